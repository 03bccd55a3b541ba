// src/handlers/alunos.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        filial::FilialScope,
        i18n::Locale,
        rbac::{PermCadastrosWrite, RequirePermission},
    },
    models::aluno::{Aluno, AlunoFiltro, CreateAlunoPayload, UpdateAlunoPayload},
};

// GET /api/alunos
#[utoipa::path(
    get,
    path = "/api/alunos",
    tag = "Alunos",
    params(AlunoFiltro, ("x-filial-id" = Option<i32>, Header, description = "Filial escolhida pela matriz")),
    responses((status = 200, description = "Alunos do escopo", body = Vec<Aluno>)),
    security(("api_jwt" = []))
)]
pub async fn list_alunos(
    State(app_state): State<AppState>,
    locale: Locale,
    scope: FilialScope,
    Query(filtro): Query<AlunoFiltro>,
) -> Result<impl IntoResponse, ApiError> {
    let alunos = app_state
        .aluno_service
        .list_alunos(&scope, &filtro)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(alunos)))
}

// GET /api/alunos/{id}
#[utoipa::path(
    get,
    path = "/api/alunos/{id}",
    tag = "Alunos",
    params(("id" = i32, Path, description = "ID do aluno")),
    responses(
        (status = 200, body = Aluno),
        (status = 404, description = "Aluno não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_aluno(
    State(app_state): State<AppState>,
    locale: Locale,
    scope: FilialScope,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let aluno = app_state
        .aluno_service
        .get_aluno(&scope, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(aluno)))
}

// POST /api/alunos
#[utoipa::path(
    post,
    path = "/api/alunos",
    tag = "Alunos",
    request_body = CreateAlunoPayload,
    responses(
        (status = 201, description = "Aluno cadastrado", body = Aluno),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Filial fora do escopo")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_aluno(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCadastrosWrite>,
    scope: FilialScope,
    Json(payload): Json<CreateAlunoPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let aluno = app_state
        .aluno_service
        .create_aluno(&scope, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(aluno)))
}

// PUT /api/alunos/{id}
#[utoipa::path(
    put,
    path = "/api/alunos/{id}",
    tag = "Alunos",
    params(("id" = i32, Path, description = "ID do aluno")),
    request_body = UpdateAlunoPayload,
    responses(
        (status = 200, body = Aluno),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Aluno não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_aluno(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCadastrosWrite>,
    scope: FilialScope,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateAlunoPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let aluno = app_state
        .aluno_service
        .update_aluno(&scope, id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(aluno)))
}

// DELETE /api/alunos/{id}
#[utoipa::path(
    delete,
    path = "/api/alunos/{id}",
    tag = "Alunos",
    params(("id" = i32, Path, description = "ID do aluno")),
    responses(
        (status = 204, description = "Aluno excluído"),
        (status = 404, description = "Aluno não encontrado"),
        (status = 409, description = "Aluno tem pagamentos registrados")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_aluno(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCadastrosWrite>,
    scope: FilialScope,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .aluno_service
        .delete_aluno(&scope, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
