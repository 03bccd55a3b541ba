// src/handlers/matriculas.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        filial::FilialScope,
        i18n::Locale,
        rbac::{PermCadastrosWrite, RequirePermission},
    },
    models::matricula::{
        CreateMatriculaPayload, Matricula, MatriculaDetalhe, MatriculaFiltro, UpdateMatriculaPayload,
    },
};

// GET /api/matriculas
#[utoipa::path(
    get,
    path = "/api/matriculas",
    tag = "Matrículas",
    params(MatriculaFiltro),
    responses((status = 200, body = Vec<MatriculaDetalhe>)),
    security(("api_jwt" = []))
)]
pub async fn list_matriculas(
    State(app_state): State<AppState>,
    locale: Locale,
    scope: FilialScope,
    Query(filtro): Query<MatriculaFiltro>,
) -> Result<impl IntoResponse, ApiError> {
    let matriculas = app_state
        .matricula_service
        .list_matriculas(&scope, &filtro)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(matriculas)))
}

// GET /api/matriculas/{id}
#[utoipa::path(
    get,
    path = "/api/matriculas/{id}",
    tag = "Matrículas",
    params(("id" = i32, Path, description = "ID da matrícula")),
    responses((status = 200, body = MatriculaDetalhe), (status = 404, description = "Matrícula não encontrada")),
    security(("api_jwt" = []))
)]
pub async fn get_matricula(
    State(app_state): State<AppState>,
    locale: Locale,
    scope: FilialScope,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let matricula = app_state
        .matricula_service
        .get_matricula(&scope, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(matricula)))
}

// POST /api/matriculas
#[utoipa::path(
    post,
    path = "/api/matriculas",
    tag = "Matrículas",
    request_body = CreateMatriculaPayload,
    responses(
        (status = 201, description = "Aluno matriculado", body = Matricula),
        (status = 404, description = "Aluno ou turma não encontrados"),
        (status = 409, description = "Turma lotada, filiais diferentes ou matrícula repetida")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_matricula(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCadastrosWrite>,
    scope: FilialScope,
    Json(payload): Json<CreateMatriculaPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let matricula = app_state
        .matricula_service
        .create_matricula(&scope, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(matricula)))
}

// PUT /api/matriculas/{id}
#[utoipa::path(
    put,
    path = "/api/matriculas/{id}",
    tag = "Matrículas",
    params(("id" = i32, Path, description = "ID da matrícula")),
    request_body = UpdateMatriculaPayload,
    responses(
        (status = 200, body = Matricula),
        (status = 404, description = "Matrícula não encontrada"),
        (status = 409, description = "Turma lotada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_matricula(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCadastrosWrite>,
    scope: FilialScope,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateMatriculaPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let matricula = app_state
        .matricula_service
        .set_ativo(&scope, id, payload.ativo)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(matricula)))
}

// DELETE /api/matriculas/{id}
#[utoipa::path(
    delete,
    path = "/api/matriculas/{id}",
    tag = "Matrículas",
    params(("id" = i32, Path, description = "ID da matrícula")),
    responses((status = 204, description = "Matrícula excluída"), (status = 404, description = "Matrícula não encontrada")),
    security(("api_jwt" = []))
)]
pub async fn delete_matricula(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCadastrosWrite>,
    scope: FilialScope,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .matricula_service
        .delete_matricula(&scope, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
