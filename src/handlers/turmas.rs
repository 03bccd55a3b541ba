// src/handlers/turmas.rs

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
    models::turma::{CreateTurmaPayload, Turma, TurmaFiltro, TurmaOcupacao, UpdateTurmaPayload},
};

// GET /api/turmas
#[utoipa::path(
    get,
    path = "/api/turmas",
    tag = "Turmas",
    params(TurmaFiltro),
    responses((status = 200, description = "Turmas com a ocupação atual", body = Vec<TurmaOcupacao>)),
    security(("api_jwt" = []))
)]
pub async fn list_turmas(
    State(app_state): State<AppState>,
    locale: Locale,
    scope: FilialScope,
    Query(filtro): Query<TurmaFiltro>,
) -> Result<impl IntoResponse, ApiError> {
    let turmas = app_state
        .turma_service
        .list_turmas(&scope, &filtro)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(turmas)))
}

// GET /api/turmas/{id}
#[utoipa::path(
    get,
    path = "/api/turmas/{id}",
    tag = "Turmas",
    params(("id" = i32, Path, description = "ID da turma")),
    responses((status = 200, body = TurmaOcupacao), (status = 404, description = "Turma não encontrada")),
    security(("api_jwt" = []))
)]
pub async fn get_turma(
    State(app_state): State<AppState>,
    locale: Locale,
    scope: FilialScope,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let turma = app_state
        .turma_service
        .get_turma(&scope, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(turma)))
}

// POST /api/turmas
#[utoipa::path(
    post,
    path = "/api/turmas",
    tag = "Turmas",
    request_body = CreateTurmaPayload,
    responses(
        (status = 201, body = Turma),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Professor de outra filial")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_turma(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCadastrosWrite>,
    scope: FilialScope,
    Json(payload): Json<CreateTurmaPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let turma = app_state
        .turma_service
        .create_turma(&scope, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(turma)))
}

// PUT /api/turmas/{id}
#[utoipa::path(
    put,
    path = "/api/turmas/{id}",
    tag = "Turmas",
    params(("id" = i32, Path, description = "ID da turma")),
    request_body = UpdateTurmaPayload,
    responses((status = 200, body = Turma), (status = 404, description = "Turma não encontrada")),
    security(("api_jwt" = []))
)]
pub async fn update_turma(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCadastrosWrite>,
    scope: FilialScope,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateTurmaPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let turma = app_state
        .turma_service
        .update_turma(&scope, id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(turma)))
}

// DELETE /api/turmas/{id}
#[utoipa::path(
    delete,
    path = "/api/turmas/{id}",
    tag = "Turmas",
    params(("id" = i32, Path, description = "ID da turma")),
    responses((status = 204, description = "Turma excluída"), (status = 404, description = "Turma não encontrada")),
    security(("api_jwt" = []))
)]
pub async fn delete_turma(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCadastrosWrite>,
    scope: FilialScope,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .turma_service
        .delete_turma(&scope, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
