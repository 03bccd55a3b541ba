// src/handlers/professores.rs

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
    models::professor::{CreateProfessorPayload, Professor, ProfessorFiltro, UpdateProfessorPayload},
};

// GET /api/professores
#[utoipa::path(
    get,
    path = "/api/professores",
    tag = "Professores",
    params(ProfessorFiltro),
    responses((status = 200, body = Vec<Professor>)),
    security(("api_jwt" = []))
)]
pub async fn list_professores(
    State(app_state): State<AppState>,
    locale: Locale,
    scope: FilialScope,
    Query(filtro): Query<ProfessorFiltro>,
) -> Result<impl IntoResponse, ApiError> {
    let professores = app_state
        .professor_service
        .list_professores(&scope, &filtro)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(professores)))
}

// GET /api/professores/{id}
#[utoipa::path(
    get,
    path = "/api/professores/{id}",
    tag = "Professores",
    params(("id" = i32, Path, description = "ID do professor")),
    responses((status = 200, body = Professor), (status = 404, description = "Professor não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn get_professor(
    State(app_state): State<AppState>,
    locale: Locale,
    scope: FilialScope,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let professor = app_state
        .professor_service
        .get_professor(&scope, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(professor)))
}

// POST /api/professores
#[utoipa::path(
    post,
    path = "/api/professores",
    tag = "Professores",
    request_body = CreateProfessorPayload,
    responses((status = 201, body = Professor), (status = 400, description = "Dados inválidos")),
    security(("api_jwt" = []))
)]
pub async fn create_professor(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCadastrosWrite>,
    scope: FilialScope,
    Json(payload): Json<CreateProfessorPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let professor = app_state
        .professor_service
        .create_professor(&scope, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(professor)))
}

// PUT /api/professores/{id}
#[utoipa::path(
    put,
    path = "/api/professores/{id}",
    tag = "Professores",
    params(("id" = i32, Path, description = "ID do professor")),
    request_body = UpdateProfessorPayload,
    responses((status = 200, body = Professor), (status = 404, description = "Professor não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn update_professor(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCadastrosWrite>,
    scope: FilialScope,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateProfessorPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let professor = app_state
        .professor_service
        .update_professor(&scope, id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(professor)))
}

// DELETE /api/professores/{id}
#[utoipa::path(
    delete,
    path = "/api/professores/{id}",
    tag = "Professores",
    params(("id" = i32, Path, description = "ID do professor")),
    responses((status = 204, description = "Professor excluído"), (status = 404, description = "Professor não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn delete_professor(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCadastrosWrite>,
    scope: FilialScope,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .professor_service
        .delete_professor(&scope, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
