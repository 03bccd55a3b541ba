// src/handlers/gestores.rs

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
        rbac::{PermGestoresWrite, RequirePermission},
    },
    models::gestor::{CreateGestorPayload, GestorFiltro, GestorUnidade, UpdateGestorPayload},
};

// GET /api/gestores
#[utoipa::path(
    get,
    path = "/api/gestores",
    tag = "Gestores",
    params(GestorFiltro),
    responses((status = 200, body = Vec<GestorUnidade>)),
    security(("api_jwt" = []))
)]
pub async fn list_gestores(
    State(app_state): State<AppState>,
    locale: Locale,
    scope: FilialScope,
    Query(filtro): Query<GestorFiltro>,
) -> Result<impl IntoResponse, ApiError> {
    let gestores = app_state
        .gestor_service
        .list_gestores(&scope, &filtro)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(gestores)))
}

// GET /api/gestores/{id}
#[utoipa::path(
    get,
    path = "/api/gestores/{id}",
    tag = "Gestores",
    params(("id" = i32, Path, description = "ID do gestor")),
    responses((status = 200, body = GestorUnidade), (status = 404, description = "Gestor não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn get_gestor(
    State(app_state): State<AppState>,
    locale: Locale,
    scope: FilialScope,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let gestor = app_state
        .gestor_service
        .get_gestor(&scope, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(gestor)))
}

// POST /api/gestores
#[utoipa::path(
    post,
    path = "/api/gestores",
    tag = "Gestores",
    request_body = CreateGestorPayload,
    responses(
        (status = 201, description = "Gestor e conta de acesso criados", body = GestorUnidade),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "E-mail já cadastrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_gestor(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermGestoresWrite>,
    Json(payload): Json<CreateGestorPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let gestor = app_state
        .gestor_service
        .create_gestor(&payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(gestor)))
}

// PUT /api/gestores/{id}
#[utoipa::path(
    put,
    path = "/api/gestores/{id}",
    tag = "Gestores",
    params(("id" = i32, Path, description = "ID do gestor")),
    request_body = UpdateGestorPayload,
    responses((status = 200, body = GestorUnidade), (status = 404, description = "Gestor não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn update_gestor(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermGestoresWrite>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateGestorPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let gestor = app_state
        .gestor_service
        .update_gestor(id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(gestor)))
}

// DELETE /api/gestores/{id}
#[utoipa::path(
    delete,
    path = "/api/gestores/{id}",
    tag = "Gestores",
    params(("id" = i32, Path, description = "ID do gestor")),
    responses((status = 204, description = "Gestor e conta removidos"), (status = 404, description = "Gestor não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn delete_gestor(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermGestoresWrite>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .gestor_service
        .delete_gestor(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
