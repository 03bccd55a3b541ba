// src/handlers/combos.rs

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
    models::combo::{ComboAulas, ComboFiltro, CreateComboPayload, UpdateComboPayload},
};

// GET /api/combos
#[utoipa::path(
    get,
    path = "/api/combos",
    tag = "Combos",
    params(ComboFiltro),
    responses((status = 200, description = "Combos da filial e os da rede toda", body = Vec<ComboAulas>)),
    security(("api_jwt" = []))
)]
pub async fn list_combos(
    State(app_state): State<AppState>,
    locale: Locale,
    scope: FilialScope,
    Query(filtro): Query<ComboFiltro>,
) -> Result<impl IntoResponse, ApiError> {
    let combos = app_state
        .combo_service
        .list_combos(&scope, &filtro)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(combos)))
}

// GET /api/combos/{id}
#[utoipa::path(
    get,
    path = "/api/combos/{id}",
    tag = "Combos",
    params(("id" = i32, Path, description = "ID do combo")),
    responses((status = 200, body = ComboAulas), (status = 404, description = "Combo não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn get_combo(
    State(app_state): State<AppState>,
    locale: Locale,
    scope: FilialScope,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let combo = app_state
        .combo_service
        .get_combo(&scope, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(combo)))
}

// POST /api/combos
#[utoipa::path(
    post,
    path = "/api/combos",
    tag = "Combos",
    request_body = CreateComboPayload,
    responses((status = 201, body = ComboAulas), (status = 400, description = "Dados inválidos")),
    security(("api_jwt" = []))
)]
pub async fn create_combo(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCadastrosWrite>,
    scope: FilialScope,
    Json(payload): Json<CreateComboPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let combo = app_state
        .combo_service
        .create_combo(&scope, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(combo)))
}

// PUT /api/combos/{id}
#[utoipa::path(
    put,
    path = "/api/combos/{id}",
    tag = "Combos",
    params(("id" = i32, Path, description = "ID do combo")),
    request_body = UpdateComboPayload,
    responses((status = 200, body = ComboAulas), (status = 404, description = "Combo não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn update_combo(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCadastrosWrite>,
    scope: FilialScope,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateComboPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let combo = app_state
        .combo_service
        .update_combo(&scope, id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(combo)))
}

// DELETE /api/combos/{id}
#[utoipa::path(
    delete,
    path = "/api/combos/{id}",
    tag = "Combos",
    params(("id" = i32, Path, description = "ID do combo")),
    responses((status = 204, description = "Combo excluído"), (status = 404, description = "Combo não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn delete_combo(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermCadastrosWrite>,
    scope: FilialScope,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .combo_service
        .delete_combo(&scope, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
