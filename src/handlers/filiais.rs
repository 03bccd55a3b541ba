// src/handlers/filiais.rs

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
        rbac::{PermFiliaisWrite, RequirePermission},
    },
    models::filial::{CreateFilialPayload, Filial, FilialFiltro, SyncStatus, UpdateFilialPayload},
};

// GET /api/filiais
#[utoipa::path(
    get,
    path = "/api/filiais",
    tag = "Filiais",
    params(FilialFiltro),
    responses((status = 200, description = "Filiais visíveis para o usuário", body = Vec<Filial>)),
    security(("api_jwt" = []))
)]
pub async fn list_filiais(
    State(app_state): State<AppState>,
    locale: Locale,
    scope: FilialScope,
    Query(filtro): Query<FilialFiltro>,
) -> Result<impl IntoResponse, ApiError> {
    let filiais = app_state
        .filial_service
        .list_filiais(&scope, &filtro)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(filiais)))
}

// GET /api/filiais/{id}
#[utoipa::path(
    get,
    path = "/api/filiais/{id}",
    tag = "Filiais",
    params(("id" = i32, Path, description = "ID da filial")),
    responses(
        (status = 200, body = Filial),
        (status = 404, description = "Filial não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_filial(
    State(app_state): State<AppState>,
    locale: Locale,
    scope: FilialScope,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let filial = app_state
        .filial_service
        .get_filial(&scope, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(filial)))
}

// POST /api/filiais
#[utoipa::path(
    post,
    path = "/api/filiais",
    tag = "Filiais",
    request_body = CreateFilialPayload,
    responses(
        (status = 201, description = "Filial criada (e a conta do portal, se informada)", body = Filial),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "E-mail de acesso já usado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_filial(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermFiliaisWrite>,
    Json(payload): Json<CreateFilialPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let filial = app_state
        .filial_service
        .create_filial(&payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(filial)))
}

// PUT /api/filiais/{id}
#[utoipa::path(
    put,
    path = "/api/filiais/{id}",
    tag = "Filiais",
    params(("id" = i32, Path, description = "ID da filial")),
    request_body = UpdateFilialPayload,
    responses(
        (status = 200, body = Filial),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Filial não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_filial(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermFiliaisWrite>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateFilialPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let filial = app_state
        .filial_service
        .update_filial(id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(filial)))
}

// DELETE /api/filiais/{id}
#[utoipa::path(
    delete,
    path = "/api/filiais/{id}",
    tag = "Filiais",
    params(("id" = i32, Path, description = "ID da filial")),
    responses(
        (status = 204, description = "Filial excluída"),
        (status = 404, description = "Filial não encontrada"),
        (status = 409, description = "Filial ainda tem registros vinculados")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_filial(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermFiliaisWrite>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .filial_service
        .delete_filial(id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/filiais/{id}/sincronizacao
#[utoipa::path(
    get,
    path = "/api/filiais/{id}/sincronizacao",
    tag = "Filiais",
    params(("id" = i32, Path, description = "ID da filial")),
    responses(
        (status = 200, description = "Situação da sincronização da filial", body = SyncStatus),
        (status = 404, description = "Filial não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_sincronizacao(
    State(app_state): State<AppState>,
    locale: Locale,
    scope: FilialScope,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let status = app_state
        .filial_service
        .sync_status(&scope, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(status)))
}

// POST /api/filiais/{id}/sincronizar
#[utoipa::path(
    post,
    path = "/api/filiais/{id}/sincronizar",
    tag = "Filiais",
    params(("id" = i32, Path, description = "ID da filial")),
    responses(
        (status = 200, description = "Filial marcada como sincronizada", body = SyncStatus),
        (status = 404, description = "Filial não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn sincronizar(
    State(app_state): State<AppState>,
    locale: Locale,
    scope: FilialScope,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let status = app_state
        .filial_service
        .sincronizar(&scope, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(status)))
}
