// src/handlers/presencas.rs

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
        rbac::{PermPresencasWrite, RequirePermission},
    },
    models::presenca::{
        ChamadaPayload, CreatePresencaPayload, Presenca, PresencaDetalhe, PresencaFiltro, UpdatePresencaPayload,
    },
};

// GET /api/presencas
#[utoipa::path(
    get,
    path = "/api/presencas",
    tag = "Presenças",
    params(PresencaFiltro),
    responses((status = 200, body = Vec<PresencaDetalhe>)),
    security(("api_jwt" = []))
)]
pub async fn list_presencas(
    State(app_state): State<AppState>,
    locale: Locale,
    scope: FilialScope,
    Query(filtro): Query<PresencaFiltro>,
) -> Result<impl IntoResponse, ApiError> {
    let presencas = app_state
        .presenca_service
        .list_presencas(&scope, &filtro)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(presencas)))
}

// GET /api/presencas/{id}
#[utoipa::path(
    get,
    path = "/api/presencas/{id}",
    tag = "Presenças",
    params(("id" = i32, Path, description = "ID do registro de presença")),
    responses((status = 200, body = PresencaDetalhe), (status = 404, description = "Registro não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn get_presenca(
    State(app_state): State<AppState>,
    locale: Locale,
    scope: FilialScope,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let presenca = app_state
        .presenca_service
        .get_presenca(&scope, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(presenca)))
}

// POST /api/presencas/chamada
#[utoipa::path(
    post,
    path = "/api/presencas/chamada",
    tag = "Presenças",
    request_body = ChamadaPayload,
    responses(
        (status = 200, description = "Chamada gravada (repetir o dia sobrescreve)", body = Vec<Presenca>),
        (status = 400, description = "Chamada sem alunos"),
        (status = 404, description = "Turma não encontrada"),
        (status = 422, description = "Aluno sem matrícula ativa na turma")
    ),
    security(("api_jwt" = []))
)]
pub async fn registrar_chamada(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermPresencasWrite>,
    scope: FilialScope,
    Json(payload): Json<ChamadaPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let presencas = app_state
        .presenca_service
        .registrar_chamada(&scope, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(presencas)))
}

// POST /api/presencas
#[utoipa::path(
    post,
    path = "/api/presencas",
    tag = "Presenças",
    request_body = CreatePresencaPayload,
    responses(
        (status = 201, body = Presenca),
        (status = 409, description = "Já existe registro do aluno nesse dia"),
        (status = 422, description = "Aluno sem matrícula ativa na turma")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_presenca(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermPresencasWrite>,
    scope: FilialScope,
    Json(payload): Json<CreatePresencaPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let presenca = app_state
        .presenca_service
        .create_presenca(&scope, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(presenca)))
}

// PUT /api/presencas/{id}
#[utoipa::path(
    put,
    path = "/api/presencas/{id}",
    tag = "Presenças",
    params(("id" = i32, Path, description = "ID do registro de presença")),
    request_body = UpdatePresencaPayload,
    responses((status = 200, body = Presenca), (status = 404, description = "Registro não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn update_presenca(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermPresencasWrite>,
    scope: FilialScope,
    Path(id): Path<i32>,
    Json(payload): Json<UpdatePresencaPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let presenca = app_state
        .presenca_service
        .update_presenca(&scope, id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(presenca)))
}

// DELETE /api/presencas/{id}
#[utoipa::path(
    delete,
    path = "/api/presencas/{id}",
    tag = "Presenças",
    params(("id" = i32, Path, description = "ID do registro de presença")),
    responses((status = 204, description = "Registro excluído"), (status = 404, description = "Registro não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn delete_presenca(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermPresencasWrite>,
    scope: FilialScope,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .presenca_service
        .delete_presenca(&scope, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
