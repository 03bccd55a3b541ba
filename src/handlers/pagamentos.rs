// src/handlers/pagamentos.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        filial::FilialScope,
        i18n::Locale,
        rbac::{PermFinanceiroRead, PermFinanceiroWrite, RequirePermission},
    },
    models::pagamento::{
        CreatePagamentoPayload, Pagamento, PagamentoDetalhe, PagamentoFiltro, UpdatePagamentoPayload,
    },
};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecalculoResponse {
    pub alunos_atualizados: u64,
}

// GET /api/pagamentos
#[utoipa::path(
    get,
    path = "/api/pagamentos",
    tag = "Pagamentos",
    params(PagamentoFiltro),
    responses((status = 200, description = "Pagamentos, do mais recente ao mais antigo", body = Vec<PagamentoDetalhe>)),
    security(("api_jwt" = []))
)]
pub async fn list_pagamentos(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermFinanceiroRead>,
    scope: FilialScope,
    Query(filtro): Query<PagamentoFiltro>,
) -> Result<impl IntoResponse, ApiError> {
    let pagamentos = app_state
        .pagamento_service
        .list_pagamentos(&scope, &filtro)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(pagamentos)))
}

// GET /api/pagamentos/{id}
#[utoipa::path(
    get,
    path = "/api/pagamentos/{id}",
    tag = "Pagamentos",
    params(("id" = i32, Path, description = "ID do pagamento")),
    responses((status = 200, body = PagamentoDetalhe), (status = 404, description = "Pagamento não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn get_pagamento(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermFinanceiroRead>,
    scope: FilialScope,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let pagamento = app_state
        .pagamento_service
        .get_pagamento(&scope, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(pagamento)))
}

// POST /api/pagamentos
#[utoipa::path(
    post,
    path = "/api/pagamentos",
    tag = "Pagamentos",
    request_body = CreatePagamentoPayload,
    responses(
        (status = 201, description = "Pagamento registrado; status do aluno recalculado", body = Pagamento),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Aluno não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_pagamento(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermFinanceiroWrite>,
    scope: FilialScope,
    Json(payload): Json<CreatePagamentoPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let pagamento = app_state
        .pagamento_service
        .create_pagamento(&scope, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(pagamento)))
}

// PUT /api/pagamentos/{id}
#[utoipa::path(
    put,
    path = "/api/pagamentos/{id}",
    tag = "Pagamentos",
    params(("id" = i32, Path, description = "ID do pagamento")),
    request_body = UpdatePagamentoPayload,
    responses((status = 200, body = Pagamento), (status = 404, description = "Pagamento não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn update_pagamento(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermFinanceiroWrite>,
    scope: FilialScope,
    Path(id): Path<i32>,
    Json(payload): Json<UpdatePagamentoPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let pagamento = app_state
        .pagamento_service
        .update_pagamento(&scope, id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(pagamento)))
}

// DELETE /api/pagamentos/{id}
#[utoipa::path(
    delete,
    path = "/api/pagamentos/{id}",
    tag = "Pagamentos",
    params(("id" = i32, Path, description = "ID do pagamento")),
    responses((status = 204, description = "Pagamento excluído"), (status = 404, description = "Pagamento não encontrado")),
    security(("api_jwt" = []))
)]
pub async fn delete_pagamento(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermFinanceiroWrite>,
    scope: FilialScope,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .pagamento_service
        .delete_pagamento(&scope, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/pagamentos/recalcular-status
#[utoipa::path(
    post,
    path = "/api/pagamentos/recalcular-status",
    tag = "Pagamentos",
    responses((status = 200, description = "Status dos alunos do escopo recalculado", body = RecalculoResponse)),
    security(("api_jwt" = []))
)]
pub async fn recalcular_status(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermFinanceiroWrite>,
    scope: FilialScope,
) -> Result<impl IntoResponse, ApiError> {
    let alunos_atualizados = app_state
        .pagamento_service
        .recalcular_status(&scope)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(RecalculoResponse { alunos_atualizados })))
}
