// src/handlers/configuracoes.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{PermConfiguracoesWrite, RequirePermission},
    },
    models::configuracoes::{Configuracoes, UpdateConfiguracoesRequest},
};

// GET /api/configuracoes
#[utoipa::path(
    get,
    path = "/api/configuracoes",
    tag = "Configurações",
    responses((status = 200, description = "Configurações da rede (padrões se nunca salvas)", body = Configuracoes)),
    security(("api_jwt" = []))
)]
pub async fn get_configuracoes(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let configuracoes = app_state
        .configuracoes_repo
        .get(&app_state.db_pool)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(configuracoes)))
}

// PUT /api/configuracoes
#[utoipa::path(
    put,
    path = "/api/configuracoes",
    tag = "Configurações",
    request_body = UpdateConfiguracoesRequest,
    responses(
        (status = 200, body = Configuracoes),
        (status = 400, description = "Cor, tema ou dia de vencimento inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_configuracoes(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermConfiguracoesWrite>,
    Json(payload): Json<UpdateConfiguracoesRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let updated = app_state
        .configuracoes_repo
        .update(&app_state.db_pool, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    tracing::info!("Configurações da rede atualizadas");
    Ok((StatusCode::OK, Json(updated)))
}
