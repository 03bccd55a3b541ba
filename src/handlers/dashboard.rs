// src/handlers/dashboard.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{filial::FilialScope, i18n::Locale},
    models::dashboard::DashboardMetrics,
};

// GET /api/dashboard/metrics
#[utoipa::path(
    get,
    path = "/api/dashboard/metrics",
    tag = "Dashboard",
    params(("x-filial-id" = Option<i32>, Header, description = "Filial escolhida pela matriz")),
    responses((status = 200, description = "Cards do painel no mês corrente", body = DashboardMetrics)),
    security(("api_jwt" = []))
)]
pub async fn get_metrics(
    State(app_state): State<AppState>,
    locale: Locale,
    scope: FilialScope,
) -> Result<impl IntoResponse, ApiError> {
    let metrics = app_state
        .dashboard_service
        .get_metrics(&scope)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(metrics)))
}
