// src/handlers/relatorios.rs

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        filial::FilialScope,
        i18n::Locale,
        rbac::{PermRelatoriosRead, RequirePermission},
    },
    models::{
        aluno::AlunoFiltro,
        pagamento::PagamentoFiltro,
        presenca::PresencaFiltro,
        relatorio::{RelatorioAlunos, RelatorioFinanceiro, RelatorioPresencas, RelatorioQuery},
    },
};

fn resposta_csv(nome_arquivo: &str, conteudo: Vec<u8>) -> Response {
    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", nome_arquivo)),
    ];
    (StatusCode::OK, headers, conteudo).into_response()
}

// GET /api/relatorios/financeiro
#[utoipa::path(
    get,
    path = "/api/relatorios/financeiro",
    tag = "Relatórios",
    params(RelatorioQuery),
    responses((status = 200, description = "Receita do ano por mês e por forma de pagamento", body = RelatorioFinanceiro)),
    security(("api_jwt" = []))
)]
pub async fn relatorio_financeiro(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermRelatoriosRead>,
    scope: FilialScope,
    Query(query): Query<RelatorioQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let relatorio = app_state
        .relatorio_service
        .financeiro(&scope, &query)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(relatorio)))
}

// GET /api/relatorios/alunos
#[utoipa::path(
    get,
    path = "/api/relatorios/alunos",
    tag = "Relatórios",
    params(RelatorioQuery),
    responses((status = 200, description = "Alunos ativos por faixa etária, filial e status", body = RelatorioAlunos)),
    security(("api_jwt" = []))
)]
pub async fn relatorio_alunos(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermRelatoriosRead>,
    scope: FilialScope,
    Query(query): Query<RelatorioQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let relatorio = app_state
        .relatorio_service
        .alunos(&scope, &query)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(relatorio)))
}

// GET /api/relatorios/presencas
#[utoipa::path(
    get,
    path = "/api/relatorios/presencas",
    tag = "Relatórios",
    params(RelatorioQuery),
    responses((status = 200, description = "Frequência por turma no período", body = RelatorioPresencas)),
    security(("api_jwt" = []))
)]
pub async fn relatorio_presencas(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermRelatoriosRead>,
    scope: FilialScope,
    Query(query): Query<RelatorioQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let relatorio = app_state
        .relatorio_service
        .presencas(&scope, &query)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(relatorio)))
}

// GET /api/relatorios/alunos/csv
#[utoipa::path(
    get,
    path = "/api/relatorios/alunos/csv",
    tag = "Relatórios",
    params(AlunoFiltro),
    responses((status = 200, description = "Alunos filtrados em CSV", body = String, content_type = "text/csv")),
    security(("api_jwt" = []))
)]
pub async fn exportar_alunos(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermRelatoriosRead>,
    scope: FilialScope,
    Query(filtro): Query<AlunoFiltro>,
) -> Result<Response, ApiError> {
    let csv = app_state
        .relatorio_service
        .alunos_csv(&scope, &filtro)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(resposta_csv("alunos.csv", csv))
}

// GET /api/relatorios/pagamentos/csv
#[utoipa::path(
    get,
    path = "/api/relatorios/pagamentos/csv",
    tag = "Relatórios",
    params(PagamentoFiltro),
    responses((status = 200, description = "Pagamentos filtrados em CSV", body = String, content_type = "text/csv")),
    security(("api_jwt" = []))
)]
pub async fn exportar_pagamentos(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermRelatoriosRead>,
    scope: FilialScope,
    Query(filtro): Query<PagamentoFiltro>,
) -> Result<Response, ApiError> {
    let csv = app_state
        .relatorio_service
        .pagamentos_csv(&scope, &filtro)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(resposta_csv("pagamentos.csv", csv))
}

// GET /api/relatorios/presencas/csv
#[utoipa::path(
    get,
    path = "/api/relatorios/presencas/csv",
    tag = "Relatórios",
    params(PresencaFiltro),
    responses((status = 200, description = "Presenças filtradas em CSV", body = String, content_type = "text/csv")),
    security(("api_jwt" = []))
)]
pub async fn exportar_presencas(
    State(app_state): State<AppState>,
    locale: Locale,
    _perm: RequirePermission<PermRelatoriosRead>,
    scope: FilialScope,
    Query(filtro): Query<PresencaFiltro>,
) -> Result<Response, ApiError> {
    let csv = app_state
        .relatorio_service
        .presencas_csv(&scope, &filtro)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(resposta_csv("presencas.csv", csv))
}
