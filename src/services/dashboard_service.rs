// src/services/dashboard_service.rs

use chrono::{Datelike, Local, NaiveDate};
use sqlx::PgPool;

use crate::{
    common::error::AppError, db::DashboardRepository, middleware::filial::FilialScope,
    models::dashboard::DashboardMetrics, services::pagamento_service::mes_referencia_de,
};

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
    pool: PgPool,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn get_metrics(&self, scope: &FilialScope) -> Result<DashboardMetrics, AppError> {
        let filial_id = scope.filtro(None)?;
        let hoje = Local::now().date_naive();
        let inicio_mes = NaiveDate::from_ymd_opt(hoje.year(), hoje.month(), 1).unwrap_or(hoje);

        self.repo
            .get_metrics(&self.pool, filial_id, &mes_referencia_de(hoje), inicio_mes)
            .await
    }
}
