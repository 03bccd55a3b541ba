// src/models/dashboard.rs

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

// Cards do topo do painel
#[derive(Debug, Default, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub alunos_ativos: i64,
    pub professores_ativos: i64,
    pub turmas_ativas: i64,
    pub filiais_ativas: i64,

    // Soma dos pagamentos com mesReferencia = mês corrente
    #[schema(example = "15420.50")]
    pub receita_mes: Decimal,

    // Alunos ativos com status pendente ou atrasado
    pub alunos_inadimplentes: i64,

    // Percentual (0-100) das presenças registradas no mês
    #[schema(example = 87.5)]
    pub taxa_presenca_mes: f64,

    pub novas_matriculas_mes: i64,
}
