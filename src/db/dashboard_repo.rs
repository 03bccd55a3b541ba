// src/db/dashboard_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, Postgres};

use crate::{common::error::AppError, models::dashboard::DashboardMetrics};

#[derive(Clone, Default)]
pub struct DashboardRepository;

impl DashboardRepository {
    pub fn new() -> Self {
        Self
    }

    /// Todos os cards numa leitura só. `filial_id` nulo = rede inteira.
    pub async fn get_metrics<'e, E>(
        &self,
        executor: E,
        filial_id: Option<i32>,
        mes_referencia: &str,
        inicio_mes: NaiveDate,
    ) -> Result<DashboardMetrics, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let metrics = sqlx::query_as::<_, DashboardMetrics>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM alunos
                    WHERE ativo AND ($1::int IS NULL OR filial_id = $1)) AS alunos_ativos,
                (SELECT COUNT(*) FROM professores
                    WHERE ativo AND ($1::int IS NULL OR filial_id = $1)) AS professores_ativos,
                (SELECT COUNT(*) FROM turmas
                    WHERE ativo AND ($1::int IS NULL OR filial_id = $1)) AS turmas_ativas,
                (SELECT COUNT(*) FROM filiais
                    WHERE ativo AND ($1::int IS NULL OR id = $1)) AS filiais_ativas,
                (SELECT COALESCE(SUM(valor), 0) FROM pagamentos
                    WHERE mes_referencia = $2 AND ($1::int IS NULL OR filial_id = $1)) AS receita_mes,
                (SELECT COUNT(*) FROM alunos
                    WHERE ativo AND status_pagamento <> 'em_dia'
                      AND ($1::int IS NULL OR filial_id = $1)) AS alunos_inadimplentes,
                (SELECT COALESCE(
                        ROUND(100.0 * COUNT(*) FILTER (WHERE pr.presente) / NULLIF(COUNT(*), 0), 1),
                        0
                    )::float8
                    FROM presencas pr
                    JOIN turmas t ON t.id = pr.turma_id
                    WHERE pr.data >= $3 AND pr.data < ($3::date + INTERVAL '1 month')
                      AND ($1::int IS NULL OR t.filial_id = $1)) AS taxa_presenca_mes,
                (SELECT COUNT(*) FROM matriculas m
                    JOIN turmas t ON t.id = m.turma_id
                    WHERE m.data_matricula >= $3 AND m.data_matricula < ($3::date + INTERVAL '1 month')
                      AND ($1::int IS NULL OR t.filial_id = $1)) AS novas_matriculas_mes
            "#,
        )
        .bind(filial_id)
        .bind(mes_referencia)
        .bind(inicio_mes)
        .fetch_one(executor)
        .await?;

        Ok(metrics)
    }
}
