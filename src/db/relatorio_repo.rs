// src/db/relatorio_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, Postgres, QueryBuilder};

use crate::{
    common::{
        db_utils::{push_cmp, push_eq},
        error::AppError,
    },
    models::relatorio::{LinhaAluno, LinhaReceita, PresencaPorTurma},
};

#[derive(Clone, Default)]
pub struct RelatorioRepository;

impl RelatorioRepository {
    pub fn new() -> Self {
        Self
    }

    /// Pagamentos do ano (pelo mês de referência) para agregar no serviço.
    pub async fn linhas_receita<'e, E>(
        &self,
        executor: E,
        filial_id: Option<i32>,
        ano: i32,
    ) -> Result<Vec<LinhaReceita>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT mes_referencia, valor, forma_pagamento FROM pagamentos WHERE mes_referencia LIKE ",
        );
        qb.push_bind(format!("{:04}-%", ano));
        push_eq(&mut qb, "filial_id", filial_id);
        qb.push(" ORDER BY mes_referencia");

        let linhas = qb.build_query_as::<LinhaReceita>().fetch_all(executor).await?;
        Ok(linhas)
    }

    pub async fn linhas_alunos<'e, E>(&self, executor: E, filial_id: Option<i32>) -> Result<Vec<LinhaAluno>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(
            r#"
            SELECT a.data_nascimento, a.status_pagamento, a.filial_id, f.nome AS filial_nome
            FROM alunos a
            JOIN filiais f ON f.id = a.filial_id
            WHERE a.ativo
            "#,
        );
        push_eq(&mut qb, "a.filial_id", filial_id);

        let linhas = qb.build_query_as::<LinhaAluno>().fetch_all(executor).await?;
        Ok(linhas)
    }

    pub async fn presencas_por_turma<'e, E>(
        &self,
        executor: E,
        filial_id: Option<i32>,
        data_inicio: Option<NaiveDate>,
        data_fim: Option<NaiveDate>,
    ) -> Result<Vec<PresencaPorTurma>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(
            r#"
            SELECT t.id AS turma_id,
                t.nome AS turma_nome,
                COUNT(*) AS total_registros,
                COUNT(*) FILTER (WHERE pr.presente) AS presentes,
                ROUND(100.0 * COUNT(*) FILTER (WHERE pr.presente) / COUNT(*), 1)::float8 AS taxa_presenca
            FROM presencas pr
            JOIN turmas t ON t.id = pr.turma_id
            WHERE 1=1
            "#,
        );
        push_eq(&mut qb, "t.filial_id", filial_id);
        push_cmp(&mut qb, "pr.data", ">=", data_inicio);
        push_cmp(&mut qb, "pr.data", "<=", data_fim);
        qb.push(" GROUP BY t.id, t.nome ORDER BY t.nome");

        let turmas = qb.build_query_as::<PresencaPorTurma>().fetch_all(executor).await?;
        Ok(turmas)
    }
}
