// src/db/presenca_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, Postgres, QueryBuilder};

use crate::{
    common::{
        db_utils::{map_write_error, push_cmp, push_eq},
        error::AppError,
    },
    models::presenca::{Presenca, PresencaDetalhe, PresencaFiltro, UpdatePresencaPayload},
};

const SELECT_DETALHE: &str = r#"
    SELECT pr.*, a.nome AS aluno_nome, t.nome AS turma_nome, t.filial_id
    FROM presencas pr
    JOIN alunos a ON a.id = pr.aluno_id
    JOIN turmas t ON t.id = pr.turma_id
    WHERE 1=1
"#;

#[derive(Clone, Default)]
pub struct PresencaRepository;

impl PresencaRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        filtro: &PresencaFiltro,
        filial_id: Option<i32>,
    ) -> Result<Vec<PresencaDetalhe>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(SELECT_DETALHE);
        push_eq(&mut qb, "pr.aluno_id", filtro.aluno_id);
        push_eq(&mut qb, "pr.turma_id", filtro.turma_id);
        push_eq(&mut qb, "pr.data", filtro.data);
        push_cmp(&mut qb, "pr.data", ">=", filtro.data_inicio);
        push_cmp(&mut qb, "pr.data", "<=", filtro.data_fim);
        push_eq(&mut qb, "t.filial_id", filial_id);
        qb.push(" ORDER BY pr.data DESC, a.nome");

        let presencas = qb.build_query_as::<PresencaDetalhe>().fetch_all(executor).await?;
        Ok(presencas)
    }

    pub async fn find_detalhe<'e, E>(&self, executor: E, id: i32) -> Result<Option<PresencaDetalhe>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(SELECT_DETALHE);
        push_eq(&mut qb, "pr.id", Some(id));

        let presenca = qb.build_query_as::<PresencaDetalhe>().fetch_optional(executor).await?;
        Ok(presenca)
    }

    /// Registrar de novo o mesmo aluno, turma e dia sobrescreve.
    pub async fn upsert<'e, E>(
        &self,
        executor: E,
        aluno_id: i32,
        turma_id: i32,
        data: NaiveDate,
        presente: bool,
        observacoes: Option<&str>,
    ) -> Result<Presenca, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let presenca = sqlx::query_as::<_, Presenca>(
            r#"
            INSERT INTO presencas (aluno_id, turma_id, data, presente, observacoes)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (aluno_id, turma_id, data)
            DO UPDATE SET
                presente = EXCLUDED.presente,
                observacoes = EXCLUDED.observacoes
            RETURNING *
            "#,
        )
        .bind(aluno_id)
        .bind(turma_id)
        .bind(data)
        .bind(presente)
        .bind(observacoes)
        .fetch_one(executor)
        .await
        .map_err(|e| map_write_error(e, "registro_duplicado"))?;

        Ok(presenca)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: i32,
        input: &UpdatePresencaPayload,
    ) -> Result<Presenca, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let presenca = sqlx::query_as::<_, Presenca>(
            r#"
            UPDATE presencas SET
                presente = COALESCE($2, presente),
                observacoes = COALESCE($3, observacoes)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.presente)
        .bind(&input.observacoes)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("presenca"))?;

        Ok(presenca)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: i32) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM presencas WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("presenca"));
        }
        Ok(())
    }
}
