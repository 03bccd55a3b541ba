// src/db/matricula_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, Postgres, QueryBuilder};

use crate::{
    common::{
        db_utils::{map_write_error, push_eq},
        error::AppError,
    },
    models::matricula::{Matricula, MatriculaDetalhe, MatriculaFiltro},
};

const SELECT_DETALHE: &str = r#"
    SELECT m.*, a.nome AS aluno_nome, t.nome AS turma_nome, t.filial_id
    FROM matriculas m
    JOIN alunos a ON a.id = m.aluno_id
    JOIN turmas t ON t.id = m.turma_id
    WHERE 1=1
"#;

#[derive(Clone, Default)]
pub struct MatriculaRepository;

impl MatriculaRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        filtro: &MatriculaFiltro,
        filial_id: Option<i32>,
    ) -> Result<Vec<MatriculaDetalhe>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(SELECT_DETALHE);
        push_eq(&mut qb, "m.aluno_id", filtro.aluno_id);
        push_eq(&mut qb, "m.turma_id", filtro.turma_id);
        push_eq(&mut qb, "m.ativo", filtro.ativo);
        push_eq(&mut qb, "t.filial_id", filial_id);
        qb.push(" ORDER BY a.nome, t.nome");

        let matriculas = qb.build_query_as::<MatriculaDetalhe>().fetch_all(executor).await?;
        Ok(matriculas)
    }

    pub async fn find_detalhe<'e, E>(&self, executor: E, id: i32) -> Result<Option<MatriculaDetalhe>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(SELECT_DETALHE);
        push_eq(&mut qb, "m.id", Some(id));

        let matricula = qb.build_query_as::<MatriculaDetalhe>().fetch_optional(executor).await?;
        Ok(matricula)
    }

    pub async fn ativa_existe<'e, E>(&self, executor: E, aluno_id: i32, turma_id: i32) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let existe: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM matriculas WHERE aluno_id = $1 AND turma_id = $2 AND ativo)",
        )
        .bind(aluno_id)
        .bind(turma_id)
        .fetch_one(executor)
        .await?;
        Ok(existe)
    }

    /// Dos alunos informados, os que têm matrícula ativa na turma.
    pub async fn alunos_ativos<'e, E>(
        &self,
        executor: E,
        turma_id: i32,
        aluno_ids: &[i32],
    ) -> Result<Vec<i32>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids: Vec<i32> = sqlx::query_scalar(
            "SELECT aluno_id FROM matriculas WHERE turma_id = $1 AND ativo AND aluno_id = ANY($2)",
        )
        .bind(turma_id)
        .bind(aluno_ids)
        .fetch_all(executor)
        .await?;
        Ok(ids)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        aluno_id: i32,
        turma_id: i32,
        data_matricula: Option<NaiveDate>,
    ) -> Result<Matricula, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let matricula = sqlx::query_as::<_, Matricula>(
            r#"
            INSERT INTO matriculas (aluno_id, turma_id, data_matricula)
            VALUES ($1, $2, COALESCE($3, CURRENT_DATE))
            RETURNING *
            "#,
        )
        .bind(aluno_id)
        .bind(turma_id)
        .bind(data_matricula)
        .fetch_one(executor)
        .await
        .map_err(|e| map_write_error(e, "matricula_duplicada"))?;

        Ok(matricula)
    }

    pub async fn set_ativo<'e, E>(&self, executor: E, id: i32, ativo: bool) -> Result<Matricula, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let matricula = sqlx::query_as::<_, Matricula>("UPDATE matriculas SET ativo = $2 WHERE id = $1 RETURNING *")
            .bind(id)
            .bind(ativo)
            .fetch_optional(executor)
            .await
            .map_err(|e| map_write_error(e, "matricula_duplicada"))?
            .ok_or(AppError::NotFound("matricula"))?;
        Ok(matricula)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: i32) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM matriculas WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("matricula"));
        }
        Ok(())
    }
}
