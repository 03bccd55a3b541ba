// src/db/professor_repo.rs

use sqlx::{Executor, Postgres, QueryBuilder};

use crate::{
    common::{
        db_utils::{map_delete_error, map_write_error, push_busca, push_eq},
        error::AppError,
    },
    models::professor::{CreateProfessorPayload, Professor, ProfessorFiltro, UpdateProfessorPayload},
};

#[derive(Clone, Default)]
pub struct ProfessorRepository;

impl ProfessorRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        filtro: &ProfessorFiltro,
        filial_id: Option<i32>,
    ) -> Result<Vec<Professor>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM professores WHERE 1=1");
        push_busca(&mut qb, &["nome", "cpf", "email", "especialidade"], filtro.busca.as_deref());
        push_eq(&mut qb, "filial_id", filial_id);
        push_eq(&mut qb, "ativo", filtro.ativo);
        push_eq(&mut qb, "especialidade", filtro.especialidade.clone());
        qb.push(" ORDER BY nome");

        let professores = qb.build_query_as::<Professor>().fetch_all(executor).await?;
        Ok(professores)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: i32) -> Result<Option<Professor>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let professor = sqlx::query_as::<_, Professor>("SELECT * FROM professores WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(professor)
    }

    pub async fn lock_by_id<'e, E>(&self, executor: E, id: i32) -> Result<Option<Professor>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let professor = sqlx::query_as::<_, Professor>("SELECT * FROM professores WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(professor)
    }

    /// Turmas (ativas ou não) que têm este professor.
    pub async fn contar_turmas<'e, E>(&self, executor: E, id: i32) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM turmas WHERE professor_id = $1")
            .bind(id)
            .fetch_one(executor)
            .await?;
        Ok(total)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        input: &CreateProfessorPayload,
        filial_id: i32,
    ) -> Result<Professor, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let professor = sqlx::query_as::<_, Professor>(
            r#"
            INSERT INTO professores (
                nome, cpf, email, telefone, especialidade, filial_id, ativo, data_admissao
            )
            VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, TRUE), $8)
            RETURNING *
            "#,
        )
        .bind(input.nome.trim())
        .bind(&input.cpf)
        .bind(&input.email)
        .bind(&input.telefone)
        .bind(&input.especialidade)
        .bind(filial_id)
        .bind(input.ativo)
        .bind(input.data_admissao)
        .fetch_one(executor)
        .await
        .map_err(|e| map_write_error(e, "registro_duplicado"))?;

        Ok(professor)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: i32,
        input: &UpdateProfessorPayload,
    ) -> Result<Professor, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let professor = sqlx::query_as::<_, Professor>(
            r#"
            UPDATE professores SET
                nome = COALESCE($2, nome),
                cpf = COALESCE($3, cpf),
                email = COALESCE($4, email),
                telefone = COALESCE($5, telefone),
                especialidade = COALESCE($6, especialidade),
                filial_id = COALESCE($7, filial_id),
                ativo = COALESCE($8, ativo),
                data_admissao = COALESCE($9, data_admissao),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.nome.as_deref().map(str::trim))
        .bind(&input.cpf)
        .bind(&input.email)
        .bind(&input.telefone)
        .bind(&input.especialidade)
        .bind(input.filial_id)
        .bind(input.ativo)
        .bind(input.data_admissao)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_write_error(e, "registro_duplicado"))?
        .ok_or(AppError::NotFound("professor"))?;

        Ok(professor)
    }

    // As turmas do professor ficam sem professor (ON DELETE SET NULL)
    pub async fn delete<'e, E>(&self, executor: E, id: i32) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM professores WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(map_delete_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("professor"));
        }
        Ok(())
    }
}
