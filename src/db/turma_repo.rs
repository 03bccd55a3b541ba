// src/db/turma_repo.rs

use sqlx::{Executor, Postgres, QueryBuilder};

use crate::{
    common::{
        db_utils::{map_delete_error, map_write_error, push_busca, push_eq},
        error::AppError,
    },
    models::turma::{CreateTurmaPayload, Turma, TurmaFiltro, TurmaOcupacao, UpdateTurmaPayload},
};

const SELECT_OCUPACAO: &str = r#"
    SELECT t.*,
        p.nome AS professor_nome,
        (SELECT COUNT(*) FROM matriculas m WHERE m.turma_id = t.id AND m.ativo) AS matriculados
    FROM turmas t
    LEFT JOIN professores p ON p.id = t.professor_id
    WHERE 1=1
"#;

#[derive(Clone, Default)]
pub struct TurmaRepository;

impl TurmaRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        filtro: &TurmaFiltro,
        filial_id: Option<i32>,
    ) -> Result<Vec<TurmaOcupacao>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(SELECT_OCUPACAO);
        push_busca(&mut qb, &["t.nome", "t.categoria", "p.nome"], filtro.busca.as_deref());
        push_eq(&mut qb, "t.filial_id", filial_id);
        push_eq(&mut qb, "t.professor_id", filtro.professor_id);
        push_eq(&mut qb, "t.categoria", filtro.categoria.clone());
        push_eq(&mut qb, "t.ativo", filtro.ativo);
        qb.push(" ORDER BY t.nome");

        let turmas = qb.build_query_as::<TurmaOcupacao>().fetch_all(executor).await?;
        Ok(turmas)
    }

    pub async fn find_detalhe<'e, E>(&self, executor: E, id: i32) -> Result<Option<TurmaOcupacao>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(SELECT_OCUPACAO);
        push_eq(&mut qb, "t.id", Some(id));

        let turma = qb.build_query_as::<TurmaOcupacao>().fetch_optional(executor).await?;
        Ok(turma)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: i32) -> Result<Option<Turma>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let turma = sqlx::query_as::<_, Turma>("SELECT * FROM turmas WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(turma)
    }

    /// Trava a linha da turma até o fim da transação (checagem de vagas).
    pub async fn lock_by_id<'e, E>(&self, executor: E, id: i32) -> Result<Option<Turma>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let turma = sqlx::query_as::<_, Turma>("SELECT * FROM turmas WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(turma)
    }

    pub async fn contar_matriculados<'e, E>(&self, executor: E, id: i32) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM matriculas WHERE turma_id = $1 AND ativo")
            .bind(id)
            .fetch_one(executor)
            .await?;
        Ok(total)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        input: &CreateTurmaPayload,
        filial_id: i32,
    ) -> Result<Turma, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let turma = sqlx::query_as::<_, Turma>(
            r#"
            INSERT INTO turmas (
                nome, categoria, horario, dias_semana, capacidade, professor_id, filial_id, ativo
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, COALESCE($8, TRUE))
            RETURNING *
            "#,
        )
        .bind(input.nome.trim())
        .bind(&input.categoria)
        .bind(&input.horario)
        .bind(&input.dias_semana)
        .bind(input.capacidade)
        .bind(input.professor_id)
        .bind(filial_id)
        .bind(input.ativo)
        .fetch_one(executor)
        .await
        .map_err(|e| map_write_error(e, "registro_duplicado"))?;

        Ok(turma)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: i32,
        input: &UpdateTurmaPayload,
    ) -> Result<Turma, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let turma = sqlx::query_as::<_, Turma>(
            r#"
            UPDATE turmas SET
                nome = COALESCE($2, nome),
                categoria = COALESCE($3, categoria),
                horario = COALESCE($4, horario),
                dias_semana = COALESCE($5, dias_semana),
                capacidade = COALESCE($6, capacidade),
                professor_id = COALESCE($7, professor_id),
                filial_id = COALESCE($8, filial_id),
                ativo = COALESCE($9, ativo),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.nome.as_deref().map(str::trim))
        .bind(&input.categoria)
        .bind(&input.horario)
        .bind(&input.dias_semana)
        .bind(input.capacidade)
        .bind(input.professor_id)
        .bind(input.filial_id)
        .bind(input.ativo)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_write_error(e, "registro_duplicado"))?
        .ok_or(AppError::NotFound("turma"))?;

        Ok(turma)
    }

    // Matrículas e presenças da turma saem junto
    pub async fn delete<'e, E>(&self, executor: E, id: i32) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM turmas WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(map_delete_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("turma"));
        }
        Ok(())
    }
}
