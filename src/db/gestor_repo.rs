// src/db/gestor_repo.rs

use sqlx::{Executor, Postgres, QueryBuilder};

use crate::{
    common::{
        db_utils::{map_write_error, push_busca, push_eq},
        error::AppError,
    },
    models::gestor::{CreateGestorPayload, GestorFiltro, GestorUnidade, UpdateGestorPayload},
};

#[derive(Clone, Default)]
pub struct GestorRepository;

impl GestorRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        filtro: &GestorFiltro,
    ) -> Result<Vec<GestorUnidade>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM gestores_unidade WHERE 1=1");
        push_busca(&mut qb, &["nome", "email"], filtro.busca.as_deref());
        push_eq(&mut qb, "filial_id", filtro.filial_id);
        qb.push(" ORDER BY nome");

        let gestores = qb.build_query_as::<GestorUnidade>().fetch_all(executor).await?;
        Ok(gestores)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: i32) -> Result<Option<GestorUnidade>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let gestor = sqlx::query_as::<_, GestorUnidade>("SELECT * FROM gestores_unidade WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(gestor)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        input: &CreateGestorPayload,
        usuario_id: i32,
    ) -> Result<GestorUnidade, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let gestor = sqlx::query_as::<_, GestorUnidade>(
            r#"
            INSERT INTO gestores_unidade (nome, email, telefone, filial_id, usuario_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(input.nome.trim())
        .bind(input.email.trim())
        .bind(&input.telefone)
        .bind(input.filial_id)
        .bind(usuario_id)
        .fetch_one(executor)
        .await
        .map_err(|e| map_write_error(e, "email_duplicado"))?;

        Ok(gestor)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: i32,
        input: &UpdateGestorPayload,
    ) -> Result<GestorUnidade, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let gestor = sqlx::query_as::<_, GestorUnidade>(
            r#"
            UPDATE gestores_unidade SET
                nome = COALESCE($2, nome),
                email = COALESCE($3, email),
                telefone = COALESCE($4, telefone),
                filial_id = COALESCE($5, filial_id),
                ativo = COALESCE($6, ativo),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.nome.as_deref().map(str::trim))
        .bind(input.email.as_deref().map(str::trim))
        .bind(&input.telefone)
        .bind(input.filial_id)
        .bind(input.ativo)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_write_error(e, "email_duplicado"))?
        .ok_or(AppError::NotFound("gestor"))?;

        Ok(gestor)
    }
}
