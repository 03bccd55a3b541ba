// src/db/combo_repo.rs

use sqlx::{Executor, Postgres, QueryBuilder};

use crate::{
    common::{
        db_utils::{map_delete_error, map_write_error, push_busca, push_eq},
        error::AppError,
    },
    models::combo::{ComboAulas, ComboFiltro, CreateComboPayload, UpdateComboPayload},
};

#[derive(Clone, Default)]
pub struct ComboRepository;

impl ComboRepository {
    pub fn new() -> Self {
        Self
    }

    /// Combos da rede (sem filial) aparecem para todas as filiais.
    pub async fn list<'e, E>(
        &self,
        executor: E,
        filtro: &ComboFiltro,
        filial_id: Option<i32>,
    ) -> Result<Vec<ComboAulas>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM combos_aulas WHERE 1=1");
        push_busca(&mut qb, &["nome", "descricao"], filtro.busca.as_deref());
        if let Some(filial_id) = filial_id {
            qb.push(" AND (filial_id IS NULL OR filial_id = ")
                .push_bind(filial_id)
                .push(")");
        }
        push_eq(&mut qb, "ativo", filtro.ativo);
        qb.push(" ORDER BY nome");

        let combos = qb.build_query_as::<ComboAulas>().fetch_all(executor).await?;
        Ok(combos)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: i32) -> Result<Option<ComboAulas>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let combo = sqlx::query_as::<_, ComboAulas>("SELECT * FROM combos_aulas WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(combo)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        input: &CreateComboPayload,
        filial_id: Option<i32>,
    ) -> Result<ComboAulas, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let combo = sqlx::query_as::<_, ComboAulas>(
            r#"
            INSERT INTO combos_aulas (nome, descricao, quantidade_aulas, valor, filial_id, ativo)
            VALUES ($1, $2, $3, $4, $5, COALESCE($6, TRUE))
            RETURNING *
            "#,
        )
        .bind(input.nome.trim())
        .bind(&input.descricao)
        .bind(input.quantidade_aulas)
        .bind(input.valor)
        .bind(filial_id)
        .bind(input.ativo)
        .fetch_one(executor)
        .await
        .map_err(|e| map_write_error(e, "registro_duplicado"))?;

        Ok(combo)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: i32,
        input: &UpdateComboPayload,
    ) -> Result<ComboAulas, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let combo = sqlx::query_as::<_, ComboAulas>(
            r#"
            UPDATE combos_aulas SET
                nome = COALESCE($2, nome),
                descricao = COALESCE($3, descricao),
                quantidade_aulas = COALESCE($4, quantidade_aulas),
                valor = COALESCE($5, valor),
                ativo = COALESCE($6, ativo),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.nome.as_deref().map(str::trim))
        .bind(&input.descricao)
        .bind(input.quantidade_aulas)
        .bind(input.valor)
        .bind(input.ativo)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_write_error(e, "registro_duplicado"))?
        .ok_or(AppError::NotFound("combo"))?;

        Ok(combo)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: i32) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM combos_aulas WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(map_delete_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("combo"));
        }
        Ok(())
    }
}
