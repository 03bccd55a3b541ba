// src/db/pagamento_repo.rs

use sqlx::{Executor, Postgres, QueryBuilder};

use crate::{
    common::{
        db_utils::{map_write_error, push_busca, push_cmp, push_eq},
        error::AppError,
    },
    models::pagamento::{
        CreatePagamentoPayload, Pagamento, PagamentoDetalhe, PagamentoFiltro, UpdatePagamentoPayload,
    },
};

const SELECT_DETALHE: &str = r#"
    SELECT p.*, a.nome AS aluno_nome
    FROM pagamentos p
    JOIN alunos a ON a.id = p.aluno_id
    WHERE 1=1
"#;

#[derive(Clone, Default)]
pub struct PagamentoRepository;

impl PagamentoRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        filtro: &PagamentoFiltro,
        filial_id: Option<i32>,
    ) -> Result<Vec<PagamentoDetalhe>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(SELECT_DETALHE);
        push_busca(&mut qb, &["a.nome", "p.observacoes"], filtro.busca.as_deref());
        push_eq(&mut qb, "p.filial_id", filial_id);
        push_eq(&mut qb, "p.aluno_id", filtro.aluno_id);
        push_eq(&mut qb, "p.mes_referencia", filtro.mes_referencia.clone());
        push_eq(&mut qb, "p.forma_pagamento", filtro.forma_pagamento);
        push_cmp(&mut qb, "p.data_pagamento", ">=", filtro.data_inicio);
        push_cmp(&mut qb, "p.data_pagamento", "<=", filtro.data_fim);
        qb.push(" ORDER BY p.data_pagamento DESC, p.id DESC");

        let pagamentos = qb.build_query_as::<PagamentoDetalhe>().fetch_all(executor).await?;
        Ok(pagamentos)
    }

    pub async fn find_detalhe<'e, E>(&self, executor: E, id: i32) -> Result<Option<PagamentoDetalhe>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(SELECT_DETALHE);
        push_eq(&mut qb, "p.id", Some(id));

        let pagamento = qb.build_query_as::<PagamentoDetalhe>().fetch_optional(executor).await?;
        Ok(pagamento)
    }

    pub async fn pagou_mes<'e, E>(&self, executor: E, aluno_id: i32, mes_referencia: &str) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pagou: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM pagamentos WHERE aluno_id = $1 AND mes_referencia = $2)",
        )
        .bind(aluno_id)
        .bind(mes_referencia)
        .fetch_one(executor)
        .await?;
        Ok(pagou)
    }

    /// A filial do pagamento é sempre a do aluno.
    pub async fn create<'e, E>(
        &self,
        executor: E,
        input: &CreatePagamentoPayload,
        filial_id: i32,
    ) -> Result<Pagamento, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pagamento = sqlx::query_as::<_, Pagamento>(
            r#"
            INSERT INTO pagamentos (
                aluno_id, filial_id, valor, mes_referencia, data_pagamento, forma_pagamento, observacoes
            )
            VALUES ($1, $2, $3, $4, COALESCE($5, CURRENT_DATE), $6, $7)
            RETURNING *
            "#,
        )
        .bind(input.aluno_id)
        .bind(filial_id)
        .bind(input.valor)
        .bind(input.mes_referencia.trim())
        .bind(input.data_pagamento)
        .bind(input.forma_pagamento)
        .bind(&input.observacoes)
        .fetch_one(executor)
        .await
        .map_err(|e| map_write_error(e, "registro_duplicado"))?;

        Ok(pagamento)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: i32,
        input: &UpdatePagamentoPayload,
    ) -> Result<Pagamento, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let pagamento = sqlx::query_as::<_, Pagamento>(
            r#"
            UPDATE pagamentos SET
                valor = COALESCE($2, valor),
                mes_referencia = COALESCE($3, mes_referencia),
                data_pagamento = COALESCE($4, data_pagamento),
                forma_pagamento = COALESCE($5, forma_pagamento),
                observacoes = COALESCE($6, observacoes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.valor)
        .bind(input.mes_referencia.as_deref().map(str::trim))
        .bind(input.data_pagamento)
        .bind(input.forma_pagamento)
        .bind(&input.observacoes)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("pagamento"))?;

        Ok(pagamento)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: i32) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM pagamentos WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("pagamento"));
        }
        Ok(())
    }
}
