// src/db/configuracoes_repo.rs

use sqlx::{Executor, Postgres};

use crate::{
    common::error::AppError,
    models::configuracoes::{Configuracoes, UpdateConfiguracoesRequest},
};

const COLUNAS: &str =
    "nome_escola, logo_url, cor_primaria, cor_secundaria, tema, dia_vencimento, updated_at";

#[derive(Clone, Default)]
pub struct ConfiguracoesRepository;

impl ConfiguracoesRepository {
    pub fn new() -> Self {
        Self
    }

    // Sem linha ainda: devolve os padrões em vez de 404
    pub async fn get<'e, E>(&self, executor: E) -> Result<Configuracoes, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {} FROM configuracoes WHERE id = 1", COLUNAS);
        let configuracoes = sqlx::query_as::<_, Configuracoes>(&sql)
            .fetch_optional(executor)
            .await?;

        Ok(configuracoes.unwrap_or_default())
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        input: &UpdateConfiguracoesRequest,
    ) -> Result<Configuracoes, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // UPSERT (Insert or Update) da linha única
        let sql = format!(
            r#"
            INSERT INTO configuracoes (
                id, nome_escola, logo_url, cor_primaria, cor_secundaria, tema, dia_vencimento, updated_at
            )
            VALUES (1, $1, $2, $3, $4, $5, COALESCE($6, 10), NOW())
            ON CONFLICT (id)
            DO UPDATE SET
                nome_escola = COALESCE(EXCLUDED.nome_escola, configuracoes.nome_escola),
                logo_url = COALESCE(EXCLUDED.logo_url, configuracoes.logo_url),
                cor_primaria = COALESCE(EXCLUDED.cor_primaria, configuracoes.cor_primaria),
                cor_secundaria = COALESCE(EXCLUDED.cor_secundaria, configuracoes.cor_secundaria),
                tema = COALESCE(EXCLUDED.tema, configuracoes.tema),
                dia_vencimento = COALESCE($6, configuracoes.dia_vencimento),
                updated_at = NOW()
            RETURNING {}
            "#,
            COLUNAS
        );
        let configuracoes = sqlx::query_as::<_, Configuracoes>(&sql)
            .bind(&input.nome_escola)
            .bind(&input.logo_url)
            .bind(&input.cor_primaria)
            .bind(&input.cor_secundaria)
            .bind(&input.tema)
            .bind(input.dia_vencimento)
            .fetch_one(executor)
            .await?;

        Ok(configuracoes)
    }
}
