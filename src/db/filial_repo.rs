// src/db/filial_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, Postgres, QueryBuilder};

use crate::{
    common::{
        db_utils::{map_delete_error, map_write_error, push_busca, push_eq},
        error::AppError,
    },
    models::filial::{CreateFilialPayload, Filial, FilialFiltro, SyncTotais, UpdateFilialPayload},
};

#[derive(Clone, Default)]
pub struct FilialRepository;

impl FilialRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(
        &self,
        executor: E,
        filtro: &FilialFiltro,
        somente: Option<i32>,
    ) -> Result<Vec<Filial>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM filiais WHERE 1=1");
        push_busca(&mut qb, &["nome", "cidade", "responsavel"], filtro.busca.as_deref());
        push_eq(&mut qb, "ativo", filtro.ativo);
        push_eq(&mut qb, "id", somente);
        qb.push(" ORDER BY nome");

        let filiais = qb.build_query_as::<Filial>().fetch_all(executor).await?;
        Ok(filiais)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: i32) -> Result<Option<Filial>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let filial = sqlx::query_as::<_, Filial>("SELECT * FROM filiais WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(filial)
    }

    pub async fn create<'e, E>(&self, executor: E, input: &CreateFilialPayload) -> Result<Filial, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let filial = sqlx::query_as::<_, Filial>(
            r#"
            INSERT INTO filiais (
                nome, cnpj, endereco, cidade, estado, cep, telefone, email,
                responsavel, login_email, ativo
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, COALESCE($11, TRUE))
            RETURNING *
            "#,
        )
        .bind(input.nome.trim())
        .bind(&input.cnpj)
        .bind(&input.endereco)
        .bind(&input.cidade)
        .bind(input.estado.as_deref().map(str::to_uppercase))
        .bind(&input.cep)
        .bind(&input.telefone)
        .bind(&input.email)
        .bind(&input.responsavel)
        .bind(input.login_email.as_deref().map(str::trim))
        .bind(input.ativo)
        .fetch_one(executor)
        .await
        .map_err(|e| map_write_error(e, "login_filial_duplicado"))?;

        Ok(filial)
    }

    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: i32,
        input: &UpdateFilialPayload,
    ) -> Result<Filial, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let filial = sqlx::query_as::<_, Filial>(
            r#"
            UPDATE filiais SET
                nome = COALESCE($2, nome),
                cnpj = COALESCE($3, cnpj),
                endereco = COALESCE($4, endereco),
                cidade = COALESCE($5, cidade),
                estado = COALESCE($6, estado),
                cep = COALESCE($7, cep),
                telefone = COALESCE($8, telefone),
                email = COALESCE($9, email),
                responsavel = COALESCE($10, responsavel),
                login_email = COALESCE($11, login_email),
                ativo = COALESCE($12, ativo),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.nome.as_deref().map(str::trim))
        .bind(&input.cnpj)
        .bind(&input.endereco)
        .bind(&input.cidade)
        .bind(input.estado.as_deref().map(str::to_uppercase))
        .bind(&input.cep)
        .bind(&input.telefone)
        .bind(&input.email)
        .bind(&input.responsavel)
        .bind(input.login_email.as_deref().map(str::trim))
        .bind(input.ativo)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_write_error(e, "login_filial_duplicado"))?
        .ok_or(AppError::NotFound("filial"))?;

        Ok(filial)
    }

    // Usuários e gestores da filial saem junto (ON DELETE CASCADE).
    // Alunos, professores e turmas seguram a exclusão.
    pub async fn delete<'e, E>(&self, executor: E, id: i32) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM filiais WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await
            .map_err(map_delete_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("filial"));
        }
        Ok(())
    }

    // ---
    // Sincronização
    // ---

    /// Última alteração entre alunos, professores, turmas e pagamentos.
    /// Remoções e saídas para outra filial ficam em `dados_alterados_em`,
    /// gravado por gatilho.
    pub async fn ultima_alteracao<'e, E>(&self, executor: E, id: i32) -> Result<Option<DateTime<Utc>>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ultima: Option<DateTime<Utc>> = sqlx::query_scalar(
            r#"
            SELECT GREATEST(
                (SELECT MAX(updated_at) FROM alunos WHERE filial_id = $1),
                (SELECT MAX(updated_at) FROM professores WHERE filial_id = $1),
                (SELECT MAX(updated_at) FROM turmas WHERE filial_id = $1),
                (SELECT MAX(updated_at) FROM pagamentos WHERE filial_id = $1),
                (SELECT dados_alterados_em FROM filiais WHERE id = $1)
            )
            "#,
        )
        .bind(id)
        .fetch_one(executor)
        .await?;
        Ok(ultima)
    }

    pub async fn totais<'e, E>(&self, executor: E, id: i32) -> Result<SyncTotais, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let totais = sqlx::query_as::<_, SyncTotais>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM alunos WHERE filial_id = $1) AS alunos,
                (SELECT COUNT(*) FROM professores WHERE filial_id = $1) AS professores,
                (SELECT COUNT(*) FROM turmas WHERE filial_id = $1) AS turmas,
                (SELECT COUNT(*) FROM pagamentos WHERE filial_id = $1) AS pagamentos
            "#,
        )
        .bind(id)
        .fetch_one(executor)
        .await?;
        Ok(totais)
    }

    pub async fn marcar_sincronizada<'e, E>(&self, executor: E, id: i32) -> Result<Filial, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // updated_at fica como está: sincronizar não é alterar o cadastro
        let filial = sqlx::query_as::<_, Filial>(
            "UPDATE filiais SET ultima_sincronizacao = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound("filial"))?;
        Ok(filial)
    }
}
