// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};

use crate::{
    common::error::AppError,
    models::auth::{Papel, User},
};

// O repositório de usuários, responsável por todas as interações com a tabela 'usuarios'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

fn map_user_write_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::EmailAlreadyExists;
        }
        if db_err.is_foreign_key_violation() {
            return AppError::InvalidReference;
        }
    }
    e.into()
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo e-mail (login não diferencia maiúsculas)
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>("SELECT * FROM usuarios WHERE LOWER(email) = LOWER($1)")
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>("SELECT * FROM usuarios WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    /// Conta de acesso do portal de uma filial, se houver.
    pub async fn find_portal_user<'e, E>(&self, executor: E, filial_id: i32) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let maybe_user = sqlx::query_as::<_, User>(
            "SELECT * FROM usuarios WHERE filial_id = $1 AND papel = 'filial' ORDER BY id LIMIT 1",
        )
        .bind(filial_id)
        .fetch_optional(executor)
        .await?;
        Ok(maybe_user)
    }

    pub async fn admin_exists(&self) -> Result<bool, AppError> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM usuarios WHERE papel = 'admin')")
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    // Cria um novo usuário. E-mail duplicado vira `EmailAlreadyExists`.
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        email: &str,
        password_hash: &str,
        nome: &str,
        papel: Papel,
        filial_id: Option<i32>,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO usuarios (email, password_hash, nome, papel, filial_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(email.trim())
        .bind(password_hash)
        .bind(nome)
        .bind(papel)
        .bind(filial_id)
        .fetch_one(executor)
        .await
        .map_err(map_user_write_error)?;

        Ok(user)
    }

    /// Atualização parcial dos dados de acesso. `None` mantém o valor atual.
    #[allow(clippy::too_many_arguments)]
    pub async fn update_user<'e, E>(
        &self,
        executor: E,
        id: i32,
        email: Option<&str>,
        password_hash: Option<&str>,
        nome: Option<&str>,
        filial_id: Option<i32>,
        ativo: Option<bool>,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE usuarios SET
                email = COALESCE($2, email),
                password_hash = COALESCE($3, password_hash),
                nome = COALESCE($4, nome),
                filial_id = COALESCE($5, filial_id),
                ativo = COALESCE($6, ativo),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(email.map(str::trim))
        .bind(password_hash)
        .bind(nome)
        .bind(filial_id)
        .bind(ativo)
        .fetch_optional(executor)
        .await
        .map_err(map_user_write_error)?
        .ok_or(AppError::NotFound("usuario"))?;

        Ok(user)
    }

    pub async fn delete_user<'e, E>(&self, executor: E, id: i32) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM usuarios WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(())
    }
}
