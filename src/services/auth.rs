// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::UserRepository,
    middleware::rbac::permissoes_do_papel,
    models::auth::{AlterarSenhaPayload, AuthResponse, Claims, Papel, SessionUser, User},
};

/// Validade do token de sessão.
pub const SESSION_DAYS: i64 = 7;

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    pool: PgPool,
}

// Hash e verificação rodam fora do runtime async (bcrypt é caro de propósito)
pub async fn hash_password(password: &str) -> Result<String, AppError> {
    let password_clone = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
    Ok(hashed)
}

pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool, AppError> {
    let password_clone = password.to_owned();
    let password_hash_clone = password_hash.to_owned();
    let is_valid = tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
        .await
        .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
    Ok(is_valid)
}

pub fn create_token(user_id: i32, jwt_secret: &str) -> Result<String, AppError> {
    let now = Utc::now();
    let expires_at = now + chrono::Duration::days(SESSION_DAYS);

    let claims = Claims {
        sub: user_id,
        exp: expires_at.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_ref()),
    )?)
}

/// Token malformado, com assinatura errada ou expirado: sessão inválida.
pub fn decode_token(token: &str, jwt_secret: &str) -> Result<Claims, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_ref()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthenticated)?;
    Ok(token_data.claims)
}

pub fn session_user(user: &User) -> SessionUser {
    SessionUser {
        id: user.id,
        email: user.email.clone(),
        nome: user.nome.clone(),
        papel: user.papel,
        filial_id: user.filial_id,
        permissoes: permissoes_do_papel(user.papel)
            .iter()
            .map(|p| p.to_string())
            .collect(),
    }
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String, pool: PgPool) -> Self {
        Self { user_repo, jwt_secret, pool }
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<AuthResponse, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .filter(|u| u.ativo)
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash).await? {
            tracing::warn!("Tentativa de login com senha inválida para o usuário {}", user.id);
            return Err(AppError::InvalidCredentials);
        }

        let token = create_token(user.id, &self.jwt_secret)?;
        tracing::info!("🔑 Login do usuário {} ({:?})", user.id, user.papel);

        Ok(AuthResponse {
            token,
            usuario: session_user(&user),
        })
    }

    // O token é conferido antes de qualquer ida ao banco
    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = decode_token(token, &self.jwt_secret)?;

        self.user_repo
            .find_by_id(claims.sub)
            .await?
            .filter(|u| u.ativo)
            .ok_or(AppError::Unauthenticated)
    }

    pub async fn change_password(&self, user: &User, payload: &AlterarSenhaPayload) -> Result<(), AppError> {
        if !verify_password(&payload.senha_atual, &user.password_hash).await? {
            return Err(AppError::InvalidCredentials);
        }

        let novo_hash = hash_password(&payload.nova_senha).await?;
        self.user_repo
            .update_user(&self.pool, user.id, None, Some(&novo_hash), None, None, None)
            .await?;

        tracing::info!("Senha alterada pelo usuário {}", user.id);
        Ok(())
    }

    /// Cria a primeira conta da matriz quando ainda não existe nenhum admin.
    pub async fn bootstrap_admin(&self, email: &str, password: &str, nome: &str) -> Result<bool, AppError> {
        if self.user_repo.admin_exists().await? {
            return Ok(false);
        }

        let hashed_password = hash_password(password).await?;
        let admin = self
            .user_repo
            .create_user(&self.pool, email, &hashed_password, nome, Papel::Admin, None)
            .await?;

        tracing::info!("✅ Conta admin inicial criada: {}", admin.email);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "segredo-de-teste";

    #[test]
    fn token_round_trip_keeps_subject() {
        let token = create_token(42, SECRET).unwrap();
        let claims = decode_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, 42);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = create_token(1, "outro-segredo").unwrap();
        assert!(matches!(decode_token(&token, SECRET), Err(AppError::Unauthenticated)));
        assert!(matches!(decode_token("lixo", SECRET), Err(AppError::Unauthenticated)));
    }

    #[test]
    fn expired_token_is_rejected() {
        let past = Utc::now() - chrono::Duration::days(1);
        let claims = Claims {
            sub: 1,
            exp: past.timestamp() as usize,
            iat: (past - chrono::Duration::days(7)).timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_ref())).unwrap();
        assert!(matches!(decode_token(&token, SECRET), Err(AppError::Unauthenticated)));
    }

    #[test]
    fn session_user_lists_role_permissions() {
        let user = User {
            id: 7,
            email: "portal@escolinha.com.br".to_string(),
            password_hash: "x".to_string(),
            nome: "Portal Centro".to_string(),
            papel: Papel::Filial,
            filial_id: Some(2),
            ativo: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let session = session_user(&user);
        assert_eq!(session.permissoes, vec!["presencas:write".to_string()]);
        assert_eq!(session.filial_id, Some(2));
    }

    #[tokio::test]
    async fn password_hash_verifies() {
        let hashed = hash_password("senha123").await.unwrap();
        assert!(verify_password("senha123", &hashed).await.unwrap());
        assert!(!verify_password("outra", &hashed).await.unwrap());
    }
}
