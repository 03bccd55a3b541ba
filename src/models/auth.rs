// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Papel do usuário na rede: matriz (admin), gestor de unidade ou o acesso
/// do portal da filial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "papel_usuario", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Papel {
    Admin,
    Gestor,
    Filial,
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i32,
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    pub nome: String,
    pub papel: Papel,
    pub filial_id: Option<i32>,
    pub ativo: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(email(message = "invalid_email"))]
    #[schema(example = "secretaria@escolinha.com.br")]
    pub email: String,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "senha-secreta")]
    pub senha: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlterarSenhaPayload {
    #[validate(length(min = 1, message = "required"))]
    pub senha_atual: String,

    #[validate(length(min = 6, message = "senha_curta"))]
    pub nova_senha: String,
}

/// O que o front-end consulta para saber quem está logado.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: i32,
    pub email: String,
    pub nome: String,
    pub papel: Papel,
    pub filial_id: Option<i32>,
    pub permissoes: Vec<String>,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub usuario: SessionUser,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i32,   // ID do usuário
    pub exp: usize, // Expiração
    pub iat: usize, // Emissão
}
