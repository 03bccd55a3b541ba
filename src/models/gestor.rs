// src/models/gestor.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::validacao::validate_obrigatorio;

// Gestor de unidade: a pessoa + a conta de acesso dela
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GestorUnidade {
    pub id: i32,

    #[schema(example = "Mariana Lopes")]
    pub nome: String,

    #[schema(example = "mariana@escolinha.com.br")]
    pub email: String,

    pub telefone: Option<String>,
    pub filial_id: i32,
    pub usuario_id: i32,
    pub ativo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateGestorPayload {
    #[validate(custom(function = "validate_obrigatorio"))]
    pub nome: String,

    // Também é o login
    #[validate(email(message = "invalid_email"))]
    pub email: String,

    pub telefone: Option<String>,
    pub filial_id: i32,

    #[validate(length(min = 6, message = "senha_curta"))]
    pub senha: String,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGestorPayload {
    #[validate(custom(function = "validate_obrigatorio"))]
    pub nome: Option<String>,

    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,

    pub telefone: Option<String>,
    pub filial_id: Option<i32>,
    pub ativo: Option<bool>,

    #[validate(length(min = 6, message = "senha_curta"))]
    pub senha: Option<String>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct GestorFiltro {
    pub busca: Option<String>,
    pub filial_id: Option<i32>,
}
