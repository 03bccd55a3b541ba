// src/models/professor.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::validacao::{validate_cpf, validate_obrigatorio};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Professor {
    pub id: i32,

    #[schema(example = "Carlos Alberto")]
    pub nome: String,

    pub cpf: Option<String>,
    pub email: Option<String>,
    pub telefone: Option<String>,

    #[schema(example = "Goleiros")]
    pub especialidade: Option<String>,

    pub filial_id: i32,
    pub ativo: bool,
    pub data_admissao: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProfessorPayload {
    #[validate(custom(function = "validate_obrigatorio"))]
    #[schema(example = "Carlos Alberto")]
    pub nome: String,

    #[validate(custom(function = "validate_cpf"))]
    pub cpf: Option<String>,

    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,

    pub telefone: Option<String>,
    pub especialidade: Option<String>,
    pub filial_id: Option<i32>,
    pub ativo: Option<bool>,
    pub data_admissao: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfessorPayload {
    #[validate(custom(function = "validate_obrigatorio"))]
    pub nome: Option<String>,

    #[validate(custom(function = "validate_cpf"))]
    pub cpf: Option<String>,

    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,

    pub telefone: Option<String>,
    pub especialidade: Option<String>,
    pub filial_id: Option<i32>,
    pub ativo: Option<bool>,
    pub data_admissao: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProfessorFiltro {
    /// Busca por nome, e-mail ou CPF
    pub busca: Option<String>,
    pub filial_id: Option<i32>,
    pub ativo: Option<bool>,
    pub especialidade: Option<String>,
}
