// src/models/combo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::validacao::{validate_obrigatorio, validate_valor_nao_negativo};

// Pacote de aulas com preço fechado
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComboAulas {
    pub id: i32,

    #[schema(example = "Pacote 8 aulas")]
    pub nome: String,

    pub descricao: Option<String>,

    #[schema(example = 8)]
    pub quantidade_aulas: i32,

    #[schema(example = "320.00")]
    pub valor: Decimal,

    // Nulo: vale para toda a rede
    pub filial_id: Option<i32>,

    pub ativo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateComboPayload {
    #[validate(custom(function = "validate_obrigatorio"))]
    pub nome: String,

    pub descricao: Option<String>,

    #[validate(range(min = 1, message = "invalid_quantidade"))]
    pub quantidade_aulas: i32,

    #[validate(custom(function = "validate_valor_nao_negativo"))]
    pub valor: Decimal,

    pub filial_id: Option<i32>,
    pub ativo: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateComboPayload {
    #[validate(custom(function = "validate_obrigatorio"))]
    pub nome: Option<String>,

    pub descricao: Option<String>,

    #[validate(range(min = 1, message = "invalid_quantidade"))]
    pub quantidade_aulas: Option<i32>,

    #[validate(custom(function = "validate_valor_nao_negativo"))]
    pub valor: Option<Decimal>,

    pub ativo: Option<bool>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ComboFiltro {
    pub busca: Option<String>,
    pub filial_id: Option<i32>,
    pub ativo: Option<bool>,
}
