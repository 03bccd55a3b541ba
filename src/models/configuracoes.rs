// src/models/configuracoes.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::models::validacao::{validate_cor_hex, validate_tema};

pub const DIA_VENCIMENTO_PADRAO: i32 = 10;

// Identidade visual e regras gerais da rede (linha única)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Configuracoes {
    #[schema(example = "Escolinha Craques do Amanhã")]
    pub nome_escola: Option<String>,

    #[schema(example = "https://escolinha.com.br/logo.png")]
    pub logo_url: Option<String>,

    #[schema(example = "#0B6E4F")]
    pub cor_primaria: Option<String>,

    #[schema(example = "#F2C14E")]
    pub cor_secundaria: Option<String>,

    #[schema(example = "claro")]
    pub tema: Option<String>,

    // Depois deste dia, quem não pagou o mês fica "atrasado"
    #[schema(example = 10)]
    pub dia_vencimento: i32,

    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for Configuracoes {
    fn default() -> Self {
        Self {
            nome_escola: None,
            logo_url: None,
            cor_primaria: None,
            cor_secundaria: None,
            tema: None,
            dia_vencimento: DIA_VENCIMENTO_PADRAO,
            updated_at: None,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateConfiguracoesRequest {
    pub nome_escola: Option<String>,
    pub logo_url: Option<String>,

    #[validate(custom(function = "validate_cor_hex"))]
    pub cor_primaria: Option<String>,

    #[validate(custom(function = "validate_cor_hex"))]
    pub cor_secundaria: Option<String>,

    #[validate(custom(function = "validate_tema"))]
    pub tema: Option<String>,

    #[validate(range(min = 1, max = 28, message = "invalid_dia_vencimento"))]
    pub dia_vencimento: Option<i32>,
}
