// src/models/pagamento.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::validacao::{validate_mes_referencia, validate_valor_positivo};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "forma_pagamento", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FormaPagamento {
    Dinheiro,
    Pix,
    CartaoCredito,
    CartaoDebito,
    Boleto,
    Transferencia,
}

impl FormaPagamento {
    pub fn label(&self) -> &'static str {
        match self {
            FormaPagamento::Dinheiro => "Dinheiro",
            FormaPagamento::Pix => "PIX",
            FormaPagamento::CartaoCredito => "Cartão de crédito",
            FormaPagamento::CartaoDebito => "Cartão de débito",
            FormaPagamento::Boleto => "Boleto",
            FormaPagamento::Transferencia => "Transferência",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagamento {
    pub id: i32,
    pub aluno_id: i32,

    // Copiada do aluno no momento do lançamento
    pub filial_id: i32,

    #[schema(example = "180.00")]
    pub valor: Decimal,

    #[schema(example = "2025-03")]
    pub mes_referencia: String,

    pub data_pagamento: NaiveDate,
    pub forma_pagamento: FormaPagamento,
    pub observacoes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Linha da tela Financeiro: pagamento + nome do aluno.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PagamentoDetalhe {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub pagamento: Pagamento,
    pub aluno_nome: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePagamentoPayload {
    pub aluno_id: i32,

    #[validate(custom(function = "validate_valor_positivo"))]
    #[schema(example = "180.00")]
    pub valor: Decimal,

    #[validate(custom(function = "validate_mes_referencia"))]
    #[schema(example = "2025-03")]
    pub mes_referencia: String,

    // Sem data, vale o dia do lançamento
    pub data_pagamento: Option<NaiveDate>,

    pub forma_pagamento: FormaPagamento,
    pub observacoes: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePagamentoPayload {
    #[validate(custom(function = "validate_valor_positivo"))]
    pub valor: Option<Decimal>,

    #[validate(custom(function = "validate_mes_referencia"))]
    pub mes_referencia: Option<String>,

    pub data_pagamento: Option<NaiveDate>,
    pub forma_pagamento: Option<FormaPagamento>,
    pub observacoes: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PagamentoFiltro {
    /// Busca pelo nome do aluno ou observações
    pub busca: Option<String>,
    pub filial_id: Option<i32>,
    pub aluno_id: Option<i32>,
    pub mes_referencia: Option<String>,
    pub forma_pagamento: Option<FormaPagamento>,
    pub data_inicio: Option<NaiveDate>,
    pub data_fim: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_rejects_zero_value_and_bad_month() {
        let payload: CreatePagamentoPayload = serde_json::from_value(serde_json::json!({
            "alunoId": 1,
            "valor": 0,
            "mesReferencia": "2025/03",
            "formaPagamento": "pix"
        }))
        .unwrap();

        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("valor"));
        assert!(fields.contains_key("mes_referencia"));
    }

    #[test]
    fn forma_pagamento_wire_names() {
        let forma: FormaPagamento = serde_json::from_str("\"cartao_credito\"").unwrap();
        assert_eq!(forma, FormaPagamento::CartaoCredito);
        assert_eq!(forma.label(), "Cartão de crédito");
    }
}
