// src/models/aluno.rs

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::validacao::{validate_cpf, validate_obrigatorio};

/// Situação financeira resumida do aluno (a coluna da listagem).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "status_pagamento", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StatusPagamento {
    EmDia,
    Pendente,
    Atrasado,
}

impl StatusPagamento {
    /// Em dia se já pagou o mês corrente. Senão, atrasado depois do dia de
    /// vencimento e pendente até lá.
    pub fn calcular(pagou_mes_atual: bool, hoje: NaiveDate, dia_vencimento: u32) -> Self {
        if pagou_mes_atual {
            StatusPagamento::EmDia
        } else if hoje.day() > dia_vencimento {
            StatusPagamento::Atrasado
        } else {
            StatusPagamento::Pendente
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatusPagamento::EmDia => "Em dia",
            StatusPagamento::Pendente => "Pendente",
            StatusPagamento::Atrasado => "Atrasado",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Aluno {
    pub id: i32,

    #[schema(example = "Pedro Henrique Souza")]
    pub nome: String,

    pub data_nascimento: Option<NaiveDate>,

    #[schema(example = "123.456.789-09")]
    pub cpf: Option<String>,

    pub email: Option<String>,
    pub telefone: Option<String>,
    pub endereco: Option<String>,

    // Responsável (obrigatório na prática para menores, mas não no cadastro)
    pub nome_responsavel: Option<String>,
    pub telefone_responsavel: Option<String>,
    pub email_responsavel: Option<String>,
    pub cpf_responsavel: Option<String>,

    pub filial_id: i32,
    pub ativo: bool,
    pub data_matricula: NaiveDate,
    pub status_pagamento: StatusPagamento,
    pub observacoes: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlunoPayload {
    #[validate(custom(function = "validate_obrigatorio"))]
    #[schema(example = "Pedro Henrique Souza")]
    pub nome: String,

    #[schema(example = "2014-05-20")]
    pub data_nascimento: Option<NaiveDate>,

    #[validate(custom(function = "validate_cpf"))]
    pub cpf: Option<String>,

    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub endereco: Option<String>,

    pub nome_responsavel: Option<String>,
    pub telefone_responsavel: Option<String>,

    #[validate(email(message = "invalid_email"))]
    pub email_responsavel: Option<String>,

    #[validate(custom(function = "validate_cpf"))]
    pub cpf_responsavel: Option<String>,

    // Opcional para gestores (usa a filial da sessão); obrigatório para a matriz.
    pub filial_id: Option<i32>,

    pub ativo: Option<bool>,
    pub data_matricula: Option<NaiveDate>,
    pub observacoes: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAlunoPayload {
    #[validate(custom(function = "validate_obrigatorio"))]
    pub nome: Option<String>,

    pub data_nascimento: Option<NaiveDate>,

    #[validate(custom(function = "validate_cpf"))]
    pub cpf: Option<String>,

    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub endereco: Option<String>,

    pub nome_responsavel: Option<String>,
    pub telefone_responsavel: Option<String>,

    #[validate(email(message = "invalid_email"))]
    pub email_responsavel: Option<String>,

    #[validate(custom(function = "validate_cpf"))]
    pub cpf_responsavel: Option<String>,

    pub filial_id: Option<i32>,
    pub ativo: Option<bool>,
    pub data_matricula: Option<NaiveDate>,
    pub observacoes: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AlunoFiltro {
    /// Busca por nome, CPF, e-mail ou responsável
    pub busca: Option<String>,
    pub filial_id: Option<i32>,
    pub ativo: Option<bool>,
    pub status_pagamento: Option<StatusPagamento>,
    /// Apenas alunos com matrícula ativa na turma
    pub turma_id: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dia(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn status_pagamento_rules() {
        assert_eq!(StatusPagamento::calcular(true, dia(2025, 3, 25), 10), StatusPagamento::EmDia);
        assert_eq!(StatusPagamento::calcular(false, dia(2025, 3, 10), 10), StatusPagamento::Pendente);
        assert_eq!(StatusPagamento::calcular(false, dia(2025, 3, 11), 10), StatusPagamento::Atrasado);
    }

    #[test]
    fn status_serializes_as_snake_case() {
        assert_eq!(serde_json::to_string(&StatusPagamento::EmDia).unwrap(), "\"em_dia\"");
    }

    #[test]
    fn create_payload_requires_nome_and_valid_formats() {
        let payload: CreateAlunoPayload = serde_json::from_value(serde_json::json!({
            "nome": "",
            "cpf": "123",
            "emailResponsavel": "nao-e-email"
        }))
        .unwrap();

        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("nome"));
        assert!(fields.contains_key("cpf"));
        assert!(fields.contains_key("email_responsavel"));
    }

    #[test]
    fn filtro_reads_camel_case_query() {
        let filtro: AlunoFiltro = serde_json::from_value(serde_json::json!({
            "busca": "ana",
            "statusPagamento": "atrasado",
            "turmaId": 4
        }))
        .unwrap();
        assert_eq!(filtro.status_pagamento, Some(StatusPagamento::Atrasado));
        assert_eq!(filtro.turma_id, Some(4));
    }
}
