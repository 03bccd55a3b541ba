// src/models/relatorio.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use crate::models::{aluno::StatusPagamento, pagamento::FormaPagamento};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RelatorioQuery {
    /// Ano do relatório financeiro (padrão: ano corrente)
    pub ano: Option<i32>,
    pub data_inicio: Option<NaiveDate>,
    pub data_fim: Option<NaiveDate>,
    pub filial_id: Option<i32>,
}

// --- Financeiro ---

// Linha crua para a agregação do relatório financeiro
#[derive(Debug, Clone, FromRow)]
pub struct LinhaReceita {
    pub mes_referencia: String,
    pub valor: Decimal,
    pub forma_pagamento: FormaPagamento,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReceitaMensal {
    #[schema(example = "2025-03")]
    pub mes_referencia: String,
    pub total: Decimal,
    pub quantidade: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReceitaPorForma {
    pub forma_pagamento: FormaPagamento,
    pub total: Decimal,
    pub quantidade: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RelatorioFinanceiro {
    pub ano: i32,
    pub total: Decimal,
    pub meses: Vec<ReceitaMensal>,
    pub por_forma: Vec<ReceitaPorForma>,
}

// --- Alunos ---

#[derive(Debug, Clone, FromRow)]
pub struct LinhaAluno {
    pub data_nascimento: Option<NaiveDate>,
    pub status_pagamento: StatusPagamento,
    pub filial_id: i32,
    pub filial_nome: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FaixaEtaria {
    #[schema(example = "7-9")]
    pub faixa: String,
    pub quantidade: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlunosPorFilial {
    pub filial_id: i32,
    pub filial_nome: String,
    pub quantidade: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlunosPorStatus {
    pub status: StatusPagamento,
    pub quantidade: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RelatorioAlunos {
    pub total: i64,
    pub faixas_etarias: Vec<FaixaEtaria>,
    pub por_filial: Vec<AlunosPorFilial>,
    pub por_status: Vec<AlunosPorStatus>,
}

// --- Presenças ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PresencaPorTurma {
    pub turma_id: i32,
    pub turma_nome: String,
    pub total_registros: i64,
    pub presentes: i64,
    // Percentual 0-100
    pub taxa_presenca: f64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RelatorioPresencas {
    pub data_inicio: Option<NaiveDate>,
    pub data_fim: Option<NaiveDate>,
    pub turmas: Vec<PresencaPorTurma>,
}
