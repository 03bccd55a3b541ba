// src/models/presenca.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Presenca {
    pub id: i32,
    pub aluno_id: i32,
    pub turma_id: i32,
    pub data: NaiveDate,
    pub presente: bool,
    pub observacoes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Linha da listagem e da exportação, com os nomes.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PresencaDetalhe {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub presenca: Presenca,
    pub aluno_nome: String,
    pub turma_nome: String,
    pub filial_id: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePresencaPayload {
    pub aluno_id: i32,
    pub turma_id: i32,
    #[schema(example = "2025-03-18")]
    pub data: NaiveDate,
    pub presente: bool,
    pub observacoes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePresencaPayload {
    pub presente: Option<bool>,
    pub observacoes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistroChamada {
    pub aluno_id: i32,
    pub presente: bool,
    pub observacoes: Option<String>,
}

/// Chamada de uma turma em um dia: uma linha por aluno.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChamadaPayload {
    pub turma_id: i32,
    pub data: NaiveDate,
    #[validate(length(min = 1, message = "required"))]
    pub registros: Vec<RegistroChamada>,
}

#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PresencaFiltro {
    pub aluno_id: Option<i32>,
    pub turma_id: Option<i32>,
    pub filial_id: Option<i32>,
    pub data: Option<NaiveDate>,
    pub data_inicio: Option<NaiveDate>,
    pub data_fim: Option<NaiveDate>,
}
