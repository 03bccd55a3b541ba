// src/models/matricula.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

// Vínculo aluno <-> turma
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Matricula {
    pub id: i32,
    pub aluno_id: i32,
    pub turma_id: i32,
    pub ativo: bool,
    pub data_matricula: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Linha da listagem: a matrícula com os nomes para a tabela.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatriculaDetalhe {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub matricula: Matricula,
    pub aluno_nome: String,
    pub turma_nome: String,
    pub filial_id: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMatriculaPayload {
    pub aluno_id: i32,
    pub turma_id: i32,
    pub data_matricula: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMatriculaPayload {
    pub ativo: bool,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MatriculaFiltro {
    pub aluno_id: Option<i32>,
    pub turma_id: Option<i32>,
    pub ativo: Option<bool>,
    pub filial_id: Option<i32>,
}
