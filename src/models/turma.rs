// src/models/turma.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::models::validacao::{validate_dias_semana, validate_obrigatorio};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Turma {
    pub id: i32,

    #[schema(example = "Sub-11 Tarde")]
    pub nome: String,

    #[schema(example = "Sub-11")]
    pub categoria: Option<String>,

    #[schema(example = "16:00-17:30")]
    pub horario: Option<String>,

    /// Dias da semana: seg, ter, qua, qui, sex, sab, dom
    pub dias_semana: Vec<String>,

    pub capacidade: i32,
    pub professor_id: Option<i32>,
    pub filial_id: i32,
    pub ativo: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Turma com a ocupação atual (matrículas ativas).
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TurmaOcupacao {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub turma: Turma,
    pub professor_nome: Option<String>,
    pub matriculados: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTurmaPayload {
    #[validate(custom(function = "validate_obrigatorio"))]
    #[schema(example = "Sub-11 Tarde")]
    pub nome: String,

    pub categoria: Option<String>,
    pub horario: Option<String>,

    #[serde(default)]
    #[validate(custom(function = "validate_dias_semana"))]
    pub dias_semana: Vec<String>,

    #[validate(range(min = 1, message = "invalid_capacidade"))]
    #[schema(example = 20)]
    pub capacidade: i32,

    pub professor_id: Option<i32>,
    pub filial_id: Option<i32>,
    pub ativo: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTurmaPayload {
    #[validate(custom(function = "validate_obrigatorio"))]
    pub nome: Option<String>,

    pub categoria: Option<String>,
    pub horario: Option<String>,

    #[validate(custom(function = "validate_dias_semana"))]
    pub dias_semana: Option<Vec<String>>,

    #[validate(range(min = 1, message = "invalid_capacidade"))]
    pub capacidade: Option<i32>,

    pub professor_id: Option<i32>,
    pub filial_id: Option<i32>,
    pub ativo: Option<bool>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TurmaFiltro {
    /// Busca por nome da turma, categoria ou nome do professor
    pub busca: Option<String>,
    pub filial_id: Option<i32>,
    pub professor_id: Option<i32>,
    pub categoria: Option<String>,
    pub ativo: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacidade_precisa_ser_positiva() {
        let payload: CreateTurmaPayload = serde_json::from_value(serde_json::json!({
            "nome": "Sub-9",
            "capacidade": 0,
            "diasSemana": ["seg", "feriado"]
        }))
        .unwrap();

        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("capacidade"));
        assert!(fields.contains_key("dias_semana"));
    }

    #[test]
    fn dias_semana_default_to_empty() {
        let payload: CreateTurmaPayload =
            serde_json::from_value(serde_json::json!({ "nome": "Sub-13", "capacidade": 18 })).unwrap();
        assert!(payload.dias_semana.is_empty());
        assert!(payload.validate().is_ok());
    }
}
