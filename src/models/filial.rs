// src/models/filial.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::models::validacao::validate_obrigatorio;

// ---
// Filial (unidade da franquia)
// ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Filial {
    pub id: i32,

    #[schema(example = "Unidade Centro")]
    pub nome: String,

    #[schema(example = "12.345.678/0001-99")]
    pub cnpj: Option<String>,

    pub endereco: Option<String>,
    pub cidade: Option<String>,
    #[schema(example = "SP")]
    pub estado: Option<String>,
    pub cep: Option<String>,
    pub telefone: Option<String>,
    pub email: Option<String>,
    pub responsavel: Option<String>,

    // E-mail de acesso ao portal da filial. A senha fica só no usuário.
    #[schema(example = "centro@escolinha.com.br")]
    pub login_email: Option<String>,

    pub ativo: bool,
    pub ultima_sincronizacao: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_login_completo"))]
pub struct CreateFilialPayload {
    #[validate(custom(function = "validate_obrigatorio"))]
    #[schema(example = "Unidade Centro")]
    pub nome: String,

    pub cnpj: Option<String>,
    pub endereco: Option<String>,
    pub cidade: Option<String>,

    #[validate(length(equal = 2, message = "invalid_estado"))]
    #[schema(example = "SP")]
    pub estado: Option<String>,

    pub cep: Option<String>,
    pub telefone: Option<String>,

    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,

    pub responsavel: Option<String>,

    #[validate(email(message = "invalid_email"))]
    #[schema(example = "centro@escolinha.com.br")]
    pub login_email: Option<String>,

    #[validate(length(min = 6, message = "senha_curta"))]
    pub senha: Option<String>,

    pub ativo: Option<bool>,
}

// Credencial do portal: ou vem e-mail e senha juntos, ou nenhum dos dois.
fn validate_login_completo(payload: &CreateFilialPayload) -> Result<(), ValidationError> {
    if payload.login_email.is_some() != payload.senha.is_some() {
        let mut err = ValidationError::new("login_incompleto");
        err.message = Some("login_incompleto".into());
        return Err(err);
    }
    Ok(())
}

/// Atualização parcial: campo ausente fica como está.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFilialPayload {
    #[validate(custom(function = "validate_obrigatorio"))]
    pub nome: Option<String>,

    pub cnpj: Option<String>,
    pub endereco: Option<String>,
    pub cidade: Option<String>,

    #[validate(length(equal = 2, message = "invalid_estado"))]
    pub estado: Option<String>,

    pub cep: Option<String>,
    pub telefone: Option<String>,

    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,

    pub responsavel: Option<String>,

    #[validate(email(message = "invalid_email"))]
    pub login_email: Option<String>,

    #[validate(length(min = 6, message = "senha_curta"))]
    pub senha: Option<String>,

    pub ativo: Option<bool>,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct FilialFiltro {
    /// Busca por nome, cidade ou responsável
    pub busca: Option<String>,
    pub ativo: Option<bool>,
}

// ---
// Sincronização com a matriz
// ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    Nunca,
    Sincronizado,
    Pendente,
}

impl SyncState {
    /// Pendente quando algum cadastro da filial mudou depois da última
    /// sincronização.
    pub fn from_timestamps(
        ultima_sincronizacao: Option<DateTime<Utc>>,
        ultima_alteracao: Option<DateTime<Utc>>,
    ) -> Self {
        match (ultima_sincronizacao, ultima_alteracao) {
            (None, _) => SyncState::Nunca,
            (Some(sync), Some(alteracao)) if alteracao > sync => SyncState::Pendente,
            (Some(_), _) => SyncState::Sincronizado,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncTotais {
    pub alunos: i64,
    pub professores: i64,
    pub turmas: i64,
    pub pagamentos: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatus {
    pub filial_id: i32,
    pub status: SyncState,
    pub ultima_sincronizacao: Option<DateTime<Utc>>,
    pub ultima_alteracao: Option<DateTime<Utc>>,
    pub totais: SyncTotais,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn payload(login_email: Option<&str>, senha: Option<&str>) -> CreateFilialPayload {
        CreateFilialPayload {
            nome: "Unidade Norte".into(),
            cnpj: None,
            endereco: None,
            cidade: None,
            estado: Some("RS".into()),
            cep: None,
            telefone: None,
            email: None,
            responsavel: None,
            login_email: login_email.map(Into::into),
            senha: senha.map(Into::into),
            ativo: None,
        }
    }

    #[test]
    fn login_do_portal_precisa_de_email_e_senha() {
        assert!(payload(None, None).validate().is_ok());
        assert!(payload(Some("norte@escola.com"), Some("123456")).validate().is_ok());
        assert!(payload(Some("norte@escola.com"), None).validate().is_err());
        assert!(payload(None, Some("123456")).validate().is_err());
    }

    #[test]
    fn nome_em_branco_bloqueia_o_cadastro() {
        let mut p = payload(None, None);
        p.nome = "  ".into();
        let errors = p.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("nome"));
    }

    #[test]
    fn sync_state_rules() {
        let t1 = Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0).unwrap();
        let t2 = Utc.with_ymd_and_hms(2025, 3, 2, 10, 0, 0).unwrap();

        assert_eq!(SyncState::from_timestamps(None, Some(t1)), SyncState::Nunca);
        assert_eq!(SyncState::from_timestamps(Some(t2), Some(t1)), SyncState::Sincronizado);
        assert_eq!(SyncState::from_timestamps(Some(t1), Some(t2)), SyncState::Pendente);
        assert_eq!(SyncState::from_timestamps(Some(t1), None), SyncState::Sincronizado);
    }
}
