use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

/// Rota para onde o cliente deve mandar o usuário sem sessão.
pub const LOGIN_URL: &str = "/api/login";

// Nosso tipo de erro de domínio. Nunca vai direto para o cliente:
// passa antes pelo `to_api_error`, que traduz a mensagem.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Sessão ausente, inválida ou expirada")]
    Unauthenticated,

    #[error("Permissão '{0}' necessária")]
    Forbidden(&'static str),

    #[error("Filial fora do escopo do usuário")]
    FilialForbidden,

    // A string é a chave da entidade no catálogo ("aluno", "turma"...)
    #[error("Registro não encontrado: {0}")]
    NotFound(&'static str),

    // A string é a chave da mensagem de conflito ("cpf_duplicado"...)
    #[error("Violação de unicidade: {0}")]
    Conflict(&'static str),

    #[error("Registro em uso por outros cadastros")]
    RecordInUse,

    #[error("Referência para registro inexistente")]
    InvalidReference,

    // CHECK do banco ou número fora da faixa da coluna
    #[error("Dado recusado pelo banco")]
    ConstraintViolation,

    #[error("Turma lotada (capacidade {capacidade})")]
    TurmaLotada { capacidade: i32 },

    #[error("Registros de filiais diferentes")]
    FilialMismatch,

    #[error("Aluno {0} sem matrícula ativa na turma")]
    AlunoNaoMatriculado(i32),

    #[error("Arquivo inválido: {0}")]
    InvalidUpload(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

/// O erro que de fato vira resposta HTTP, já traduzido.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl AppError {
    pub fn to_api_error(self, locale: &Locale, store: &I18nStore) -> ApiError {
        let lang = locale.0.as_str();

        let (status, key, details) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            let code = e.message.as_deref().unwrap_or(e.code.as_ref());
                            store.translate(lang, &format!("validacao.{}", code))
                        })
                        .collect();
                    // Erros de struct inteira (`schema`) chegam como "__all__"
                    let key = if field == "__all__" { "geral".to_string() } else { to_camel_case(&field) };
                    details.insert(key, json!(messages));
                }
                return ApiError {
                    status: StatusCode::BAD_REQUEST,
                    error: store.translate(lang, "erro.validacao"),
                    details: Some(Value::Object(details)),
                };
            }
            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "erro.email_em_uso".to_string(), None),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "erro.credenciais_invalidas".to_string(), None),
            AppError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "erro.nao_autenticado".to_string(),
                Some(json!({ "loginUrl": LOGIN_URL })),
            ),
            AppError::Forbidden(permission) => {
                let message = store.translate_with(lang, "erro.sem_permissao", &[("permissao", permission)]);
                return ApiError {
                    status: StatusCode::FORBIDDEN,
                    error: message,
                    details: Some(json!({ "permissao": permission })),
                };
            }
            AppError::FilialForbidden => (StatusCode::FORBIDDEN, "erro.filial_fora_do_escopo".to_string(), None),
            AppError::NotFound(entity) => (StatusCode::NOT_FOUND, format!("nao_encontrado.{}", entity), None),
            AppError::Conflict(key) => (StatusCode::CONFLICT, format!("conflito.{}", key), None),
            AppError::RecordInUse => (StatusCode::CONFLICT, "erro.registro_em_uso".to_string(), None),
            AppError::InvalidReference => (StatusCode::UNPROCESSABLE_ENTITY, "erro.referencia_invalida".to_string(), None),
            AppError::ConstraintViolation => (StatusCode::UNPROCESSABLE_ENTITY, "erro.dado_recusado".to_string(), None),
            AppError::TurmaLotada { capacidade } => {
                let limite = capacidade.to_string();
                let message = store.translate_with(lang, "erro.turma_lotada", &[("capacidade", limite.as_str())]);
                return ApiError {
                    status: StatusCode::CONFLICT,
                    error: message,
                    details: Some(json!({ "capacidade": capacidade })),
                };
            }
            AppError::FilialMismatch => (StatusCode::CONFLICT, "erro.filial_divergente".to_string(), None),
            AppError::AlunoNaoMatriculado(aluno_id) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "erro.aluno_nao_matriculado".to_string(),
                Some(json!({ "alunoId": aluno_id })),
            ),
            AppError::InvalidUpload(reason) => (
                StatusCode::BAD_REQUEST,
                "erro.arquivo_invalido".to_string(),
                Some(json!({ "motivo": reason })),
            ),

            // Todos os outros erros viram 500. O detalhe fica só no log.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "erro.interno".to_string(), None)
            }
        };

        ApiError {
            status,
            error: store.translate(lang, &key),
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

// "data_nascimento" -> "dataNascimento", para casar com o JSON da API.
fn to_camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper_next = false;
    for c in field.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use validator::{ValidationError, ValidationErrors};

    fn pt() -> Locale {
        Locale("pt".to_string())
    }

    #[test]
    fn converts_field_names_to_camel_case() {
        assert_eq!(to_camel_case("data_nascimento"), "dataNascimento");
        assert_eq!(to_camel_case("nome"), "nome");
        assert_eq!(to_camel_case("cpf_responsavel"), "cpfResponsavel");
    }

    #[test]
    fn validation_errors_become_bad_request_with_field_details() {
        let store = I18nStore::load().unwrap();
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("length");
        err.message = Some("required".into());
        errors.add("nome", err);

        let api = AppError::ValidationError(errors).to_api_error(&pt(), &store);

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.unwrap();
        assert_eq!(details["nome"][0], "O campo é obrigatório.");
    }

    #[test]
    fn unauthenticated_points_to_login() {
        let store = I18nStore::load().unwrap();
        let api = AppError::Unauthenticated.to_api_error(&pt(), &store);

        assert_eq!(api.status, StatusCode::UNAUTHORIZED);
        assert_eq!(api.details.unwrap()["loginUrl"], LOGIN_URL);
    }

    #[test]
    fn maps_domain_errors_to_status_codes() {
        let store = I18nStore::load().unwrap();
        let cases = [
            (AppError::NotFound("aluno"), StatusCode::NOT_FOUND),
            (AppError::Conflict("email_duplicado"), StatusCode::CONFLICT),
            (AppError::RecordInUse, StatusCode::CONFLICT),
            (AppError::InvalidReference, StatusCode::UNPROCESSABLE_ENTITY),
            (AppError::ConstraintViolation, StatusCode::UNPROCESSABLE_ENTITY),
            (AppError::FilialMismatch, StatusCode::CONFLICT),
            (AppError::TurmaLotada { capacidade: 20 }, StatusCode::CONFLICT),
            (AppError::FilialForbidden, StatusCode::FORBIDDEN),
            (AppError::Forbidden("filiais:write"), StatusCode::FORBIDDEN),
            (AppError::AlunoNaoMatriculado(3), StatusCode::UNPROCESSABLE_ENTITY),
            (AppError::InternalServerError(anyhow::anyhow!("boom")), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, status) in cases {
            assert_eq!(error.to_api_error(&pt(), &store).status, status);
        }
    }

    #[test]
    fn turma_lotada_message_carries_capacity() {
        let store = I18nStore::load().unwrap();
        let api = AppError::TurmaLotada { capacidade: 18 }.to_api_error(&pt(), &store);
        assert!(api.error.contains("18"));
    }

    #[test]
    fn messages_follow_the_locale() {
        let store = I18nStore::load().unwrap();
        let api = AppError::InvalidCredentials.to_api_error(&Locale("en".to_string()), &store);
        assert_eq!(api.error, "Invalid e-mail or password.");
    }

    #[tokio::test]
    async fn api_error_renders_json_body() {
        let response = ApiError {
            status: StatusCode::NOT_FOUND,
            error: "Aluno não encontrado.".to_string(),
            details: None,
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body, json!({ "error": "Aluno não encontrado." }));
    }
}
