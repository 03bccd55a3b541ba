// src/middleware/filial.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use validator::{ValidationError, ValidationErrors};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::localizar},
    models::auth::{Papel, User},
};

// Cabeçalho com que a matriz escolhe a filial em que está trabalhando
pub const FILIAL_ID_HEADER: &str = "x-filial-id";

/// Recorte de filiais visível para a requisição.
///
/// A matriz (admin) vê a rede inteira e pode estreitar as listagens com o
/// cabeçalho `x-filial-id`. Gestores e o portal da filial ficam presos à
/// própria filial (`fixa`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilialScope {
    pub filial_id: Option<i32>,
    pub fixa: bool,
}

impl FilialScope {
    pub fn resolve(user: &User, header: Option<&str>) -> Result<Self, AppError> {
        let pedida = match header.map(str::trim).filter(|h| !h.is_empty()) {
            Some(valor) => Some(valor.parse::<i32>().map_err(|_| AppError::FilialForbidden)?),
            None => None,
        };

        match (user.papel, user.filial_id) {
            (Papel::Admin, _) => Ok(Self { filial_id: pedida, fixa: false }),
            (_, Some(propria)) => {
                if pedida.is_some_and(|id| id != propria) {
                    return Err(AppError::FilialForbidden);
                }
                Ok(Self { filial_id: Some(propria), fixa: true })
            }
            // Usuário de unidade sem filial: o banco não deixa, mas não liberamos nada
            (_, None) => Err(AppError::FilialForbidden),
        }
    }

    /// Filtro de filial de uma listagem.
    pub fn filtro(&self, pedido: Option<i32>) -> Result<Option<i32>, AppError> {
        if self.fixa {
            if pedido.is_some() && pedido != self.filial_id {
                return Err(AppError::FilialForbidden);
            }
            return Ok(self.filial_id);
        }
        Ok(pedido.or(self.filial_id))
    }

    /// Leitura de um registro. Fora do escopo vira 404 no serviço.
    pub fn pode_ler(&self, filial_id: i32) -> bool {
        !self.fixa || self.filial_id == Some(filial_id)
    }

    pub fn garantir_escrita(&self, filial_id: i32) -> Result<(), AppError> {
        if self.pode_ler(filial_id) {
            Ok(())
        } else {
            Err(AppError::FilialForbidden)
        }
    }

    /// Filial de um cadastro novo: a do usuário de unidade, ou a informada
    /// pela matriz (no corpo ou no cabeçalho).
    pub fn filial_para_cadastro(&self, pedida: Option<i32>) -> Result<i32, AppError> {
        if self.fixa {
            let propria = self.filial_id.ok_or(AppError::FilialForbidden)?;
            self.garantir_escrita(pedida.unwrap_or(propria))?;
            return Ok(propria);
        }

        pedida.or(self.filial_id).ok_or_else(|| {
            let mut err = ValidationError::new("required");
            err.message = Some("required".into());
            let mut errors = ValidationErrors::new();
            errors.add("filial_id", err);
            AppError::ValidationError(errors)
        })
    }
}

impl<S> FromRequestParts<S> for FilialScope
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let resultado = match parts.extensions.get::<AuthenticatedUser>() {
            Some(AuthenticatedUser(user)) => {
                let header = parts
                    .headers
                    .get(FILIAL_ID_HEADER)
                    .and_then(|value| value.to_str().ok());
                FilialScope::resolve(user, header)
            }
            None => Err(AppError::Unauthenticated),
        };

        resultado.map_err(|e| localizar(&parts.headers, &app_state.i18n_store, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn usuario(papel: Papel, filial_id: Option<i32>) -> User {
        User {
            id: 1,
            email: "teste@escolinha.com.br".to_string(),
            password_hash: String::new(),
            nome: "Teste".to_string(),
            papel,
            filial_id,
            ativo: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn admin_sees_everything_unless_narrowed() {
        let admin = usuario(Papel::Admin, None);

        let scope = FilialScope::resolve(&admin, None).unwrap();
        assert_eq!(scope.filtro(None).unwrap(), None);
        assert_eq!(scope.filtro(Some(4)).unwrap(), Some(4));
        assert!(scope.pode_ler(9));

        let scope = FilialScope::resolve(&admin, Some("2")).unwrap();
        assert_eq!(scope.filtro(None).unwrap(), Some(2));
        assert_eq!(scope.filial_para_cadastro(None).unwrap(), 2);
        assert_eq!(scope.filial_para_cadastro(Some(7)).unwrap(), 7);
    }

    #[test]
    fn admin_must_name_filial_when_creating() {
        let scope = FilialScope::resolve(&usuario(Papel::Admin, None), None).unwrap();
        assert!(matches!(
            scope.filial_para_cadastro(None),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn gestor_is_pinned_to_own_filial() {
        let gestor = usuario(Papel::Gestor, Some(3));
        let scope = FilialScope::resolve(&gestor, None).unwrap();

        assert_eq!(scope.filtro(None).unwrap(), Some(3));
        assert_eq!(scope.filtro(Some(3)).unwrap(), Some(3));
        assert!(matches!(scope.filtro(Some(5)), Err(AppError::FilialForbidden)));
        assert!(scope.pode_ler(3));
        assert!(!scope.pode_ler(5));
        assert!(matches!(scope.garantir_escrita(5), Err(AppError::FilialForbidden)));
        assert_eq!(scope.filial_para_cadastro(None).unwrap(), 3);
        assert!(matches!(
            scope.filial_para_cadastro(Some(5)),
            Err(AppError::FilialForbidden)
        ));
    }

    #[test]
    fn conflicting_header_is_forbidden_for_unit_accounts() {
        let portal = usuario(Papel::Filial, Some(3));
        assert!(FilialScope::resolve(&portal, Some("3")).is_ok());
        assert!(matches!(
            FilialScope::resolve(&portal, Some("4")),
            Err(AppError::FilialForbidden)
        ));
    }

    #[test]
    fn garbage_header_is_rejected() {
        let admin = usuario(Papel::Admin, None);
        assert!(FilialScope::resolve(&admin, Some("abc")).is_err());
        assert_eq!(
            FilialScope::resolve(&admin, Some("  ")).unwrap().filial_id,
            None
        );
    }
}
