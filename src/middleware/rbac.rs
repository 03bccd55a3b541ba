// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::localizar},
    models::auth::Papel,
};

// ---
// TABELA PAPEL -> PERMISSÕES
// ---

const PERMISSOES_ADMIN: &[&str] = &[
    "filiais:write",
    "configuracoes:write",
    "gestores:write",
    "cadastros:write",
    "financeiro:read",
    "financeiro:write",
    "presencas:write",
    "relatorios:read",
    "documentos:write",
];

const PERMISSOES_GESTOR: &[&str] = &[
    "cadastros:write",
    "financeiro:read",
    "financeiro:write",
    "presencas:write",
    "relatorios:read",
    "documentos:write",
];

// O portal da filial só faz a chamada
const PERMISSOES_FILIAL: &[&str] = &["presencas:write"];

pub fn permissoes_do_papel(papel: Papel) -> &'static [&'static str] {
    match papel {
        Papel::Admin => PERMISSOES_ADMIN,
        Papel::Gestor => PERMISSOES_GESTOR,
        Papel::Filial => PERMISSOES_FILIAL,
    }
}

pub fn tem_permissao(papel: Papel, slug: &str) -> bool {
    permissoes_do_papel(papel).contains(&slug)
}

/// 1. O Trait que define o que é uma Permissão
pub trait PermissionDef: Send + Sync + 'static {
    fn slug() -> &'static str;
}

/// 2. O Extractor (Guardião)
pub struct RequirePermission<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| localizar(&parts.headers, &app_state.i18n_store, AppError::Unauthenticated))?;

        let required_perm = T::slug();
        if !tem_permissao(user.0.papel, required_perm) {
            tracing::warn!(
                "Usuário {} ({:?}) sem a permissão '{}'",
                user.0.id,
                user.0.papel,
                required_perm
            );
            return Err(localizar(
                &parts.headers,
                &app_state.i18n_store,
                AppError::Forbidden(required_perm),
            ));
        }

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

macro_rules! permissao {
    ($nome:ident, $slug:literal) => {
        pub struct $nome;
        impl PermissionDef for $nome {
            fn slug() -> &'static str {
                $slug
            }
        }
    };
}

permissao!(PermFiliaisWrite, "filiais:write");
permissao!(PermConfiguracoesWrite, "configuracoes:write");
permissao!(PermGestoresWrite, "gestores:write");
permissao!(PermCadastrosWrite, "cadastros:write");
permissao!(PermFinanceiroRead, "financeiro:read");
permissao!(PermFinanceiroWrite, "financeiro:write");
permissao!(PermPresencasWrite, "presencas:write");
permissao!(PermRelatoriosRead, "relatorios:read");
permissao!(PermDocumentosWrite, "documentos:write");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_has_every_permission() {
        for slug in [
            PermFiliaisWrite::slug(),
            PermConfiguracoesWrite::slug(),
            PermGestoresWrite::slug(),
            PermCadastrosWrite::slug(),
            PermFinanceiroRead::slug(),
            PermFinanceiroWrite::slug(),
            PermPresencasWrite::slug(),
            PermRelatoriosRead::slug(),
            PermDocumentosWrite::slug(),
        ] {
            assert!(tem_permissao(Papel::Admin, slug), "admin sem {}", slug);
        }
    }

    #[test]
    fn gestor_cannot_manage_the_network() {
        assert!(tem_permissao(Papel::Gestor, "cadastros:write"));
        assert!(tem_permissao(Papel::Gestor, "financeiro:write"));
        assert!(!tem_permissao(Papel::Gestor, "filiais:write"));
        assert!(!tem_permissao(Papel::Gestor, "configuracoes:write"));
        assert!(!tem_permissao(Papel::Gestor, "gestores:write"));
    }

    #[test]
    fn filial_portal_only_takes_attendance() {
        assert_eq!(permissoes_do_papel(Papel::Filial), &["presencas:write"]);
        assert!(!tem_permissao(Papel::Filial, "financeiro:read"));
    }
}
