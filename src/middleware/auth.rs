// src/middleware/auth.rs

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    extract::cookie::CookieJar,
    headers::{authorization::Bearer, Authorization, HeaderMapExt},
};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::localizar,
    models::auth::User,
};

/// Nome do cookie HttpOnly com o JWT da sessão.
pub const SESSION_COOKIE: &str = "sessao";

// O header `Authorization: Bearer` tem prioridade sobre o cookie
pub fn token_da_requisicao(headers: &HeaderMap) -> Option<String> {
    if let Some(Authorization(bearer)) = headers.typed_get::<Authorization<Bearer>>() {
        return Some(bearer.token().to_string());
    }

    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|token| !token.is_empty())
}

// O middleware em si: sem sessão válida, a requisição nem chega ao handler.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = token_da_requisicao(request.headers()) else {
        return Err(localizar(request.headers(), &app_state.i18n_store, AppError::Unauthenticated));
    };

    let user = app_state
        .auth_service
        .validate_token(&token)
        .await
        .map_err(|e| localizar(request.headers(), &app_state.i18n_store, e))?;

    // Insere o usuário nos "extensions" da requisição
    request.extensions_mut().insert(AuthenticatedUser(user));
    Ok(next.run(request).await)
}

// Extrator para obter o usuário autenticado diretamente nos handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<AuthenticatedUser>().cloned().ok_or_else(|| {
            let app_state = AppState::from_ref(state);
            localizar(&parts.headers, &app_state.i18n_store, AppError::Unauthenticated)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, HeaderValue};

    #[test]
    fn reads_bearer_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(token_da_requisicao(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn falls_back_to_session_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("tema=escuro; sessao=tok123"));
        assert_eq!(token_da_requisicao(&headers).as_deref(), Some("tok123"));
    }

    #[test]
    fn bearer_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer do-header"));
        headers.insert(header::COOKIE, HeaderValue::from_static("sessao=do-cookie"));
        assert_eq!(token_da_requisicao(&headers).as_deref(), Some("do-header"));
    }

    #[test]
    fn no_credentials_no_token() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(token_da_requisicao(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("sessao="));
        assert_eq!(token_da_requisicao(&headers), None);
    }
}
