// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};

use crate::common::{
    error::{ApiError, AppError},
    i18n::{I18nStore, DEFAULT_LANG},
};

// Nosso extrator de idioma
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locale(pub String);

impl Locale {
    /// Primeiro idioma do `Accept-Language`, só a parte principal
    /// ("pt-BR" -> "pt").
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let lang = headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|header_value| header_value.to_str().ok())
            .and_then(|header_str| {
                accept_language::parse(header_str).first().map(|tag| {
                    tag.split('-').next().unwrap_or(tag).to_ascii_lowercase()
                })
            })
            .unwrap_or_else(|| DEFAULT_LANG.to_string());

        Locale(lang)
    }
}

impl Default for Locale {
    fn default() -> Self {
        Locale(DEFAULT_LANG.to_string())
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Locale::from_headers(&parts.headers))
    }
}

/// Traduz um erro para a resposta no idioma da requisição. Usado pelos
/// extratores e middlewares, que não recebem o `Locale` pronto.
pub fn localizar(headers: &HeaderMap, store: &I18nStore, err: AppError) -> ApiError {
    err.to_api_error(&Locale::from_headers(headers), store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn defaults_to_portuguese() {
        assert_eq!(Locale::from_headers(&HeaderMap::new()), Locale("pt".to_string()));
    }

    #[test]
    fn takes_primary_tag_of_preferred_language() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.9,pt-BR;q=0.8"),
        );
        assert_eq!(Locale::from_headers(&headers).0, "en");

        headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static("pt-BR"));
        assert_eq!(Locale::from_headers(&headers).0, "pt");
    }
}
