// src/handlers/auth.rs

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::{AuthenticatedUser, SESSION_COOKIE},
        i18n::Locale,
    },
    models::auth::{AlterarSenhaPayload, AuthResponse, LoginPayload, SessionUser},
    services::auth::{session_user, SESSION_DAYS},
};

fn cookie_da_sessao(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(SESSION_DAYS))
        .build()
}

// POST /api/login
#[utoipa::path(
    post,
    path = "/api/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Sessão aberta; o token também vai no cookie `sessao`", body = AuthResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 401, description = "E-mail ou senha incorretos")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    jar: CookieJar,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let response = app_state
        .auth_service
        .login_user(&payload.email, &payload.senha)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    let cookie = cookie_da_sessao(response.token.clone(), app_state.config.cookie_secure);
    Ok((jar.add(cookie), Json(response)))
}

// POST /api/logout
#[utoipa::path(
    post,
    path = "/api/logout",
    tag = "Auth",
    responses((status = 204, description = "Cookie de sessão removido"))
)]
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (StatusCode::NO_CONTENT, jar)
}

// GET /api/auth/user
#[utoipa::path(
    get,
    path = "/api/auth/user",
    tag = "Auth",
    responses(
        (status = 200, description = "Usuário da sessão e suas permissões", body = SessionUser),
        (status = 401, description = "Sem sessão")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedUser(user): AuthenticatedUser) -> Json<SessionUser> {
    Json(session_user(&user))
}

// PUT /api/auth/senha
#[utoipa::path(
    put,
    path = "/api/auth/senha",
    tag = "Auth",
    request_body = AlterarSenhaPayload,
    responses(
        (status = 204, description = "Senha alterada"),
        (status = 400, description = "Dados inválidos"),
        (status = 401, description = "Senha atual incorreta")
    ),
    security(("api_jwt" = []))
)]
pub async fn alterar_senha(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<AlterarSenhaPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    app_state
        .auth_service
        .change_password(&user, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_da_sessao_e_http_only() {
        let cookie = cookie_da_sessao("abc.def.ghi".into(), true);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "abc.def.ghi");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn cookie_da_sessao_dura_o_mesmo_que_o_token() {
        let cookie = cookie_da_sessao("abc.def.ghi".into(), false);
        assert_eq!(cookie.max_age(), Some(time::Duration::days(SESSION_DAYS)));
        assert_eq!(cookie.max_age().map(|d| d.whole_seconds()), Some(7 * 24 * 60 * 60));
    }
}
