// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::{common::error::AppError, config::AppState, models::auth::Auther};

/// Nome do cookie que carrega o token.
pub const TOKEN_COOKIE: &str = "jwt";

pub const NO_CREDENTIALS: &str = "no credentials provided";

// O middleware em si. Sem token a requisição segue anônima; token inválido
// é rejeitado com 403.
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // 1. Cookie primeiro, depois o header
    let token = jar
        .get(TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .or_else(|| {
            request
                .headers()
                .get(AUTHORIZATION)
                .and_then(|value| value.to_str().ok())
                .map(|value| value.strip_prefix("Bearer ").unwrap_or(value).to_string())
        })
        .filter(|token| !token.is_empty());

    // 2. Valida e insere o principal nos "extensions" da requisição
    if let Some(token) = token {
        let auther = app_state.services.auth.validate_token(&token)?;
        tracing::debug!(user_id = auther.id, "requisição autenticada");
        request.extensions_mut().insert(auther);
    }

    Ok(next.run(request).await)
}

// Extrator para obter o usuário autenticado diretamente nos handlers
pub struct AuthenticatedUser(pub Auther);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Auther>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or_else(|| AppError::unauthorized(NO_CREDENTIALS))
    }
}
