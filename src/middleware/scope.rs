// src/middleware/scope.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::{
    common::error::AppError,
    config::AppState,
    loaders::Loaders,
    middleware::auth::NO_CREDENTIALS,
    models::auth::Auther,
};

/// Contexto de uma requisição: o principal (se houver) e os loaders
/// criados só para ela.
#[derive(Clone)]
pub struct RequestScope {
    pub auther: Option<Auther>,
    pub loaders: Loaders,
}

impl RequestScope {
    pub fn new(auther: Option<Auther>, loaders: Loaders) -> Self {
        Self { auther, loaders }
    }

    pub fn auther(&self) -> Result<&Auther, AppError> {
        self.auther
            .as_ref()
            .ok_or_else(|| AppError::unauthorized(NO_CREDENTIALS))
    }
}

impl<S> FromRequestParts<S> for RequestScope
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        let auther = parts.extensions.get::<Auther>().cloned();
        let loaders = Loaders::new(&app_state.stores, app_state.loader_config);
        Ok(RequestScope::new(auther, loaders))
    }
}
