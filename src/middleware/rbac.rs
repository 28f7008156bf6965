// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{auth::Auther, rbac::Permission},
};

/// 1. O Trait que define o que é uma Permissão, com as visões aceitas
pub trait PermissionDef: Send + Sync + 'static {
    const PERMISSION: Permission;
    const MEMBER_VIEW: bool;
    const CUSTOMER_VIEW: bool;
}

/// 2. O Extractor (Guardião). Entrega o principal já autorizado.
pub struct RequirePermission<T> {
    pub auther: Auther,
    _permission: PhantomData<T>,
}

// 3. Implementação do FromRequestParts

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        // A. Extrai Usuário
        let AuthenticatedUser(auther) = AuthenticatedUser::from_request_parts(parts, state).await?;

        // B. Avalia a permissão com as visões da operação
        app_state
            .services
            .authorization
            .grant_permission(&auther, T::PERMISSION, T::MEMBER_VIEW, T::CUSTOMER_VIEW)
            .await?;

        Ok(RequirePermission { auther, _permission: PhantomData })
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

pub struct PermCreateUser;
impl PermissionDef for PermCreateUser {
    const PERMISSION: Permission = Permission::CreateUser;
    const MEMBER_VIEW: bool = true;
    const CUSTOMER_VIEW: bool = false;
}
