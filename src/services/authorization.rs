// src/services/authorization.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::RoleStore,
    models::{
        auth::{Auther, AutherKind},
        rbac::Permission,
    },
};

pub const NOT_AUTHORIZED: &str = "user not authorized";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny,
}

/// Avaliador de permissões. O isolamento por organização fica nos serviços,
/// depois de um `Allow`.
#[derive(Clone)]
pub struct AuthorizationService {
    roles: Arc<dyn RoleStore>,
}

impl AuthorizationService {
    pub fn new(roles: Arc<dyn RoleStore>) -> Self {
        Self { roles }
    }

    /// Regras em ordem; a primeira que casar decide. Falha ao buscar o cargo
    /// é propagada como erro, nunca como `Deny`.
    pub async fn evaluate(
        &self,
        auther: &Auther,
        permission: Permission,
        member_view: bool,
        customer_view: bool,
    ) -> Result<Access, AppError> {
        // 1. Operação sem visão para membro nem cliente: só admin
        if !auther.is_admin() && !member_view && !customer_view {
            return Ok(Access::Deny);
        }

        // 2. Cliente sem visão de cliente
        if !customer_view && auther.is_customer() {
            return Ok(Access::Deny);
        }

        // 3. Membro sem visão de membro
        if !member_view && auther.is_member() {
            return Ok(Access::Deny);
        }

        // 4. Membro: decide o cargo
        if let AutherKind::Member { role_id, .. } = auther.kind {
            let role = self.roles.get_by_id(role_id).await?;
            return Ok(if role.grants(permission) { Access::Allow } else { Access::Deny });
        }

        // 5. Admin, ou cliente com visão de cliente
        Ok(Access::Allow)
    }

    pub async fn grant_permission(
        &self,
        auther: &Auther,
        permission: Permission,
        member_view: bool,
        customer_view: bool,
    ) -> Result<(), AppError> {
        match self.evaluate(auther, permission, member_view, customer_view).await? {
            Access::Allow => Ok(()),
            Access::Deny => {
                tracing::debug!(user_id = auther.id, %permission, "permissão negada");
                Err(AppError::unauthorized(NOT_AUTHORIZED))
            }
        }
    }
}
