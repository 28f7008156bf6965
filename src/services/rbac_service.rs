// src/services/rbac_service.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::{OrganizationStore, RoleStore},
    models::{
        auth::Auther,
        rbac::{list_permissions, NewRole, Role, RoleCreateRequest, RoleUpdateRequest},
    },
    services::guard::{ensure_same_tenant, owning_tenant, require_admin, PERMISSION_NOT_GRANTED},
};

const ROLE_NOT_FOUND: &str = "no role found";

/// Remove repetições mantendo a ordem da primeira ocorrência.
pub fn unique_permissions(requested: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(requested.len());
    for permission in requested {
        if !unique.contains(permission) {
            unique.push(permission.clone());
        }
    }
    unique
}

pub fn contains_permission<S: AsRef<str>>(catalog: &[S], candidate: &str) -> bool {
    catalog.iter().any(|p| p.as_ref() == candidate)
}

// Sem repetição e só com nomes do catálogo; o resto é descartado em silêncio.
pub fn known_permissions(requested: &[String]) -> Vec<String> {
    let catalog = list_permissions();
    unique_permissions(requested)
        .into_iter()
        .filter(|p| contains_permission(&catalog, p))
        .collect()
}

#[derive(Clone)]
pub struct RbacService {
    roles: Arc<dyn RoleStore>,
    organizations: Arc<dyn OrganizationStore>,
}

impl RbacService {
    pub fn new(roles: Arc<dyn RoleStore>, organizations: Arc<dyn OrganizationStore>) -> Self {
        Self { roles, organizations }
    }

    // Admin vê todos (ou filtra por organização); membro só os da própria.
    pub async fn list(
        &self,
        auther: &Auther,
        organization_id: Option<i64>,
    ) -> Result<Vec<Role>, AppError> {
        if auther.is_admin() {
            return match organization_id {
                Some(org) => self.roles.list_by_org_id(org).await,
                None => self.roles.list_all().await,
            };
        }
        match auther.organization_id() {
            Some(own) => self.roles.list_by_org_id(own).await,
            None => Err(AppError::unauthorized(PERMISSION_NOT_GRANTED)),
        }
    }

    pub async fn get_by_id(&self, auther: &Auther, id: i64) -> Result<Role, AppError> {
        let role = self.roles.get_by_id(id).await?;
        ensure_same_tenant(auther, Some(role.organization_id), ROLE_NOT_FOUND)?;
        Ok(role)
    }

    pub async fn get_by_code(&self, auther: &Auther, code: &str) -> Result<Role, AppError> {
        let role = self.roles.get_by_code(code).await?;
        ensure_same_tenant(auther, Some(role.organization_id), ROLE_NOT_FOUND)?;
        Ok(role)
    }

    pub async fn create(&self, auther: &Auther, request: RoleCreateRequest) -> Result<Role, AppError> {
        // 1. Validação
        if request.name.trim().is_empty() {
            return Err(AppError::bad_request("name is required"));
        }
        let permissions = if request.is_org_admin {
            Vec::new()
        } else {
            known_permissions(&request.permissions)
        };
        if !request.is_org_admin && permissions.is_empty() {
            return Err(AppError::bad_request("permissions are required"));
        }

        // 2. Resolve a organização (forçada para membros)
        let organization_id = owning_tenant(auther, request.organization_id)?;
        if auther.is_admin() {
            self.organizations.get_by_id(organization_id).await?;
        }

        // 3. Só quem já administra a organização cria outro cargo de administrador
        if request.is_org_admin && !self.administers(auther).await? {
            return Err(AppError::unauthorized(PERMISSION_NOT_GRANTED));
        }

        // 4. Persiste (o código ROLE00000 vem do repositório)
        self.roles
            .insert(NewRole {
                name: request.name.trim().to_string(),
                permissions,
                is_org_admin: request.is_org_admin,
                organization_id,
            })
            .await
    }

    pub async fn update(&self, auther: &Auther, request: RoleUpdateRequest) -> Result<Role, AppError> {
        // 1. Validação (a lista é conferida antes do filtro)
        if request.name.trim().is_empty() {
            return Err(AppError::bad_request("name is required"));
        }
        if request.permissions.is_empty() {
            return Err(AppError::bad_request("permissions are required"));
        }

        // 2. Busca com isolamento
        let mut role = self.get_by_id(auther, request.id).await?;

        // 3. Aplica
        role.name = request.name.trim().to_string();
        if !role.is_org_admin {
            role.permissions = known_permissions(&request.permissions);
        }
        role.is_archived = request.is_archived;

        self.roles.update(&role).await
    }

    pub async fn delete(&self, auther: &Auther, id: i64) -> Result<(), AppError> {
        require_admin(auther)?;
        self.roles.delete(id).await
    }

    async fn administers(&self, auther: &Auther) -> Result<bool, AppError> {
        if auther.is_admin() {
            return Ok(true);
        }
        match auther.role_id() {
            Some(role_id) => Ok(self.roles.get_by_id(role_id).await?.is_org_admin),
            None => Ok(false),
        }
    }
}
