// src/services/tenancy_service.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::OrganizationStore,
    models::{
        auth::Auther,
        tenancy::{Organization, OrganizationUpdate},
    },
    services::guard::{ensure_same_tenant, require_admin},
};

const ORGANIZATION_NOT_FOUND: &str = "no organization found";

#[derive(Clone)]
pub struct TenantService {
    organizations: Arc<dyn OrganizationStore>,
}

impl TenantService {
    pub fn new(organizations: Arc<dyn OrganizationStore>) -> Self {
        Self { organizations }
    }

    pub async fn list(&self, auther: &Auther) -> Result<Vec<Organization>, AppError> {
        if auther.is_admin() {
            return self.organizations.list().await;
        }
        match auther.organization_id() {
            Some(own) => Ok(vec![self.organizations.get_by_id(own).await?]),
            None => Ok(Vec::new()),
        }
    }

    pub async fn get_by_id(&self, auther: &Auther, id: i64) -> Result<Organization, AppError> {
        let org = self.organizations.get_by_id(id).await?;
        ensure_same_tenant(auther, Some(org.id), ORGANIZATION_NOT_FOUND)?;
        Ok(org)
    }

    pub async fn get_by_code(&self, auther: &Auther, code: &str) -> Result<Organization, AppError> {
        let org = self.organizations.get_by_code(code).await?;
        ensure_same_tenant(auther, Some(org.id), ORGANIZATION_NOT_FOUND)?;
        Ok(org)
    }

    pub async fn update(
        &self,
        auther: &Auther,
        id: i64,
        update: OrganizationUpdate,
    ) -> Result<Organization, AppError> {
        if update.name.trim().is_empty() {
            return Err(AppError::bad_request("name is required"));
        }

        let mut org = self.get_by_id(auther, id).await?;
        org.name = update.name.trim().to_string();
        org.website = update.website;

        self.organizations.update(&org).await
    }

    pub async fn archive(&self, auther: &Auther, id: i64) -> Result<Organization, AppError> {
        let mut org = self.get_by_id(auther, id).await?;
        if org.is_archived {
            return Err(AppError::bad_request("organization is already archived"));
        }
        org.is_archived = true;
        self.organizations.update(&org).await
    }

    pub async fn unarchive(&self, auther: &Auther, id: i64) -> Result<Organization, AppError> {
        let mut org = self.get_by_id(auther, id).await?;
        if !org.is_archived {
            return Err(AppError::bad_request("organization is not archived"));
        }
        org.is_archived = false;
        self.organizations.update(&org).await
    }

    pub async fn delete(&self, auther: &Auther, id: i64) -> Result<(), AppError> {
        require_admin(auther)?;
        self.organizations.delete(id).await
    }
}
