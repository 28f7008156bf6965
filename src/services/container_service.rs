// src/services/container_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::ContainerStore,
    models::{
        auth::Auther,
        inventory::{Container, ContainerCreateRequest, ContainerUpdateRequest, NewContainer},
    },
    services::guard::{ensure_same_tenant, owning_tenant, require_admin},
};

pub(crate) const CONTAINER_NOT_FOUND: &str = "no container found";

#[derive(Clone)]
pub struct ContainerService {
    containers: Arc<dyn ContainerStore>,
}

impl ContainerService {
    pub fn new(containers: Arc<dyn ContainerStore>) -> Self {
        Self { containers }
    }

    pub async fn list(&self, auther: &Auther) -> Result<Vec<Container>, AppError> {
        if auther.is_admin() {
            return self.containers.list().await;
        }
        match auther.organization_id() {
            Some(own) => self.containers.list_by_org_id(own).await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn get_by_id(&self, auther: &Auther, id: i64) -> Result<Container, AppError> {
        let container = self.containers.get_by_id(id).await?;
        ensure_same_tenant(auther, container.organization_id, CONTAINER_NOT_FOUND)?;
        Ok(container)
    }

    pub async fn get_by_uid(&self, auther: &Auther, uid: Uuid) -> Result<Container, AppError> {
        let container = self.containers.get_by_uid(uid).await?;
        ensure_same_tenant(auther, container.organization_id, CONTAINER_NOT_FOUND)?;
        Ok(container)
    }

    pub async fn get_by_code(&self, auther: &Auther, code: &str) -> Result<Container, AppError> {
        let container = self.containers.get_by_code(code).await?;
        ensure_same_tenant(auther, container.organization_id, CONTAINER_NOT_FOUND)?;
        Ok(container)
    }

    pub async fn create(
        &self,
        auther: &Auther,
        request: ContainerCreateRequest,
    ) -> Result<Container, AppError> {
        let organization_id = owning_tenant(auther, request.organization_id)?;

        self.containers
            .insert(NewContainer {
                description: request.description,
                organization_id,
                created_by_id: auther.id,
            })
            .await
    }

    pub async fn update(
        &self,
        auther: &Auther,
        request: ContainerUpdateRequest,
    ) -> Result<Container, AppError> {
        let mut container = self.get_by_id(auther, request.id).await?;
        container.description = request.description;
        self.containers.update(&container).await
    }

    pub async fn archive(&self, auther: &Auther, id: i64) -> Result<Container, AppError> {
        self.set_archived(auther, id, true).await
    }

    pub async fn unarchive(&self, auther: &Auther, id: i64) -> Result<Container, AppError> {
        self.set_archived(auther, id, false).await
    }

    pub async fn delete(&self, auther: &Auther, id: i64) -> Result<(), AppError> {
        require_admin(auther)?;
        self.containers.delete(id).await
    }

    async fn set_archived(&self, auther: &Auther, id: i64, archived: bool) -> Result<Container, AppError> {
        let mut container = self.get_by_id(auther, id).await?;
        if container.is_archived == archived {
            let state = if archived { "already archived" } else { "not archived" };
            return Err(AppError::bad_request(format!("container is {}", state)));
        }
        container.is_archived = archived;
        self.containers.update(&container).await
    }
}
