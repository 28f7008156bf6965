// src/services/pallet_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ContainerStore, PalletStore},
    models::{
        auth::Auther,
        inventory::{NewPallet, Pallet, PalletCreateRequest, PalletUpdateRequest},
    },
    services::{
        container_service::CONTAINER_NOT_FOUND,
        guard::{ensure_same_tenant, owning_tenant, require_admin},
    },
};

const PALLET_NOT_FOUND: &str = "no pallet found";
const CONTAINER_NOT_IN_TENANT: &str = "no container found with given container id";

#[derive(Clone)]
pub struct PalletService {
    pallets: Arc<dyn PalletStore>,
    containers: Arc<dyn ContainerStore>,
}

impl PalletService {
    pub fn new(pallets: Arc<dyn PalletStore>, containers: Arc<dyn ContainerStore>) -> Self {
        Self { pallets, containers }
    }

    // Com `container_id`, lista os paletes daquele contêiner (se visível).
    pub async fn list(
        &self,
        auther: &Auther,
        container_id: Option<i64>,
    ) -> Result<Vec<Pallet>, AppError> {
        if let Some(container_id) = container_id {
            let container = self.containers.get_by_id(container_id).await?;
            ensure_same_tenant(auther, container.organization_id, CONTAINER_NOT_FOUND)?;
            return self.pallets.list_by_container_id(container.id).await;
        }

        if auther.is_admin() {
            return self.pallets.list().await;
        }
        match auther.organization_id() {
            Some(own) => self.pallets.list_by_org_id(own).await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn get_by_id(&self, auther: &Auther, id: i64) -> Result<Pallet, AppError> {
        let pallet = self.pallets.get_by_id(id).await?;
        ensure_same_tenant(auther, pallet.organization_id, PALLET_NOT_FOUND)?;
        Ok(pallet)
    }

    pub async fn get_by_uid(&self, auther: &Auther, uid: Uuid) -> Result<Pallet, AppError> {
        let pallet = self.pallets.get_by_uid(uid).await?;
        ensure_same_tenant(auther, pallet.organization_id, PALLET_NOT_FOUND)?;
        Ok(pallet)
    }

    pub async fn get_by_code(&self, auther: &Auther, code: &str) -> Result<Pallet, AppError> {
        let pallet = self.pallets.get_by_code(code).await?;
        ensure_same_tenant(auther, pallet.organization_id, PALLET_NOT_FOUND)?;
        Ok(pallet)
    }

    pub async fn create(&self, auther: &Auther, request: PalletCreateRequest) -> Result<Pallet, AppError> {
        // 1. Organização dona (forçada para membros)
        let organization_id = owning_tenant(auther, request.organization_id)?;

        // 2. O contêiner, se informado, precisa ser da mesma organização
        if let Some(container_id) = request.container_id {
            self.verify_container(container_id, organization_id).await?;
        }

        // 3. Persiste (o código PLT00000 vem do repositório)
        self.pallets
            .insert(NewPallet {
                description: request.description,
                organization_id,
                container_id: request.container_id,
                created_by_id: auther.id,
            })
            .await
    }

    pub async fn update(&self, auther: &Auther, request: PalletUpdateRequest) -> Result<Pallet, AppError> {
        let mut pallet = self.get_by_id(auther, request.id).await?;

        if request.container_id != pallet.container_id {
            if let (Some(container_id), Some(organization_id)) =
                (request.container_id, pallet.organization_id)
            {
                self.verify_container(container_id, organization_id).await?;
            }
        }

        pallet.description = request.description;
        pallet.container_id = request.container_id;
        self.pallets.update(&pallet).await
    }

    pub async fn archive(&self, auther: &Auther, id: i64) -> Result<Pallet, AppError> {
        self.set_archived(auther, id, true).await
    }

    pub async fn unarchive(&self, auther: &Auther, id: i64) -> Result<Pallet, AppError> {
        self.set_archived(auther, id, false).await
    }

    pub async fn delete(&self, auther: &Auther, id: i64) -> Result<(), AppError> {
        require_admin(auther)?;
        self.pallets.delete(id).await
    }

    async fn verify_container(&self, container_id: i64, organization_id: i64) -> Result<(), AppError> {
        let container = self
            .containers
            .get_by_id(container_id)
            .await
            .map_err(|err| match err {
                AppError::NotFound(_) => AppError::not_found(CONTAINER_NOT_IN_TENANT),
                other => other,
            })?;
        if container.organization_id != Some(organization_id) {
            return Err(AppError::not_found(CONTAINER_NOT_IN_TENANT));
        }
        Ok(())
    }

    async fn set_archived(&self, auther: &Auther, id: i64, archived: bool) -> Result<Pallet, AppError> {
        let mut pallet = self.get_by_id(auther, id).await?;
        if pallet.is_archived == archived {
            let state = if archived { "already archived" } else { "not archived" };
            return Err(AppError::bad_request(format!("pallet is {}", state)));
        }
        pallet.is_archived = archived;
        self.pallets.update(&pallet).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;

    fn service(store: &Arc<MemoryStore>) -> PalletService {
        PalletService::new(store.clone(), store.clone())
    }

    #[tokio::test]
    async fn create_checks_the_container_tenant() {
        let store = MemoryStore::new();
        let own = store.add_container(10).await;
        let foreign = store.add_container(20).await;
        let member = Auther::member(5, 10, 1);

        let pallet = service(&store)
            .create(
                &member,
                PalletCreateRequest { description: None, organization_id: None, container_id: Some(own.id) },
            )
            .await
            .unwrap();
        assert_eq!(pallet.container_id, Some(own.id));
        assert_eq!(pallet.organization_id, Some(10));
        assert_eq!(pallet.code, format!("PLT{:05}", pallet.id));

        for container_id in [foreign.id, 999] {
            let result = service(&store)
                .create(
                    &member,
                    PalletCreateRequest { description: None, organization_id: None, container_id: Some(container_id) },
                )
                .await;
            assert!(matches!(result, Err(AppError::NotFound(ref m)) if m == CONTAINER_NOT_IN_TENANT));
        }
    }

    #[tokio::test]
    async fn pallets_of_a_foreign_container_are_hidden() {
        let store = MemoryStore::new();
        let foreign = store.add_container(20).await;
        store.add_pallet(20, Some(foreign.id)).await;
        let own = store.add_container(10).await;
        store.add_pallet(10, Some(own.id)).await;
        store.add_pallet(10, None).await;
        let member = Auther::member(5, 10, 1);

        let hidden = service(&store).list(&member, Some(foreign.id)).await;
        assert!(matches!(hidden, Err(AppError::NotFound(_))));

        assert_eq!(service(&store).list(&member, Some(own.id)).await.unwrap().len(), 1);
        assert_eq!(service(&store).list(&member, None).await.unwrap().len(), 2);
        assert_eq!(service(&store).list(&Auther::admin(1), None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn update_moves_pallet_between_own_containers_only() {
        let store = MemoryStore::new();
        let first = store.add_container(10).await;
        let second = store.add_container(10).await;
        let foreign = store.add_container(20).await;
        let pallet = store.add_pallet(10, Some(first.id)).await;
        let member = Auther::member(5, 10, 1);

        let moved = service(&store)
            .update(
                &member,
                PalletUpdateRequest { id: pallet.id, description: Some("moved".into()), container_id: Some(second.id) },
            )
            .await
            .unwrap();
        assert_eq!(moved.container_id, Some(second.id));

        let result = service(&store)
            .update(
                &member,
                PalletUpdateRequest { id: pallet.id, description: None, container_id: Some(foreign.id) },
            )
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_is_admin_only() {
        let store = MemoryStore::new();
        let pallet = store.add_pallet(10, None).await;

        let denied = service(&store).delete(&Auther::member(5, 10, 1), pallet.id).await;
        assert!(matches!(denied, Err(AppError::Unauthorized(_))));
        assert!(service(&store).delete(&Auther::admin(1), pallet.id).await.is_ok());
    }
}
