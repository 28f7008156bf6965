use std::sync::Arc;

use sqlx::PgPool;

pub mod inventory_repo;
pub use inventory_repo::{ContainerStore, InventoryRepository, PalletStore};
pub mod rbac_repo;
pub use rbac_repo::{RbacRepository, RoleStore};
pub mod tenancy_repo;
pub use tenancy_repo::{OrganizationStore, TenantRepository};
pub mod user_repo;
pub use user_repo::{ProfileStore, UserRepository, UserStore};

#[cfg(test)]
pub mod memory;

/// Conjunto de repositórios compartilhado pelos serviços e pelos loaders.
#[derive(Clone)]
pub struct Stores {
    pub organizations: Arc<dyn OrganizationStore>,
    pub roles: Arc<dyn RoleStore>,
    pub users: Arc<dyn UserStore>,
    pub profiles: Arc<dyn ProfileStore>,
    pub containers: Arc<dyn ContainerStore>,
    pub pallets: Arc<dyn PalletStore>,
}

impl Stores {
    pub fn postgres(pool: PgPool) -> Self {
        let users = Arc::new(UserRepository::new(pool.clone()));
        let inventory = Arc::new(InventoryRepository::new(pool.clone()));
        Self {
            organizations: Arc::new(TenantRepository::new(pool.clone())),
            roles: Arc::new(RbacRepository::new(pool)),
            users: users.clone(),
            profiles: users,
            containers: inventory.clone(),
            pallets: inventory,
        }
    }
}
