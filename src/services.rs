// src/services.rs

pub mod auth;
pub mod authorization;
pub mod container_service;
pub mod guard;
pub mod pallet_service;
pub mod rbac_service;
pub mod tenancy_service;
pub mod user_service;

use crate::db::Stores;

use self::{
    auth::{AuthService, AuthSettings},
    authorization::AuthorizationService,
    container_service::ContainerService,
    pallet_service::PalletService,
    rbac_service::RbacService,
    tenancy_service::TenantService,
    user_service::UserService,
};

/// Gráfico de dependências dos serviços, montado uma vez no boot.
#[derive(Clone)]
pub struct Services {
    pub auth: AuthService,
    pub authorization: AuthorizationService,
    pub organizations: TenantService,
    pub roles: RbacService,
    pub users: UserService,
    pub containers: ContainerService,
    pub pallets: PalletService,
}

impl Services {
    pub fn new(stores: &Stores, settings: AuthSettings) -> Self {
        Self {
            auth: AuthService::new(
                stores.users.clone(),
                stores.roles.clone(),
                stores.organizations.clone(),
                settings,
            ),
            authorization: AuthorizationService::new(stores.roles.clone()),
            organizations: TenantService::new(stores.organizations.clone()),
            roles: RbacService::new(stores.roles.clone(), stores.organizations.clone()),
            users: UserService::new(stores.users.clone(), stores.profiles.clone()),
            containers: ContainerService::new(stores.containers.clone()),
            pallets: PalletService::new(stores.pallets.clone(), stores.containers.clone()),
        }
    }
}
