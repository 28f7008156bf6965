// src/loaders.rs
//
// Loaders por entidade. Um conjunto novo é criado a cada requisição.

use std::sync::Arc;

use async_trait::async_trait;

pub mod batch;
pub use batch::{BatchFetch, Loader, LoaderConfig};

use crate::{
    common::error::AppError,
    db::{ContainerStore, OrganizationStore, PalletStore, ProfileStore, RoleStore, Stores, UserStore},
    models::{
        auth::{Profile, User},
        inventory::{Container, Pallet},
        rbac::Role,
        tenancy::Organization,
    },
};

pub struct UserFetch(Arc<dyn UserStore>);

#[async_trait]
impl BatchFetch for UserFetch {
    type Value = User;

    const ENTITY: &'static str = "users";

    async fn fetch(&self, keys: &[i64]) -> Result<Vec<User>, AppError> {
        self.0.get_many(keys).await
    }

    fn key(value: &User) -> i64 {
        value.id
    }
}

// Perfis são chaveados pelo id do usuário, não pelo próprio id.
pub struct ProfileFetch(Arc<dyn ProfileStore>);

#[async_trait]
impl BatchFetch for ProfileFetch {
    type Value = Profile;

    const ENTITY: &'static str = "profiles";

    async fn fetch(&self, keys: &[i64]) -> Result<Vec<Profile>, AppError> {
        self.0.get_many(keys).await
    }

    fn key(value: &Profile) -> i64 {
        value.user_id
    }
}

pub struct OrganizationFetch(Arc<dyn OrganizationStore>);

#[async_trait]
impl BatchFetch for OrganizationFetch {
    type Value = Organization;

    const ENTITY: &'static str = "organizations";

    async fn fetch(&self, keys: &[i64]) -> Result<Vec<Organization>, AppError> {
        self.0.get_many(keys).await
    }

    fn key(value: &Organization) -> i64 {
        value.id
    }
}

pub struct RoleFetch(Arc<dyn RoleStore>);

#[async_trait]
impl BatchFetch for RoleFetch {
    type Value = Role;

    const ENTITY: &'static str = "roles";

    async fn fetch(&self, keys: &[i64]) -> Result<Vec<Role>, AppError> {
        self.0.get_many(keys).await
    }

    fn key(value: &Role) -> i64 {
        value.id
    }
}

pub struct ContainerFetch(Arc<dyn ContainerStore>);

#[async_trait]
impl BatchFetch for ContainerFetch {
    type Value = Container;

    const ENTITY: &'static str = "containers";

    async fn fetch(&self, keys: &[i64]) -> Result<Vec<Container>, AppError> {
        self.0.get_many(keys).await
    }

    fn key(value: &Container) -> i64 {
        value.id
    }
}

/// Paletes de um contêiner, agrupados pela chave do contêiner.
#[derive(Debug, Clone)]
pub struct ContainerPallets {
    pub container_id: i64,
    pub pallets: Vec<Pallet>,
}

pub struct ContainerPalletsFetch(Arc<dyn PalletStore>);

#[async_trait]
impl BatchFetch for ContainerPalletsFetch {
    type Value = ContainerPallets;

    const ENTITY: &'static str = "container_pallets";

    // Uma entrada por chave, mesmo vazia.
    async fn fetch(&self, keys: &[i64]) -> Result<Vec<ContainerPallets>, AppError> {
        let pallets = self.0.list_by_container_ids(keys).await?;
        Ok(keys
            .iter()
            .map(|&container_id| ContainerPallets {
                container_id,
                pallets: pallets
                    .iter()
                    .filter(|p| p.container_id == Some(container_id))
                    .cloned()
                    .collect(),
            })
            .collect())
    }

    fn key(value: &ContainerPallets) -> i64 {
        value.container_id
    }
}

pub type UserLoader = Loader<UserFetch>;
pub type ProfileLoader = Loader<ProfileFetch>;
pub type OrganizationLoader = Loader<OrganizationFetch>;
pub type RoleLoader = Loader<RoleFetch>;
pub type ContainerLoader = Loader<ContainerFetch>;
pub type ContainerPalletsLoader = Loader<ContainerPalletsFetch>;

#[derive(Clone)]
pub struct Loaders {
    pub users: UserLoader,
    pub profiles: ProfileLoader,
    pub organizations: OrganizationLoader,
    pub roles: RoleLoader,
    pub containers: ContainerLoader,
    pub container_pallets: ContainerPalletsLoader,
}

impl Loaders {
    pub fn new(stores: &Stores, config: LoaderConfig) -> Self {
        Self {
            users: Loader::new(UserFetch(stores.users.clone()), config),
            profiles: Loader::new(ProfileFetch(stores.profiles.clone()), config),
            organizations: Loader::new(OrganizationFetch(stores.organizations.clone()), config),
            roles: Loader::new(RoleFetch(stores.roles.clone()), config),
            containers: Loader::new(ContainerFetch(stores.containers.clone()), config),
            container_pallets: Loader::new(ContainerPalletsFetch(stores.pallets.clone()), config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::models::auth::AutherKind;

    #[tokio::test]
    async fn organizations_are_batched_per_request() {
        let store = MemoryStore::new();
        let a = store.add_organization("Acme").await;
        let b = store.add_organization("Globex").await;
        let loaders = Loaders::new(&store.stores(), LoaderConfig::default());

        let (x, y, z) = tokio::join!(
            loaders.organizations.load(a.id),
            loaders.organizations.load(b.id),
            loaders.organizations.load(a.id),
        );

        assert_eq!(x.unwrap().map(|o| o.name), Some("Acme".to_string()));
        assert_eq!(y.unwrap().map(|o| o.name), Some("Globex".to_string()));
        assert_eq!(z.unwrap().map(|o| o.name), Some("Acme".to_string()));
        assert_eq!(store.batches("organizations").await, vec![vec![a.id, b.id]]);
    }

    #[tokio::test]
    async fn profiles_are_indexed_by_user_id() {
        let store = MemoryStore::new();
        let (customer, profile) = store
            .insert_customer(crate::models::auth::NewAccount {
                first_name: "Rui".into(),
                last_name: "Costa".into(),
                email: "rui@example.com".into(),
                phone: "+5511999990000".into(),
                password_hash: String::new(),
            })
            .await
            .unwrap();
        let admin = store.add_user(AutherKind::Admin).await;
        let loaders = Loaders::new(&store.stores(), LoaderConfig::default());

        let (found, missing) = tokio::join!(loaders.profiles.load(customer.id), loaders.profiles.load(admin.id));

        assert_eq!(found.unwrap().map(|p| p.referral_code), Some(profile.referral_code));
        assert!(missing.unwrap().is_none());
        assert_eq!(store.batches("profiles").await, vec![vec![customer.id, admin.id]]);
    }

    #[tokio::test]
    async fn each_request_gets_a_fresh_cache() {
        let store = MemoryStore::new();
        let container = store.add_container(1).await;

        let first = Loaders::new(&store.stores(), LoaderConfig::default());
        first.containers.load(container.id).await.unwrap();
        first.containers.load(container.id).await.unwrap();

        let second = Loaders::new(&store.stores(), LoaderConfig::default());
        second.containers.load(container.id).await.unwrap();

        assert_eq!(store.batches("containers").await.len(), 2);
    }

    #[tokio::test]
    async fn store_failure_reaches_every_key_and_is_retried() {
        let store = MemoryStore::new();
        let first = store.add_user(AutherKind::Admin).await;
        let second = store.add_user(AutherKind::Customer).await;
        let loaders = Loaders::new(&store.stores(), LoaderConfig::default());

        store.fail_batches(true);
        let (a, b) = tokio::join!(loaders.users.load(first.id), loaders.users.load(second.id));
        let (a, b) = (a.unwrap_err(), b.unwrap_err());
        assert!(std::sync::Arc::ptr_eq(&a, &b));
        assert_eq!(a.code(), "internal_server_error");

        store.fail_batches(false);
        assert_eq!(loaders.users.load(first.id).await.unwrap().map(|u| u.id), Some(first.id));
        assert_eq!(store.batches("users").await.len(), 2);
    }

    #[tokio::test]
    async fn pallets_are_grouped_by_container() {
        let store = MemoryStore::new();
        let full = store.add_container(1).await;
        let empty = store.add_container(1).await;
        store.add_pallet(1, Some(full.id)).await;
        store.add_pallet(1, Some(full.id)).await;
        store.add_pallet(1, None).await;
        let loaders = Loaders::new(&store.stores(), LoaderConfig::default());

        let (a, b) = tokio::join!(
            loaders.container_pallets.load(full.id),
            loaders.container_pallets.load(empty.id),
        );

        assert_eq!(a.unwrap().map(|g| g.pallets.len()), Some(2));
        assert_eq!(b.unwrap().map(|g| g.pallets.len()), Some(0));
        assert_eq!(store.batches("container_pallets").await, vec![vec![full.id, empty.id]]);
    }
}
