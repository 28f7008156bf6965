// src/db/memory.rs
//
// Repositórios em memória para os testes. Registram cada get_many para as
// asserções de agrupamento dos loaders.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{
            sequence_code, CONTAINER_CODE_PREFIX, ORGANIZATION_CODE_PREFIX, PALLET_CODE_PREFIX,
            ROLE_CODE_PREFIX,
        },
        error::AppError,
    },
    db::{
        tenancy_repo::ORG_ADMIN_ROLE_NAME, user_repo::referral_code, ContainerStore,
        OrganizationStore, PalletStore, ProfileStore, RoleStore, Stores, UserStore,
    },
    models::{
        auth::{Auther, AutherKind, NewAccount, NewUser, Profile, User, UserFilter},
        inventory::{Container, NewContainer, NewPallet, Pallet},
        rbac::{NewRole, Permission, Role},
        tenancy::{NewOrganization, Organization},
    },
};

#[derive(Default)]
struct Tables {
    organizations: Vec<Organization>,
    roles: Vec<Role>,
    users: Vec<User>,
    profiles: Vec<Profile>,
    containers: Vec<Container>,
    pallets: Vec<Pallet>,
    sequences: HashMap<&'static str, i64>,
}

impl Tables {
    fn next_id(&mut self, table: &'static str) -> i64 {
        let id = self.sequences.entry(table).or_insert(0);
        *id += 1;
        *id
    }

    fn ensure_unique_account(&self, email: &str, phone: &str) -> Result<(), AppError> {
        if self.users.iter().any(|u| u.email == email) {
            return Err(AppError::EmailAlreadyExists);
        }
        if self.users.iter().any(|u| u.phone == phone) {
            return Err(AppError::PhoneAlreadyExists);
        }
        Ok(())
    }

    fn insert_user(&mut self, account: &NewAccount, kind: AutherKind) -> Result<User, AppError> {
        self.ensure_unique_account(&account.email, &account.phone)?;
        let id = self.next_id("users");
        let (organization_id, role_id) = match kind {
            AutherKind::Member { organization_id, role_id } => (Some(organization_id), Some(role_id)),
            _ => (None, None),
        };
        let user = User {
            id,
            first_name: account.first_name.clone(),
            last_name: account.last_name.clone(),
            email: account.email.clone(),
            phone: account.phone.clone(),
            is_admin: matches!(kind, AutherKind::Admin),
            is_member: matches!(kind, AutherKind::Member { .. }),
            is_customer: matches!(kind, AutherKind::Customer),
            password_hash: account.password_hash.clone(),
            organization_id,
            role_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.users.push(user.clone());
        Ok(user)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    batches: Mutex<Vec<(&'static str, Vec<i64>)>>,
    fail_batches: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn stores(self: &Arc<Self>) -> Stores {
        Stores {
            organizations: self.clone(),
            roles: self.clone(),
            users: self.clone(),
            profiles: self.clone(),
            containers: self.clone(),
            pallets: self.clone(),
        }
    }

    /// Chaves de cada get_many emitido para a entidade, em ordem.
    pub async fn batches(&self, entity: &str) -> Vec<Vec<i64>> {
        self.batches
            .lock()
            .await
            .iter()
            .filter(|(name, _)| *name == entity)
            .map(|(_, keys)| keys.clone())
            .collect()
    }

    pub fn fail_batches(&self, fail: bool) {
        self.fail_batches.store(fail, Ordering::SeqCst);
    }

    async fn record_batch(&self, entity: &'static str, ids: &[i64]) -> Result<(), AppError> {
        self.batches.lock().await.push((entity, ids.to_vec()));
        if self.fail_batches.load(Ordering::SeqCst) {
            return Err(AppError::InternalServerError(anyhow::anyhow!(
                "{} batch failed",
                entity
            )));
        }
        Ok(())
    }

    // --- Atalhos para montar cenários ---

    pub async fn add_organization(&self, name: &str) -> Organization {
        let mut t = self.tables.lock().await;
        let id = t.next_id("organizations");
        let org = Organization {
            id,
            code: sequence_code(ORGANIZATION_CODE_PREFIX, id),
            name: name.to_string(),
            website: None,
            is_archived: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        t.organizations.push(org.clone());
        org
    }

    pub async fn add_role(
        &self,
        organization_id: i64,
        permissions: &[Permission],
        is_org_admin: bool,
    ) -> Role {
        RoleStore::insert(
            self,
            NewRole {
                name: "Role".into(),
                permissions: permissions.iter().map(|p| p.as_str().to_string()).collect(),
                is_org_admin,
                organization_id,
            },
        )
        .await
        .unwrap()
    }

    pub async fn add_user(&self, kind: AutherKind) -> User {
        let mut t = self.tables.lock().await;
        let n = t.sequences.get("users").copied().unwrap_or(0) + 1;
        let account = NewAccount {
            first_name: format!("User{}", n),
            last_name: "Test".into(),
            email: format!("user{}@example.com", n),
            phone: format!("+55110000{:04}", n),
            password_hash: String::new(),
        };
        t.insert_user(&account, kind).unwrap()
    }

    pub async fn add_member(&self, organization_id: i64, role_id: i64) -> (User, Auther) {
        let user = self.add_user(AutherKind::Member { organization_id, role_id }).await;
        let auther = user.auther().unwrap();
        (user, auther)
    }

    pub async fn add_container(&self, organization_id: i64) -> Container {
        ContainerStore::insert(
            self,
            NewContainer { description: None, organization_id, created_by_id: 1 },
        )
        .await
        .unwrap()
    }

    pub async fn add_pallet(&self, organization_id: i64, container_id: Option<i64>) -> Pallet {
        PalletStore::insert(
            self,
            NewPallet { description: None, organization_id, container_id, created_by_id: 1 },
        )
        .await
        .unwrap()
    }
}

fn not_found(message: &str) -> AppError {
    AppError::not_found(message)
}

// Mesma regra do WHERE em user_repo: nenhuma flag marcada lista todos.
fn matches_filter(filter: UserFilter, user: &User) -> bool {
    if !filter.is_admin && !filter.is_member && !filter.is_customer {
        return true;
    }
    (filter.is_admin && user.is_admin)
        || (filter.is_member && user.is_member)
        || (filter.is_customer && user.is_customer)
}

#[async_trait]
impl OrganizationStore for MemoryStore {
    async fn get_by_id(&self, id: i64) -> Result<Organization, AppError> {
        let t = self.tables.lock().await;
        t.organizations.iter().find(|o| o.id == id).cloned().ok_or_else(|| not_found("no organization found"))
    }

    async fn get_by_code(&self, code: &str) -> Result<Organization, AppError> {
        let t = self.tables.lock().await;
        t.organizations.iter().find(|o| o.code == code).cloned().ok_or_else(|| not_found("no organization found"))
    }

    async fn get_many(&self, ids: &[i64]) -> Result<Vec<Organization>, AppError> {
        self.record_batch("organizations", ids).await?;
        let t = self.tables.lock().await;
        Ok(t.organizations.iter().filter(|o| ids.contains(&o.id)).cloned().collect())
    }

    async fn list(&self) -> Result<Vec<Organization>, AppError> {
        Ok(self.tables.lock().await.organizations.clone())
    }

    async fn update(&self, organization: &Organization) -> Result<Organization, AppError> {
        let mut t = self.tables.lock().await;
        let row = t.organizations.iter_mut().find(|o| o.id == organization.id).ok_or_else(|| not_found("no organization found"))?;
        *row = organization.clone();
        Ok(row.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut t = self.tables.lock().await;
        let before = t.organizations.len();
        t.organizations.retain(|o| o.id != id);
        if t.organizations.len() == before {
            return Err(not_found("no organization found"));
        }
        Ok(())
    }

    async fn register(
        &self,
        organization: NewOrganization,
        owner: NewAccount,
    ) -> Result<(Organization, Role, User), AppError> {
        let mut t = self.tables.lock().await;
        // Valida antes de gravar qualquer linha: tudo ou nada
        t.ensure_unique_account(&owner.email, &owner.phone)?;

        let org_id = t.next_id("organizations");
        let org = Organization {
            id: org_id,
            code: sequence_code(ORGANIZATION_CODE_PREFIX, org_id),
            name: organization.name,
            website: organization.website,
            is_archived: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        t.organizations.push(org.clone());

        let role_id = t.next_id("roles");
        let role = Role {
            id: role_id,
            code: sequence_code(ROLE_CODE_PREFIX, role_id),
            name: ORG_ADMIN_ROLE_NAME.into(),
            permissions: vec![],
            is_org_admin: true,
            is_archived: false,
            organization_id: org.id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        t.roles.push(role.clone());

        let user = t.insert_user(
            &owner,
            AutherKind::Member { organization_id: org.id, role_id: role.id },
        )?;
        Ok((org, role, user))
    }
}

#[async_trait]
impl RoleStore for MemoryStore {
    async fn get_by_id(&self, id: i64) -> Result<Role, AppError> {
        let t = self.tables.lock().await;
        t.roles.iter().find(|r| r.id == id).cloned().ok_or_else(|| not_found("no role found"))
    }

    async fn get_by_code(&self, code: &str) -> Result<Role, AppError> {
        let t = self.tables.lock().await;
        t.roles.iter().find(|r| r.code == code).cloned().ok_or_else(|| not_found("no role found"))
    }

    async fn get_many(&self, ids: &[i64]) -> Result<Vec<Role>, AppError> {
        self.record_batch("roles", ids).await?;
        let t = self.tables.lock().await;
        Ok(t.roles.iter().filter(|r| ids.contains(&r.id)).cloned().collect())
    }

    async fn list_all(&self) -> Result<Vec<Role>, AppError> {
        Ok(self.tables.lock().await.roles.clone())
    }

    async fn list_by_org_id(&self, organization_id: i64) -> Result<Vec<Role>, AppError> {
        let t = self.tables.lock().await;
        Ok(t.roles.iter().filter(|r| r.organization_id == organization_id).cloned().collect())
    }

    async fn insert(&self, role: NewRole) -> Result<Role, AppError> {
        let mut t = self.tables.lock().await;
        let id = t.next_id("roles");
        let created = Role {
            id,
            code: sequence_code(ROLE_CODE_PREFIX, id),
            name: role.name,
            permissions: role.permissions,
            is_org_admin: role.is_org_admin,
            is_archived: false,
            organization_id: role.organization_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        t.roles.push(created.clone());
        Ok(created)
    }

    async fn update(&self, role: &Role) -> Result<Role, AppError> {
        let mut t = self.tables.lock().await;
        let row = t.roles.iter_mut().find(|r| r.id == role.id).ok_or_else(|| not_found("no role found"))?;
        row.name = role.name.clone();
        row.permissions = role.permissions.clone();
        row.is_archived = role.is_archived;
        Ok(row.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut t = self.tables.lock().await;
        let before = t.roles.len();
        t.roles.retain(|r| r.id != id);
        if t.roles.len() == before {
            return Err(not_found("no role found"));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn get_by_id(&self, id: i64) -> Result<User, AppError> {
        let t = self.tables.lock().await;
        t.users.iter().find(|u| u.id == id).cloned().ok_or_else(|| not_found("user not found"))
    }

    async fn get_by_email(&self, email: &str) -> Result<User, AppError> {
        let t = self.tables.lock().await;
        t.users.iter().find(|u| u.email == email).cloned().ok_or_else(|| not_found("user not found"))
    }

    async fn get_by_phone(&self, phone: &str) -> Result<User, AppError> {
        let t = self.tables.lock().await;
        t.users.iter().find(|u| u.phone == phone).cloned().ok_or_else(|| not_found("user not found"))
    }

    async fn get_many(&self, ids: &[i64]) -> Result<Vec<User>, AppError> {
        self.record_batch("users", ids).await?;
        let t = self.tables.lock().await;
        Ok(t.users.iter().filter(|u| ids.contains(&u.id)).cloned().collect())
    }

    async fn list(&self, filter: UserFilter) -> Result<Vec<User>, AppError> {
        let t = self.tables.lock().await;
        Ok(t.users.iter().filter(|u| matches_filter(filter, u)).cloned().collect())
    }

    async fn list_by_org_id(&self, organization_id: i64) -> Result<Vec<User>, AppError> {
        let t = self.tables.lock().await;
        Ok(t
            .users
            .iter()
            .filter(|u| u.is_member && u.organization_id == Some(organization_id))
            .cloned()
            .collect())
    }

    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        self.tables.lock().await.insert_user(&user.account, user.kind)
    }

    async fn insert_customer(&self, account: NewAccount) -> Result<(User, Profile), AppError> {
        let mut t = self.tables.lock().await;
        let user = t.insert_user(&account, AutherKind::Customer)?;
        let profile = Profile {
            user_id: user.id,
            date_of_birth: None,
            referral_code: Some(referral_code()),
            wallet_points: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        t.profiles.push(profile.clone());
        Ok((user, profile))
    }

    async fn update(&self, user: &User) -> Result<User, AppError> {
        let mut t = self.tables.lock().await;
        if t.users.iter().any(|u| u.id != user.id && u.email == user.email) {
            return Err(AppError::EmailAlreadyExists);
        }
        if t.users.iter().any(|u| u.id != user.id && u.phone == user.phone) {
            return Err(AppError::PhoneAlreadyExists);
        }
        let row = t.users.iter_mut().find(|u| u.id == user.id).ok_or_else(|| not_found("user not found"))?;
        row.first_name = user.first_name.clone();
        row.last_name = user.last_name.clone();
        row.email = user.email.clone();
        row.phone = user.phone.clone();
        Ok(row.clone())
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<(), AppError> {
        let mut t = self.tables.lock().await;
        let row = t.users.iter_mut().find(|u| u.id == id).ok_or_else(|| not_found("user not found"))?;
        row.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut t = self.tables.lock().await;
        let before = t.users.len();
        t.users.retain(|u| u.id != id);
        if t.users.len() == before {
            return Err(not_found("user not found"));
        }
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get_by_user_id(&self, user_id: i64) -> Result<Profile, AppError> {
        let t = self.tables.lock().await;
        t.profiles.iter().find(|p| p.user_id == user_id).cloned().ok_or_else(|| not_found("no profile found"))
    }

    async fn get_many(&self, user_ids: &[i64]) -> Result<Vec<Profile>, AppError> {
        self.record_batch("profiles", user_ids).await?;
        let t = self.tables.lock().await;
        Ok(t.profiles.iter().filter(|p| user_ids.contains(&p.user_id)).cloned().collect())
    }
}

#[async_trait]
impl ContainerStore for MemoryStore {
    async fn get_by_id(&self, id: i64) -> Result<Container, AppError> {
        let t = self.tables.lock().await;
        t.containers.iter().find(|c| c.id == id).cloned().ok_or_else(|| not_found("no container found"))
    }

    async fn get_by_uid(&self, uid: Uuid) -> Result<Container, AppError> {
        let t = self.tables.lock().await;
        t.containers.iter().find(|c| c.uid == uid).cloned().ok_or_else(|| not_found("no container found"))
    }

    async fn get_by_code(&self, code: &str) -> Result<Container, AppError> {
        let t = self.tables.lock().await;
        t.containers.iter().find(|c| c.code == code).cloned().ok_or_else(|| not_found("no container found"))
    }

    async fn get_many(&self, ids: &[i64]) -> Result<Vec<Container>, AppError> {
        self.record_batch("containers", ids).await?;
        let t = self.tables.lock().await;
        Ok(t.containers.iter().filter(|c| ids.contains(&c.id)).cloned().collect())
    }

    async fn list(&self) -> Result<Vec<Container>, AppError> {
        Ok(self.tables.lock().await.containers.clone())
    }

    async fn list_by_org_id(&self, organization_id: i64) -> Result<Vec<Container>, AppError> {
        let t = self.tables.lock().await;
        Ok(t.containers.iter().filter(|c| c.organization_id == Some(organization_id)).cloned().collect())
    }

    async fn insert(&self, container: NewContainer) -> Result<Container, AppError> {
        let mut t = self.tables.lock().await;
        let id = t.next_id("containers");
        let created = Container {
            id,
            uid: Uuid::new_v4(),
            code: sequence_code(CONTAINER_CODE_PREFIX, id),
            description: container.description,
            is_archived: false,
            organization_id: Some(container.organization_id),
            created_by_id: container.created_by_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        t.containers.push(created.clone());
        Ok(created)
    }

    async fn update(&self, container: &Container) -> Result<Container, AppError> {
        let mut t = self.tables.lock().await;
        let row = t.containers.iter_mut().find(|c| c.id == container.id).ok_or_else(|| not_found("no container found"))?;
        row.description = container.description.clone();
        row.is_archived = container.is_archived;
        Ok(row.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut t = self.tables.lock().await;
        let before = t.containers.len();
        t.containers.retain(|c| c.id != id);
        if t.containers.len() == before {
            return Err(not_found("no container found"));
        }
        Ok(())
    }
}

#[async_trait]
impl PalletStore for MemoryStore {
    async fn get_by_id(&self, id: i64) -> Result<Pallet, AppError> {
        let t = self.tables.lock().await;
        t.pallets.iter().find(|p| p.id == id).cloned().ok_or_else(|| not_found("no pallet found"))
    }

    async fn get_by_uid(&self, uid: Uuid) -> Result<Pallet, AppError> {
        let t = self.tables.lock().await;
        t.pallets.iter().find(|p| p.uid == uid).cloned().ok_or_else(|| not_found("no pallet found"))
    }

    async fn get_by_code(&self, code: &str) -> Result<Pallet, AppError> {
        let t = self.tables.lock().await;
        t.pallets.iter().find(|p| p.code == code).cloned().ok_or_else(|| not_found("no pallet found"))
    }

    async fn list(&self) -> Result<Vec<Pallet>, AppError> {
        Ok(self.tables.lock().await.pallets.clone())
    }

    async fn list_by_org_id(&self, organization_id: i64) -> Result<Vec<Pallet>, AppError> {
        let t = self.tables.lock().await;
        Ok(t.pallets.iter().filter(|p| p.organization_id == Some(organization_id)).cloned().collect())
    }

    async fn list_by_container_id(&self, container_id: i64) -> Result<Vec<Pallet>, AppError> {
        let t = self.tables.lock().await;
        Ok(t.pallets.iter().filter(|p| p.container_id == Some(container_id)).cloned().collect())
    }

    async fn list_by_container_ids(&self, container_ids: &[i64]) -> Result<Vec<Pallet>, AppError> {
        self.record_batch("container_pallets", container_ids).await?;
        let t = self.tables.lock().await;
        Ok(t.pallets
            .iter()
            .filter(|p| p.container_id.is_some_and(|c| container_ids.contains(&c)))
            .cloned()
            .collect())
    }

    async fn insert(&self, pallet: NewPallet) -> Result<Pallet, AppError> {
        let mut t = self.tables.lock().await;
        let id = t.next_id("pallets");
        let created = Pallet {
            id,
            uid: Uuid::new_v4(),
            code: sequence_code(PALLET_CODE_PREFIX, id),
            description: pallet.description,
            is_archived: false,
            organization_id: Some(pallet.organization_id),
            container_id: pallet.container_id,
            created_by_id: pallet.created_by_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        t.pallets.push(created.clone());
        Ok(created)
    }

    async fn update(&self, pallet: &Pallet) -> Result<Pallet, AppError> {
        let mut t = self.tables.lock().await;
        let row = t.pallets.iter_mut().find(|p| p.id == pallet.id).ok_or_else(|| not_found("no pallet found"))?;
        row.description = pallet.description.clone();
        row.container_id = pallet.container_id;
        row.is_archived = pallet.is_archived;
        Ok(row.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut t = self.tables.lock().await;
        let before = t.pallets.len();
        t.pallets.retain(|p| p.id != id);
        if t.pallets.len() == before {
            return Err(not_found("no pallet found"));
        }
        Ok(())
    }
}
