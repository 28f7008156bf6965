// src/services/user_service.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::{ProfileStore, UserStore},
    models::auth::{normalize_email, Auther, AutherKind, Profile, User, UserFilter, UserUpdate},
    services::guard::{require_admin, PERMISSION_NOT_GRANTED},
};

const USER_NOT_FOUND: &str = "user not found";

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
    profiles: Arc<dyn ProfileStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>, profiles: Arc<dyn ProfileStore>) -> Self {
        Self { users, profiles }
    }

    // Admin filtra por tipo ou organização; membro sempre recebe os membros
    // da própria organização.
    pub async fn list(
        &self,
        auther: &Auther,
        filter: UserFilter,
        organization_id: Option<i64>,
    ) -> Result<Vec<User>, AppError> {
        match auther.kind {
            AutherKind::Admin => match organization_id {
                Some(org) => self.users.list_by_org_id(org).await,
                None => self.users.list(filter).await,
            },
            AutherKind::Member { organization_id: own, .. } => self.users.list_by_org_id(own).await,
            AutherKind::Customer => Err(AppError::unauthorized(PERMISSION_NOT_GRANTED)),
        }
    }

    pub async fn get_by_id(&self, auther: &Auther, id: i64) -> Result<User, AppError> {
        let user = self.users.get_by_id(id).await?;
        visible(auther, user)
    }

    pub async fn get_by_email(&self, auther: &Auther, email: &str) -> Result<User, AppError> {
        let user = self.users.get_by_email(&normalize_email(email)).await?;
        visible(auther, user)
    }

    pub async fn get_by_phone(&self, auther: &Auther, phone: &str) -> Result<User, AppError> {
        let user = self.users.get_by_phone(phone).await?;
        visible(auther, user)
    }

    pub async fn me(&self, auther: &Auther) -> Result<User, AppError> {
        self.users.get_by_id(auther.id).await
    }

    pub async fn profile(&self, auther: &Auther) -> Result<Profile, AppError> {
        if !auther.is_customer() {
            return Err(AppError::unauthorized("only customers have a profile"));
        }
        self.profiles.get_by_user_id(auther.id).await
    }

    pub async fn update(&self, auther: &Auther, id: i64, update: UserUpdate) -> Result<User, AppError> {
        let mut user = self.get_by_id(auther, id).await?;

        // Campos vazios são ignorados; duplicidade vem da constraint
        if let Some(first_name) = non_blank(update.first_name) {
            user.first_name = first_name;
        }
        if let Some(last_name) = non_blank(update.last_name) {
            user.last_name = last_name;
        }
        if let Some(email) = non_blank(update.email) {
            user.email = normalize_email(&email);
        }
        if let Some(phone) = non_blank(update.phone) {
            user.phone = phone;
        }

        self.users.update(&user).await
    }

    pub async fn delete(&self, auther: &Auther, id: i64) -> Result<(), AppError> {
        require_admin(auther)?;
        self.users.delete(id).await
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

// Admin vê qualquer usuário; membro, os membros da própria organização;
// cliente, apenas a si mesmo.
fn visible(auther: &Auther, user: User) -> Result<User, AppError> {
    let allowed = match auther.kind {
        AutherKind::Admin => true,
        AutherKind::Member { organization_id, .. } => {
            user.is_member && user.organization_id == Some(organization_id)
        }
        AutherKind::Customer => user.id == auther.id,
    };
    if allowed {
        Ok(user)
    } else {
        Err(AppError::not_found(USER_NOT_FOUND))
    }
}
