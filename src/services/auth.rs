// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use crate::{
    common::error::AppError,
    db::{OrganizationStore, RoleStore, UserStore},
    models::{
        auth::{
            normalize_email, AuthResponse, Auther, AutherKind, Claims, LoginPayload, NewAccount,
            NewUser, Profile, RegisterMemberPayload, RegisterOrganizationPayload, RegisterPayload, User,
        },
        rbac::Role,
        tenancy::{NewOrganization, Organization},
    },
    services::guard::{owning_tenant, PERMISSION_NOT_GRANTED},
};

/// Tipo de usuário aceito por cada rota de login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginKind {
    Admin,
    Member,
    Customer,
}

impl LoginKind {
    fn accepts(self, user: &User) -> bool {
        match self {
            LoginKind::Admin => user.is_admin,
            LoginKind::Member => user.is_member,
            LoginKind::Customer => user.is_customer,
        }
    }
}

#[derive(Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub bcrypt_cost: u32,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    roles: Arc<dyn RoleStore>,
    organizations: Arc<dyn OrganizationStore>,
    settings: AuthSettings,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        roles: Arc<dyn RoleStore>,
        organizations: Arc<dyn OrganizationStore>,
        settings: AuthSettings,
    ) -> Self {
        Self { users, roles, organizations, settings }
    }

    pub async fn login(&self, kind: LoginKind, payload: LoginPayload) -> Result<AuthResponse, AppError> {
        // 1. Localiza por e-mail ou telefone
        let user = match (payload.email.as_deref(), payload.phone.as_deref()) {
            (Some(email), _) if !email.trim().is_empty() => {
                self.users.get_by_email(&normalize_email(email)).await?
            }
            (_, Some(phone)) if !phone.is_empty() => self.users.get_by_phone(phone).await?,
            _ => return Err(AppError::bad_request("email or phone is required")),
        };

        // 2. A rota precisa casar com o tipo do usuário
        if !kind.accepts(&user) {
            return Err(AppError::not_found("user not found"));
        }

        // 3. Confere a senha
        if !self.verify_password(&payload.password, &user.password_hash).await? {
            return Err(AppError::bad_request("wrong password"));
        }

        // 4. Emite o token
        let auther = user.auther()?;
        let token = self.create_token(&auther)?;
        tracing::info!(user_id = user.id, "login realizado");

        Ok(AuthResponse { auther: auther.flags(), token })
    }

    pub async fn register_admin(&self, payload: RegisterPayload) -> Result<User, AppError> {
        let account = self.account(payload.first_name, payload.last_name, payload.email, payload.phone, payload.password).await?;
        self.users.insert(NewUser { account, kind: AutherKind::Admin }).await
    }

    pub async fn register_customer(&self, payload: RegisterPayload) -> Result<(User, Profile), AppError> {
        let account = self.account(payload.first_name, payload.last_name, payload.email, payload.phone, payload.password).await?;
        self.users.insert_customer(account).await
    }

    // Membro novo: organização forçada para quem não é admin, e o cargo
    // precisa pertencer a ela.
    pub async fn register_member(
        &self,
        auther: &Auther,
        payload: RegisterMemberPayload,
    ) -> Result<User, AppError> {
        // 1. Resolve e confere a organização
        let organization_id = owning_tenant(auther, payload.organization_id)?;
        self.organizations.get_by_id(organization_id).await?;

        // 2. Confere o cargo
        let role = self.roles.get_by_id(payload.role_id).await?;
        if role.organization_id != organization_id {
            return Err(AppError::bad_request("role does not belong to the organization"));
        }

        // 3. Cargo de administrador só é atribuído por quem já administra
        if role.is_org_admin && !self.administers(auther).await? {
            return Err(AppError::unauthorized(PERMISSION_NOT_GRANTED));
        }

        // 4. Cria o usuário
        let account = self.account(payload.first_name, payload.last_name, payload.email, payload.phone, payload.password).await?;
        self.users
            .insert(NewUser {
                account,
                kind: AutherKind::Member { organization_id, role_id: role.id },
            })
            .await
    }

    pub async fn register_organization(
        &self,
        payload: RegisterOrganizationPayload,
    ) -> Result<(Organization, Role, User), AppError> {
        let account = self.account(payload.first_name, payload.last_name, payload.email, payload.phone, payload.password).await?;
        let organization = NewOrganization {
            name: payload.org_name.trim().to_string(),
            website: payload.website.filter(|w| !w.trim().is_empty()),
        };
        self.organizations.register(organization, account).await
    }

    // Troca exige a senha atual, conferida contra o hash gravado.
    pub async fn change_password(
        &self,
        auther: &Auther,
        old_password: &str,
        password: &str,
    ) -> Result<(), AppError> {
        let user = self.users.get_by_id(auther.id).await?;
        if !self.verify_password(old_password, &user.password_hash).await? {
            return Err(AppError::bad_request("wrong password"));
        }

        if password.len() < 6 {
            return Err(AppError::bad_request("password must have at least 6 characters"));
        }
        if old_password == password {
            return Err(AppError::bad_request("new password must be different from the current one"));
        }

        let hashed = self.hash_password(password).await?;
        self.users.update_password(user.id, &hashed).await
    }

    // Cria o primeiro admin da plataforma, se o e-mail ainda não existir.
    pub async fn seed_admin(&self, email: &str, phone: &str, password: &str) -> Result<Option<User>, AppError> {
        match self.users.get_by_email(&normalize_email(email)).await {
            Ok(_) => return Ok(None),
            Err(AppError::NotFound(_)) => {}
            Err(err) => return Err(err),
        }

        let user = self
            .register_admin(RegisterPayload {
                first_name: "Super".into(),
                last_name: "Admin".into(),
                email: email.to_string(),
                phone: phone.to_string(),
                password: password.to_string(),
            })
            .await?;
        Ok(Some(user))
    }

    pub fn create_token(&self, auther: &Auther) -> Result<String, AppError> {
        let now = Utc::now();
        let flags = auther.flags();
        let claims = Claims {
            sub: auther.id,
            is_admin: flags.is_admin,
            is_member: flags.is_member,
            is_customer: flags.is_customer,
            organization_id: flags.organization_id,
            role_id: flags.role_id,
            exp: (now + self.settings.token_ttl).timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.settings.jwt_secret.as_ref()),
        )?;
        Ok(token)
    }

    pub fn validate_token(&self, token: &str) -> Result<Auther, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.settings.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        Auther::try_from(token_data.claims)
    }

    // Admin da plataforma ou membro cujo cargo administra a organização.
    async fn administers(&self, auther: &Auther) -> Result<bool, AppError> {
        if auther.is_admin() {
            return Ok(true);
        }
        match auther.role_id() {
            Some(role_id) => Ok(self.roles.get_by_id(role_id).await?.is_org_admin),
            None => Ok(false),
        }
    }

    async fn account(
        &self,
        first_name: String,
        last_name: String,
        email: String,
        phone: String,
        password: String,
    ) -> Result<NewAccount, AppError> {
        let password_hash = self.hash_password(&password).await?;
        Ok(NewAccount {
            first_name: first_name.trim().to_string(),
            last_name: last_name.trim().to_string(),
            email: normalize_email(&email),
            phone: phone.trim().to_string(),
            password_hash,
        })
    }

    async fn hash_password(&self, password: &str) -> Result<String, AppError> {
        // Hashing em um thread separado
        let password = password.to_owned();
        let cost = self.settings.bcrypt_cost;
        let hashed = tokio::task::spawn_blocking(move || hash(&password, cost))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;
        Ok(hashed)
    }

    async fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool, AppError> {
        let password = password.to_owned();
        let password_hash = password_hash.to_owned();
        let valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;
        Ok(valid)
    }
}
