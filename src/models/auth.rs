// src/models/auth.rs

use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::common::error::AppError;

/// Tipo do principal. Um usuário é exatamente um dos três.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutherKind {
    Admin,
    Member { organization_id: i64, role_id: i64 },
    Customer,
}

/// Principal autenticado de uma requisição. Reconstruído a partir do token,
/// nunca persistido.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Auther {
    pub id: i64,
    pub kind: AutherKind,
}

impl Auther {
    pub fn admin(id: i64) -> Self {
        Self { id, kind: AutherKind::Admin }
    }

    pub fn member(id: i64, organization_id: i64, role_id: i64) -> Self {
        Self { id, kind: AutherKind::Member { organization_id, role_id } }
    }

    pub fn customer(id: i64) -> Self {
        Self { id, kind: AutherKind::Customer }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.kind, AutherKind::Admin)
    }

    pub fn is_member(&self) -> bool {
        matches!(self.kind, AutherKind::Member { .. })
    }

    pub fn is_customer(&self) -> bool {
        matches!(self.kind, AutherKind::Customer)
    }

    pub fn organization_id(&self) -> Option<i64> {
        match self.kind {
            AutherKind::Member { organization_id, .. } => Some(organization_id),
            _ => None,
        }
    }

    pub fn role_id(&self) -> Option<i64> {
        match self.kind {
            AutherKind::Member { role_id, .. } => Some(role_id),
            _ => None,
        }
    }

    // Reconstrói o principal a partir das flags (token ou linha de users).
    // Flags ambíguas ou membro sem organização/cargo são rejeitados.
    pub fn from_flags(flags: &AutherFlags) -> Option<Self> {
        match (flags.is_admin, flags.is_member, flags.is_customer) {
            (true, false, false) => Some(Self::admin(flags.id)),
            (false, true, false) => Some(Self::member(
                flags.id,
                flags.organization_id?,
                flags.role_id?,
            )),
            (false, false, true) => Some(Self::customer(flags.id)),
            _ => None,
        }
    }

    pub fn flags(&self) -> AutherFlags {
        AutherFlags {
            id: self.id,
            is_admin: self.is_admin(),
            is_member: self.is_member(),
            is_customer: self.is_customer(),
            organization_id: self.organization_id(),
            role_id: self.role_id(),
        }
    }
}

// Forma serializável do principal (resposta de login).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AutherFlags {
    pub id: i64,
    pub is_admin: bool,
    pub is_member: bool,
    pub is_customer: bool,
    pub organization_id: Option<i64>,
    pub role_id: Option<i64>,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: i64, // Subject (ID do usuário)
    pub is_admin: bool,
    pub is_member: bool,
    pub is_customer: bool,
    pub organization_id: Option<i64>,
    pub role_id: Option<i64>,
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

impl TryFrom<Claims> for Auther {
    type Error = AppError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let flags = AutherFlags {
            id: claims.sub,
            is_admin: claims.is_admin,
            is_member: claims.is_member,
            is_customer: claims.is_customer,
            organization_id: claims.organization_id,
            role_id: claims.role_id,
        };
        Auther::from_flags(&flags).ok_or(AppError::InvalidToken)
    }
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, SimpleObject)]
#[graphql(complex)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub is_admin: bool,
    pub is_member: bool,
    pub is_customer: bool,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[graphql(skip)]
    pub password_hash: String,

    pub organization_id: Option<i64>,
    pub role_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn auther(&self) -> Result<Auther, AppError> {
        let flags = AutherFlags {
            id: self.id,
            is_admin: self.is_admin,
            is_member: self.is_member,
            is_customer: self.is_customer,
            organization_id: self.organization_id,
            role_id: self.role_id,
        };
        Auther::from_flags(&flags).ok_or_else(|| {
            AppError::InternalServerError(anyhow::anyhow!(
                "user {} has an inconsistent kind",
                self.id
            ))
        })
    }

    pub fn kind_label(&self) -> &'static str {
        if self.is_admin {
            "Super Admin"
        } else if self.is_member {
            "Member"
        } else {
            "Customer"
        }
    }
}

// Perfil de cliente, chaveado pelo id do usuário.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub user_id: i64,
    pub date_of_birth: Option<String>,
    pub referral_code: Option<String>,
    pub wallet_points: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Dados de conta comuns a qualquer tipo de usuário (senha já em hash).
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
}

// Dados para inserir um usuário. O tipo define as flags gravadas.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub account: NewAccount,
    pub kind: AutherKind,
}

#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Filtro por tipo de usuário. Nenhuma flag marcada lista todos.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub is_admin: bool,
    pub is_member: bool,
    pub is_customer: bool,
}

/// Forma canônica do e-mail, usada ao gravar e ao buscar.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    #[validate(email(message = "Email is invalid"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

// Dados para registro de um administrador ou cliente
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    #[validate(length(min = 1, message = "First Name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last Name is required"))]
    pub last_name: String,
    #[validate(email(message = "Email is invalid"))]
    pub email: String,
    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,
    #[validate(length(min = 6, message = "Password must have at least 6 characters"))]
    pub password: String,
}

// Registro de membro: o cargo precisa pertencer à organização
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterMemberPayload {
    #[validate(length(min = 1, message = "First Name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last Name is required"))]
    pub last_name: String,
    #[validate(email(message = "Email is invalid"))]
    pub email: String,
    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,
    #[validate(length(min = 6, message = "Password must have at least 6 characters"))]
    pub password: String,
    pub organization_id: Option<i64>,
    #[validate(range(min = 1, message = "Role is required"))]
    pub role_id: i64,
}

// Registro de organização + primeiro membro (administrador da organização)
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterOrganizationPayload {
    #[validate(length(min = 1, message = "Organization Name is required"))]
    pub org_name: String,
    pub website: Option<String>,
    #[validate(length(min = 1, message = "First Name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last Name is required"))]
    pub last_name: String,
    #[validate(email(message = "Email is invalid"))]
    pub email: String,
    #[validate(length(min = 1, message = "Phone is required"))]
    pub phone: String,
    #[validate(length(min = 6, message = "Password must have at least 6 characters"))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub auther: AutherFlags,
    pub token: String,
}
