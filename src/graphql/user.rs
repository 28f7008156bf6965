// src/graphql/user.rs

use async_graphql::{ComplexObject, Context, InputObject, Object, Result, SimpleObject};

use crate::{
    common::error::AppError,
    graphql::{authenticated, authorize, loaders, services, GqlResult},
    models::{
        auth::{Profile, User, UserFilter, UserUpdate},
        rbac::{Permission, Role},
        tenancy::Organization,
    },
};

#[ComplexObject]
impl User {
    /// "Super Admin", "Member" ou "Customer".
    async fn user_type(&self) -> String {
        self.kind_label().to_string()
    }

    async fn organization(&self, ctx: &Context<'_>) -> Result<Option<Organization>> {
        match self.organization_id {
            Some(id) => loaders(ctx)?.organizations.load(id).await.gql(),
            None => Ok(None),
        }
    }

    async fn role(&self, ctx: &Context<'_>) -> Result<Option<Role>> {
        match self.role_id {
            Some(id) => loaders(ctx)?.roles.load(id).await.gql(),
            None => Ok(None),
        }
    }

    // Só clientes têm perfil
    async fn profile(&self, ctx: &Context<'_>) -> Result<Option<Profile>> {
        if !self.is_customer {
            return Ok(None);
        }
        loaders(ctx)?.profiles.load(self.id).await.gql()
    }
}

#[derive(SimpleObject)]
pub struct UserResult {
    pub users: Vec<User>,
    pub total: i64,
}

#[derive(InputObject)]
pub struct UserUpdateInput {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Default)]
pub struct UserQuery;

#[Object]
impl UserQuery {
    async fn users(
        &self,
        ctx: &Context<'_>,
        is_admin: Option<bool>,
        is_member: Option<bool>,
        is_customer: Option<bool>,
        organization_id: Option<i64>,
    ) -> Result<UserResult> {
        let auther = authorize(ctx, Permission::ReadUser, true, false).await?;
        let filter = UserFilter {
            is_admin: is_admin.unwrap_or(false),
            is_member: is_member.unwrap_or(false),
            is_customer: is_customer.unwrap_or(false),
        };
        let users = services(ctx)?.users.list(auther, filter, organization_id).await.gql()?;
        Ok(UserResult { total: users.len() as i64, users })
    }

    /// Busca por id, e-mail ou telefone, nesta ordem.
    async fn user(
        &self,
        ctx: &Context<'_>,
        id: Option<i64>,
        email: Option<String>,
        phone: Option<String>,
    ) -> Result<User> {
        let auther = authorize(ctx, Permission::ReadUser, true, true).await?;
        let service = &services(ctx)?.users;
        match (id, email, phone) {
            (Some(id), _, _) => service.get_by_id(auther, id).await.gql(),
            (None, Some(email), _) => service.get_by_email(auther, &email).await.gql(),
            (None, None, Some(phone)) => service.get_by_phone(auther, &phone).await.gql(),
            (None, None, None) => Err(AppError::bad_request("id, email or phone is required")).gql(),
        }
    }

    async fn me(&self, ctx: &Context<'_>) -> Result<User> {
        let auther = authenticated(ctx)?;
        services(ctx)?.users.me(auther).await.gql()
    }

    async fn profile(&self, ctx: &Context<'_>) -> Result<Profile> {
        let auther = authenticated(ctx)?;
        services(ctx)?.users.profile(auther).await.gql()
    }
}

#[derive(Default)]
pub struct UserMutation;

#[Object]
impl UserMutation {
    async fn user_update(&self, ctx: &Context<'_>, input: UserUpdateInput) -> Result<User> {
        let auther = authorize(ctx, Permission::UpdateUser, true, false).await?;
        let update = UserUpdate {
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            phone: input.phone,
        };
        services(ctx)?.users.update(auther, input.id, update).await.gql()
    }

    async fn user_delete(&self, ctx: &Context<'_>, id: i64) -> Result<bool> {
        let auther = authorize(ctx, Permission::DeleteUser, true, false).await?;
        services(ctx)?.users.delete(auther, id).await.gql()?;
        Ok(true)
    }

    async fn change_password(
        &self,
        ctx: &Context<'_>,
        old_password: String,
        password: String,
    ) -> Result<bool> {
        let auther = authenticated(ctx)?;
        services(ctx)?.auth.change_password(auther, &old_password, &password).await.gql()?;
        Ok(true)
    }
}
