// src/graphql/role.rs

use async_graphql::{ComplexObject, Context, InputObject, Object, Result, SimpleObject};

use crate::{
    common::error::AppError,
    graphql::{authorize, loaders, services, GqlResult},
    models::{
        rbac::{Permission, Role, RoleCreateRequest, RoleUpdateRequest},
        tenancy::Organization,
    },
};

#[ComplexObject]
impl Role {
    async fn organization(&self, ctx: &Context<'_>) -> Result<Option<Organization>> {
        loaders(ctx)?.organizations.load(self.organization_id).await.gql()
    }
}

#[derive(SimpleObject)]
pub struct RoleResult {
    pub roles: Vec<Role>,
    pub total: i64,
}

#[derive(InputObject)]
pub struct RoleCreateInput {
    pub name: String,
    pub permissions: Vec<String>,
    #[graphql(default)]
    pub is_org_admin: bool,
    pub organization_id: Option<i64>,
}

#[derive(InputObject)]
pub struct RoleUpdateInput {
    pub id: i64,
    pub name: String,
    pub permissions: Vec<String>,
    #[graphql(default)]
    pub is_archived: bool,
}

#[derive(Default)]
pub struct RoleQuery;

#[Object]
impl RoleQuery {
    async fn roles(&self, ctx: &Context<'_>, organization_id: Option<i64>) -> Result<RoleResult> {
        let auther = authorize(ctx, Permission::ReadRole, true, false).await?;
        let roles = services(ctx)?.roles.list(auther, organization_id).await.gql()?;
        Ok(RoleResult { total: roles.len() as i64, roles })
    }

    async fn role(&self, ctx: &Context<'_>, id: Option<i64>, code: Option<String>) -> Result<Role> {
        let auther = authorize(ctx, Permission::ReadRole, true, false).await?;
        let service = &services(ctx)?.roles;
        match (id, code) {
            (Some(id), _) => service.get_by_id(auther, id).await.gql(),
            (None, Some(code)) => service.get_by_code(auther, &code).await.gql(),
            (None, None) => Err(AppError::bad_request("id or code is required")).gql(),
        }
    }
}

#[derive(Default)]
pub struct RoleMutation;

#[Object]
impl RoleMutation {
    async fn role_create(&self, ctx: &Context<'_>, input: RoleCreateInput) -> Result<Role> {
        let auther = authorize(ctx, Permission::CreateRole, true, false).await?;
        let request = RoleCreateRequest {
            name: input.name,
            permissions: input.permissions,
            is_org_admin: input.is_org_admin,
            organization_id: input.organization_id,
        };
        services(ctx)?.roles.create(auther, request).await.gql()
    }

    async fn role_update(&self, ctx: &Context<'_>, input: RoleUpdateInput) -> Result<Role> {
        let auther = authorize(ctx, Permission::UpdateRole, true, false).await?;
        let request = RoleUpdateRequest {
            id: input.id,
            name: input.name,
            permissions: input.permissions,
            is_archived: input.is_archived,
        };
        services(ctx)?.roles.update(auther, request).await.gql()
    }

    async fn role_delete(&self, ctx: &Context<'_>, id: i64) -> Result<bool> {
        let auther = authorize(ctx, Permission::DeleteRole, true, false).await?;
        services(ctx)?.roles.delete(auther, id).await.gql()?;
        Ok(true)
    }
}
