// src/graphql/organization.rs

use async_graphql::{Context, InputObject, Object, Result, SimpleObject};

use crate::{
    common::error::AppError,
    graphql::{authorize, services, GqlResult},
    models::{
        rbac::Permission,
        tenancy::{Organization, OrganizationUpdate},
    },
};

#[derive(SimpleObject)]
pub struct OrganizationResult {
    pub organizations: Vec<Organization>,
    pub total: i64,
}

#[derive(InputObject)]
pub struct OrganizationUpdateInput {
    pub id: i64,
    pub name: String,
    pub website: Option<String>,
}

#[derive(Default)]
pub struct OrganizationQuery;

#[Object]
impl OrganizationQuery {
    async fn organizations(&self, ctx: &Context<'_>) -> Result<OrganizationResult> {
        let auther = authorize(ctx, Permission::ReadOrganization, true, false).await?;
        let organizations = services(ctx)?.organizations.list(auther).await.gql()?;
        Ok(OrganizationResult { total: organizations.len() as i64, organizations })
    }

    /// Busca por id ou, na falta dele, por código.
    async fn organization(
        &self,
        ctx: &Context<'_>,
        id: Option<i64>,
        code: Option<String>,
    ) -> Result<Organization> {
        let auther = authorize(ctx, Permission::ReadOrganization, true, false).await?;
        let service = &services(ctx)?.organizations;
        match (id, code) {
            (Some(id), _) => service.get_by_id(auther, id).await.gql(),
            (None, Some(code)) => service.get_by_code(auther, &code).await.gql(),
            (None, None) => Err(AppError::bad_request("id or code is required")).gql(),
        }
    }
}

#[derive(Default)]
pub struct OrganizationMutation;

#[Object]
impl OrganizationMutation {
    async fn organization_update(
        &self,
        ctx: &Context<'_>,
        input: OrganizationUpdateInput,
    ) -> Result<Organization> {
        let auther = authorize(ctx, Permission::UpdateOrganization, true, false).await?;
        let update = OrganizationUpdate { name: input.name, website: input.website };
        services(ctx)?.organizations.update(auther, input.id, update).await.gql()
    }

    async fn organization_archive(&self, ctx: &Context<'_>, id: i64) -> Result<Organization> {
        let auther = authorize(ctx, Permission::UpdateOrganization, true, false).await?;
        services(ctx)?.organizations.archive(auther, id).await.gql()
    }

    async fn organization_unarchive(&self, ctx: &Context<'_>, id: i64) -> Result<Organization> {
        let auther = authorize(ctx, Permission::UpdateOrganization, true, false).await?;
        services(ctx)?.organizations.unarchive(auther, id).await.gql()
    }

    async fn organization_delete(&self, ctx: &Context<'_>, id: i64) -> Result<bool> {
        let auther = authorize(ctx, Permission::DeleteOrganization, true, false).await?;
        services(ctx)?.organizations.delete(auther, id).await.gql()?;
        Ok(true)
    }
}
