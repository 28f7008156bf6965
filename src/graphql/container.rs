// src/graphql/container.rs

use async_graphql::{ComplexObject, Context, InputObject, Object, Result, SimpleObject};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    graphql::{authorize, creator, loaders, services, GqlResult},
    models::{
        auth::User,
        inventory::{Container, ContainerCreateRequest, ContainerUpdateRequest, Pallet},
        rbac::Permission,
        tenancy::Organization,
    },
};

#[ComplexObject]
impl Container {
    async fn created_by(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        creator(ctx, self.created_by_id).await
    }

    async fn organization(&self, ctx: &Context<'_>) -> Result<Option<Organization>> {
        match self.organization_id {
            Some(id) => loaders(ctx)?.organizations.load(id).await.gql(),
            None => Ok(None),
        }
    }

    async fn pallets(&self, ctx: &Context<'_>) -> Result<Vec<Pallet>> {
        let group = loaders(ctx)?.container_pallets.load(self.id).await.gql()?;
        Ok(group.map(|g| g.pallets).unwrap_or_default())
    }
}

#[derive(SimpleObject)]
pub struct ContainerResult {
    pub containers: Vec<Container>,
    pub total: i64,
}

#[derive(InputObject)]
pub struct ContainerCreateInput {
    pub description: Option<String>,
    pub organization_id: Option<i64>,
}

#[derive(InputObject)]
pub struct ContainerUpdateInput {
    pub id: i64,
    pub description: Option<String>,
}

#[derive(Default)]
pub struct ContainerQuery;

#[Object]
impl ContainerQuery {
    async fn containers(&self, ctx: &Context<'_>) -> Result<ContainerResult> {
        let auther = authorize(ctx, Permission::ReadContainer, true, false).await?;
        let containers = services(ctx)?.containers.list(auther).await.gql()?;
        Ok(ContainerResult { total: containers.len() as i64, containers })
    }

    async fn container(
        &self,
        ctx: &Context<'_>,
        id: Option<i64>,
        uid: Option<Uuid>,
        code: Option<String>,
    ) -> Result<Container> {
        let auther = authorize(ctx, Permission::ReadContainer, true, false).await?;
        let service = &services(ctx)?.containers;
        match (id, uid, code) {
            (Some(id), _, _) => service.get_by_id(auther, id).await.gql(),
            (None, Some(uid), _) => service.get_by_uid(auther, uid).await.gql(),
            (None, None, Some(code)) => service.get_by_code(auther, &code).await.gql(),
            (None, None, None) => Err(AppError::bad_request("id, uid or code is required")).gql(),
        }
    }
}

#[derive(Default)]
pub struct ContainerMutation;

#[Object]
impl ContainerMutation {
    async fn container_create(&self, ctx: &Context<'_>, input: ContainerCreateInput) -> Result<Container> {
        let auther = authorize(ctx, Permission::CreateContainer, true, false).await?;
        let request = ContainerCreateRequest {
            description: input.description,
            organization_id: input.organization_id,
        };
        services(ctx)?.containers.create(auther, request).await.gql()
    }

    async fn container_update(&self, ctx: &Context<'_>, input: ContainerUpdateInput) -> Result<Container> {
        let auther = authorize(ctx, Permission::UpdateContainer, true, false).await?;
        let request = ContainerUpdateRequest { id: input.id, description: input.description };
        services(ctx)?.containers.update(auther, request).await.gql()
    }

    async fn container_archive(&self, ctx: &Context<'_>, id: i64) -> Result<Container> {
        let auther = authorize(ctx, Permission::UpdateContainer, true, false).await?;
        services(ctx)?.containers.archive(auther, id).await.gql()
    }

    async fn container_unarchive(&self, ctx: &Context<'_>, id: i64) -> Result<Container> {
        let auther = authorize(ctx, Permission::UpdateContainer, true, false).await?;
        services(ctx)?.containers.unarchive(auther, id).await.gql()
    }

    async fn container_delete(&self, ctx: &Context<'_>, id: i64) -> Result<bool> {
        let auther = authorize(ctx, Permission::DeleteContainer, true, false).await?;
        services(ctx)?.containers.delete(auther, id).await.gql()?;
        Ok(true)
    }
}
