// src/graphql/pallet.rs

use async_graphql::{ComplexObject, Context, InputObject, Object, Result, SimpleObject};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    graphql::{authorize, creator, loaders, services, GqlResult},
    models::{
        auth::User,
        inventory::{Container, Pallet, PalletCreateRequest, PalletUpdateRequest},
        rbac::Permission,
        tenancy::Organization,
    },
};

#[ComplexObject]
impl Pallet {
    async fn created_by(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        creator(ctx, self.created_by_id).await
    }

    async fn container(&self, ctx: &Context<'_>) -> Result<Option<Container>> {
        match self.container_id {
            Some(id) => loaders(ctx)?.containers.load(id).await.gql(),
            None => Ok(None),
        }
    }

    async fn organization(&self, ctx: &Context<'_>) -> Result<Option<Organization>> {
        match self.organization_id {
            Some(id) => loaders(ctx)?.organizations.load(id).await.gql(),
            None => Ok(None),
        }
    }
}

#[derive(SimpleObject)]
pub struct PalletResult {
    pub pallets: Vec<Pallet>,
    pub total: i64,
}

#[derive(InputObject)]
pub struct PalletCreateInput {
    pub description: Option<String>,
    pub organization_id: Option<i64>,
    pub container_id: Option<i64>,
}

#[derive(InputObject)]
pub struct PalletUpdateInput {
    pub id: i64,
    pub description: Option<String>,
    pub container_id: Option<i64>,
}

#[derive(Default)]
pub struct PalletQuery;

#[Object]
impl PalletQuery {
    async fn pallets(&self, ctx: &Context<'_>, container_id: Option<i64>) -> Result<PalletResult> {
        let auther = authorize(ctx, Permission::ReadPallet, true, false).await?;
        let pallets = services(ctx)?.pallets.list(auther, container_id).await.gql()?;
        Ok(PalletResult { total: pallets.len() as i64, pallets })
    }

    async fn pallet(
        &self,
        ctx: &Context<'_>,
        id: Option<i64>,
        uid: Option<Uuid>,
        code: Option<String>,
    ) -> Result<Pallet> {
        let auther = authorize(ctx, Permission::ReadPallet, true, false).await?;
        let service = &services(ctx)?.pallets;
        match (id, uid, code) {
            (Some(id), _, _) => service.get_by_id(auther, id).await.gql(),
            (None, Some(uid), _) => service.get_by_uid(auther, uid).await.gql(),
            (None, None, Some(code)) => service.get_by_code(auther, &code).await.gql(),
            (None, None, None) => Err(AppError::bad_request("id, uid or code is required")).gql(),
        }
    }
}

#[derive(Default)]
pub struct PalletMutation;

#[Object]
impl PalletMutation {
    async fn pallet_create(&self, ctx: &Context<'_>, input: PalletCreateInput) -> Result<Pallet> {
        let auther = authorize(ctx, Permission::CreatePallet, true, false).await?;
        let request = PalletCreateRequest {
            description: input.description,
            organization_id: input.organization_id,
            container_id: input.container_id,
        };
        services(ctx)?.pallets.create(auther, request).await.gql()
    }

    async fn pallet_update(&self, ctx: &Context<'_>, input: PalletUpdateInput) -> Result<Pallet> {
        let auther = authorize(ctx, Permission::UpdatePallet, true, false).await?;
        let request = PalletUpdateRequest {
            id: input.id,
            description: input.description,
            container_id: input.container_id,
        };
        services(ctx)?.pallets.update(auther, request).await.gql()
    }

    async fn pallet_archive(&self, ctx: &Context<'_>, id: i64) -> Result<Pallet> {
        let auther = authorize(ctx, Permission::UpdatePallet, true, false).await?;
        services(ctx)?.pallets.archive(auther, id).await.gql()
    }

    async fn pallet_unarchive(&self, ctx: &Context<'_>, id: i64) -> Result<Pallet> {
        let auther = authorize(ctx, Permission::UpdatePallet, true, false).await?;
        services(ctx)?.pallets.unarchive(auther, id).await.gql()
    }

    async fn pallet_delete(&self, ctx: &Context<'_>, id: i64) -> Result<bool> {
        let auther = authorize(ctx, Permission::DeletePallet, true, false).await?;
        services(ctx)?.pallets.delete(auther, id).await.gql()?;
        Ok(true)
    }
}
