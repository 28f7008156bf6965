// src/graphql.rs
//
// Schema GraphQL. Cada resolver autentica, passa pelo avaliador de
// permissões e só então chama o serviço com o principal.

use std::sync::Arc;

use async_graphql::{Context, EmptySubscription, ErrorExtensions, MergedObject, Object, Schema};

pub mod container;
pub mod organization;
pub mod pallet;
pub mod role;
pub mod user;

use crate::{
    common::error::AppError,
    loaders::Loaders,
    middleware::scope::RequestScope,
    models::{auth::{Auther, User}, rbac::{list_permissions, Permission}},
    services::Services,
};

#[derive(MergedObject, Default)]
pub struct QueryRoot(
    CatalogQuery,
    organization::OrganizationQuery,
    role::RoleQuery,
    user::UserQuery,
    container::ContainerQuery,
    pallet::PalletQuery,
);

#[derive(MergedObject, Default)]
pub struct MutationRoot(
    organization::OrganizationMutation,
    role::RoleMutation,
    user::UserMutation,
    container::ContainerMutation,
    pallet::PalletMutation,
);

pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(services: Services) -> AppSchema {
    Schema::build(QueryRoot::default(), MutationRoot::default(), EmptySubscription)
        .data(services)
        .finish()
}

/// Converte o erro de domínio mantendo status e categoria nas extensões.
pub(crate) trait GqlResult<T> {
    fn gql(self) -> async_graphql::Result<T>;
}

impl<T> GqlResult<T> for Result<T, AppError> {
    fn gql(self) -> async_graphql::Result<T> {
        self.map_err(|e| e.extend())
    }
}

// Erro de lote dos loaders (compartilhado entre as chaves)
impl<T> GqlResult<T> for Result<T, Arc<AppError>> {
    fn gql(self) -> async_graphql::Result<T> {
        self.map_err(|e| e.as_ref().extend())
    }
}

pub(crate) fn services<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a Services> {
    ctx.data::<Services>()
}

pub(crate) fn loaders<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a Loaders> {
    Ok(&ctx.data::<RequestScope>()?.loaders)
}

pub(crate) fn authenticated<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a Auther> {
    ctx.data::<RequestScope>()?.auther().gql()
}

// Autentica e avalia a permissão com as visões da operação.
pub(crate) async fn authorize<'a>(
    ctx: &Context<'a>,
    permission: Permission,
    member_view: bool,
    customer_view: bool,
) -> async_graphql::Result<&'a Auther> {
    let auther = authenticated(ctx)?;
    services(ctx)?
        .authorization
        .grant_permission(auther, permission, member_view, customer_view)
        .await
        .gql()?;
    Ok(auther)
}

// Autor de um contêiner ou palete. Membros só enxergam autores da própria
// organização; os demais viram null.
pub(crate) async fn creator(ctx: &Context<'_>, user_id: i64) -> async_graphql::Result<Option<User>> {
    let auther = authenticated(ctx)?;
    let user = loaders(ctx)?.users.load(user_id).await.gql()?;
    Ok(user.filter(|u| {
        auther.is_admin() || (u.is_member && u.organization_id == auther.organization_id())
    }))
}

#[derive(Default)]
pub struct CatalogQuery;

#[Object]
impl CatalogQuery {
    /// Catálogo de permissões, na ordem do registro.
    async fn permissions(&self) -> Vec<String> {
        list_permissions().into_iter().map(String::from).collect()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use async_graphql::{Request, Response, Value};

    use super::*;
    use crate::{
        db::memory::MemoryStore,
        loaders::LoaderConfig,
        services::auth::AuthSettings,
    };

    pub(crate) fn schema(store: &Arc<MemoryStore>) -> AppSchema {
        let settings = AuthSettings {
            jwt_secret: "test-secret".into(),
            token_ttl: chrono::Duration::hours(1),
            bcrypt_cost: 4,
        };
        build_schema(Services::new(&store.stores(), settings))
    }

    pub(crate) async fn run(
        store: &Arc<MemoryStore>,
        auther: Option<Auther>,
        query: &str,
    ) -> Response {
        let scope = RequestScope::new(auther, Loaders::new(&store.stores(), LoaderConfig::default()));
        schema(store).execute(Request::new(query).data(scope)).await
    }

    pub(crate) fn error_code(response: &Response) -> Option<Value> {
        response
            .errors
            .first()
            .and_then(|e| e.extensions.as_ref())
            .and_then(|ext| ext.get("error").cloned())
    }

    #[tokio::test]
    async fn permissions_are_public() {
        let store = MemoryStore::new();
        let response = run(&store, None, "{ permissions }").await;

        assert!(response.errors.is_empty());
        let json = response.data.into_json().unwrap();
        assert_eq!(json["permissions"][0], "Read Organization");
        assert_eq!(json["permissions"].as_array().unwrap().len(), Permission::ALL.len());
    }

    #[tokio::test]
    async fn anonymous_callers_are_rejected() {
        let store = MemoryStore::new();
        let response = run(&store, None, "{ containers { total } }").await;

        assert_eq!(response.errors[0].message, "no credentials provided");
        assert_eq!(error_code(&response), Some(Value::from("unauthorized")));
    }

    #[tokio::test]
    async fn denied_permission_keeps_status_extension() {
        let store = MemoryStore::new();
        let role = store.add_role(10, &[Permission::ReadPallet], false).await;
        let (_, member) = store.add_member(10, role.id).await;

        let response = run(&store, Some(member), "{ containers { total } }").await;

        assert_eq!(response.errors[0].message, "user not authorized");
        let status = response.errors[0].extensions.as_ref().and_then(|ext| ext.get("status").cloned());
        assert_eq!(status, Some(Value::from(401)));
    }
}
