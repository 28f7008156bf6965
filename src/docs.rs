// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::permissions,
        handlers::auth::admin_login,
        handlers::auth::member_login,
        handlers::auth::customer_login,
        handlers::auth::register_admin,
        handlers::auth::register_member,
        handlers::auth::register_customer,
        handlers::auth::register_organization,
        handlers::auth::logout,
    ),
    components(
        schemas(
            models::auth::AutherFlags,
            models::auth::AuthResponse,
            models::auth::LoginPayload,
            models::auth::RegisterPayload,
            models::auth::RegisterMemberPayload,
            models::auth::RegisterOrganizationPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro (o restante da API é GraphQL em /api/gql)")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
