// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::{
    cookie::{Cookie, SameSite},
    CookieJar,
};
use serde::Serialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::{AuthenticatedUser, TOKEN_COOKIE},
        rbac::{PermCreateUser, RequirePermission},
    },
    models::{
        auth::{
            AuthResponse, LoginPayload, RegisterMemberPayload, RegisterOrganizationPayload,
            RegisterPayload, User,
        },
        rbac::list_permissions,
    },
    services::{auth::LoginKind, guard::require_admin},
};

// Envelope padrão das respostas de sucesso
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub message: String,
    pub status: u16,
}

type Reply<T> = (StatusCode, Json<ApiResponse<T>>);

fn reply<T: Serialize>(status: StatusCode, message: &str, data: T) -> Reply<T> {
    (
        status,
        Json(ApiResponse { data, message: message.to_string(), status: status.as_u16() }),
    )
}

fn token_cookie(token: String) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

// GET /api/auth/permissions
#[utoipa::path(
    get,
    path = "/api/auth/permissions",
    tag = "Auth",
    responses(
        (status = 200, description = "Catálogo de permissões, na ordem do registro", body = [String])
    )
)]
pub async fn permissions() -> Json<Vec<&'static str>> {
    Json(list_permissions())
}

async fn login(
    app_state: AppState,
    jar: CookieJar,
    kind: LoginKind,
    payload: LoginPayload,
) -> Result<(CookieJar, Reply<AuthResponse>), AppError> {
    payload.validate()?;

    let response = app_state.services.auth.login(kind, payload).await?;
    let jar = jar.add(token_cookie(response.token.clone()));

    Ok((jar, reply(StatusCode::ACCEPTED, "login successful", response)))
}

#[utoipa::path(
    post,
    path = "/api/auth/admin/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 202, description = "Login realizado; cookie `jwt` definido", body = AuthResponse),
        (status = 400, description = "Senha incorreta ou dados inválidos"),
        (status = 404, description = "Usuário não encontrado para este tipo")
    )
)]
pub async fn admin_login(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginPayload>,
) -> Result<(CookieJar, Reply<AuthResponse>), AppError> {
    login(app_state, jar, LoginKind::Admin, payload).await
}

#[utoipa::path(
    post,
    path = "/api/auth/member/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 202, description = "Login realizado; cookie `jwt` definido", body = AuthResponse),
        (status = 404, description = "Usuário não encontrado para este tipo")
    )
)]
pub async fn member_login(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginPayload>,
) -> Result<(CookieJar, Reply<AuthResponse>), AppError> {
    login(app_state, jar, LoginKind::Member, payload).await
}

#[utoipa::path(
    post,
    path = "/api/auth/customer/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 202, description = "Login realizado; cookie `jwt` definido", body = AuthResponse),
        (status = 404, description = "Usuário não encontrado para este tipo")
    )
)]
pub async fn customer_login(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginPayload>,
) -> Result<(CookieJar, Reply<AuthResponse>), AppError> {
    login(app_state, jar, LoginKind::Customer, payload).await
}

// Só um admin cria outro admin; o primeiro vem do `seed`
#[utoipa::path(
    post,
    path = "/api/auth/admin/register",
    tag = "Auth",
    request_body = RegisterPayload,
    responses(
        (status = 201, description = "Administrador criado"),
        (status = 401, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn register_admin(
    State(app_state): State<AppState>,
    AuthenticatedUser(auther): AuthenticatedUser,
    Json(payload): Json<RegisterPayload>,
) -> Result<Reply<User>, AppError> {
    require_admin(&auther)?;
    payload.validate()?;

    let user = app_state.services.auth.register_admin(payload).await?;
    Ok(reply(StatusCode::CREATED, "admin registered", user))
}

#[utoipa::path(
    post,
    path = "/api/auth/member/register",
    tag = "Auth",
    request_body = RegisterMemberPayload,
    responses(
        (status = 201, description = "Membro criado"),
        (status = 401, description = "Sem a permissão Create User")
    ),
    security(("api_jwt" = []))
)]
pub async fn register_member(
    State(app_state): State<AppState>,
    guard: RequirePermission<PermCreateUser>,
    Json(payload): Json<RegisterMemberPayload>,
) -> Result<Reply<User>, AppError> {
    payload.validate()?;

    let user = app_state.services.auth.register_member(&guard.auther, payload).await?;
    Ok(reply(StatusCode::CREATED, "member registered", user))
}

#[utoipa::path(
    post,
    path = "/api/auth/customer/register",
    tag = "Auth",
    request_body = RegisterPayload,
    responses(
        (status = 201, description = "Cliente e perfil criados"),
        (status = 400, description = "E-mail ou telefone já cadastrado")
    )
)]
pub async fn register_customer(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<Reply<Value>, AppError> {
    payload.validate()?;

    let (user, profile) = app_state.services.auth.register_customer(payload).await?;
    Ok(reply(
        StatusCode::CREATED,
        "customer registered",
        json!({ "user": user, "profile": profile }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/organization/register",
    tag = "Auth",
    request_body = RegisterOrganizationPayload,
    responses(
        (status = 201, description = "Organização, cargo de administrador e membro criados"),
        (status = 400, description = "Dados inválidos ou já cadastrados")
    )
)]
pub async fn register_organization(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterOrganizationPayload>,
) -> Result<Reply<Value>, AppError> {
    payload.validate()?;

    let (organization, role, user) = app_state.services.auth.register_organization(payload).await?;
    Ok(reply(
        StatusCode::CREATED,
        "organization registered",
        json!({ "organization": organization, "role": role, "user": user }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/auth/logout",
    tag = "Auth",
    responses(
        (status = 200, description = "Cookie `jwt` removido")
    )
)]
pub async fn logout(jar: CookieJar) -> (CookieJar, Reply<Option<()>>) {
    let jar = jar.remove(Cookie::build(TOKEN_COOKIE).path("/"));
    (jar, reply(StatusCode::OK, "logged out", None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::memory::MemoryStore,
        loaders::LoaderConfig,
        models::auth::Auther,
        services::auth::AuthSettings,
    };

    fn state(store: &std::sync::Arc<MemoryStore>) -> AppState {
        let settings = AuthSettings {
            jwt_secret: "test-secret".into(),
            token_ttl: chrono::Duration::hours(1),
            bcrypt_cost: 4,
        };
        AppState::new(store.stores(), settings, LoaderConfig::default())
    }

    fn customer_payload() -> RegisterPayload {
        RegisterPayload {
            first_name: "Ana".into(),
            last_name: "Lima".into(),
            email: "ana@example.com".into(),
            phone: "100".into(),
            password: "secret123".into(),
        }
    }

    #[tokio::test]
    async fn login_sets_the_token_cookie() {
        let store = MemoryStore::new();
        let app_state = state(&store);
        let (created, _) = register_customer(State(app_state.clone()), Json(customer_payload())).await.unwrap();
        assert_eq!(created, StatusCode::CREATED);

        let payload = LoginPayload {
            email: Some("ana@example.com".into()),
            phone: None,
            password: "secret123".into(),
        };
        let (jar, (status, Json(body))) =
            customer_login(State(app_state.clone()), CookieJar::new(), Json(payload)).await.unwrap();

        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body.status, 202);
        assert!(body.data.auther.is_customer);
        assert_eq!(jar.get(TOKEN_COOKIE).map(|c| c.value().to_string()), Some(body.data.token.clone()));
        assert!(app_state.services.auth.validate_token(&body.data.token).is_ok());
    }

    #[tokio::test]
    async fn invalid_payload_is_a_validation_error() {
        let store = MemoryStore::new();
        let mut payload = customer_payload();
        payload.email = "not-an-email".into();

        let result = register_customer(State(state(&store)), Json(payload)).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[tokio::test]
    async fn admin_registration_requires_an_admin() {
        let store = MemoryStore::new();
        let app_state = state(&store);

        let denied = register_admin(
            State(app_state.clone()),
            AuthenticatedUser(Auther::customer(3)),
            Json(customer_payload()),
        )
        .await;
        assert!(matches!(denied, Err(AppError::Unauthorized(_))));

        let (status, Json(body)) = register_admin(
            State(app_state),
            AuthenticatedUser(Auther::admin(1)),
            Json(customer_payload()),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert!(body.data.is_admin);
    }

    #[tokio::test]
    async fn organization_registration_returns_all_three_rows() {
        let store = MemoryStore::new();
        let payload = RegisterOrganizationPayload {
            org_name: "Acme".into(),
            website: None,
            first_name: "Rui".into(),
            last_name: "Costa".into(),
            email: "rui@example.com".into(),
            phone: "200".into(),
            password: "secret123".into(),
        };

        let (_, Json(body)) = register_organization(State(state(&store)), Json(payload)).await.unwrap();

        assert_eq!(body.data["role"]["name"], "Org Admin");
        assert_eq!(body.data["role"]["isOrgAdmin"], true);
        assert_eq!(body.data["user"]["isMember"], true);
        assert!(body.data["user"].get("passwordHash").is_none());
        assert!(body.data["organization"]["code"].as_str().unwrap().starts_with("ORG"));
    }

    #[tokio::test]
    async fn logout_clears_the_cookie() {
        let jar = CookieJar::new().add(token_cookie("abc".into()));
        let (jar, (status, _)) = logout(jar).await;

        assert_eq!(status, StatusCode::OK);
        assert!(jar.get(TOKEN_COOKIE).is_none());
    }
}
