//src/main.rs

use anyhow::Context;
use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method, StatusCode,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Json, Router,
};
use clap::{Parser, Subcommand};
use sqlx::{postgres::PgPoolOptions, PgPool};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;

mod common;
mod config;
mod db;
mod docs;
mod graphql;
mod handlers;
mod loaders;
mod middleware;
mod models;
mod services;

use crate::{
    config::{AppState, Config},
    db::Stores,
    docs::ApiDoc,
    middleware::auth::auth_middleware,
};

#[derive(Parser)]
#[command(name = "palletrack", version, about = "Backend multi-tenant de contêineres e paletes")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Sobe o servidor HTTP (padrão)
    Serve,
    /// Cria o administrador da plataforma a partir de SEED_ADMIN_*
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Inicializa o logger (RUST_LOG controla o nível)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let pool = connect(&config).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config, pool).await,
        Command::Seed => seed(config, pool).await,
    }
}

async fn connect(config: &Config) -> anyhow::Result<PgPool> {
    // Conecta ao banco de dados, usando '?' para propagar erros
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(std::time::Duration::from_secs(3))
        .connect(&config.database_url)
        .await
        .context("Falha ao conectar ao banco de dados")?;
    tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&pool)
        .await
        .context("Falha ao rodar as migrações do banco de dados")?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    Ok(pool)
}

async fn seed(config: Config, pool: PgPool) -> anyhow::Result<()> {
    let email = config.seed_admin_email.clone().context("SEED_ADMIN_EMAIL deve ser definido")?;
    let password = config.seed_admin_password.clone().context("SEED_ADMIN_PASSWORD deve ser definido")?;

    let app_state = AppState::new(Stores::postgres(pool), config.auth_settings(), config.loader);
    match app_state
        .services
        .auth
        .seed_admin(&email, &config.seed_admin_phone, &password)
        .await
        .map_err(|e| anyhow::anyhow!("Falha ao criar o administrador: {}", e))?
    {
        Some(user) => tracing::info!(user_id = user.id, "🌱 Administrador criado: {}", email),
        None => tracing::info!("Administrador {} já existe, nada a fazer", email),
    }
    Ok(())
}

async fn serve(config: Config, pool: PgPool) -> anyhow::Result<()> {
    let app_state = AppState::new(Stores::postgres(pool), config.auth_settings(), config.loader);

    // Define as rotas de autenticação (REST)
    let auth_routes = Router::new()
        .route("/permissions", get(handlers::auth::permissions))
        .route("/admin/login", post(handlers::auth::admin_login))
        .route("/member/login", post(handlers::auth::member_login))
        .route("/customer/login", post(handlers::auth::customer_login))
        .route("/admin/register", post(handlers::auth::register_admin))
        .route("/member/register", post(handlers::auth::register_member))
        .route("/customer/register", post(handlers::auth::register_customer))
        .route("/organization/register", post(handlers::auth::register_organization))
        .route("/logout", get(handlers::auth::logout));

    // GraphQL (playground + execução)
    let gql_routes = Router::new()
        .route("/", get(handlers::graphql::graphiql))
        .route("/query", post(handlers::graphql::graphql_handler));

    // Qualquer origem, com credenciais (cookie `jwt`)
    let cors_layer = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .nest("/api/auth", auth_routes)
        .nest("/api/gql", gql_routes)
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_middleware))
        .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, config.request_timeout))
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&config.server_address)
        .await
        .context("Falha ao iniciar o listener TCP")?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await.context("Erro no servidor Axum")?;

    Ok(())
}
