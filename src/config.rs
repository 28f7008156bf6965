// src/config.rs

use std::{env, str::FromStr, time::Duration};

use anyhow::Context;

use crate::{
    db::Stores,
    graphql::{build_schema, AppSchema},
    loaders::LoaderConfig,
    services::{auth::AuthSettings, Services},
};

const DEFAULT_BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;

// Configuração lida do ambiente (.env incluído)
#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub database_url: String,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub request_timeout: Duration,
    pub db_max_connections: u32,
    pub loader: LoaderConfig,
    pub seed_admin_email: Option<String>,
    pub seed_admin_password: Option<String>,
    pub seed_admin_phone: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL deve ser definida")?;
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        Ok(Self {
            server_address: env::var("SERVER_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".into()),
            database_url,
            jwt_secret,
            token_ttl_hours: parse_or("TOKEN_TTL_HOURS", 168)?,
            request_timeout: Duration::from_secs(parse_or("REQUEST_TIMEOUT_SECS", 10)?),
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 5)?,
            loader: LoaderConfig {
                wait: Duration::from_millis(parse_or("LOADER_WAIT_MS", 1)?),
                max_batch: parse_or("LOADER_MAX_BATCH", 100)?,
            },
            seed_admin_email: env::var("SEED_ADMIN_EMAIL").ok(),
            seed_admin_password: env::var("SEED_ADMIN_PASSWORD").ok(),
            seed_admin_phone: env::var("SEED_ADMIN_PHONE").unwrap_or_else(|_| "+0000000000".into()),
        })
    }

    pub fn auth_settings(&self) -> AuthSettings {
        AuthSettings {
            jwt_secret: self.jwt_secret.clone(),
            token_ttl: chrono::Duration::hours(self.token_ttl_hours),
            bcrypt_cost: DEFAULT_BCRYPT_COST,
        }
    }
}

fn parse_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw.parse().with_context(|| format!("{} inválida: {}", key, raw)),
        Err(_) => Ok(default),
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub stores: Stores,
    pub services: Services,
    pub schema: AppSchema,
    pub loader_config: LoaderConfig,
}

impl AppState {
    // Monta o gráfico de dependências a partir dos repositórios
    pub fn new(stores: Stores, settings: AuthSettings, loader_config: LoaderConfig) -> Self {
        let services = Services::new(&stores, settings);
        let schema = build_schema(services.clone());

        Self { stores, services, schema, loader_config }
    }
}
