// src/models/inventory.rs

use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

// --- 1. Contêineres ---
#[derive(Debug, Clone, Serialize, FromRow, SimpleObject)]
#[graphql(complex)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    pub id: i64,
    pub uid: Uuid,
    pub code: String,
    pub description: Option<String>,
    pub is_archived: bool,
    pub organization_id: Option<i64>,
    pub created_by_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- 2. Paletes ---
// Um palete pode estar dentro de um contêiner da mesma organização.
#[derive(Debug, Clone, Serialize, FromRow, SimpleObject)]
#[graphql(complex)]
#[serde(rename_all = "camelCase")]
pub struct Pallet {
    pub id: i64,
    pub uid: Uuid,
    pub code: String,
    pub description: Option<String>,
    pub is_archived: bool,
    pub organization_id: Option<i64>,
    pub container_id: Option<i64>,
    pub created_by_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Requisições ---

#[derive(Debug, Clone, Default)]
pub struct ContainerCreateRequest {
    pub description: Option<String>,
    pub organization_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct ContainerUpdateRequest {
    pub id: i64,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PalletCreateRequest {
    pub description: Option<String>,
    pub organization_id: Option<i64>,
    pub container_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct PalletUpdateRequest {
    pub id: i64,
    pub description: Option<String>,
    pub container_id: Option<i64>,
}

// Linha a inserir, já com a organização resolvida.
#[derive(Debug, Clone)]
pub struct NewContainer {
    pub description: Option<String>,
    pub organization_id: i64,
    pub created_by_id: i64,
}

#[derive(Debug, Clone)]
pub struct NewPallet {
    pub description: Option<String>,
    pub organization_id: i64,
    pub container_id: Option<i64>,
    pub created_by_id: i64,
}
