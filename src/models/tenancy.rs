// src/models/tenancy.rs

use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

// ---
// Organization (o tenant)
// ---
// Todo membro, cargo, contêiner e palete pertence a exatamente uma.
#[derive(Debug, Clone, Serialize, FromRow, SimpleObject)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub website: Option<String>,
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Dados para inserir uma organização (o código é gerado pelo repositório)
#[derive(Debug, Clone)]
pub struct NewOrganization {
    pub name: String,
    pub website: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct OrganizationUpdate {
    pub name: String,
    pub website: Option<String>,
}
