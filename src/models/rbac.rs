// src/models/rbac.rs

use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use std::{fmt, str::FromStr};

// Gera o enum fechado de permissões e a tabela de nomes, na ordem do catálogo.
macro_rules! permissions {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// Catálogo fechado de permissões. O nome é a forma gravada nos cargos.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Permission {
            $($variant),+
        }

        impl Permission {
            /// Todas as permissões, na ordem do catálogo.
            pub const ALL: &'static [Permission] = &[$(Permission::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(Permission::$variant => $name),+
                }
            }
        }
    };
}

permissions! {
    ReadOrganization => "Read Organization",
    UpdateOrganization => "Update Organization",
    DeleteOrganization => "Delete Organization",

    CreateRole => "Create Role",
    ReadRole => "Read Role",
    UpdateRole => "Update Role",
    DeleteRole => "Delete Role",

    CreateUser => "Create User",
    ReadUser => "Read User",
    UpdateUser => "Update User",
    DeleteUser => "Delete User",

    CreateCategoryOne => "Create Category One",
    ReadCategoryOne => "Read Category One",
    UpdateCategoryOne => "Update Category One",
    DeleteCategoryOne => "Delete Category One",

    CreateCategoryTwo => "Create Category Two",
    ReadCategoryTwo => "Read Category Two",
    UpdateCategoryTwo => "Update Category Two",
    DeleteCategoryTwo => "Delete Category Two",

    CreateSku => "Create SKU",
    ReadSku => "Read SKU",
    UpdateSku => "Update SKU",
    DeleteSku => "Delete SKU",

    CreateOrder => "Create Order",
    ReadOrder => "Read Order",
    UpdateOrder => "Update Order",
    DeleteOrder => "Delete Order",

    CreateContract => "Create Contract",
    ReadContract => "Read Contract",
    UpdateContract => "Update Contract",
    DeleteContract => "Delete Contract",

    CreateDistributor => "Create Distributor",
    ReadDistributor => "Read Distributor",
    UpdateDistributor => "Update Distributor",
    DeleteDistributor => "Delete Distributor",

    CreateContainer => "Create Container",
    ReadContainer => "Read Container",
    UpdateContainer => "Update Container",
    DeleteContainer => "Delete Container",

    CreatePallet => "Create Pallet",
    ReadPallet => "Read Pallet",
    UpdatePallet => "Update Pallet",
    DeletePallet => "Delete Pallet",

    CreateCarton => "Create Carton",
    ReadCarton => "Read Carton",
    UpdateCarton => "Update Carton",
    DeleteCarton => "Delete Carton",

    CreateProduct => "Create Product",
    ReadProduct => "Read Product",
    UpdateProduct => "Update Product",
    DeleteProduct => "Delete Product",

    CreateTask => "Create Task",
    ReadTask => "Read Task",
    UpdateTask => "Update Task",
    DeleteTask => "Delete Task",

    CreatePurchaseRecord => "Create Purchase Record",
    ReadPurchaseRecord => "Read Purchase Record",
    UpdatePurchaseRecord => "Update Purchase Record",
    DeletePurchaseRecord => "Delete Purchase Record",

    CreateConsumerOrder => "Create Consumer Order",
    ReadConsumerOrder => "Read Consumer Order",
    UpdateConsumerOrder => "Update Consumer Order",
    DeleteConsumerOrder => "Delete Consumer Order",

    CreateTrackAction => "Create Track Action",
    ReadTrackAction => "Read Track Action",
    UpdateTrackAction => "Update Track Action",
    DeleteTrackAction => "Delete Track Action",
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPermission(pub String);

impl FromStr for Permission {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPermission(s.to_string()))
    }
}

/// Nomes de todas as permissões, na ordem do catálogo.
pub fn list_permissions() -> Vec<&'static str> {
    Permission::ALL.iter().map(|p| p.as_str()).collect()
}

// O que sai do banco (Tabela roles)
#[derive(Debug, Clone, Serialize, FromRow, SimpleObject)]
#[graphql(complex)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub permissions: Vec<String>,
    pub is_org_admin: bool,
    pub is_archived: bool,
    pub organization_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    // Cargo de administrador da organização libera tudo; senão, busca exata pelo nome.
    pub fn grants(&self, permission: Permission) -> bool {
        self.is_org_admin || self.permissions.iter().any(|p| p == permission.as_str())
    }
}

// Dados para inserir um cargo (o código é gerado pelo repositório)
#[derive(Debug, Clone)]
pub struct NewRole {
    pub name: String,
    pub permissions: Vec<String>,
    pub is_org_admin: bool,
    pub organization_id: i64,
}

#[derive(Debug, Clone, Default)]
pub struct RoleCreateRequest {
    pub name: String,
    pub permissions: Vec<String>,
    pub is_org_admin: bool,
    pub organization_id: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct RoleUpdateRequest {
    pub id: i64,
    pub name: String,
    pub permissions: Vec<String>,
    pub is_archived: bool,
}
