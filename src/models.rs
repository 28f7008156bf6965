pub mod auth;
pub mod inventory;
pub mod rbac;
pub mod tenancy;
