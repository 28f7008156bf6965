// src/handlers.rs

pub mod auth;
pub mod graphql;
