// src/common/error.rs

use async_graphql::ErrorExtensions;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
// Cada variante cai em uma das categorias expostas ao cliente:
// bad_request, unauthorized, not_found, unprocessable_entity ou internal_server_error.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("email already registered")]
    EmailAlreadyExists,

    #[error("phone already registered")]
    PhoneAlreadyExists,

    #[error("duplicated value for {0}")]
    UniqueConstraintViolation(String),

    #[error("token error")]
    InvalidToken,

    // Variante para erros de banco de dados. `RowNotFound` nunca chega aqui,
    // a conversão abaixo o transforma em NotFound.
    #[error("Erro de banco de dados")]
    DatabaseError(#[source] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::NotFound("object not found".into()),
            other => AppError::DatabaseError(other),
        }
    }
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        AppError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::BadRequest(_)
            | AppError::EmailAlreadyExists
            | AppError::PhoneAlreadyExists
            | AppError::UniqueConstraintViolation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::InvalidToken => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::JwtError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::DatabaseError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Código curto da categoria, usado no campo `error` da resposta.
    pub fn code(&self) -> &'static str {
        match self.status() {
            StatusCode::BAD_REQUEST => "bad_request",
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => "unauthorized",
            StatusCode::NOT_FOUND => "not_found",
            StatusCode::UNPROCESSABLE_ENTITY => "unprocessable_entity",
            _ => "internal_server_error",
        }
    }

    /// Mensagem segura para o cliente: erros internos nunca vazam detalhes.
    pub fn public_message(&self) -> String {
        match self.status() {
            StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!("Erro Interno do Servidor: {:?}", self);
                "internal server error".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Retorna todos os detalhes da validação.
        if let AppError::ValidationError(errors) = &self {
            let mut details = std::collections::HashMap::new();
            for (field, field_errors) in errors.field_errors() {
                let messages: Vec<String> = field_errors
                    .iter()
                    .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                    .collect();
                details.insert(field.to_string(), messages);
            }
            let body = Json(json!({
                "message": "one or more fields are invalid",
                "error": self.code(),
                "status": status.as_u16(),
                "details": details,
            }));
            return (status, body).into_response();
        }

        let body = Json(json!({
            "message": self.public_message(),
            "error": self.code(),
            "status": status.as_u16(),
        }));
        (status, body).into_response()
    }
}

// No GraphQL a categoria segue nas extensões do erro.
impl ErrorExtensions for AppError {
    fn extend(&self) -> async_graphql::Error {
        let status = i32::from(self.status().as_u16());
        let code = self.code();
        async_graphql::Error::new(self.public_message()).extend_with(|_, e| {
            e.set("status", status);
            e.set("error", code);
        })
    }
}
