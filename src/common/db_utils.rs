// src/common/db_utils.rs

use sqlx::{Postgres, Transaction};

use crate::common::error::AppError;

pub const ORGANIZATION_CODE_PREFIX: &str = "ORG";
pub const ROLE_CODE_PREFIX: &str = "ROLE";
pub const CONTAINER_CODE_PREFIX: &str = "CNT";
pub const PALLET_CODE_PREFIX: &str = "PLT";

/// Código legível de uma entidade: prefixo + número com 5 dígitos (`CNT00042`).
pub fn sequence_code(prefix: &str, number: i64) -> String {
    format!("{}{:05}", prefix, number)
}

// Reserva o próximo id da tabela dentro da transação corrente.
// O código é derivado dele, então duas inserções concorrentes nunca colidem.
pub(crate) async fn next_id(
    tx: &mut Transaction<'_, Postgres>,
    table: &str,
) -> Result<i64, AppError> {
    let id: i64 = sqlx::query_scalar("SELECT nextval(pg_get_serial_sequence($1, 'id'))")
        .bind(table)
        .fetch_one(&mut **tx)
        .await?;
    Ok(id)
}

// Classifica violações de constraint a partir do nome da constraint.
pub(crate) fn classify_constraint_violation(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_foreign_key_violation() {
            return AppError::bad_request("object is still referenced or references a missing object");
        }
        if db_err.is_unique_violation() {
            if let Some(constraint) = db_err.constraint() {
                return match constraint {
                    // O nome padrão que o Postgres cria para "UNIQUE" na coluna
                    "users_email_key" => AppError::EmailAlreadyExists,
                    "users_phone_key" => AppError::PhoneAlreadyExists,
                    _ => AppError::UniqueConstraintViolation(constraint.to_string()),
                };
            }
        }
    }
    err.into()
}
