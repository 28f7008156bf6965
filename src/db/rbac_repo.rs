// src/db/rbac_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::{
        db_utils::{classify_constraint_violation, next_id, sequence_code, ROLE_CODE_PREFIX},
        error::AppError,
    },
    models::rbac::{NewRole, Role},
};

#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn get_by_id(&self, id: i64) -> Result<Role, AppError>;
    async fn get_by_code(&self, code: &str) -> Result<Role, AppError>;
    async fn get_many(&self, ids: &[i64]) -> Result<Vec<Role>, AppError>;
    async fn list_all(&self) -> Result<Vec<Role>, AppError>;
    async fn list_by_org_id(&self, organization_id: i64) -> Result<Vec<Role>, AppError>;
    async fn insert(&self, role: NewRole) -> Result<Role, AppError>;
    async fn update(&self, role: &Role) -> Result<Role, AppError>;
    async fn delete(&self, id: i64) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct RbacRepository {
    pool: PgPool,
}

impl RbacRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleStore for RbacRepository {
    async fn get_by_id(&self, id: i64) -> Result<Role, AppError> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("no role found"))
    }

    async fn get_by_code(&self, code: &str) -> Result<Role, AppError> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("no role found"))
    }

    async fn get_many(&self, ids: &[i64]) -> Result<Vec<Role>, AppError> {
        let roles = sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(roles)
    }

    async fn list_all(&self) -> Result<Vec<Role>, AppError> {
        let roles = sqlx::query_as::<_, Role>("SELECT * FROM roles ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(roles)
    }

    async fn list_by_org_id(&self, organization_id: i64) -> Result<Vec<Role>, AppError> {
        let roles = sqlx::query_as::<_, Role>(
            "SELECT * FROM roles WHERE organization_id = $1 ORDER BY id",
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(roles)
    }

    async fn insert(&self, role: NewRole) -> Result<Role, AppError> {
        // 1. Inicia Transação
        let mut tx = self.pool.begin().await?;

        // 2. Reserva o id e deriva o código (ROLE00001)
        let id = next_id(&mut tx, "roles").await?;

        // 3. Cria o Cargo
        let created = sqlx::query_as::<_, Role>(
            r#"
            INSERT INTO roles (id, code, name, permissions, is_org_admin, organization_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(sequence_code(ROLE_CODE_PREFIX, id))
        .bind(&role.name)
        .bind(&role.permissions)
        .bind(role.is_org_admin)
        .bind(role.organization_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(classify_constraint_violation)?;

        // 4. Commit
        tx.commit().await?;
        tracing::debug!(role_id = created.id, code = %created.code, "cargo criado");
        Ok(created)
    }

    async fn update(&self, role: &Role) -> Result<Role, AppError> {
        let mut tx = self.pool.begin().await?;

        // organization_id é imutável: não entra no SET
        let updated = sqlx::query_as::<_, Role>(
            r#"
            UPDATE roles
            SET name = $2, permissions = $3, is_archived = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(role.id)
        .bind(&role.name)
        .bind(&role.permissions)
        .bind(role.is_archived)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found("no role found"))?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(classify_constraint_violation)?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("no role found"));
        }

        tx.commit().await?;
        Ok(())
    }
}
