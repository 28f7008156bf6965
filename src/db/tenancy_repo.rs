// src/db/tenancy_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::{
        db_utils::{
            classify_constraint_violation, next_id, sequence_code, ORGANIZATION_CODE_PREFIX,
            ROLE_CODE_PREFIX,
        },
        error::AppError,
    },
    models::{
        auth::{NewAccount, User},
        rbac::Role,
        tenancy::{NewOrganization, Organization},
    },
};

/// Nome do cargo criado junto com a organização.
pub const ORG_ADMIN_ROLE_NAME: &str = "Org Admin";

#[async_trait]
pub trait OrganizationStore: Send + Sync {
    async fn get_by_id(&self, id: i64) -> Result<Organization, AppError>;
    async fn get_by_code(&self, code: &str) -> Result<Organization, AppError>;
    async fn get_many(&self, ids: &[i64]) -> Result<Vec<Organization>, AppError>;
    async fn list(&self) -> Result<Vec<Organization>, AppError>;
    async fn update(&self, organization: &Organization) -> Result<Organization, AppError>;
    async fn delete(&self, id: i64) -> Result<(), AppError>;

    /// Cria a organização, o cargo de administrador dela e o primeiro membro,
    /// tudo ou nada.
    async fn register(
        &self,
        organization: NewOrganization,
        owner: NewAccount,
    ) -> Result<(Organization, Role, User), AppError>;
}

#[derive(Clone)]
pub struct TenantRepository {
    pool: PgPool,
}

impl TenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrganizationStore for TenantRepository {
    async fn get_by_id(&self, id: i64) -> Result<Organization, AppError> {
        sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("no organization found"))
    }

    async fn get_by_code(&self, code: &str) -> Result<Organization, AppError> {
        sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("no organization found"))
    }

    async fn get_many(&self, ids: &[i64]) -> Result<Vec<Organization>, AppError> {
        let organizations =
            sqlx::query_as::<_, Organization>("SELECT * FROM organizations WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(&self.pool)
                .await?;
        Ok(organizations)
    }

    async fn list(&self) -> Result<Vec<Organization>, AppError> {
        let organizations =
            sqlx::query_as::<_, Organization>("SELECT * FROM organizations ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        Ok(organizations)
    }

    async fn update(&self, organization: &Organization) -> Result<Organization, AppError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Organization>(
            r#"
            UPDATE organizations
            SET name = $2, website = $3, is_archived = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(organization.id)
        .bind(&organization.name)
        .bind(&organization.website)
        .bind(organization.is_archived)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found("no organization found"))?;

        tx.commit().await?;
        tracing::debug!(organization_id = updated.id, "organização atualizada");
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM organizations WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(classify_constraint_violation)?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("no organization found"));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn register(
        &self,
        organization: NewOrganization,
        owner: NewAccount,
    ) -> Result<(Organization, Role, User), AppError> {
        // 1. Inicia Transação (rollback automático no drop se algo falhar)
        let mut tx = self.pool.begin().await?;

        // 2. Cria a Organização
        let org_id = next_id(&mut tx, "organizations").await?;
        let org = sqlx::query_as::<_, Organization>(
            r#"
            INSERT INTO organizations (id, code, name, website)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(org_id)
        .bind(sequence_code(ORGANIZATION_CODE_PREFIX, org_id))
        .bind(&organization.name)
        .bind(&organization.website)
        .fetch_one(&mut *tx)
        .await
        .map_err(classify_constraint_violation)?;

        // 3. Cria o Cargo de administrador da organização
        let role_id = next_id(&mut tx, "roles").await?;
        let role = sqlx::query_as::<_, Role>(
            r#"
            INSERT INTO roles (id, code, name, permissions, is_org_admin, organization_id)
            VALUES ($1, $2, $3, '{}', TRUE, $4)
            RETURNING *
            "#,
        )
        .bind(role_id)
        .bind(sequence_code(ROLE_CODE_PREFIX, role_id))
        .bind(ORG_ADMIN_ROLE_NAME)
        .bind(org.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(classify_constraint_violation)?;

        // 4. Cria o Membro dono da organização
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                first_name, last_name, email, phone, password_hash,
                is_member, organization_id, role_id
            )
            VALUES ($1, $2, $3, $4, $5, TRUE, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&owner.first_name)
        .bind(&owner.last_name)
        .bind(&owner.email)
        .bind(&owner.phone)
        .bind(&owner.password_hash)
        .bind(org.id)
        .bind(role.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(classify_constraint_violation)?;

        // 5. Commit
        tx.commit().await?;
        tracing::debug!(organization_id = org.id, user_id = user.id, "organização registrada");

        Ok((org, role, user))
    }
}
