// src/db/inventory_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{
            classify_constraint_violation, next_id, sequence_code, CONTAINER_CODE_PREFIX,
            PALLET_CODE_PREFIX,
        },
        error::AppError,
    },
    models::inventory::{Container, NewContainer, NewPallet, Pallet},
};

#[async_trait]
pub trait ContainerStore: Send + Sync {
    async fn get_by_id(&self, id: i64) -> Result<Container, AppError>;
    async fn get_by_uid(&self, uid: Uuid) -> Result<Container, AppError>;
    async fn get_by_code(&self, code: &str) -> Result<Container, AppError>;
    async fn get_many(&self, ids: &[i64]) -> Result<Vec<Container>, AppError>;
    async fn list(&self) -> Result<Vec<Container>, AppError>;
    async fn list_by_org_id(&self, organization_id: i64) -> Result<Vec<Container>, AppError>;
    async fn insert(&self, container: NewContainer) -> Result<Container, AppError>;
    async fn update(&self, container: &Container) -> Result<Container, AppError>;
    async fn delete(&self, id: i64) -> Result<(), AppError>;
}

#[async_trait]
pub trait PalletStore: Send + Sync {
    async fn get_by_id(&self, id: i64) -> Result<Pallet, AppError>;
    async fn get_by_uid(&self, uid: Uuid) -> Result<Pallet, AppError>;
    async fn get_by_code(&self, code: &str) -> Result<Pallet, AppError>;
    async fn list(&self) -> Result<Vec<Pallet>, AppError>;
    async fn list_by_org_id(&self, organization_id: i64) -> Result<Vec<Pallet>, AppError>;
    async fn list_by_container_id(&self, container_id: i64) -> Result<Vec<Pallet>, AppError>;
    async fn list_by_container_ids(&self, container_ids: &[i64]) -> Result<Vec<Pallet>, AppError>;
    async fn insert(&self, pallet: NewPallet) -> Result<Pallet, AppError>;
    async fn update(&self, pallet: &Pallet) -> Result<Pallet, AppError>;
    async fn delete(&self, id: i64) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct InventoryRepository {
    pool: PgPool,
}

impl InventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// ---
// Contêineres
// ---
#[async_trait]
impl ContainerStore for InventoryRepository {
    async fn get_by_id(&self, id: i64) -> Result<Container, AppError> {
        sqlx::query_as::<_, Container>("SELECT * FROM containers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("no container found"))
    }

    async fn get_by_uid(&self, uid: Uuid) -> Result<Container, AppError> {
        sqlx::query_as::<_, Container>("SELECT * FROM containers WHERE uid = $1")
            .bind(uid)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("no container found"))
    }

    async fn get_by_code(&self, code: &str) -> Result<Container, AppError> {
        sqlx::query_as::<_, Container>("SELECT * FROM containers WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("no container found"))
    }

    async fn get_many(&self, ids: &[i64]) -> Result<Vec<Container>, AppError> {
        let containers =
            sqlx::query_as::<_, Container>("SELECT * FROM containers WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(&self.pool)
                .await?;
        Ok(containers)
    }

    async fn list(&self) -> Result<Vec<Container>, AppError> {
        let containers = sqlx::query_as::<_, Container>("SELECT * FROM containers ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(containers)
    }

    async fn list_by_org_id(&self, organization_id: i64) -> Result<Vec<Container>, AppError> {
        let containers = sqlx::query_as::<_, Container>(
            "SELECT * FROM containers WHERE organization_id = $1 ORDER BY id",
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(containers)
    }

    async fn insert(&self, container: NewContainer) -> Result<Container, AppError> {
        // 1. Inicia Transação
        let mut tx = self.pool.begin().await?;

        // 2. Reserva o id e deriva o código (CNT00001)
        let id = next_id(&mut tx, "containers").await?;

        // 3. Cria o Contêiner
        let created = sqlx::query_as::<_, Container>(
            r#"
            INSERT INTO containers (id, uid, code, description, organization_id, created_by_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Uuid::new_v4())
        .bind(sequence_code(CONTAINER_CODE_PREFIX, id))
        .bind(&container.description)
        .bind(container.organization_id)
        .bind(container.created_by_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(classify_constraint_violation)?;

        // 4. Commit
        tx.commit().await?;
        tracing::debug!(container_id = created.id, code = %created.code, "contêiner criado");
        Ok(created)
    }

    async fn update(&self, container: &Container) -> Result<Container, AppError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Container>(
            r#"
            UPDATE containers
            SET description = $2, is_archived = $3, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(container.id)
        .bind(&container.description)
        .bind(container.is_archived)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::not_found("no container found"))?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM containers WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(classify_constraint_violation)?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("no container found"));
        }

        tx.commit().await?;
        Ok(())
    }
}

// ---
// Paletes
// ---
#[async_trait]
impl PalletStore for InventoryRepository {
    async fn get_by_id(&self, id: i64) -> Result<Pallet, AppError> {
        sqlx::query_as::<_, Pallet>("SELECT * FROM pallets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("no pallet found"))
    }

    async fn get_by_uid(&self, uid: Uuid) -> Result<Pallet, AppError> {
        sqlx::query_as::<_, Pallet>("SELECT * FROM pallets WHERE uid = $1")
            .bind(uid)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("no pallet found"))
    }

    async fn get_by_code(&self, code: &str) -> Result<Pallet, AppError> {
        sqlx::query_as::<_, Pallet>("SELECT * FROM pallets WHERE code = $1")
            .bind(code)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("no pallet found"))
    }

    async fn list(&self) -> Result<Vec<Pallet>, AppError> {
        let pallets = sqlx::query_as::<_, Pallet>("SELECT * FROM pallets ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(pallets)
    }

    async fn list_by_org_id(&self, organization_id: i64) -> Result<Vec<Pallet>, AppError> {
        let pallets = sqlx::query_as::<_, Pallet>(
            "SELECT * FROM pallets WHERE organization_id = $1 ORDER BY id",
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(pallets)
    }

    async fn list_by_container_id(&self, container_id: i64) -> Result<Vec<Pallet>, AppError> {
        let pallets = sqlx::query_as::<_, Pallet>(
            "SELECT * FROM pallets WHERE container_id = $1 ORDER BY id",
        )
        .bind(container_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(pallets)
    }

    async fn list_by_container_ids(&self, container_ids: &[i64]) -> Result<Vec<Pallet>, AppError> {
        let pallets = sqlx::query_as::<_, Pallet>(
            "SELECT * FROM pallets WHERE container_id = ANY($1) ORDER BY id",
        )
        .bind(container_ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(pallets)
    }

    async fn insert(&self, pallet: NewPallet) -> Result<Pallet, AppError> {
        // 1. Inicia Transação
        let mut tx = self.pool.begin().await?;

        // 2. Reserva o id e deriva o código (PLT00001)
        let id = next_id(&mut tx, "pallets").await?;

        // 3. Cria o Palete
        let created = sqlx::query_as::<_, Pallet>(
            r#"
            INSERT INTO pallets (
                id, uid, code, description, organization_id, container_id, created_by_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Uuid::new_v4())
        .bind(sequence_code(PALLET_CODE_PREFIX, id))
        .bind(&pallet.description)
        .bind(pallet.organization_id)
        .bind(pallet.container_id)
        .bind(pallet.created_by_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(classify_constraint_violation)?;

        // 4. Commit
        tx.commit().await?;
        tracing::debug!(pallet_id = created.id, code = %created.code, "palete criado");
        Ok(created)
    }

    async fn update(&self, pallet: &Pallet) -> Result<Pallet, AppError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Pallet>(
            r#"
            UPDATE pallets
            SET description = $2, container_id = $3, is_archived = $4, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(pallet.id)
        .bind(&pallet.description)
        .bind(pallet.container_id)
        .bind(pallet.is_archived)
        .fetch_optional(&mut *tx)
        .await
        .map_err(classify_constraint_violation)?
        .ok_or_else(|| AppError::not_found("no pallet found"))?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM pallets WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(classify_constraint_violation)?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("no pallet found"));
        }

        tx.commit().await?;
        Ok(())
    }
}
