// src/db/user_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{db_utils::classify_constraint_violation, error::AppError},
    models::auth::{AutherKind, NewAccount, NewUser, Profile, User, UserFilter},
};

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn get_by_id(&self, id: i64) -> Result<User, AppError>;
    async fn get_by_email(&self, email: &str) -> Result<User, AppError>;
    async fn get_by_phone(&self, phone: &str) -> Result<User, AppError>;
    async fn get_many(&self, ids: &[i64]) -> Result<Vec<User>, AppError>;
    async fn list(&self, filter: UserFilter) -> Result<Vec<User>, AppError>;
    /// Membros de uma organização.
    async fn list_by_org_id(&self, organization_id: i64) -> Result<Vec<User>, AppError>;
    async fn insert(&self, user: NewUser) -> Result<User, AppError>;
    /// Cria cliente e perfil na mesma transação.
    async fn insert_customer(&self, account: NewAccount) -> Result<(User, Profile), AppError>;
    async fn update(&self, user: &User) -> Result<User, AppError>;
    async fn update_password(&self, id: i64, password_hash: &str) -> Result<(), AppError>;
    async fn delete(&self, id: i64) -> Result<(), AppError>;
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_by_user_id(&self, user_id: i64) -> Result<Profile, AppError>;
    async fn get_many(&self, user_ids: &[i64]) -> Result<Vec<Profile>, AppError>;
}

// Código de indicação do cliente: 10 caracteres aleatórios em maiúsculas.
pub(crate) fn referral_code() -> String {
    Uuid::new_v4().simple().to_string()[..10].to_uppercase()
}

// O repositório de usuários, responsável por todas as interações com as tabelas 'users' e 'profiles'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, value: &str) -> Result<User, AppError> {
        // `column` nunca vem do cliente: só os literais abaixo chegam aqui
        let sql = format!("SELECT * FROM users WHERE {} = $1", column);
        sqlx::query_as::<_, User>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("user not found"))
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn get_by_id(&self, id: i64) -> Result<User, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("user not found"))
    }

    async fn get_by_email(&self, email: &str) -> Result<User, AppError> {
        self.find_one("email", email).await
    }

    async fn get_by_phone(&self, phone: &str) -> Result<User, AppError> {
        self.find_one("phone", phone).await
    }

    async fn get_many(&self, ids: &[i64]) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn list(&self, filter: UserFilter) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE NOT ($1 OR $2 OR $3)
               OR ($1 AND is_admin)
               OR ($2 AND is_member)
               OR ($3 AND is_customer)
            ORDER BY id
            "#,
        )
        .bind(filter.is_admin)
        .bind(filter.is_member)
        .bind(filter.is_customer)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn list_by_org_id(&self, organization_id: i64) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE is_member AND organization_id = $1 ORDER BY id",
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    // Cria um novo usuário no banco de dados
    // Com tratamento de erro específico para e-mail e telefone duplicados.
    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        let mut tx = self.pool.begin().await?;

        let (organization_id, role_id) = match user.kind {
            AutherKind::Member { organization_id, role_id } => (Some(organization_id), Some(role_id)),
            _ => (None, None),
        };

        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                first_name, last_name, email, phone, password_hash,
                is_admin, is_member, is_customer, organization_id, role_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(&user.account.first_name)
        .bind(&user.account.last_name)
        .bind(&user.account.email)
        .bind(&user.account.phone)
        .bind(&user.account.password_hash)
        .bind(matches!(user.kind, AutherKind::Admin))
        .bind(matches!(user.kind, AutherKind::Member { .. }))
        .bind(matches!(user.kind, AutherKind::Customer))
        .bind(organization_id)
        .bind(role_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(classify_constraint_violation)?;

        tx.commit().await?;
        tracing::debug!(user_id = created.id, "usuário criado");
        Ok(created)
    }

    async fn insert_customer(&self, account: NewAccount) -> Result<(User, Profile), AppError> {
        // 1. Inicia Transação
        let mut tx = self.pool.begin().await?;

        // 2. Cria o Usuário
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (first_name, last_name, email, phone, password_hash, is_customer)
            VALUES ($1, $2, $3, $4, $5, TRUE)
            RETURNING *
            "#,
        )
        .bind(&account.first_name)
        .bind(&account.last_name)
        .bind(&account.email)
        .bind(&account.phone)
        .bind(&account.password_hash)
        .fetch_one(&mut *tx)
        .await
        .map_err(classify_constraint_violation)?;

        // 3. Cria o Perfil (se falhar, o usuário acima é desfeito)
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (user_id, referral_code)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(referral_code())
        .fetch_one(&mut *tx)
        .await
        .map_err(classify_constraint_violation)?;

        // 4. Commit
        tx.commit().await?;
        Ok((user, profile))
    }

    async fn update(&self, user: &User) -> Result<User, AppError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET first_name = $2, last_name = $3, email = $4, phone = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.phone)
        .fetch_optional(&mut *tx)
        .await
        .map_err(classify_constraint_violation)?
        .ok_or_else(|| AppError::not_found("user not found"))?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("user not found"));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(classify_constraint_violation)?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found("user not found"));
        }

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl ProfileStore for UserRepository {
    async fn get_by_user_id(&self, user_id: i64) -> Result<Profile, AppError> {
        sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("no profile found"))
    }

    async fn get_many(&self, user_ids: &[i64]) -> Result<Vec<Profile>, AppError> {
        let profiles =
            sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE user_id = ANY($1)")
                .bind(user_ids)
                .fetch_all(&self.pool)
                .await?;
        Ok(profiles)
    }
}
