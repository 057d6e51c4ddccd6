use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth;
use crate::database::models::user::{NewUser, UserChanges};
use crate::database::models::User;
use crate::database::resource::USERS;
use crate::error::ApiError;
use crate::filter::{Filter, Page};

const USER_COLUMNS: &str =
    "id, name, email, role, password_hash, reset_password_token, reset_password_expire, created_at";

pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: &PgPool) -> Self {
        Self { pool: pool.clone() }
    }

    pub async fn find(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE lower(email) = lower($1)",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn get_json(&self, id: Uuid) -> Result<Value, ApiError> {
        super::fetch_json(&self.pool, &USERS, id, &[])
            .await?
            .ok_or_else(|| ApiError::not_found(format!("No user with the id of {}", id)))
    }

    pub async fn list(&self, filter: Filter) -> Result<Page<Value>, ApiError> {
        super::fetch_page(&self.pool, filter).await
    }

    /// Inserts a user, hashing the plain-text password first.
    pub async fn create(&self, new: NewUser) -> Result<User, ApiError> {
        let password_hash = auth::hash_password(new.password).await?;
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, name, email, role, password_hash) VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&new.name)
        .bind(&new.email)
        .bind(new.role.as_str())
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;
        tracing::info!(user = %user.id, role = %new.role, "User created");
        Ok(user)
    }

    pub async fn update(&self, id: Uuid, changes: UserChanges) -> Result<User, ApiError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET name = COALESCE($2, name), email = COALESCE($3, email), \
             role = COALESCE($4, role) WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(id)
        .bind(changes.name)
        .bind(changes.email)
        .bind(changes.role.map(|r| r.as_str()))
        .fetch_optional(&self.pool)
        .await?;
        user.ok_or_else(|| ApiError::not_found(format!("No user with the id of {}", id)))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ApiError::not_found(format!("No user with the id of {}", id)));
        }
        tracing::info!(user = %id, "User deleted");
        Ok(())
    }

    /// Stores a new password and drops any outstanding reset token.
    pub async fn set_password(&self, id: Uuid, password: String) -> Result<User, ApiError> {
        let password_hash = auth::hash_password(password).await?;
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET password_hash = $2, reset_password_token = NULL, reset_password_expire = NULL \
             WHERE id = $1 RETURNING {}",
            USER_COLUMNS
        ))
        .bind(id)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn set_reset_token(
        &self,
        id: Uuid,
        hashed: Option<&str>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), ApiError> {
        sqlx::query("UPDATE users SET reset_password_token = $2, reset_password_expire = $3 WHERE id = $1")
            .bind(id)
            .bind(hashed)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// The user holding an unexpired reset token with this hash.
    pub async fn find_by_reset_token(&self, hashed: &str) -> Result<Option<User>, ApiError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE reset_password_token = $1 AND reset_password_expire > now()",
            USER_COLUMNS
        ))
        .bind(hashed)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }
}
