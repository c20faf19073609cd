use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::{Result, StorageError};
use crate::models::{NormalizedEmail, User, UserRole};

pub struct UserRepository<'c> {
    conn: &'c mut PgConnection,
}

impl<'c> UserRepository<'c> {
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn find_by_id(&mut self, user_id: Uuid) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, name, email, role, created_at
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or(StorageError::NotFound)
    }

    /// Lock the user row for the rest of the transaction.
    pub async fn lock_by_id(&mut self, user_id: Uuid) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, name, email, role, created_at
            FROM users
            WHERE user_id = $1
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or(StorageError::NotFound)
    }

    pub async fn create(
        &mut self,
        name: &str,
        email: &NormalizedEmail,
        role: UserRole,
    ) -> Result<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, role)
            VALUES ($1, $2, $3)
            RETURNING user_id, name, email, role, created_at
            "#,
        )
        .bind(name)
        .bind(email.as_str())
        .bind(role.as_str())
        .fetch_one(&mut *self.conn)
        .await
        .map_err(|e| StorageError::from(e).on_unique_violation("Email already registered"))
    }

    pub async fn update_role(&mut self, user_id: Uuid, role: UserRole) -> Result<()> {
        let result = sqlx::query("UPDATE users SET role = $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(role.as_str())
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}
