use serde_json::Value;
use sqlx::{Executor, Sqlite, SqlitePool};

use super::{EntityStore, not_found, write_error};
use crate::error::Result;
use crate::models::{EntityKind, Record, User};

const SELECT_USERS: &str = r#"
    SELECT id, first_name, last_name, age, email, role, phone
    FROM users
"#;

pub(super) async fn fetch_all(pool: &SqlitePool) -> sqlx::Result<Vec<User>> {
    sqlx::query_as::<_, User>(&format!("{SELECT_USERS} ORDER BY id"))
        .fetch_all(pool)
        .await
}

pub(super) async fn fetch_one(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<User>> {
    sqlx::query_as::<_, User>(&format!("{SELECT_USERS} WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Inserts `user`, replacing whatever was stored under the same id.
pub(super) async fn upsert<'e, E>(executor: E, user: &User) -> sqlx::Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO users (id, first_name, last_name, age, email, role, phone)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            first_name = excluded.first_name,
            last_name = excluded.last_name,
            age = excluded.age,
            email = excluded.email,
            role = excluded.role,
            phone = excluded.phone
        "#,
    )
    .bind(user.id)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(user.age)
    .bind(&user.email)
    .bind(&user.role)
    .bind(&user.phone)
    .execute(executor)
    .await?;

    Ok(())
}

// ========== User Operations ==========

impl EntityStore {
    pub async fn list_users(&self) -> Result<Vec<User>> {
        let _guard = self.users.read().await;
        Ok(fetch_all(&self.db).await?)
    }

    pub async fn create_user(&self, user: &User) -> Result<()> {
        let _guard = self.users.write().await;
        upsert(&*self.db, user).await?;
        Ok(())
    }

    pub async fn get_user(&self, id: i64) -> Result<User> {
        let _guard = self.users.read().await;
        fetch_one(&self.db, id)
            .await?
            .ok_or_else(|| not_found(EntityKind::User, id))
    }

    /// Replaces every field of user `id`, including the id itself.
    pub async fn update_user(&self, id: i64, payload: Value) -> Result<()> {
        let user = User::from_payload(payload)?;

        let _guard = self.users.write().await;
        let result = sqlx::query(
            r#"
            UPDATE users
            SET id = ?, first_name = ?, last_name = ?, age = ?, email = ?, role = ?, phone = ?
            WHERE id = ?
            "#,
        )
        .bind(user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.age)
        .bind(&user.email)
        .bind(&user.role)
        .bind(&user.phone)
        .bind(id)
        .execute(&*self.db)
        .await
        .map_err(write_error(EntityKind::User, user.id))?;

        if result.rows_affected() == 0 {
            return Err(not_found(EntityKind::User, id));
        }
        Ok(())
    }

    pub async fn delete_user(&self, id: i64) -> Result<()> {
        let _guard = self.users.write().await;
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(EntityKind::User, id));
        }
        Ok(())
    }
}
