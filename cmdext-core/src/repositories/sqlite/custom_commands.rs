// File: cmdext-core/src/repositories/sqlite/custom_commands.rs

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use cmdext_common::error::Error;
use cmdext_common::models::{CustomCommand, NewCustomCommand};
use cmdext_common::traits::repository_traits::CustomCommandRepository;

pub struct SqliteCustomCommandRepository {
    pub pool: Pool<Sqlite>,
}

impl SqliteCustomCommandRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

fn row_to_command(r: &SqliteRow) -> Result<CustomCommand, Error> {
    Ok(CustomCommand {
        id: r.try_get("Id")?,
        command_name: r.try_get("CommandName")?,
        response: r.try_get("Response")?,
        required_role: r.try_get("RequiredRole")?,
        user_cooldown_seconds: r.try_get("UserCooldownSeconds")?,
        global_cooldown_seconds: r.try_get("GlobalCooldownSeconds")?,
        is_enabled: r.try_get("IsEnabled")?,
        created_at: r.try_get("CreatedAt")?,
        updated_at: r.try_get("UpdatedAt")?,
    })
}

#[async_trait]
impl CustomCommandRepository for SqliteCustomCommandRepository {
    async fn list_enabled_commands(&self) -> Result<Vec<CustomCommand>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT
                Id,
                CommandName,
                Response,
                RequiredRole,
                UserCooldownSeconds,
                GlobalCooldownSeconds,
                IsEnabled,
                CreatedAt,
                UpdatedAt
            FROM CustomCommands
            WHERE IsEnabled = 1
            ORDER BY Id ASC
            "#,
        )
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_command).collect()
    }

    async fn list_all_commands(&self) -> Result<Vec<CustomCommand>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT
                Id,
                CommandName,
                Response,
                RequiredRole,
                UserCooldownSeconds,
                GlobalCooldownSeconds,
                IsEnabled,
                CreatedAt,
                UpdatedAt
            FROM CustomCommands
            ORDER BY Id ASC
            "#,
        )
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_command).collect()
    }

    async fn insert_command(&self, cmd: &NewCustomCommand) -> Result<i64, Error> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO CustomCommands (
                CommandName,
                Response,
                RequiredRole,
                UserCooldownSeconds,
                GlobalCooldownSeconds,
                IsEnabled,
                CreatedAt,
                UpdatedAt
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
            .bind(&cmd.command_name)
            .bind(&cmd.response)
            .bind(cmd.required_role.as_str())
            .bind(cmd.user_cooldown_seconds)
            .bind(cmd.global_cooldown_seconds)
            .bind(cmd.is_enabled)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    async fn delete_command(&self, id: i64) -> Result<(), Error> {
        sqlx::query("DELETE FROM CustomCommands WHERE Id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
