// File: cmdext-core/src/repositories/sqlite/scheduled_tasks.rs

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use cmdext_common::error::Error;
use cmdext_common::models::{NewScheduledTask, ScheduledTask};
use cmdext_common::traits::repository_traits::ScheduledTaskRepository;

pub struct SqliteScheduledTaskRepository {
    pub pool: Pool<Sqlite>,
}

impl SqliteScheduledTaskRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

fn row_to_task(r: &SqliteRow) -> Result<ScheduledTask, Error> {
    Ok(ScheduledTask {
        id: r.try_get("Id")?,
        task_name: r.try_get("TaskName")?,
        message: r.try_get("Message")?,
        interval_minutes: r.try_get("IntervalMinutes")?,
        is_enabled: r.try_get("IsEnabled")?,
        created_at: r.try_get("CreatedAt")?,
        updated_at: r.try_get("UpdatedAt")?,
    })
}

#[async_trait]
impl ScheduledTaskRepository for SqliteScheduledTaskRepository {
    async fn list_enabled_tasks(&self) -> Result<Vec<ScheduledTask>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT Id, TaskName, Message, IntervalMinutes, IsEnabled, CreatedAt, UpdatedAt
            FROM ScheduledTasks
            WHERE IsEnabled = 1
            ORDER BY Id ASC
            "#,
        )
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_task).collect()
    }

    async fn list_all_tasks(&self) -> Result<Vec<ScheduledTask>, Error> {
        let rows = sqlx::query(
            r#"
            SELECT Id, TaskName, Message, IntervalMinutes, IsEnabled, CreatedAt, UpdatedAt
            FROM ScheduledTasks
            ORDER BY Id ASC
            "#,
        )
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(row_to_task).collect()
    }

    async fn insert_task(&self, task: &NewScheduledTask) -> Result<i64, Error> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO ScheduledTasks (TaskName, Message, IntervalMinutes, IsEnabled, CreatedAt, UpdatedAt)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
            .bind(&task.task_name)
            .bind(&task.message)
            .bind(task.interval_minutes)
            .bind(task.is_enabled)
            .bind(now)
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.last_insert_rowid())
    }

    async fn delete_task(&self, id: i64) -> Result<(), Error> {
        sqlx::query("DELETE FROM ScheduledTasks WHERE Id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
