use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::db::TaskStore;
use crate::error::AppError;
use crate::models::{NewTask, Task, TaskChanges};

const TASK_COLUMNS: &str =
    "id, task_name, date, description, completed, created_by, created_at, updated_at";

fn timestamp() -> String {
    // fixed precision keeps the text column sortable
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

#[derive(Clone)]
pub struct SqliteTaskStore {
    db: SqlitePool,
}

impl SqliteTaskStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations").run(&self.db).await?;
        Ok(())
    }
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    async fn create(&self, task: NewTask) -> Result<Task, AppError> {
        let id = Uuid::new_v4().to_string();
        let now = timestamp();

        sqlx::query(
            r#"
            INSERT INTO tasks
                (id, task_name, date, description, completed,
                created_by, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&id)
        .bind(&task.task_name)
        .bind(&task.date)
        .bind(&task.description)
        .bind(&task.completed)
        .bind(&task.created_by)
        .bind(&now)
        .bind(&now)
        .execute(&self.db)
        .await?;

        debug!("inserted task {} for {}", id, task.created_by);

        Ok(Task {
            id,
            task_name: task.task_name,
            date: task.date,
            description: task.description,
            completed: task.completed,
            created_by: task.created_by,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    async fn find_by_owner(&self, owner: &str) -> Result<Vec<Task>, AppError> {
        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE created_by = ?1 ORDER BY created_at ASC, rowid ASC",
            TASK_COLUMNS
        ))
        .bind(owner)
        .fetch_all(&self.db)
        .await?;

        Ok(tasks)
    }

    async fn update(
        &self,
        id: &str,
        owner: &str,
        changes: TaskChanges,
    ) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET task_name = COALESCE(?1, task_name),
                date = COALESCE(?2, date),
                description = COALESCE(?3, description),
                completed = COALESCE(?4, completed),
                updated_at = ?5
            WHERE id = ?6 AND created_by = ?7
            RETURNING {}
            "#,
            TASK_COLUMNS
        ))
        .bind(changes.task_name)
        .bind(changes.date)
        .bind(changes.description)
        .bind(changes.completed)
        .bind(timestamp())
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.db)
        .await?;

        Ok(task)
    }

    async fn delete(&self, id: &str, owner: &str) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "DELETE FROM tasks WHERE id = ?1 AND created_by = ?2 RETURNING {}",
            TASK_COLUMNS
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.db)
        .await?;

        Ok(task)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("select 1").execute(&self.db).await?;
        Ok(())
    }
}
