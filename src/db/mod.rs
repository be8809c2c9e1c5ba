pub mod repository;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::{NewTask, Task, TaskChanges};

pub use repository::SqliteTaskStore;

/// Persistence seam for task records.
///
/// `update` and `delete` are scoped to the owner; `None` means no task with
/// that id belongs to `owner`.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn create(&self, task: NewTask) -> Result<Task, AppError>;

    /// Tasks owned by `owner`, oldest first.
    async fn find_by_owner(&self, owner: &str) -> Result<Vec<Task>, AppError>;

    async fn update(
        &self,
        id: &str,
        owner: &str,
        changes: TaskChanges,
    ) -> Result<Option<Task>, AppError>;

    async fn delete(&self, id: &str, owner: &str) -> Result<Option<Task>, AppError>;

    async fn ping(&self) -> Result<(), AppError>;
}
