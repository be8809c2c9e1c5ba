pub mod task;

pub use task::{
    CreateTaskRequest, NewTask, Task, TaskChanges, TaskListResponse, TaskResponse,
    UpdateTaskRequest, parse_task_date,
};
