use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub task_name: String,
    pub date: String,
    pub description: String,
    pub completed: String,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Body of `POST /tasks`. Any `createdBy` sent by the client is dropped.
///
/// Fields stay untyped until validation so that `null`, `false` or `0`
/// count as missing instead of failing deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub task_name: Option<Value>,
    pub date: Option<Value>,
    pub description: Option<Value>,
    pub completed: Option<Value>,
}

/// Validated insert input, owner already attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub task_name: String,
    pub date: String,
    pub description: String,
    pub completed: String,
    pub created_by: String,
}

/// Body of `PATCH`/`PUT /tasks/{id}`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub task_name: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
    pub completed: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    pub task_name: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
    pub completed: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskResponse {
    pub task: Task,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,
    pub count: usize,
}

impl From<Vec<Task>> for TaskListResponse {
    fn from(tasks: Vec<Task>) -> Self {
        let count = tasks.len();
        Self { tasks, count }
    }
}

fn non_blank(value: Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        _ => None,
    }
}

fn is_json(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(str::trim)
        .is_some_and(|mime| mime == "application/json" || mime.ends_with("+json"))
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (taken as a UTC date).
pub fn parse_task_date(raw: &str) -> Result<NaiveDate, AppError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc).date_naive()))
        .map_err(|_| AppError::Validation(format!("Invalid date: {}", raw)))
}

impl CreateTaskRequest {
    /// A body that is empty or not JSON is read as `{}`.
    pub fn from_body(content_type: Option<&str>, body: &[u8]) -> Result<Self, AppError> {
        if !is_json(content_type) || body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        serde_json::from_slice(body)
            .map_err(|e| AppError::Validation(format!("Invalid JSON body: {}", e)))
    }

    pub fn into_new_task(self, owner: &str) -> Result<NewTask, AppError> {
        let (Some(task_name), Some(date), Some(description), Some(completed)) = (
            non_blank(self.task_name),
            non_blank(self.date),
            non_blank(self.description),
            non_blank(self.completed),
        ) else {
            return Err(AppError::Validation("All fields are required".to_string()));
        };

        let date = parse_task_date(&date)?;

        Ok(NewTask {
            task_name,
            date: date.to_string(),
            description,
            completed,
            created_by: owner.to_string(),
        })
    }
}

impl UpdateTaskRequest {
    pub fn into_changes(self) -> Result<TaskChanges, AppError> {
        if matches!(self.completed.as_deref(), Some(c) if c.trim().is_empty()) {
            return Err(AppError::Validation("Completed Field cannot be empty".to_string()));
        }
        if matches!(self.task_name.as_deref(), Some(n) if n.trim().is_empty()) {
            return Err(AppError::Validation("Task Name cannot be empty".to_string()));
        }
        if matches!(self.description.as_deref(), Some(d) if d.trim().is_empty()) {
            return Err(AppError::Validation("Description cannot be empty".to_string()));
        }

        let date = match self.date {
            Some(raw) => Some(parse_task_date(&raw)?.to_string()),
            None => None,
        };

        Ok(TaskChanges {
            task_name: self.task_name,
            date,
            description: self.description,
            completed: self.completed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_request() -> CreateTaskRequest {
        CreateTaskRequest {
            task_name: Some(Value::from("Buy milk")),
            date: Some(Value::from("2024-01-01")),
            description: Some(Value::from("2%")),
            completed: Some(Value::from("Pending")),
        }
    }

    fn expect_validation(result: Result<TaskChanges, AppError>, expected: &str) {
        match result {
            Err(AppError::Validation(msg)) => assert_eq!(msg, expected),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_into_new_task_attaches_owner() {
        let new_task = full_request().into_new_task("u1").expect("valid request");
        assert_eq!(new_task.created_by, "u1");
        assert_eq!(new_task.task_name, "Buy milk");
        assert_eq!(new_task.date, "2024-01-01");
    }

    #[test]
    fn test_into_new_task_requires_every_field() {
        let strip: [fn(&mut CreateTaskRequest); 4] = [
            |r| r.task_name = None,
            |r| r.date = Some(Value::Null),
            |r| r.description = Some(Value::from("")),
            |r| r.completed = Some(Value::Bool(false)),
        ];

        for f in strip {
            let mut req = full_request();
            f(&mut req);
            match req.into_new_task("u1") {
                Err(AppError::Validation(msg)) => assert_eq!(msg, "All fields are required"),
                other => panic!("expected validation error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_parse_task_date_formats() {
        assert_eq!(
            parse_task_date("2024-03-05").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
        );
        assert_eq!(
            parse_task_date("2024-03-05T23:30:00-02:00").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 6).unwrap()
        );
        assert!(matches!(parse_task_date("tomorrow"), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_update_rejects_empty_completed_first() {
        let req = UpdateTaskRequest {
            task_name: Some(String::new()),
            date: Some("not a date".to_string()),
            description: None,
            completed: Some(String::new()),
        };
        match req.into_changes() {
            Err(AppError::Validation(msg)) => assert_eq!(msg, "Completed Field cannot be empty"),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_update_normalizes_date() {
        let req = UpdateTaskRequest {
            date: Some("2024-06-01T08:00:00Z".to_string()),
            completed: Some("Completed".to_string()),
            ..Default::default()
        };
        let changes = req.into_changes().expect("valid changes");
        assert_eq!(changes.date.as_deref(), Some("2024-06-01"));
        assert_eq!(changes.completed.as_deref(), Some("Completed"));
        assert!(changes.task_name.is_none());
    }

    #[test]
    fn test_into_new_task_treats_falsy_values_as_missing() {
        for falsy in [Value::from(0), Value::Bool(false), Value::Null, Value::from("   ")] {
            let mut req = full_request();
            req.task_name = Some(falsy);
            match req.into_new_task("u1") {
                Err(AppError::Validation(msg)) => assert_eq!(msg, "All fields are required"),
                other => panic!("expected validation error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_from_body_without_json_is_empty_request() {
        let req = CreateTaskRequest::from_body(None, br#"{"taskName":"x"}"#).unwrap();
        assert!(req.task_name.is_none());

        let req = CreateTaskRequest::from_body(Some("application/json"), b"  ").unwrap();
        assert!(req.task_name.is_none() && req.completed.is_none());

        let req = CreateTaskRequest::from_body(
            Some("application/json; charset=utf-8"),
            br#"{"taskName":"x"}"#,
        )
        .unwrap();
        assert_eq!(req.task_name, Some(Value::from("x")));
    }

    #[test]
    fn test_from_body_rejects_broken_json() {
        let result = CreateTaskRequest::from_body(Some("application/json"), b"{not json");
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_update_rejects_empty_task_name() {
        let req = UpdateTaskRequest {
            task_name: Some("  ".to_string()),
            description: Some(String::new()),
            completed: Some("Completed".to_string()),
            ..Default::default()
        };
        expect_validation(req.into_changes(), "Task Name cannot be empty");
    }

    #[test]
    fn test_update_rejects_empty_description() {
        let req = UpdateTaskRequest {
            description: Some(String::new()),
            date: Some("not a date".to_string()),
            ..Default::default()
        };
        expect_validation(req.into_changes(), "Description cannot be empty");
    }

    #[test]
    fn test_update_rejects_invalid_date() {
        let req = UpdateTaskRequest {
            date: Some("31/12/2024".to_string()),
            ..Default::default()
        };
        expect_validation(req.into_changes(), "Invalid date: 31/12/2024");
    }

    #[test]
    fn test_list_response_counts() {
        let resp = TaskListResponse::from(Vec::new());
        assert_eq!(resp.count, 0);
        assert!(resp.tasks.is_empty());
    }
}
