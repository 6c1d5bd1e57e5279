use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Key synonyms accepted in server responses, probed in priority order. The
/// server's field names have drifted across versions, so each value is read
/// under every name it has shipped with.
pub const ID_KEYS: [&str; 3] = ["task_id", "id", "taskId"];
pub const STATUS_KEYS: [&str; 2] = ["status", "state"];
pub const PROGRESS_KEYS: [&str; 2] = ["completed_count", "progress"];

/// Shown for a failed task when the server omits its own message.
pub const GENERIC_FAILURE: &str = "task failed";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    #[default]
    Idle,
    AwaitingCreation,
    Polling,
    Succeeded,
    Failed,
}

impl TaskState {
    /// Terminal states never leave; a new submit or attach is required to
    /// track another task.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Succeeded | TaskState::Failed)
    }
}

/// The client's view of the task it is tracking. `id` stays empty until the
/// server has assigned one; `result_url` is set only once the task succeeded
/// and `error` only once it failed.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TaskSnapshot {
    pub id: Option<String>,
    pub state: TaskState,
    pub progress: Option<String>,
    pub result_url: Option<String>,
    pub error: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl TaskSnapshot {
    pub fn polling(id: String) -> Self {
        Self {
            id: Some(id),
            state: TaskState::Polling,
            created_at: Some(Utc::now()),
            ..Self::default()
        }
    }
}

/// A document handed to `TaskClient::submit`.
#[derive(Clone, Debug)]
pub struct UploadFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// What a parsed status value means for the lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusClass {
    InProgress,
    Done,
    Failed,
}

/// Status values are matched case-insensitively. Anything the server reports
/// outside the known terminal values counts as still in progress.
pub fn classify_status(raw: &str) -> StatusClass {
    match raw.to_ascii_lowercase().as_str() {
        "completed" | "success" | "done" => StatusClass::Done,
        "failed" => StatusClass::Failed,
        _ => StatusClass::InProgress,
    }
}

/// First non-null value found under any of `keys`, in order.
pub fn first_field<'a>(body: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| body.get(key))
        .find(|value| !value.is_null())
}

/// Same as `first_field`, reduced to a display string. Progress arrives as a
/// count, a "3 / 10" style string or a percentage; ids are usually strings
/// but numbers are tolerated. Empty strings count as absent.
pub fn first_display(body: &Value, keys: &[&str]) -> Option<String> {
    match first_field(body, keys)? {
        Value::String(text) if !text.trim().is_empty() => Some(text.clone()),
        Value::Number(num) => Some(num.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classify_matches_done_synonyms() {
        assert_eq!(classify_status("completed"), StatusClass::Done);
        assert_eq!(classify_status("success"), StatusClass::Done);
        assert_eq!(classify_status("done"), StatusClass::Done);
    }

    #[test]
    fn classify_is_case_insensitive() {
        assert_eq!(classify_status("Completed"), StatusClass::Done);
        assert_eq!(classify_status("COMPLETED"), StatusClass::Done);
        assert_eq!(classify_status("FaIlEd"), StatusClass::Failed);
    }

    #[test]
    fn classify_treats_unknown_as_in_progress() {
        assert_eq!(classify_status("pending"), StatusClass::InProgress);
        assert_eq!(classify_status("processing"), StatusClass::InProgress);
        assert_eq!(classify_status("unknown"), StatusClass::InProgress);
        assert_eq!(classify_status(""), StatusClass::InProgress);
    }

    #[test]
    fn id_keys_are_probed_in_priority_order() {
        let body = json!({"taskId": "c", "id": "b", "task_id": "a"});
        assert_eq!(first_display(&body, &ID_KEYS).as_deref(), Some("a"));

        let body = json!({"taskId": "c", "id": "b"});
        assert_eq!(first_display(&body, &ID_KEYS).as_deref(), Some("b"));

        let body = json!({"taskId": "c"});
        assert_eq!(first_display(&body, &ID_KEYS).as_deref(), Some("c"));
    }

    #[test]
    fn null_fields_fall_through_to_the_next_synonym() {
        let body = json!({"status": null, "state": "running"});
        assert_eq!(first_display(&body, &STATUS_KEYS).as_deref(), Some("running"));
    }

    #[test]
    fn progress_accepts_numbers_and_strings() {
        let body = json!({"completed_count": 3});
        assert_eq!(first_display(&body, &PROGRESS_KEYS).as_deref(), Some("3"));

        let body = json!({"completed_count": "3 / 10"});
        assert_eq!(first_display(&body, &PROGRESS_KEYS).as_deref(), Some("3 / 10"));

        let body = json!({"progress": "42%"});
        assert_eq!(first_display(&body, &PROGRESS_KEYS).as_deref(), Some("42%"));
    }

    #[test]
    fn empty_progress_counts_as_absent() {
        let body = json!({"completed_count": ""});
        assert_eq!(first_display(&body, &PROGRESS_KEYS), None);
        assert_eq!(first_display(&json!({}), &PROGRESS_KEYS), None);
    }

    #[test]
    fn terminal_states() {
        assert!(TaskState::Succeeded.is_terminal());
        assert!(TaskState::Failed.is_terminal());
        assert!(!TaskState::Idle.is_terminal());
        assert!(!TaskState::AwaitingCreation.is_terminal());
        assert!(!TaskState::Polling.is_terminal());
    }

    #[test]
    fn polling_snapshot_carries_id_and_stamp() {
        let snapshot = TaskSnapshot::polling("T1".to_string());
        assert_eq!(snapshot.id.as_deref(), Some("T1"));
        assert_eq!(snapshot.state, TaskState::Polling);
        assert!(snapshot.created_at.is_some());
        assert!(snapshot.progress.is_none());
        assert!(snapshot.result_url.is_none());
        assert!(snapshot.error.is_none());
    }
}
