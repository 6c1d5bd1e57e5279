use crate::task::TaskSnapshot;

/// Notifications pushed to the subscriber channel. `StateChanged` carries the
/// full snapshot after every lifecycle transition and after every successful
/// poll; `CheckFailed` reports a recoverable status-check failure that left
/// the lifecycle untouched.
#[derive(Clone, Debug)]
pub enum TaskEvent {
    StateChanged(TaskSnapshot),
    CheckFailed { task_id: String, message: String },
}
