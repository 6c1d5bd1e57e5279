use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::event::TaskEvent;
use crate::http::HttpClient;
use crate::poll::PollScheduler;
use crate::task::{
    classify_status, first_display, StatusClass, TaskSnapshot, TaskState, UploadFile,
    GENERIC_FAILURE, ID_KEYS, PROGRESS_KEYS, STATUS_KEYS,
};

/// Tracks one server-side processing task at a time: uploads a document,
/// polls the status endpoint until the task is terminal and publishes every
/// lifecycle change on the event channel handed out by `new`. Clones share
/// the same tracked task.
///
/// A new `submit` or `attach` replaces the tracked task wholesale; polling
/// for the previous task stops first, and a late status response for a
/// replaced task is discarded rather than applied.
#[derive(Clone)]
pub struct TaskClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    accepted_mime: String,
    current: Mutex<TaskSnapshot>,
    scheduler: PollScheduler,
    events: UnboundedSender<TaskEvent>,
}

impl TaskClient {
    pub fn new(config: ClientConfig) -> Result<(Self, UnboundedReceiver<TaskEvent>), ClientError> {
        let http = HttpClient::new(
            &config.base_url,
            Duration::from_millis(config.request_timeout_ms),
        )?;
        let (events, receiver) = mpsc::unbounded_channel();
        let inner = Arc::new(ClientInner {
            http,
            accepted_mime: config.accepted_mime.to_ascii_lowercase(),
            current: Mutex::new(TaskSnapshot::default()),
            scheduler: PollScheduler::new(Duration::from_millis(config.poll_interval_ms)),
            events,
        });
        Ok((Self { inner }, receiver))
    }

    pub fn snapshot(&self) -> TaskSnapshot {
        self.inner.lock_current().clone()
    }

    pub fn is_polling(&self) -> bool {
        self.inner.scheduler.is_running()
    }

    /// Uploads a document and starts tracking the task the server creates
    /// for it. Returns the assigned task id.
    pub async fn submit(&self, file: UploadFile) -> Result<String, ClientError> {
        if !file.mime.eq_ignore_ascii_case(&self.inner.accepted_mime) {
            return Err(ClientError::UnsupportedFile(file.mime));
        }

        self.inner.scheduler.stop();
        self.inner.replace(TaskSnapshot {
            state: TaskState::AwaitingCreation,
            ..TaskSnapshot::default()
        });

        let file_name = file.name.clone();
        let body = match self.inner.http.create_task(file).await {
            Ok(body) => body,
            Err(err) => {
                warn!(file = %file_name, error = %err, "upload failed");
                self.inner.replace(TaskSnapshot::default());
                return Err(err);
            }
        };

        let task_id = match first_display(&body, &ID_KEYS) {
            Some(id) => id,
            None => {
                self.inner.replace(TaskSnapshot::default());
                return Err(ClientError::MalformedResponse(
                    "no task id in create response",
                ));
            }
        };

        info!(task_id = %task_id, file = %file_name, "task created");
        self.inner.replace(TaskSnapshot::polling(task_id.clone()));
        self.start_polling();
        Ok(task_id)
    }

    /// Re-attaches to an existing task by id and resumes tracking it. Runs
    /// one immediate status check; a task that is already terminal never
    /// starts the timer.
    pub async fn attach(&self, task_id: &str) -> Result<(), ClientError> {
        let task_id = task_id.trim();
        if task_id.is_empty() {
            return Err(ClientError::EmptyTaskId);
        }

        info!(task_id = %task_id, "attaching to task");
        self.inner.scheduler.stop();
        self.inner.replace(TaskSnapshot::polling(task_id.to_string()));

        self.check_status().await;

        let current = self.snapshot();
        if current.id.as_deref() == Some(task_id) && !current.state.is_terminal() {
            self.start_polling();
        }
        Ok(())
    }

    /// Stops polling and returns to idle. Safe to call when already idle. An
    /// in-flight status request is not aborted; its response is discarded by
    /// the id guard in `apply_status`.
    pub fn cancel(&self) {
        self.inner.scheduler.stop();
        let mut current = self.inner.lock_current();
        if current.id.is_none() && current.state == TaskState::Idle {
            return;
        }
        debug!(task_id = ?current.id, "tracking cancelled");
        *current = TaskSnapshot::default();
        self.inner.emit_state(&current);
    }

    /// Queries the server once for the current task and folds the response
    /// into the lifecycle. Invoked by the scheduler on every tick and by
    /// `attach` for its immediate check; a no-op when nothing is tracked.
    pub async fn check_status(&self) {
        let issued_id = self.inner.lock_current().id.clone();
        let Some(issued_id) = issued_id else { return };
        let result = self.inner.http.task_status(&issued_id).await;
        self.apply_status(&issued_id, result);
    }

    /// Exposes the result endpoint fetch for callers that want the artifact;
    /// the lifecycle itself only ever records the URL.
    pub async fn download_result(&self, id: &str) -> Result<Vec<u8>, ClientError> {
        self.inner.http.download_result(id).await
    }

    fn start_polling(&self) {
        // the poll loop holds only a weak handle, so dropping the last
        // TaskClient tears the timer down via the scheduler's Drop
        let weak = Arc::downgrade(&self.inner);
        self.inner.scheduler.start(move || {
            let weak = Weak::clone(&weak);
            async move {
                if let Some(inner) = weak.upgrade() {
                    TaskClient { inner }.check_status().await;
                }
            }
        });
    }

    /// Folds one status response into the tracked task. Responses for a task
    /// that is no longer current are dropped: cancel and re-submit do not
    /// abort in-flight requests, so a late completion must not touch the
    /// state of whatever replaced it.
    fn apply_status(&self, issued_id: &str, result: Result<Value, ClientError>) {
        let mut current = self.inner.lock_current();
        if current.id.as_deref() != Some(issued_id) {
            debug!(task_id = %issued_id, "dropping stale status response");
            return;
        }

        let body = match result {
            Ok(body) => body,
            Err(err) => {
                warn!(task_id = %issued_id, error = %err, "status check failed");
                self.inner.emit(TaskEvent::CheckFailed {
                    task_id: issued_id.to_string(),
                    message: err.to_string(),
                });
                return;
            }
        };

        let Some(raw_status) = first_display(&body, &STATUS_KEYS) else {
            self.inner.emit(TaskEvent::CheckFailed {
                task_id: issued_id.to_string(),
                message: ClientError::MalformedResponse("no status in response").to_string(),
            });
            return;
        };

        // most recent progress value wins, including its absence
        current.progress = first_display(&body, &PROGRESS_KEYS);

        match classify_status(&raw_status) {
            StatusClass::Done => {
                current.state = TaskState::Succeeded;
                current.result_url = Some(self.inner.http.result_url(issued_id));
                current.error = None;
                self.inner.scheduler.stop();
                info!(task_id = %issued_id, "task succeeded");
            }
            StatusClass::Failed => {
                current.state = TaskState::Failed;
                current.error = Some(
                    first_display(&body, &["error"]).unwrap_or_else(|| GENERIC_FAILURE.to_string()),
                );
                current.result_url = None;
                self.inner.scheduler.stop();
                warn!(task_id = %issued_id, error = ?current.error, "task failed");
            }
            StatusClass::InProgress => {
                current.state = TaskState::Polling;
                debug!(
                    task_id = %issued_id,
                    status = %raw_status,
                    progress = ?current.progress,
                    "task in progress"
                );
            }
        }
        self.inner.emit_state(&current);
    }
}

impl ClientInner {
    fn lock_current(&self) -> MutexGuard<'_, TaskSnapshot> {
        match self.current.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn replace(&self, next: TaskSnapshot) {
        let mut current = self.lock_current();
        *current = next;
        self.emit_state(&current);
    }

    fn emit_state(&self, snapshot: &TaskSnapshot) {
        self.emit(TaskEvent::StateChanged(snapshot.clone()));
    }

    fn emit(&self, event: TaskEvent) {
        // tracking continues even if the subscriber went away
        let _ = self.events.send(event);
    }
}
