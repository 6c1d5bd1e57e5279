use std::path::Path;

use tokio::fs;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::error::ClientError;
use crate::event::TaskEvent;
use crate::task::{TaskSnapshot, UploadFile};

/// MIME type inferred from the file extension, mirroring the gate the server
/// applies to uploads. Unknown extensions fall back to a generic binary type,
/// which `TaskClient::submit` rejects before any request is made.
pub fn mime_for_path(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

pub async fn load_upload(path: &Path) -> Result<UploadFile, ClientError> {
    let bytes = fs::read(path).await?;
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload")
        .to_string();
    Ok(UploadFile {
        name,
        mime: mime_for_path(path).to_string(),
        bytes,
    })
}

/// Drains the event stream until the tracked task reaches a terminal state
/// and returns that snapshot. `None` means the channel closed first.
pub async fn wait_for_terminal(
    events: &mut UnboundedReceiver<TaskEvent>,
) -> Option<TaskSnapshot> {
    while let Some(event) = events.recv().await {
        if let TaskEvent::StateChanged(snapshot) = event {
            if snapshot.state.is_terminal() {
                return Some(snapshot);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskState;
    use tokio::sync::mpsc;

    #[test]
    fn mime_follows_the_extension() {
        assert_eq!(mime_for_path(Path::new("a/scan.pdf")), "application/pdf");
        assert_eq!(mime_for_path(Path::new("SCAN.PDF")), "application/pdf");
        assert_eq!(mime_for_path(Path::new("notes.txt")), "application/octet-stream");
        assert_eq!(mime_for_path(Path::new("no_extension")), "application/octet-stream");
    }

    #[tokio::test]
    async fn wait_for_terminal_skips_intermediate_events() {
        let (tx, mut rx) = mpsc::unbounded_channel();

        let mut polling = TaskSnapshot::polling("T1".to_string());
        tx.send(TaskEvent::StateChanged(polling.clone())).unwrap();
        tx.send(TaskEvent::CheckFailed {
            task_id: "T1".to_string(),
            message: "noise".to_string(),
        })
        .unwrap();
        polling.state = TaskState::Succeeded;
        tx.send(TaskEvent::StateChanged(polling)).unwrap();

        let terminal = wait_for_terminal(&mut rx).await.unwrap();
        assert_eq!(terminal.state, TaskState::Succeeded);
    }

    #[tokio::test]
    async fn wait_for_terminal_ends_on_closed_channel() {
        let (tx, mut rx) = mpsc::unbounded_channel::<TaskEvent>();
        drop(tx);
        assert!(wait_for_terminal(&mut rx).await.is_none());
    }
}
