use std::path::Path;

use pdf_ocr_client_rs::helpers::{load_upload, wait_for_terminal};
use pdf_ocr_client_rs::{ClientConfig, ClientError, TaskClient, TaskEvent, TaskState};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::models::CLIConfig;
use crate::render;

pub fn build_client(
    cfg: &CLIConfig,
) -> Result<(TaskClient, UnboundedReceiver<TaskEvent>), ClientError> {
    TaskClient::new(ClientConfig {
        base_url: cfg.base_url.clone(),
        poll_interval_ms: cfg.poll_interval_ms,
        request_timeout_ms: cfg.timeout_ms,
        ..ClientConfig::default()
    })
}

pub struct Repl {
    config: CLIConfig,
    client: TaskClient,
    events: UnboundedReceiver<TaskEvent>,
}

impl Repl {
    pub fn new(
        config: CLIConfig,
        client: TaskClient,
        events: UnboundedReceiver<TaskEvent>,
    ) -> Self {
        Self {
            config,
            client,
            events,
        }
    }

    pub async fn run(&mut self) {
        render::banner(&self.config);
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        render::prompt();
        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Ok(Some(line)) = line else { break };
                    let line = line.trim();
                    if line.is_empty() {
                        render::prompt();
                        continue;
                    }
                    if self.handle_command(line).await {
                        break;
                    }
                    render::prompt();
                }
                event = self.events.recv() => {
                    let Some(event) = event else { break };
                    render::event(&event);
                    render::prompt();
                }
            }
        }
    }

    async fn handle_command(&mut self, line: &str) -> bool {
        let mut parts = line.splitn(2, ' ');
        let cmd = parts.next().unwrap_or("").trim_start_matches('/');
        let rest = parts.next().unwrap_or("").trim();
        match cmd {
            "exit" | "quit" => return true,
            "help" => render::help(),
            "upload" => self.upload(rest).await,
            "attach" | "query" => self.attach(rest).await,
            "status" => render::snapshot(&self.client.snapshot()),
            "wait" => self.wait_done().await,
            "result" => self.save_result(rest).await,
            "cancel" => {
                self.client.cancel();
                render::info("cancelled");
            }
            "config" => render::config(&self.config),
            "base" => self.set_base(rest),
            _ => render::info("unknown command, type /help"),
        }
        false
    }

    async fn upload(&mut self, rest: &str) {
        if rest.is_empty() {
            render::error("usage: /upload <path>");
            return;
        }
        let file = match load_upload(Path::new(rest)).await {
            Ok(file) => file,
            Err(err) => {
                render::error(&err.to_string());
                return;
            }
        };
        match self.client.submit(file).await {
            Ok(task_id) => render::info(&format!("task created: {}", task_id)),
            Err(err) => render::error(&err.to_string()),
        }
    }

    async fn attach(&mut self, rest: &str) {
        match self.client.attach(rest).await {
            Ok(()) => render::info("attached"),
            Err(err) => render::error(&err.to_string()),
        }
    }

    async fn wait_done(&mut self) {
        let snapshot = self.client.snapshot();
        if snapshot.state.is_terminal() {
            render::snapshot(&snapshot);
            return;
        }
        if !self.client.is_polling() {
            render::info("no active task");
            return;
        }
        match wait_for_terminal(&mut self.events).await {
            Some(terminal) => render::snapshot(&terminal),
            None => render::error("event channel closed"),
        }
    }

    async fn save_result(&mut self, rest: &str) {
        let snapshot = self.client.snapshot();
        let Some(id) = snapshot.id else {
            render::error("no task");
            return;
        };
        if snapshot.state != TaskState::Succeeded {
            render::error("task has no result yet");
            return;
        }
        let path = if rest.is_empty() {
            format!("{}.md", id)
        } else {
            rest.to_string()
        };
        match self.client.download_result(&id).await {
            Ok(bytes) => match tokio::fs::write(&path, bytes).await {
                Ok(()) => render::info(&format!("result saved to {}", path)),
                Err(err) => render::error(&err.to_string()),
            },
            Err(err) => render::error(&err.to_string()),
        }
    }

    fn set_base(&mut self, rest: &str) {
        if rest.is_empty() {
            render::info(&format!("base: {}", self.config.base_url));
            return;
        }
        let mut next = self.config.clone();
        next.base_url = rest.to_string();
        match build_client(&next) {
            Ok((client, events)) => {
                self.config = next;
                self.client = client;
                self.events = events;
                render::info("base url updated");
            }
            Err(err) => render::error(&err.to_string()),
        }
    }
}
