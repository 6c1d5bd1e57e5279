use std::io::{self, Write};

use pdf_ocr_client_rs::{TaskEvent, TaskSnapshot, TaskState};

use crate::models::CLIConfig;

pub fn banner(cfg: &CLIConfig) {
    println!("PDF OCR Debug CLI");
    println!("API: {}", cfg.base_url);
    println!(
        "Poll interval: {}ms  Timeout: {}ms",
        cfg.poll_interval_ms, cfg.timeout_ms
    );
    println!("Type /help for commands.");
}

pub fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}

pub fn help() {
    println!("Commands:");
    println!("  /help                 Show commands");
    println!("  /exit | /quit         Exit");
    println!("  /upload <path>        Upload a PDF and track the task");
    println!("  /attach <task-id>     Track an existing task");
    println!("  /status               Show the tracked task");
    println!("  /wait                 Block until the task is terminal");
    println!("  /result [path]        Save a finished task's result");
    println!("  /cancel               Stop tracking");
    println!("  /config               Show current config");
    println!("  /base <url>           Update base URL");
}

pub fn snapshot(snapshot: &TaskSnapshot) {
    let id = snapshot.id.as_deref().unwrap_or("-");
    match snapshot.state {
        TaskState::Idle => println!("no active task"),
        TaskState::AwaitingCreation => println!("uploading..."),
        TaskState::Polling => println!(
            "[{}] processing  progress: {}",
            id,
            snapshot.progress.as_deref().unwrap_or("-")
        ),
        TaskState::Succeeded => println!(
            "[{}] completed  result: {}",
            id,
            snapshot.result_url.as_deref().unwrap_or("-")
        ),
        TaskState::Failed => println!(
            "[{}] failed: {}",
            id,
            snapshot.error.as_deref().unwrap_or("-")
        ),
    }
}

pub fn event(event: &TaskEvent) {
    match event {
        TaskEvent::StateChanged(state) => snapshot(state),
        TaskEvent::CheckFailed { task_id, message } => {
            eprintln!("status check failed for {}: {}", task_id, message);
        }
    }
}

pub fn config(cfg: &CLIConfig) {
    println!("config:");
    println!("  base: {}", cfg.base_url);
    println!("  interval: {}ms", cfg.poll_interval_ms);
    println!("  timeout: {}ms", cfg.timeout_ms);
    println!("  debug: {}", cfg.debug);
}

pub fn info(msg: &str) {
    println!("{}", msg);
}

pub fn error(msg: &str) {
    eprintln!("error: {}", msg);
}
