use std::env;

use crate::models::CLIConfig;

const DEFAULT_URL: &str = "http://localhost:8080";
const DEFAULT_POLL_MS: u64 = 2_000;
const DEFAULT_TIMEOUT_MS: u64 = 30_000;

pub fn parse_config() -> CLIConfig {
    let mut cfg = CLIConfig {
        base_url: env_or("PDF_OCR_URL", DEFAULT_URL.to_string()),
        poll_interval_ms: env_u64("PDF_OCR_POLL_MS", DEFAULT_POLL_MS),
        timeout_ms: env_u64("PDF_OCR_TIMEOUT_MS", DEFAULT_TIMEOUT_MS),
        debug: env_bool("PDF_OCR_DEBUG", false),
    };

    let args: Vec<String> = env::args().collect();
    let mut idx = 1;
    while idx < args.len() {
        match args[idx].as_str() {
            "--base" => {
                if let Some(value) = args.get(idx + 1) {
                    cfg.base_url = value.clone();
                    idx += 1;
                }
            }
            "--interval" => {
                if let Some(value) = args.get(idx + 1) {
                    if let Ok(parsed) = value.parse::<u64>() {
                        cfg.poll_interval_ms = parsed;
                    }
                    idx += 1;
                }
            }
            "--timeout" => {
                if let Some(value) = args.get(idx + 1) {
                    if let Ok(parsed) = value.parse::<u64>() {
                        cfg.timeout_ms = parsed;
                    }
                    idx += 1;
                }
            }
            "--debug" => {
                cfg.debug = true;
            }
            _ => {}
        }
        idx += 1;
    }

    cfg
}

fn env_or(key: &str, fallback: String) -> String {
    env::var(key).unwrap_or(fallback)
}

fn env_u64(key: &str, fallback: u64) -> u64 {
    match env::var(key) {
        Ok(value) => value.parse::<u64>().unwrap_or(fallback),
        Err(_) => fallback,
    }
}

fn env_bool(key: &str, fallback: bool) -> bool {
    match env::var(key) {
        Ok(value) => value.parse::<bool>().unwrap_or(fallback),
        Err(_) => fallback,
    }
}
