#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: String,
    pub poll_interval_ms: u64,
    pub request_timeout_ms: u64,
    pub accepted_mime: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            poll_interval_ms: 2_000,
            request_timeout_ms: 30_000,
            accepted_mime: "application/pdf".to_string(),
        }
    }
}
