#[derive(Clone, Debug)]
pub struct CLIConfig {
    pub base_url: String,
    pub poll_interval_ms: u64,
    pub timeout_ms: u64,
    pub debug: bool,
}
