mod cli;
mod models;
mod render;
mod repl;

use repl::Repl;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let config = cli::parse_config();
    init_tracing(config.debug);

    let (client, events) = match repl::build_client(&config) {
        Ok(pair) => pair,
        Err(err) => {
            render::error(&err.to_string());
            std::process::exit(1);
        }
    };

    let mut repl = Repl::new(config, client, events);
    repl.run().await;
}

fn init_tracing(debug: bool) {
    let default = if debug { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
