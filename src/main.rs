use std::process;

use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use elevator_dispatch::modules;
use elevator_dispatch::utilities::config::{self, Config};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_thread_names(true))
        .init();
}

fn main() -> std::io::Result<()> {
    init_logging();

    // READ CONFIGURATION
    let args = config::parse_env_args();
    let config = match args.config_path {
        Some(path) => Config::from_file(path),
        None => Config::get(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            process::exit(1);
        }
    };

    modules::run(config, args.status_view)
}
