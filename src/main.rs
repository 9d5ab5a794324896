//! chat-shell binary entry point.

use std::process::ExitCode;
use std::sync::Arc;

use chat_shell::api::{serve, AppState};
use chat_shell::{cli, driver, logging, Config};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("Try 'chat-shell --help' for more information.");
            return ExitCode::FAILURE;
        }
    };

    if args.help {
        cli::print_help();
        return ExitCode::SUCCESS;
    }
    if args.version {
        cli::print_version();
        return ExitCode::SUCCESS;
    }

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if logging::init_with_filter(config.log_filter()).is_err() {
        eprintln!("warning: logging was already initialized");
    }

    info!("chat-shell v{}", env!("CARGO_PKG_VERSION"));

    let server_config = match config.to_server_config() {
        Ok(server_config) => server_config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let state = AppState::from_config(&config);

    if driver::spawn_reaper(Arc::clone(&state.driver), config.reap_interval()).is_some() {
        info!(
            idle_timeout_secs = config.session.idle_timeout_secs,
            "idle session expiry enabled"
        );
    }

    info!(shell = %config.shell.program, "command shell configured");

    if let Err(e) = serve(server_config, state).await {
        error!("server error: {}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
