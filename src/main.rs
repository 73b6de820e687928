//! cachepost - post-job cache decision step
//!
//! CLI entry point.

use cachepost::cli::post::{self, PostOptions};
use cachepost::cli::Cli;
use cachepost::config::{ConfigManager, LogFormat};
use cachepost::env::ActionEnv;
use cachepost::error::{CachePostError, CachePostResult};
use clap::Parser;
use console::style;
use std::error::Error as _;
use std::io::IsTerminal;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit status for any failure of the post-job step
const POST_JOB_FAILURE: u8 = 3;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let env = ActionEnv::from_process();

    match run(cli, &env).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_failure(&e, &env);
            ExitCode::from(POST_JOB_FAILURE)
        }
    }
}

async fn run(cli: Cli, env: &ActionEnv) -> CachePostResult<()> {
    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = config_manager.load().await?;

    init_logging(
        cli.verbose,
        env.runner_debug(),
        cli.log_format.unwrap_or(config.general.log_format),
    );
    tracing::debug!("Configuration loaded from {}", config_manager.path().display());

    let options = PostOptions {
        dry_run: cli.dry_run,
        decision_log: cli.decision_log,
    };
    let decision = post::execute(&options, &config, env).await?;
    tracing::debug!("Post-job step finished: {}", decision);

    Ok(())
}

/// 0 = info, 1 = debug, 2+ = trace. Runner debug mode implies debug.
fn init_logging(verbose: u8, runner_debug: bool, format: LogFormat) {
    let level = match verbose {
        0 if runner_debug => "debug",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::new(format!("cachepost={}", level));

    match format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_ansi(std::io::stdout().is_terminal())
            .without_time()
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
    }
}

fn report_failure(e: &CachePostError, env: &ActionEnv) {
    eprintln!("{} {}", style("Error:").red().bold(), e);

    let mut source = e.source();
    while let Some(cause) = source {
        eprintln!("  {} {}", style("Caused by:").dim(), cause);
        source = cause.source();
    }

    if let Some(hint) = e.hint() {
        eprintln!("{} {}", style("Hint:").yellow(), hint);
    }

    if env.is_github_actions() {
        println!("::error::cachepost post-job step failed: {}", e);
    }
}
