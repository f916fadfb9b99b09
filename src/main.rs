use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::error;

use mirrorsync::config::{Cli, Config};
use mirrorsync::logging::{self, TracingSink};
use mirrorsync::scheduler::{cancel_on_ctrl_c, Scheduler};
use mirrorsync::sync::{Applier, Reconciler};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup errors happen before logging exists, so they go to stderr directly.
    let config = match Config::from_cli(cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            return ExitCode::FAILURE;
        }
    };
    if let Err(err) = logging::init(&config.log_file) {
        eprintln!("{:#}", err);
        return ExitCode::FAILURE;
    }

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: Config) -> Result<()> {
    println!("Welcome to mirrorsync!\nPress Ctrl-C to stop the program.");

    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    let reconciler = Reconciler::new(Applier::new(Arc::new(TracingSink)), config.options)
        .with_cancellation(cancel.clone());
    let scheduler = Scheduler::from_config(reconciler, &config, cancel);

    scheduler.run(config.once).await?;
    Ok(())
}
