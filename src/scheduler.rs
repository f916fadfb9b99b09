//! Periodic pass loop.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::config::Config;
use crate::sync::{PassReport, Reconciler};

/// Runs a pass, waits the interval, and repeats until cancelled.
pub struct Scheduler {
    reconciler: Arc<Reconciler>,
    source: PathBuf,
    replica: PathBuf,
    interval: Duration,
    cancel: CancellationToken,
}

impl Scheduler {
    pub fn new(
        reconciler: Reconciler,
        source: PathBuf,
        replica: PathBuf,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            reconciler: Arc::new(reconciler),
            source,
            replica,
            interval,
            cancel,
        }
    }

    pub fn from_config(reconciler: Reconciler, config: &Config, cancel: CancellationToken) -> Self {
        Self::new(
            reconciler,
            config.source.clone(),
            config.replica.clone(),
            config.interval,
            cancel,
        )
    }

    /// Run one pass off the async workers.
    pub async fn run_pass(&self) -> Result<PassReport> {
        let reconciler = Arc::clone(&self.reconciler);
        let source = self.source.clone();
        let replica = self.replica.clone();

        let report = tokio::task::spawn_blocking(move || reconciler.reconcile(&source, &replica))
            .await
            .context("Sync pass panicked")??;
        Ok(report)
    }

    /// Loop until cancelled, or after the first pass when `once` is set.
    ///
    /// A pass that cannot list either root ends the loop with that error.
    /// Returns the number of completed passes.
    pub async fn run(&self, once: bool) -> Result<usize> {
        let mut passes = 0usize;

        while !self.cancel.is_cancelled() {
            let report = self.run_pass().await?;
            passes += 1;
            log_summary(passes, &report);

            if once || report.interrupted {
                break;
            }

            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        Ok(passes)
    }
}

fn log_summary(pass: usize, report: &PassReport) {
    let stats = &report.stats;
    let prefix = if report.dry_run { "Dry-run pass" } else { "Pass" };

    if stats.changes() == 0 && stats.failed == 0 {
        debug!(pass, duration_ms = stats.duration_ms, "{} found nothing to do", prefix);
        return;
    }

    info!(
        "{} {} finished in {} ms: {} added, {} updated, {} deleted, {} failed",
        prefix,
        pass,
        stats.duration_ms,
        stats.added,
        stats.updated,
        stats.deleted,
        stats.failed
    );
}

/// Cancel `token` on the first Ctrl-C.
pub fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Stop requested, finishing up");
            token.cancel();
        }
    });
}
