//! Scan command implementation.
//!
//! Wires the CLI to the coordinator: Ctrl-C cancellation, a progress bar fed
//! from the live outcome stream, and result printing.

use crate::cli::{Args, OutputFormat};
use crate::output;
use crate::scanner::{ProbeOutcome, ScanCoordinator};
use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Execute a scan as described by `args`.
pub async fn execute(args: &Args) -> anyhow::Result<()> {
    let settings = args.load_settings()?;
    let format = args.output_format(&settings)?;
    let request = args.to_request(&settings)?;
    let interactive = !args.quiet && format == OutputFormat::Plain;

    if interactive {
        output::print_scan_header(&request);
    }

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    let signal = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, stopping scan");
            interrupt.cancel();
        }
    });

    let (events, outcomes) = mpsc::unbounded_channel();
    let progress = interactive.then(|| progress_bar(request.ports.len() as u64));
    let watcher = tokio::spawn(track_progress(outcomes, progress.clone()));

    let host = request.host.clone();
    let result = ScanCoordinator::new(request)
        .with_cancellation(cancel)
        .with_events(events)
        .run()
        .await;

    signal.abort();
    // The coordinator dropped its sender, so the watcher drains and exits.
    let _ = watcher.await;
    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }

    let report = result.with_context(|| format!("scan of {} failed", host))?;

    if report.cancelled && !args.quiet {
        output::print_warning(&format!(
            "Scan interrupted after {} of {} ports; results are partial.",
            report.ports_probed,
            report.ports.len()
        ));
    }

    output::print_results(&report, format).context("failed to write results")?;

    Ok(())
}

fn progress_bar(total: u64) -> ProgressBar {
    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
    ) {
        pb.set_style(style.progress_chars("=>-"));
    }
    pb
}

/// Consume the live outcome stream until the coordinator hangs up.
async fn track_progress(
    mut outcomes: UnboundedReceiver<ProbeOutcome>,
    progress: Option<ProgressBar>,
) {
    while let Some(outcome) = outcomes.recv().await {
        if let Some(pb) = &progress {
            pb.inc(1);
            if outcome.is_open() {
                pb.set_message(format!("Found open port: {}", outcome.port));
            }
        }
    }
}
