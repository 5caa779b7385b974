//! Plain text output formatting.
//!
//! Produces human-readable output with colors and formatting.

use crate::scanner::{ScanReport, ScanRequest};
use console::style;
use std::io::{self, Write};

const RULE: &str = "═══════════════════════════════════════════════════════════════";
const THIN_RULE: &str = "───────────────────────────────────────────────────────────────";

/// Print results in human-readable plain text format.
pub fn print_plain(report: &ScanReport) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_plain(&mut out, report)
}

/// Render the plain report into any writer.
pub fn write_plain<W: Write>(out: &mut W, report: &ScanReport) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(
        out,
        "                    {} Scan Results",
        style("tcpsweep").cyan().bold()
    )?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    writeln!(out, "  {} {}", style("Target:").bold(), report.target.original)?;
    writeln!(out, "  {} {}", style("IP Address:").bold(), report.target.ip)?;
    writeln!(out, "  {} {}", style("Ports:").bold(), report.ports)?;
    writeln!(out)?;

    writeln!(
        out,
        "  {} {} ports scanned in {:.2}s, {} open",
        style("Statistics:").bold(),
        report.ports_probed,
        report.elapsed.as_secs_f64(),
        style(report.open_count).green().bold()
    )?;
    writeln!(out)?;

    if report.results.is_empty() {
        writeln!(out, "  {}", style("No open ports found.").dim())?;
    } else {
        writeln!(out, "  {}", style(THIN_RULE).dim())?;
        writeln!(
            out,
            "  {:>6}  {:^8}  {}",
            style("PORT").bold(),
            style("STATE").bold(),
            style("BANNER").bold()
        )?;
        writeln!(out, "  {}", style(THIN_RULE).dim())?;

        for outcome in &report.results {
            let banner_display = outcome
                .banner
                .as_deref()
                .map(|b| truncate_string(b, 45))
                .unwrap_or_default();

            writeln!(
                out,
                "  {:>6}  {:^8}  {}",
                outcome.port,
                style(outcome.status.to_string()).green().bold(),
                style(banner_display).dim()
            )?;
        }

        writeln!(out, "  {}", style(THIN_RULE).dim())?;
    }

    writeln!(out)?;
    writeln!(out, "{}", style(RULE).cyan())?;
    writeln!(out)?;

    Ok(())
}

/// Print a scan header before scanning begins.
pub fn print_scan_header(request: &ScanRequest) {
    println!();
    println!(
        "{} {} v{}",
        style("Starting").cyan(),
        style("tcpsweep").cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(
        "{} Target: {}",
        style("•").dim(),
        style(&request.host).white().bold()
    );
    println!(
        "{} Scanning {} ports with {} workers (banner grabbing: {})...",
        style("•").dim(),
        style(request.ports.len()).white().bold(),
        request.concurrency,
        if request.grab_banners { "enabled" } else { "disabled" }
    );
    println!();
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Truncate a string to a maximum number of characters, adding an ellipsis
/// if truncated.
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
