//! CSV output formatting.

use crate::scanner::ScanReport;
use std::io::{self, Write};

/// Print results in CSV format.
pub fn print_csv(report: &ScanReport) -> io::Result<()> {
    let stdout = io::stdout();
    write_csv(stdout.lock(), report)
}

/// Write one row per open port.
pub fn write_csv<W: Write>(out: W, report: &ScanReport) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    wtr.write_record(["port", "status", "banner", "response_time_ms"])?;

    for outcome in &report.results {
        wtr.write_record([
            &outcome.port.to_string(),
            &outcome.status.to_string(),
            outcome.banner.as_deref().unwrap_or(""),
            &outcome
                .response_time_ms
                .map_or(String::new(), |t| t.to_string()),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
