//! JSON output formatting.

use crate::scanner::ScanReport;
use std::io::{self, Write};

/// Print results in JSON format.
pub fn print_json(report: &ScanReport) -> io::Result<()> {
    let stdout = io::stdout();
    write_json(&mut stdout.lock(), report)
}

/// Render the report as pretty JSON followed by a newline.
pub fn write_json<W: Write>(out: &mut W, report: &ScanReport) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, report).map_err(io::Error::other)?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::tests::sample_report;

    #[test]
    fn test_json_shape() {
        let mut buf = Vec::new();
        write_json(&mut buf, &sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(value["target"]["original"], "localhost");
        assert_eq!(value["open_count"], 2);
        assert_eq!(value["duration_ms"], 1500);
        assert_eq!(value["cancelled"], false);
        assert_eq!(value["results"][0]["port"], 22);
        assert_eq!(value["results"][0]["banner"], "SSH-2.0-OpenSSH_9.6");
        assert!(value["results"][1].get("banner").is_none());
    }
}
