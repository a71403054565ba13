//! Report persistence.

use crate::aggregator::Report;
use crate::error::Result;
use meritscan_core::{OutputFormat, REPORT_COLUMNS};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write one CSV row per merit record, headed by [`REPORT_COLUMNS`].
pub fn write_csv<W: Write>(report: &Report, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(REPORT_COLUMNS)?;
    for row in report.rows() {
        csv.write_record(row.record.columns())?;
    }
    csv.flush()?;
    Ok(())
}

/// Write the full report (summary, entries with outcome and attempts) as
/// pretty-printed JSON.
pub fn write_json<W: Write>(report: &Report, mut writer: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, report)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Write `report` to `path` in `format`, creating parent directories.
pub fn write_report(report: &Report, path: &Path, format: OutputFormat) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let writer = BufWriter::new(File::create(path)?);
    match format {
        OutputFormat::Csv => write_csv(report, writer)?,
        OutputFormat::Json => write_json(report, writer)?,
    }

    tracing::info!(path = %path.display(), format = ?format, rows = report.summary().rows, "Report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::ResultAggregator;
    use crate::outcome::{CandidateOutcome, FailureReason, Stage};
    use meritscan_core::{CandidateId, MeritRecord};
    use tempfile::TempDir;

    fn sample_report() -> Report {
        let first = CandidateId::new(100_000, "244", 6).expect("valid candidate");
        let second = CandidateId::new(100_001, "244", 6).expect("valid candidate");

        let aggregator = ResultAggregator::new();
        aggregator
            .record(
                second.clone(),
                CandidateOutcome::Matched(vec![MeritRecord {
                    name: "Ayesha Khan".to_string(),
                    father_name: "Imran Khan".to_string(),
                    selection_list_no: "1".to_string(),
                    programme: "BS Computer Science, Islamabad".to_string(),
                    merit_position: "112".to_string(),
                    status: "Selected".to_string(),
                    ..MeritRecord::unavailable(&second)
                }]),
                2,
            )
            .expect("record");
        aggregator
            .record(
                first,
                CandidateOutcome::Failed(FailureReason::Timeout(Stage::Submit)),
                6,
            )
            .expect("record");
        aggregator.finalize().expect("finalize")
    }

    #[test]
    fn test_csv_layout() {
        let mut buffer = Vec::new();
        write_csv(&sample_report(), &mut buffer).expect("write csv");
        let text = String::from_utf8(buffer).expect("utf-8");
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(
            lines,
            vec![
                "Roll No,Name,Father Name,Selection List No,Programme,Merit Position,Status",
                "100000244,N/A,N/A,N/A,N/A,N/A,N/A",
                "100001244,Ayesha Khan,Imran Khan,1,\"BS Computer Science, Islamabad\",112,Selected",
            ]
        );
    }

    #[test]
    fn test_json_carries_outcomes() {
        let mut buffer = Vec::new();
        write_json(&sample_report(), &mut buffer).expect("write json");
        let value: serde_json::Value = serde_json::from_slice(&buffer).expect("valid json");

        assert_eq!(value["summary"]["candidates"], 2);
        assert_eq!(value["entries"][0]["candidate"], "100000244");
        assert_eq!(value["entries"][0]["attempts"], 6);
        assert_eq!(value["entries"][0]["outcome"]["kind"], "failed");
        assert_eq!(value["entries"][1]["outcome"]["kind"], "matched");
        assert_eq!(
            value["entries"][1]["outcome"]["detail"][0]["programme"],
            "BS Computer Science, Islamabad"
        );
    }

    #[test]
    fn test_write_report_creates_parent_dirs() {
        let tmp = TempDir::new().expect("create temp dir");
        let path = tmp.path().join("out").join("merit_list.csv");

        write_report(&sample_report(), &path, OutputFormat::Csv).expect("write report");

        let text = std::fs::read_to_string(&path).expect("read report");
        assert_eq!(text.lines().count(), 3);
    }
}
