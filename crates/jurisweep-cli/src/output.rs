//! JSON Lines output and the run summary printed to stderr.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use jurisweep_core::CaseRecord;
use jurisweep_fetch::BackscrapeReport;

/// Stdout when `path` is `None`, otherwise a freshly created file.
pub fn open_output(path: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    match path {
        Some(p) => {
            let file = File::create(p).with_context(|| format!("creating {}", p.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

/// One JSON object per line.
pub fn write_jsonl<W: Write>(out: &mut W, records: &[CaseRecord]) -> anyhow::Result<()> {
    for record in records {
        serde_json::to_writer(&mut *out, record).context("serializing record")?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

/// `Published=3 Unpublished=1` style tally, in a stable order.
pub fn status_tally(records: &[CaseRecord]) -> String {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for r in records {
        *counts.entry(r.status.to_string()).or_default() += 1;
    }
    counts
        .iter()
        .map(|(status, n)| format!("{status}={n}"))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn print_backscrape_summary(court: &str, report: &BackscrapeReport) {
    eprintln!(
        "  {court}: {} records from {} chunks ({})",
        report.records.len(),
        report.chunks,
        status_tally(&report.records)
    );
    if !report.failures.is_empty() {
        eprintln!("  {} chunks failed:", report.failures.len());
        for failure in &report.failures {
            eprintln!("    {}: {}", failure.chunk, failure.error);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use jurisweep_core::Status;

    fn record(url: &str, status: Status) -> CaseRecord {
        CaseRecord {
            court_id: "pasuperct".into(),
            date_filed: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            name: "Commonwealth v. Smith".into(),
            url: url.into(),
            docket: "1234 EDA 2023".into(),
            disposition: String::new(),
            summary: String::new(),
            status,
            judge: None,
        }
    }

    #[test]
    fn jsonl_one_object_per_line() {
        let records = vec![
            record("https://example.test/1.pdf", Status::Published),
            record("https://example.test/2.pdf", Status::Unknown),
        ];
        let mut buf = Vec::new();
        write_jsonl(&mut buf, &records).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: CaseRecord = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(parsed, records[1]);
    }

    #[test]
    fn writes_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jsonl");
        {
            let mut out = open_output(Some(path.as_path())).unwrap();
            write_jsonl(&mut out, &[record("https://example.test/1.pdf", Status::Published)])
                .unwrap();
        }
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.ends_with('\n'));
        assert!(text.contains("\"docket\":\"1234 EDA 2023\""));
    }

    #[test]
    fn open_output_reports_bad_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.jsonl");
        let err = open_output(Some(path.as_path())).err().unwrap();
        assert!(err.to_string().contains("creating"));
    }

    #[test]
    fn tally_is_sorted() {
        let records = vec![
            record("a", Status::Unpublished),
            record("b", Status::Published),
            record("c", Status::Unpublished),
        ];
        assert_eq!(status_tally(&records), "Published=1 Unpublished=2");
        assert_eq!(status_tally(&[]), "");
    }
}
