//! Export of reconciled records to JSON and per-vendor CSV files.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::constants::EXPORT_JSON_FILENAME;
use crate::error::Result;
use crate::observability::metrics::{emit_counter, MetricName};
use crate::reconcile::{MatchEvent, Reconciliation, VendorSummary};
use crate::types::{EnrichedCatalogs, EnrichedRecord};

pub const CSV_HEADERS: [&str; 7] = [
    "title",
    "number",
    "compatible",
    "launch_quarter",
    "launch_raw",
    "family",
    "info_url",
];

#[derive(Debug, Serialize)]
struct ExportDocument<'a> {
    generated_at: DateTime<Utc>,
    summary: Vec<VendorSummary>,
    vendors: &'a EnrichedCatalogs,
    review: Vec<&'a MatchEvent>,
}

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single CSV row
pub fn write_row<W: Write>(mut w: W, row: &[&str]) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        if !first {
            write!(w, ",")?;
        } else {
            first = false;
        }
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}

fn record_row(record: &EnrichedRecord) -> [&str; 7] {
    [
        record.title.as_str(),
        record.number.as_deref().unwrap_or(""),
        if record.is_compatible { "yes" } else { "no" },
        record.launch_normalized.as_deref().unwrap_or(""),
        record.launch_raw.as_deref().unwrap_or(""),
        record.family.as_str(),
        record.info_url.as_str(),
    ]
}

/// Write one vendor's records as CSV, header first
pub fn write_csv<W: Write>(mut w: W, records: &[EnrichedRecord]) -> io::Result<()> {
    write_row(&mut w, &CSV_HEADERS)?;
    for record in records {
        write_row(&mut w, &record_row(record))?;
    }
    Ok(())
}

pub fn csv_filename(vendor: &str) -> String {
    format!("{}-cpus.csv", vendor.to_lowercase())
}

/// Write `cpus.json` and one CSV per vendor into `output_dir`; returns the written paths
pub fn export_all(reconciliation: &Reconciliation, output_dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)?;
    let mut written = Vec::new();

    let document = ExportDocument {
        generated_at: Utc::now(),
        summary: reconciliation.summary(),
        vendors: &reconciliation.records,
        review: reconciliation.review_events().collect(),
    };
    let json_path = output_dir.join(EXPORT_JSON_FILENAME);
    fs::write(&json_path, serde_json::to_string_pretty(&document)?)?;
    written.push(json_path);

    for (vendor, records) in &reconciliation.records {
        let csv_path = output_dir.join(csv_filename(vendor));
        let mut writer = BufWriter::new(File::create(&csv_path)?);
        write_csv(&mut writer, records)?;
        writer.flush()?;
        written.push(csv_path);
    }

    emit_counter(MetricName::ExportFilesWritten, written.len() as u64);
    info!("Exported {} files to {}", written.len(), output_dir.display());
    Ok(written)
}
