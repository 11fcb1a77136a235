//! CSV export for the usage history log.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::history::HistoryRecord;

/// Column header for history CSV export.
const HEADER: &str = "device_id,device_name,consumption_w,ended_at,duration_seconds,units_kwh";

/// Exports history records to a CSV file at the given path.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(records: &[HistoryRecord], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(records, buf)
}

/// Writes history records as CSV to any writer.
///
/// One row per record in log order; deterministic for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(records: &[HistoryRecord], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(','))?;
    for r in records {
        wtr.write_record(&[
            r.device_id.clone(),
            r.device_name.clone(),
            format!("{:.1}", r.consumption_w),
            r.ended_at.to_rfc3339(),
            r.duration_seconds.to_string(),
            format!("{:.6}", r.units_kwh),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
