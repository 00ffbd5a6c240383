/***************************************/
/*        3rd party libraries          */
/***************************************/
use chrono::NaiveDateTime;
use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::{ExportError, LogRecord};

/***************************************/
/*             Constants               */
/***************************************/
pub const CSV_HEADER: &str = "ID,Floor,Status/Operation,Timestamp";

/// `MM/dd/yyyy hh:mm:ss tt`
pub const TIMESTAMP_FORMAT: &str = "%m/%d/%Y %I:%M:%S %p";

/***************************************/
/*             Public API              */
/***************************************/
pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

pub fn default_export_name(now: &NaiveDateTime) -> String {
    format!("ElevatorLogs_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

pub fn write_csv<W: Write>(records: &[LogRecord], mut out: W) -> io::Result<()> {
    writeln!(out, "{}", CSV_HEADER)?;
    for record in records {
        writeln!(
            out,
            "{},{},{},{}",
            record.id,
            record.floor,
            escape_field(&record.status),
            format_timestamp(&record.timestamp)
        )?;
    }
    out.flush()
}

/// Writes `records` to `path`. Returns the number of rows written.
pub fn export_csv(records: &[LogRecord], path: &Path) -> Result<usize, ExportError> {
    let file = File::create(path)?;
    write_csv(records, BufWriter::new(file))?;
    log::info!("Exported {} records to {}", records.len(), path.display());
    Ok(records.len())
}

fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains(&[',', '"', '\n', '\r'][..]) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
