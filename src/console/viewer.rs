/***************************************/
/*        3rd party libraries          */
/***************************************/
use std::fmt::Write;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::database::export::format_timestamp;
use crate::shared::LogRecord;

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloorFilter {
    All,
    Floor(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LogSummary {
    pub total: usize,
    pub floor_1: usize,
    pub floor_2: usize,
}

/***************************************/
/*             Public API              */
/***************************************/

/// Applies the floor filter, then a case-insensitive search over every column.
pub fn filter_records(
    records: &[LogRecord],
    filter: FloorFilter,
    search: Option<&str>,
) -> Vec<LogRecord> {
    let needle = search
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());

    records
        .iter()
        .filter(|r| match filter {
            FloorFilter::All => true,
            FloorFilter::Floor(floor) => r.floor == floor,
        })
        .filter(|r| match &needle {
            None => true,
            Some(needle) => row_matches(r, needle),
        })
        .cloned()
        .collect()
}

pub fn summarize(records: &[LogRecord]) -> LogSummary {
    LogSummary {
        total: records.len(),
        floor_1: records.iter().filter(|r| r.floor == 1).count(),
        floor_2: records.iter().filter(|r| r.floor == 2).count(),
    }
}

pub fn render_table(records: &[LogRecord]) -> String {
    let width = records
        .iter()
        .map(|r| r.status.len())
        .max()
        .unwrap_or(0)
        .max("Status/Operation".len());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>6}  {:>5}  {:<width$}  {}",
        "ID",
        "Floor",
        "Status/Operation",
        "Timestamp",
        width = width
    );
    for r in records {
        let _ = writeln!(
            out,
            "{:>6}  {:>5}  {:<width$}  {}",
            r.id,
            r.floor,
            r.status,
            format_timestamp(&r.timestamp),
            width = width
        );
    }
    out
}

fn row_matches(record: &LogRecord, needle: &str) -> bool {
    record.id.to_string().contains(needle)
        || record.floor.to_string().contains(needle)
        || record.status.to_lowercase().contains(needle)
        || format_timestamp(&record.timestamp)
            .to_lowercase()
            .contains(needle)
}
