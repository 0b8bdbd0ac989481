//! Loader for `timestamp,value,category` CSV files.
//!
//! The first record is a header and is skipped. Fields follow RFC 4180
//! quoting. Timestamps may be integer milliseconds since the epoch, RFC 3339,
//! `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DD` (the last two read as UTC). Rows with a malformed timestamp or
//! a non-finite value are dropped here, so everything downstream only sees
//! valid points.

use crate::data::DataPoint;
use crate::error::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Points parsed from a CSV source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvData {
    /// Valid rows in file order.
    pub points: Vec<DataPoint>,
    /// Data rows that were dropped.
    pub skipped: usize,
}

/// Parse CSV text.
///
/// Fields may be quoted, so a category can contain commas. Rows may carry
/// fewer or more fields than the header.
pub fn parse_csv(content: &str) -> CsvData {
    match read_points(content.as_bytes()) {
        Ok(data) => data,
        Err(e) => {
            log::warn!("CSV text could not be read: {e}");
            CsvData::default()
        }
    }
}

/// Read and parse a CSV file.
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<CsvData> {
    let file = File::open(path)?;
    read_points(file)
}

/// Only I/O failures abort; malformed records are counted and skipped.
fn read_points<R: Read>(source: R) -> Result<CsvData> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(source);
    let mut data = CsvData::default();

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                log::debug!("skipping unreadable CSV record: {e}");
                data.skipped += 1;
                continue;
            }
        };
        if record.iter().all(str::is_empty) {
            continue;
        }
        match parse_record(&record) {
            Some(point) => data.points.push(point),
            None => {
                let line = record.position().map_or(0, csv::Position::line);
                log::debug!("skipping malformed CSV row {line}: {record:?}");
                data.skipped += 1;
            }
        }
    }

    if data.skipped > 0 {
        log::info!("loaded {} CSV rows, skipped {}", data.points.len(), data.skipped);
    }
    Ok(data)
}

fn parse_record(record: &StringRecord) -> Option<DataPoint> {
    let timestamp = parse_timestamp(record.get(0)?)?;
    let value: f64 = record.get(1)?.parse().ok()?;
    if !value.is_finite() {
        return None;
    }
    let category = record.get(2).filter(|c| !c.is_empty()).map(String::from);
    Some(DataPoint { timestamp, value, category })
}

/// Milliseconds since the epoch for any accepted timestamp spelling.
pub fn parse_timestamp(field: &str) -> Option<i64> {
    if let Ok(ms) = field.parse::<i64>() {
        return Some(ms);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(field) {
        return Some(dt.timestamp_millis());
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(field, format) {
            return Some(Utc.from_utc_datetime(&naive).timestamp_millis());
        }
    }
    let date = NaiveDate::parse_from_str(field, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?).timestamp_millis())
}
