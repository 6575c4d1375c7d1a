//! Health CSV Table
//!
//! The flat table the extractor writes and the journal reads back:
//!
//! ```text
//! type,value,unit,startDate,endDate,source
//! HKQuantityTypeIdentifierStepCount,412,count,2024-01-15 10:30:00,2024-01-15 10:35:00,iPhone
//! ```
//!
//! On read, timestamps are normalized to timezone-naive values and rows of
//! non-whitelisted types are dropped.

use crate::health::error::{HealthError, HealthResult};
use crate::health::types::{parse_timestamp, HealthRecord, RecordType, TIMESTAMP_FORMAT};
use std::io::{Read, Write};
use std::path::Path;

/// CSV column order
pub const CSV_HEADER: [&str; 6] = ["type", "value", "unit", "startDate", "endDate", "source"];

/// Write records as CSV, header included
pub fn write_csv<W: Write>(records: &[HealthRecord], writer: W) -> HealthResult<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(CSV_HEADER)?;

    for record in records {
        let start = record.start_date.format(TIMESTAMP_FORMAT).to_string();
        let end = record
            .end_date
            .map(|d| d.format(TIMESTAMP_FORMAT).to_string())
            .unwrap_or_default();

        writer.write_record([
            record.record_type.identifier(),
            record.value.as_str(),
            record.unit.as_str(),
            start.as_str(),
            end.as_str(),
            record.source.as_str(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Write records to a CSV file
pub fn write_csv_path(records: &[HealthRecord], path: &Path) -> HealthResult<()> {
    let file = std::fs::File::create(path)?;
    write_csv(records, file)?;
    tracing::info!(path = %path.display(), rows = records.len(), "Wrote health CSV");
    Ok(())
}

/// Resolved positions of the columns we read
struct Columns {
    record_type: usize,
    value: usize,
    start_date: usize,
    unit: Option<usize>,
    end_date: Option<usize>,
    source: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> HealthResult<Self> {
        let find = |name: &str| headers.iter().position(|h| h.trim() == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| {
                HealthError::Parse(format!("health CSV is missing the '{}' column", name))
            })
        };

        Ok(Self {
            record_type: require("type")?,
            value: require("value")?,
            start_date: require("startDate")?,
            unit: find("unit"),
            end_date: find("endDate"),
            source: find("source"),
        })
    }
}

/// Read a health table from any CSV source
pub fn read_csv<R: Read>(input: R) -> HealthResult<Vec<HealthRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input);

    let headers = reader.headers()?.clone();
    let columns = Columns::from_headers(&headers)?;

    let mut records = Vec::new();
    let mut dropped = 0usize;

    for (row_num, result) in reader.records().enumerate() {
        // Header is line 1
        let line = row_num + 2;
        let row = result?;
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| row.get(i))
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };

        let Some(record_type) = RecordType::from_identifier(&cell(Some(columns.record_type)))
        else {
            dropped += 1;
            continue;
        };

        let start_raw = cell(Some(columns.start_date));
        let start_date = parse_timestamp(&start_raw).ok_or_else(|| {
            HealthError::Parse(format!("line {}: invalid startDate {:?}", line, start_raw))
        })?;

        let end_raw = cell(columns.end_date);
        let end_date = if end_raw.is_empty() {
            None
        } else {
            Some(parse_timestamp(&end_raw).ok_or_else(|| {
                HealthError::Parse(format!("line {}: invalid endDate {:?}", line, end_raw))
            })?)
        };

        records.push(HealthRecord {
            record_type,
            value: cell(Some(columns.value)),
            unit: cell(columns.unit),
            start_date,
            end_date,
            source: cell(columns.source),
        });
    }

    tracing::debug!(rows = records.len(), dropped, "Loaded health table");
    Ok(records)
}

/// Read a health table held in memory (an upload)
pub fn read_csv_str(csv_data: &str) -> HealthResult<Vec<HealthRecord>> {
    read_csv(csv_data.as_bytes())
}

/// Read a health table from disk
pub fn read_csv_path(path: &Path) -> HealthResult<Vec<HealthRecord>> {
    let file = std::fs::File::open(path)?;
    read_csv(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::extract::extract_str;

    #[test]
    fn test_written_csv_layout() {
        let xml = r#"<HealthData>
<Record type="HKQuantityTypeIdentifierStepCount" sourceName="iPhone" unit="count" startDate="2024-01-15 10:30:00 -0500" endDate="2024-01-15 10:35:00 -0500" value="412"/>
<Record type="HKCategoryTypeIdentifierAudioExposureEvent" sourceName="Watch, Series 9" startDate="2024-01-16 12:00:00 -0500"/>
</HealthData>"#;
        let records = extract_str(xml).unwrap();

        let mut out = Vec::new();
        write_csv(&records, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "type,value,unit,startDate,endDate,source");
        assert_eq!(
            lines[1],
            "HKQuantityTypeIdentifierStepCount,412,count,2024-01-15 10:30:00,2024-01-15 10:35:00,iPhone"
        );
        assert_eq!(
            lines[2],
            "HKCategoryTypeIdentifierAudioExposureEvent,,,2024-01-16 12:00:00,,\"Watch, Series 9\""
        );
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_read_normalizes_timezones() {
        let csv_data = "type,value,unit,startDate,endDate,source
HKQuantityTypeIdentifierRestingHeartRate,58,count/min,2024-01-02 07:00:00 +0900,2024-01-02 07:00:00 +0900,Watch
HKQuantityTypeIdentifierStepCount,100,count,2024-01-03T08:00:00Z,,iPhone";

        let records = read_csv_str(csv_data).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(
            records[0].start_date,
            parse_timestamp("2024-01-02 07:00:00").unwrap()
        );
        assert_eq!(records[1].end_date, None);
        assert_eq!(records[1].source, "iPhone");
    }

    #[test]
    fn test_read_drops_unlisted_types() {
        let csv_data = "type,value,startDate
HKQuantityTypeIdentifierHeartRate,72,2024-01-02
HKQuantityTypeIdentifierVO2Max,40.1,2024-01-02";

        let records = read_csv_str(csv_data).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].record_type, RecordType::Vo2Max);
        assert_eq!(records[0].unit, "");
    }

    #[test]
    fn test_read_requires_core_columns() {
        let err = read_csv_str("type,value\nHKQuantityTypeIdentifierStepCount,1").unwrap_err();
        assert!(err.to_string().contains("startDate"));
    }

    #[test]
    fn test_read_reports_bad_timestamp_line() {
        let csv_data = "type,value,startDate
HKQuantityTypeIdentifierStepCount,1,2024-01-02
HKQuantityTypeIdentifierStepCount,2,not-a-date";

        let err = read_csv_str(csv_data).unwrap_err();
        assert!(matches!(err, HealthError::Parse(_)));
        assert!(err.to_string().contains("line 3"));
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("health_data_extracted.csv");
        let records = read_csv_str(
            "type,value,unit,startDate,endDate,source
HKQuantityTypeIdentifierAppleExerciseTime,32,min,2024-01-04 18:00:00,2024-01-04 18:32:00,Watch",
        )
        .unwrap();

        write_csv_path(&records, &path).unwrap();
        let reloaded = read_csv_path(&path).unwrap();

        assert_eq!(reloaded, records);
    }
}
