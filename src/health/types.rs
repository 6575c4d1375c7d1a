//! Core health data types
//!
//! - `RecordType`: the closed whitelist of measurement categories we keep
//! - `HealthRecord`: one normalized measurement from an export
//! - `WeeklyWindow`: the 7-day inclusive range a reflection covers
//! - `HealthSummary`: values grouped by type for one window

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Whitelisted health record types.
///
/// Anything else found in an export is dropped without complaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RecordType {
    // Stress & mental health
    HeartRateVariability,
    RestingHeartRate,
    SleepAnalysis,
    AudioExposureEvent,
    // Fitness & exercise
    ActiveEnergyBurned,
    DistanceWalkingRunning,
    ExerciseTime,
    StepCount,
    Vo2Max,
    WalkingHeartRateAverage,
}

impl RecordType {
    /// Every whitelisted type, in export-tool order
    pub const ALL: [RecordType; 10] = [
        RecordType::HeartRateVariability,
        RecordType::RestingHeartRate,
        RecordType::SleepAnalysis,
        RecordType::AudioExposureEvent,
        RecordType::ActiveEnergyBurned,
        RecordType::DistanceWalkingRunning,
        RecordType::ExerciseTime,
        RecordType::StepCount,
        RecordType::Vo2Max,
        RecordType::WalkingHeartRateAverage,
    ];

    /// The identifier used in the export document and the CSV `type` column
    pub fn identifier(&self) -> &'static str {
        match self {
            RecordType::HeartRateVariability => "HKQuantityTypeIdentifierHeartRateVariabilitySDNN",
            RecordType::RestingHeartRate => "HKQuantityTypeIdentifierRestingHeartRate",
            RecordType::SleepAnalysis => "HKCategoryTypeIdentifierSleepAnalysis",
            RecordType::AudioExposureEvent => "HKCategoryTypeIdentifierAudioExposureEvent",
            RecordType::ActiveEnergyBurned => "HKQuantityTypeIdentifierActiveEnergyBurned",
            RecordType::DistanceWalkingRunning => "HKQuantityTypeIdentifierDistanceWalkingRunning",
            RecordType::ExerciseTime => "HKQuantityTypeIdentifierAppleExerciseTime",
            RecordType::StepCount => "HKQuantityTypeIdentifierStepCount",
            RecordType::Vo2Max => "HKQuantityTypeIdentifierVO2Max",
            RecordType::WalkingHeartRateAverage => {
                "HKQuantityTypeIdentifierWalkingHeartRateAverage"
            }
        }
    }

    /// Look up a whitelisted type by its identifier
    pub fn from_identifier(identifier: &str) -> Option<RecordType> {
        RecordType::ALL
            .iter()
            .copied()
            .find(|t| t.identifier() == identifier)
    }

    /// Short human-readable name
    pub fn label(&self) -> &'static str {
        match self {
            RecordType::HeartRateVariability => "heart rate variability",
            RecordType::RestingHeartRate => "resting heart rate",
            RecordType::SleepAnalysis => "sleep analysis",
            RecordType::AudioExposureEvent => "audio exposure event",
            RecordType::ActiveEnergyBurned => "active energy burned",
            RecordType::DistanceWalkingRunning => "walking/running distance",
            RecordType::ExerciseTime => "exercise time",
            RecordType::StepCount => "step count",
            RecordType::Vo2Max => "VO2 max",
            RecordType::WalkingHeartRateAverage => "walking heart rate average",
        }
    }
}

impl std::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.identifier())
    }
}

impl TryFrom<String> for RecordType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        RecordType::from_identifier(&value)
            .ok_or_else(|| format!("record type not in whitelist: {}", value))
    }
}

impl From<RecordType> for String {
    fn from(value: RecordType) -> Self {
        value.identifier().to_string()
    }
}

/// A single measurement extracted from a health export.
///
/// Timestamps are timezone-naive: any offset present in the source is
/// dropped and the wall-clock time kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthRecord {
    pub record_type: RecordType,
    /// Raw value; numeric for quantity types, a category name for sleep
    pub value: String,
    pub unit: String,
    pub start_date: NaiveDateTime,
    pub end_date: Option<NaiveDateTime>,
    pub source: String,
}

/// Timestamp layout used when writing the CSV table
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse a timestamp into a timezone-naive value.
///
/// Accepts the export format (`2024-01-15 10:30:00 -0500`), RFC 3339,
/// naive date-times and bare dates (midnight).
pub fn parse_timestamp(input: &str) -> Option<NaiveDateTime> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S %z") {
        return Some(dt.naive_local());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.naive_local());
    }

    let formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];
    for fmt in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, fmt) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// A 7-day window, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WeeklyWindow {
    /// Window running from `start` through `start + 6 days`
    pub fn starting(start: NaiveDate) -> Self {
        Self {
            start,
            end: start + Duration::days(6),
        }
    }

    /// Whether `start 00:00 <= timestamp <= end 00:00`.
    ///
    /// The last day only contributes records stamped exactly at midnight.
    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        let start = self.start.and_time(NaiveTime::MIN);
        let end = self.end.and_time(NaiveTime::MIN);
        start <= timestamp && timestamp <= end
    }
}

impl std::fmt::Display for WeeklyWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Sentence used in place of a summary when the window holds no data
pub const NO_DATA_SENTINEL: &str = "No health data available for this week.";

/// Health values for one window, grouped by record type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "values", rename_all = "snake_case")]
pub enum HealthSummary {
    /// Nothing fell inside the window
    NoData,
    /// Identifier → values in input order
    ByType(BTreeMap<String, Vec<String>>),
}

impl HealthSummary {
    pub fn is_empty(&self) -> bool {
        matches!(self, HealthSummary::NoData)
    }

    /// Total number of values across all types
    pub fn value_count(&self) -> usize {
        match self {
            HealthSummary::NoData => 0,
            HealthSummary::ByType(map) => map.values().map(Vec::len).sum(),
        }
    }

    /// Render for inclusion in a prompt.
    ///
    /// Numeric values become JSON numbers; category values stay strings.
    pub fn render(&self) -> String {
        match self {
            HealthSummary::NoData => NO_DATA_SENTINEL.to_string(),
            HealthSummary::ByType(map) => {
                let object: serde_json::Map<String, serde_json::Value> = map
                    .iter()
                    .map(|(k, values)| {
                        let values = values.iter().map(|v| json_value(v)).collect();
                        (k.clone(), serde_json::Value::Array(values))
                    })
                    .collect();
                serde_json::to_string_pretty(&object).unwrap_or_else(|_| NO_DATA_SENTINEL.to_string())
            }
        }
    }
}

fn json_value(raw: &str) -> serde_json::Value {
    if let Ok(i) = raw.parse::<i64>() {
        return serde_json::Value::from(i);
    }
    raw.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(serde_json::Value::Number)
        .unwrap_or_else(|| serde_json::Value::String(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_identifier_lookup() {
        for t in RecordType::ALL {
            assert_eq!(RecordType::from_identifier(t.identifier()), Some(t));
        }
        assert_eq!(RecordType::from_identifier("HKQuantityTypeIdentifierHeartRate"), None);
    }

    #[test]
    fn test_parse_export_timestamp_drops_offset() {
        let ts = parse_timestamp("2024-01-15 10:30:00 -0500").unwrap();
        assert_eq!(ts, date(2024, 1, 15).and_hms_opt(10, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let expected = date(2024, 1, 15).and_hms_opt(10, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2024-01-15T10:30:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15 10:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-15T10:30:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-01-15"),
            Some(date(2024, 1, 15).and_hms_opt(0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp(""), None);
    }

    #[test]
    fn test_window_spans_seven_days() {
        let window = WeeklyWindow::starting(date(2024, 1, 1));
        assert_eq!(window.end, date(2024, 1, 7));
        assert!(window.contains(date(2024, 1, 1).and_hms_opt(0, 0, 0).unwrap()));
        assert!(window.contains(date(2024, 1, 6).and_hms_opt(23, 59, 59).unwrap()));
        assert!(window.contains(date(2024, 1, 7).and_hms_opt(0, 0, 0).unwrap()));
        assert!(!window.contains(date(2024, 1, 7).and_hms_opt(0, 0, 1).unwrap()));
        assert!(!window.contains(date(2023, 12, 31).and_hms_opt(23, 59, 59).unwrap()));
        assert_eq!(window.to_string(), "2024-01-01 to 2024-01-07");
    }

    #[test]
    fn test_render_no_data() {
        assert_eq!(HealthSummary::NoData.render(), NO_DATA_SENTINEL);
    }

    #[test]
    fn test_render_mixed_values() {
        let mut map = BTreeMap::new();
        map.insert(
            RecordType::StepCount.identifier().to_string(),
            vec!["1200".to_string(), "35.5".to_string()],
        );
        map.insert(
            RecordType::SleepAnalysis.identifier().to_string(),
            vec!["HKCategoryValueSleepAnalysisAsleepCore".to_string()],
        );
        let rendered = HealthSummary::ByType(map).render();
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["HKQuantityTypeIdentifierStepCount"][0], 1200);
        assert_eq!(parsed["HKQuantityTypeIdentifierStepCount"][1], 35.5);
        assert_eq!(
            parsed["HKCategoryTypeIdentifierSleepAnalysis"][0],
            "HKCategoryValueSleepAnalysisAsleepCore"
        );
    }
}
