//! Health Record Extractor
//!
//! Streams an Apple Health export (`export.xml`, or the `.zip` the Health
//! app produces) and keeps only the whitelisted record types.
//!
//! Export format:
//!
//! ```text
//! <HealthData locale="en_US">
//!   <Record type="HKQuantityTypeIdentifierStepCount" sourceName="iPhone"
//!           unit="count" startDate="2024-01-15 10:30:00 -0500"
//!           endDate="2024-01-15 10:35:00 -0500" value="412"/>
//!   ...
//! </HealthData>
//! ```

use crate::health::error::{HealthError, HealthResult};
use crate::health::types::{parse_timestamp, HealthRecord, RecordType};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek};
use std::path::Path;

/// Extract whitelisted records from an export held in memory
pub fn extract_str(xml: &str) -> HealthResult<Vec<HealthRecord>> {
    extract_reader(xml.as_bytes())
}

/// Extract whitelisted records from an `export.xml` or export `.zip` on disk
pub fn extract_path(path: &Path) -> HealthResult<Vec<HealthRecord>> {
    let is_zip = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("zip"))
        .unwrap_or(false);

    let file = File::open(path)?;
    tracing::debug!(path = %path.display(), is_zip, "Opening health export");

    if is_zip {
        extract_zip(BufReader::new(file))
    } else {
        extract_reader(BufReader::new(file))
    }
}

/// Extract from a Health app export archive.
///
/// The archive is searched for its `export.xml` entry.
pub fn extract_zip<R: Read + Seek>(reader: R) -> HealthResult<Vec<HealthRecord>> {
    let mut archive = zip::ZipArchive::new(reader)?;

    for i in 0..archive.len() {
        let file = archive.by_index(i)?;
        let name = file.name().to_string();
        if name.ends_with("export.xml") || name.ends_with("Export.xml") {
            tracing::debug!(entry = %name, "Found export document in archive");
            return extract_reader(BufReader::new(file));
        }
    }

    Err(HealthError::Parse(
        "no export.xml found in archive".to_string(),
    ))
}

/// Extract whitelisted records from any buffered XML source.
///
/// Only `Record` elements directly under the document root are read.
/// Document order is preserved. A malformed document fails as a whole.
pub fn extract_reader<R: BufRead>(input: R) -> HealthResult<Vec<HealthRecord>> {
    let mut reader = Reader::from_reader(input);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut records = Vec::new();
    let mut depth = 0usize;
    let mut seen_root = false;
    let mut dropped = 0usize;

    loop {
        let position = reader.buffer_position();
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                if depth == 0 {
                    enter_root(&mut seen_root)?;
                } else if depth == 1 && e.name().as_ref() == b"Record" {
                    match record_from_element(&e, position)? {
                        Some(record) => records.push(record),
                        None => dropped += 1,
                    }
                }
                depth += 1;
            }
            Event::Empty(e) => {
                if depth == 0 {
                    enter_root(&mut seen_root)?;
                } else if depth == 1 && e.name().as_ref() == b"Record" {
                    match record_from_element(&e, position)? {
                        Some(record) => records.push(record),
                        None => dropped += 1,
                    }
                }
            }
            Event::End(_) => {
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !seen_root {
        return Err(HealthError::Parse(
            "export document has no root element".to_string(),
        ));
    }
    if depth != 0 {
        return Err(HealthError::Parse(format!(
            "export document ended with {} unclosed element(s)",
            depth
        )));
    }

    tracing::info!(
        kept = records.len(),
        dropped,
        "Health export extraction completed"
    );

    Ok(records)
}

fn enter_root(seen_root: &mut bool) -> HealthResult<()> {
    if *seen_root {
        return Err(HealthError::Parse(
            "export document has more than one root element".to_string(),
        ));
    }
    *seen_root = true;
    Ok(())
}

#[derive(Default)]
struct RecordAttributes {
    record_type: Option<String>,
    value: Option<String>,
    unit: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
    source: Option<String>,
}

/// Build a record from a `Record` element, or `None` if its type is not whitelisted
fn record_from_element(
    element: &BytesStart<'_>,
    position: usize,
) -> HealthResult<Option<HealthRecord>> {
    let mut attrs = RecordAttributes::default();

    for attr in element.attributes() {
        let attr = attr.map_err(|e| {
            HealthError::Parse(format!("invalid attribute near byte {}: {}", position, e))
        })?;
        let value = attr.unescape_value()?.into_owned();

        match attr.key.as_ref() {
            b"type" => attrs.record_type = Some(value),
            b"value" => attrs.value = Some(value),
            b"unit" => attrs.unit = Some(value),
            b"startDate" => attrs.start_date = Some(value),
            b"endDate" => attrs.end_date = Some(value),
            b"sourceName" => attrs.source = Some(value),
            _ => {}
        }
    }

    let Some(record_type) = attrs
        .record_type
        .as_deref()
        .and_then(RecordType::from_identifier)
    else {
        return Ok(None);
    };

    let start_raw = attrs.start_date.unwrap_or_default();
    let start_date = parse_timestamp(&start_raw).ok_or_else(|| {
        HealthError::Parse(format!(
            "record near byte {} has invalid startDate {:?}",
            position, start_raw
        ))
    })?;

    let end_date = match attrs.end_date.as_deref() {
        None | Some("") => None,
        Some(raw) => Some(parse_timestamp(raw).ok_or_else(|| {
            HealthError::Parse(format!(
                "record near byte {} has invalid endDate {:?}",
                position, raw
            ))
        })?),
    };

    Ok(Some(HealthRecord {
        record_type,
        value: attrs.value.unwrap_or_default(),
        unit: attrs.unit.unwrap_or_default(),
        start_date,
        end_date,
        source: attrs.source.unwrap_or_default(),
    }))
}

/// Number of extracted records per type
pub fn type_counts(records: &[HealthRecord]) -> BTreeMap<RecordType, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.record_type).or_insert(0) += 1;
    }
    counts
}
