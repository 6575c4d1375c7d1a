//! Apple Health Import Routes
//!
//! Endpoints for importing Apple Health export data.
//!
//! - POST /api/v1/import/apple-health - Import an export ZIP or export.xml
//!
//! The extracted records replace the loaded health table, exactly as if
//! the CSV written by `moodmirror extract` had been uploaded.

use axum::{extract::State, http::StatusCode, Json};
use base64::Engine;
use std::io::Cursor;
use std::sync::Arc;

use crate::api::dto::{AppleHealthImportRequest, HealthDataResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::health::{extract_reader, extract_zip, HealthRecord, HealthResult};

/// Accepted upload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExportFormat {
    Zip,
    Xml,
}

impl ExportFormat {
    fn parse(format: &str) -> ApiResult<Self> {
        match format.trim().to_ascii_lowercase().as_str() {
            "zip" => Ok(ExportFormat::Zip),
            "xml" => Ok(ExportFormat::Xml),
            other => Err(ApiError::Validation(format!(
                "Format must be 'zip' or 'xml', got '{}'",
                other
            ))),
        }
    }
}

/// POST /api/v1/import/apple-health
pub async fn import_apple_health(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AppleHealthImportRequest>,
) -> ApiResult<(StatusCode, Json<HealthDataResponse>)> {
    let format = ExportFormat::parse(&req.format)?;

    let data = decode_payload(&req.data)?;
    if data.is_empty() {
        return Err(ApiError::InputMissing(
            "Upload an Apple Health export to import.".to_string(),
        ));
    }

    let bytes = data.len();
    let records = tokio::task::spawn_blocking(move || extract(format, data))
        .await
        .map_err(|e| ApiError::Internal(format!("Extraction task failed: {}", e)))??;

    let response = HealthDataResponse::from_records(&records);
    {
        let mut mirror = state.mirror.lock().await;
        mirror.load_health_records(records);
        state.publish(&mirror);
    }

    tracing::info!(
        format = ?format,
        bytes,
        records = response.records,
        types = response.by_type.len(),
        "Apple Health import completed"
    );

    Ok((StatusCode::OK, Json(response)))
}

fn extract(format: ExportFormat, data: Vec<u8>) -> HealthResult<Vec<HealthRecord>> {
    match format {
        ExportFormat::Zip => extract_zip(Cursor::new(data)),
        ExportFormat::Xml => extract_reader(data.as_slice()),
    }
}

/// Decode standard base64, ignoring embedded whitespace
fn decode_payload(input: &str) -> ApiResult<Vec<u8>> {
    let compact: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    base64::engine::general_purpose::STANDARD
        .decode(compact)
        .map_err(|e| ApiError::Validation(format!("Invalid base64 data: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parse() {
        assert_eq!(ExportFormat::parse("zip").unwrap(), ExportFormat::Zip);
        assert_eq!(ExportFormat::parse(" XML ").unwrap(), ExportFormat::Xml);
        assert!(matches!(
            ExportFormat::parse("csv"),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn test_decode_payload_ignores_line_breaks() {
        assert_eq!(decode_payload("aGVs\nbG8=").unwrap(), b"hello".to_vec());
        assert!(decode_payload("not*base64").is_err());
    }

    #[test]
    fn test_extract_xml_payload() {
        let xml = br#"<HealthData>
<Record type="HKQuantityTypeIdentifierStepCount" value="42" unit="count" startDate="2024-01-02 08:00:00 -0500"/>
</HealthData>"#;

        let records = extract(ExportFormat::Xml, xml.to_vec()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value, "42");
    }
}
