//! Health data error types

use thiserror::Error;

/// Errors raised while reading or writing health data
#[derive(Error, Debug)]
pub enum HealthError {
    /// Malformed export document or CSV table
    #[error("Parse error: {0}")]
    Parse(String),

    /// I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader or writer failed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Export archive could not be opened
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
}

impl From<quick_xml::Error> for HealthError {
    fn from(err: quick_xml::Error) -> Self {
        HealthError::Parse(format!("malformed export document: {}", err))
    }
}

/// Result type alias for health data operations
pub type HealthResult<T> = Result<T, HealthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HealthError::Parse("line 3: missing startDate".to_string());
        assert_eq!(err.to_string(), "Parse error: line 3: missing startDate");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "export.xml");
        let err: HealthError = io_err.into();
        assert!(matches!(err, HealthError::Io(_)));
    }
}
