//! Health Data
//!
//! Everything between a raw Apple Health export and the weekly summary
//! quoted in a reflection prompt:
//!
//! - **types**: `RecordType` whitelist, `HealthRecord`, `WeeklyWindow`, `HealthSummary`
//! - **extract**: streaming export parser (XML or ZIP)
//! - **table**: the flat CSV table written by the extractor and uploaded by users
//! - **summary**: weekly window filtering and grouping
//! - **error**: error types
//!
//! ```text
//! export.xml ─► extract ─► Vec<HealthRecord> ─► table (CSV)
//!                                  │
//!                        summarize(window)
//!                                  ▼
//!                            HealthSummary ─► prompt
//! ```

pub mod error;
pub mod extract;
pub mod summary;
pub mod table;
pub mod types;

pub use error::{HealthError, HealthResult};
pub use extract::{extract_path, extract_reader, extract_str, extract_zip, type_counts};
pub use summary::summarize;
pub use table::{read_csv, read_csv_path, read_csv_str, write_csv, write_csv_path, CSV_HEADER};
pub use types::{
    parse_timestamp, HealthRecord, HealthSummary, RecordType, WeeklyWindow, NO_DATA_SENTINEL,
    TIMESTAMP_FORMAT,
};
