//! Weekly Correlation Builder
//!
//! Narrows a health table to one weekly window and groups the values by
//! record type, ready to be quoted in a reflection prompt.

use crate::health::types::{HealthRecord, HealthSummary, WeeklyWindow};
use std::collections::BTreeMap;

/// Summarize the records whose start date falls inside `window`.
///
/// Both window ends are inclusive. Values keep their input order within a
/// type. An empty window yields [`HealthSummary::NoData`].
pub fn summarize(records: &[HealthRecord], window: WeeklyWindow) -> HealthSummary {
    let mut grouped: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for record in records.iter().filter(|r| window.contains(r.start_date)) {
        grouped
            .entry(record.record_type.identifier().to_string())
            .or_default()
            .push(record.value.clone());
    }

    if grouped.is_empty() {
        tracing::debug!(window = %window, "No health data in window");
        return HealthSummary::NoData;
    }

    tracing::debug!(
        window = %window,
        types = grouped.len(),
        values = grouped.values().map(Vec::len).sum::<usize>(),
        "Built weekly health summary"
    );

    HealthSummary::ByType(grouped)
}
