use greenhouse_model::{DocumentId, Location, ReadingStatus, StoredMetadata};
use serde::Serialize;

use crate::filter::{Pagination, QueryFilter};

/// One reading with the context of the document it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRow {
    pub source_id: DocumentId,
    pub name: String,
    pub place: String,
    pub sensor_ref: Option<String>,
    /// Kind of the referenced sensor, `None` when the reference dangles.
    pub kind: Option<String>,
    pub timestamp: String,
    pub value: Option<f64>,
    pub status: ReadingStatus,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryPage {
    /// Matching rows across all pages.
    pub total: usize,
    pub page: usize,
    pub per_page: usize,
    pub items: Vec<QueryRow>,
}

/// Flatten `records` into reading rows, keep those matching `filter`, and
/// return the requested page.
///
/// Rows keep record order, then reading order within a record.
pub fn query(records: &[StoredMetadata], filter: &QueryFilter, pagination: Pagination) -> QueryPage {
    let matching: Vec<QueryRow> = records
        .iter()
        .flat_map(|record| {
            record.metadata.readings.iter().filter_map(move |reading| {
                let kind = record.metadata.kind_of(reading);
                if !filter.matches(kind, reading) {
                    return None;
                }
                Some(QueryRow {
                    source_id: record.id.clone(),
                    name: record.metadata.name.clone(),
                    place: record.metadata.place.clone(),
                    sensor_ref: reading.sensor_ref.clone(),
                    kind: kind.map(str::to_string),
                    timestamp: reading.timestamp.clone().unwrap_or_default(),
                    value: reading.value,
                    status: reading.status,
                    location: reading.location.clone(),
                })
            })
        })
        .collect();

    let total = matching.len();
    let items: Vec<QueryRow> = matching
        .into_iter()
        .skip(pagination.offset())
        .take(pagination.per_page())
        .collect();
    tracing::debug!(
        records = records.len(),
        total,
        returned = items.len(),
        page = pagination.page(),
        "query evaluated"
    );

    QueryPage {
        total,
        page: pagination.page(),
        per_page: pagination.per_page(),
        items,
    }
}
