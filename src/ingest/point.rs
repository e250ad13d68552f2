//! Assembly of storable points from embedded chunks.

use super::types::PointError;
use crate::qdrant::Point;
use serde_json::json;
use time::OffsetDateTime;
use uuid::Uuid;

/// Assemble a storable point from a chunk, its vector, and the source filename.
///
/// Each call generates a fresh UUIDv4 identifier; re-ingesting the same
/// document therefore produces new points rather than overwriting old ones.
pub fn build_point(
    chunk_text: &str,
    vector: Vec<f32>,
    source_filename: &str,
) -> Result<Point, PointError> {
    if vector.is_empty() {
        return Err(PointError::EmptyVector);
    }

    Ok(Point {
        id: Uuid::new_v4().to_string(),
        vector,
        payload: json!({
            "text": chunk_text,
            "source": source_filename,
            "ingested_at": current_timestamp_rfc3339(),
        }),
    })
}

/// Current timestamp formatted for payload storage.
fn current_timestamp_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}
