//! Read → parse → aggregate, once per call.

use crate::aggregate::{Aggregator, Limits, Snapshot};
use crate::error::TrapError;
use crate::geo::GeoLookup;
use crate::parser::parse_log;
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::Path;

/// Read the whole log. `Ok(None)` when the file does not exist.
///
/// Invalid UTF-8 is replaced rather than rejected; the parser only looks for
/// ASCII markers.
pub fn read_log(path: &Path) -> Result<Option<String>, TrapError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Aggregate raw log text.
pub fn snapshot_from_text(
    text: &str,
    limits: Limits,
    geo: &dyn GeoLookup,
    now: DateTime<Utc>,
) -> Snapshot {
    let mut agg = Aggregator::new(limits, now);
    for event in parse_log(text) {
        agg.push(event);
    }
    agg.finish_with_geo(geo)
}

/// Build a fresh snapshot of the log at `path`.
///
/// A missing file is an empty snapshot. Any other I/O failure is returned
/// as-is; nothing is retried.
pub fn load_snapshot(
    path: &Path,
    limits: Limits,
    geo: &dyn GeoLookup,
    now: DateTime<Utc>,
) -> Result<Snapshot, TrapError> {
    match read_log(path)? {
        Some(text) => Ok(snapshot_from_text(&text, limits, geo, now)),
        None => {
            tracing::debug!(path = %path.display(), "stats: log file absent, empty snapshot");
            Ok(Snapshot::default())
        }
    }
}
