//! IP geolocation lookup.
//!
//! Resolution itself is an external concern. The stats pipeline only needs a
//! synchronous `ip -> location` answer, which [`GeoCache`] serves from a JSON
//! file populated by whatever resolver the operator runs:
//!
//! ```json
//! { "8.8.8.8": { "country": "United States", "latitude": 37.751, "longitude": -97.822 } }
//! ```

use crate::error::TrapError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// A resolved location. Any field may be missing in the cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default, alias = "lat")]
    pub latitude: Option<f64>,
    #[serde(default, alias = "lon", alias = "lng")]
    pub longitude: Option<f64>,
}

pub trait GeoLookup: Send + Sync {
    fn lookup(&self, ip: &str) -> Option<GeoLocation>;
}

/// Resolves nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoGeo;

impl GeoLookup for NoGeo {
    fn lookup(&self, _ip: &str) -> Option<GeoLocation> {
        None
    }
}

/// In-memory view of a geo cache file.
#[derive(Debug, Default, Clone)]
pub struct GeoCache {
    entries: HashMap<String, GeoLocation>,
}

impl GeoCache {
    pub fn new(entries: HashMap<String, GeoLocation>) -> Self {
        Self { entries }
    }

    /// Load the cache file. A missing file is an empty cache.
    pub fn load(path: &Path) -> Result<Self, TrapError> {
        let data = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "geo: no cache file, starting empty");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        let entries: HashMap<String, GeoLocation> = serde_json::from_str(&data)?;
        tracing::info!(path = %path.display(), entries = entries.len(), "geo: cache loaded");
        Ok(Self { entries })
    }

    /// Like [`GeoCache::load`], but a broken file only costs a warning.
    pub fn load_or_empty(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!(error = %e, path = %path.display(), "geo: failed to load cache, enrichment disabled");
            Self::default()
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl GeoLookup for GeoCache {
    fn lookup(&self, ip: &str) -> Option<GeoLocation> {
        self.entries.get(ip).cloned()
    }
}
