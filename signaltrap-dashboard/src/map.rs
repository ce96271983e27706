use crate::table::escape_html;
use serde::Serialize;
use signaltrap_core::aggregate::GeoIp;

/// A single pin on the world map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub lat: f64,
    pub lon: f64,
    pub popup: String,
}

impl Marker {
    /// `None` unless both coordinates are known.
    pub fn from_geo(geo: &GeoIp) -> Option<Self> {
        let (lat, lon) = (geo.lat?, geo.lon?);
        let country = geo.country.as_deref().unwrap_or("Unknown");
        Some(Self {
            lat,
            lon,
            popup: format!(
                "<strong>IP:</strong> {}<br><strong>Country:</strong> {}<br><strong>Events:</strong> {}",
                escape_html(&geo.ip),
                escape_html(country),
                geo.count
            ),
        })
    }
}

/// The map widget. Created once on the first tick and kept for the life of
/// the client; only its marker layer changes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeoMap {
    pub center: (f64, f64),
    pub zoom: u8,
    pub markers: Vec<Marker>,
}

impl Default for GeoMap {
    fn default() -> Self {
        Self {
            center: (0.0, 0.0),
            zoom: 1,
            markers: Vec::new(),
        }
    }
}

impl GeoMap {
    /// Drop every existing marker, then place one per located record.
    pub fn replace_markers(&mut self, geo_ips: &[GeoIp]) {
        self.markers.clear();
        self.markers
            .extend(geo_ips.iter().filter_map(Marker::from_geo));
    }
}
