use crate::chart::{ChartKind, ChartView, events_per_minute, protocol_series, top_ip_series};
use crate::map::GeoMap;
use crate::table::Tables;
use serde::Serialize;
use signaltrap_core::aggregate::Snapshot;

/// Everything the page shows. Owned by the poll loop and threaded through
/// [`render_snapshot`] on each successful fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardState {
    pub total_events: u64,
    pub last_24h: u64,
    pub events_over_time: ChartView,
    pub top_ips: ChartView,
    pub protocols: ChartView,
    pub tables: Tables,
    /// `None` until the first render.
    pub map: Option<GeoMap>,
}

/// Fold one snapshot into the view state.
///
/// Rendering the same snapshot twice yields the same state: chart handles
/// are updated in place (no revision bump for identical data), tables are
/// rebuilt and the map's markers are replaced.
pub fn render_snapshot(mut state: DashboardState, snapshot: &Snapshot) -> DashboardState {
    state.total_events = snapshot.total_events;
    state.last_24h = snapshot.last_24h;

    state.events_over_time.render(
        ChartKind::Line,
        events_per_minute(&snapshot.recent_events),
        "No data yet",
    );
    state.top_ips.render(
        ChartKind::Bar,
        top_ip_series(&snapshot.top_ips),
        "No IP data yet",
    );
    state.protocols.render(
        ChartKind::Doughnut,
        protocol_series(&snapshot.recent_events),
        "No protocol data yet",
    );

    state.tables = Tables::from_snapshot(snapshot);
    state
        .map
        .get_or_insert_with(GeoMap::default)
        .replace_markers(&snapshot.geo_ips);

    state
}
