//! Where a rendered [`DashboardState`] ends up.
//!
//! [`HtmlPageSink`] writes a self-contained page into the directory the API
//! serves statically. The file is written atomically: first to a `.tmp`
//! sibling, then renamed, so a browser never sees half a page.

use crate::state::DashboardState;
use anyhow::Context;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub trait RenderSink: Send {
    fn publish(&mut self, state: &DashboardState) -> anyhow::Result<()>;
}

pub struct HtmlPageSink {
    path: PathBuf,
    /// Browser reload period; matches the poll period.
    refresh: Duration,
}

impl HtmlPageSink {
    pub fn new(path: impl Into<PathBuf>, refresh: Duration) -> Self {
        Self {
            path: path.into(),
            refresh,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RenderSink for HtmlPageSink {
    fn publish(&mut self, state: &DashboardState) -> anyhow::Result<()> {
        let page = render_page(state, self.refresh)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let tmp = self.path.with_extension("html.tmp");
        std::fs::write(&tmp, page).with_context(|| format!("writing {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("renaming {} to {}", tmp.display(), self.path.display()))?;

        tracing::debug!(path = %self.path.display(), "dashboard page written");
        Ok(())
    }
}

/// JSON for an inline `<script>` block. `</` is split so no string inside
/// can close the element.
fn script_json<T: serde::Serialize>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

pub fn render_page(state: &DashboardState, refresh: Duration) -> anyhow::Result<String> {
    let charts = script_json(&serde_json::json!({
        "eventsOverTime": &state.events_over_time,
        "topIPs": &state.top_ips,
        "protocols": &state.protocols,
    }))?;
    let map = script_json(&state.map)?;

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta http-equiv="refresh" content="{refresh}">
<title>SignalTrap</title>
<style>
.ip-internal {{ color: #2e7d32; }}
.ip-external {{ color: #c62828; }}
.ip-label {{ font-size: 0.8em; opacity: 0.7; }}
</style>
</head>
<body>
<h1>SignalTrap</h1>
<section id="counters">
<div>Total events: <span id="totalEvents">{total}</span></div>
<div>Last 24h: <span id="last24h">{last_24h}</span></div>
</section>
<section id="charts"><div id="eventsChart"></div><div id="ipChart"></div><div id="protocolChart"></div></section>
<div id="map"></div>
<h2>Top IPs</h2>
<table id="topIPs"><thead><tr><th>IP</th><th>Events</th></tr></thead><tbody>{top_ips}</tbody></table>
<h2>Top ports</h2>
<table id="topPorts"><thead><tr><th>Port</th><th>Events</th></tr></thead><tbody>{top_ports}</tbody></table>
<h2>Recent events</h2>
<table id="recentEvents"><thead><tr><th>Time</th><th>Source IP</th><th>Port</th><th>Src port</th><th>Protocol</th><th>Type</th><th>Message</th><th>User agent</th><th>Banner</th></tr></thead><tbody>{recent}</tbody></table>
<script type="application/json" id="chartData">{charts}</script>
<script type="application/json" id="mapData">{map}</script>
</body>
</html>
"#,
        refresh = refresh.as_secs().max(1),
        total = state.total_events,
        last_24h = state.last_24h,
        top_ips = state.tables.top_ips,
        top_ports = state.tables.top_ports,
        recent = state.tables.recent_events,
    ))
}
