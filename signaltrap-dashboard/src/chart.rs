//! Chart views.
//!
//! The charting library is an opaque sink that takes labels and numbers. A
//! [`ChartView`] owns at most one live [`Chart`] handle per metric: it is
//! built on the first render that has data and mutated in place afterwards.

use serde::Serialize;
use signaltrap_core::aggregate::{IpCount, parse_timestamp};
use signaltrap_core::event::Event;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Bar,
    Doughnut,
}

/// Labels with one value each.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Series {
    pub labels: Vec<String>,
    pub data: Vec<u64>,
}

impl Series {
    fn push(&mut self, label: String, value: u64) {
        self.labels.push(label);
        self.data.push(value);
    }
}

/// A live chart handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chart {
    pub kind: ChartKind,
    pub series: Series,
    /// Bumped on every data change; stays put when an update is a no-op.
    pub revision: u64,
}

impl Chart {
    fn new(kind: ChartKind, series: Series) -> Self {
        Self {
            kind,
            series,
            revision: 0,
        }
    }

    fn update(&mut self, series: Series) {
        if self.series != series {
            self.series = series;
            self.revision += 1;
        }
    }
}

/// One chart area on the page: a handle, a "no data" placeholder, or both
/// (the handle survives an empty tick, emptied, so later data can reuse it).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChartView {
    pub handle: Option<Chart>,
    pub placeholder: Option<&'static str>,
}

impl ChartView {
    pub fn render(&mut self, kind: ChartKind, series: Series, empty_message: &'static str) {
        if series.labels.is_empty() {
            if let Some(chart) = &mut self.handle {
                chart.update(series);
            }
            self.placeholder = Some(empty_message);
            return;
        }
        match &mut self.handle {
            Some(chart) => chart.update(series),
            None => self.handle = Some(Chart::new(kind, series)),
        }
        self.placeholder = None;
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder.is_some()
    }
}

// ── Series builders ───────────────────────────────────────────

/// Events per UTC minute (`YYYY-MM-DD HH:MM`), labels ascending. Events
/// without a parseable timestamp are skipped.
pub fn events_per_minute(events: &[Event]) -> Series {
    let mut buckets: BTreeMap<String, u64> = BTreeMap::new();
    for ts in events
        .iter()
        .filter_map(|e| e.timestamp.as_deref())
        .filter_map(parse_timestamp)
    {
        *buckets
            .entry(ts.format("%Y-%m-%d %H:%M").to_string())
            .or_insert(0) += 1;
    }

    let mut series = Series::default();
    for (label, count) in buckets {
        series.push(label, count);
    }
    series
}

/// The ranked IP list as a bar series, order preserved.
pub fn top_ip_series(top: &[IpCount]) -> Series {
    let mut series = Series::default();
    for entry in top {
        series.push(entry.ip.clone(), entry.count);
    }
    series
}

/// Events per protocol in first-seen order; missing protocol is `Unknown`.
pub fn protocol_series(events: &[Event]) -> Series {
    let mut series = Series::default();
    for event in events {
        let proto = event.protocol.as_deref().unwrap_or("Unknown");
        match series.labels.iter().position(|l| l == proto) {
            Some(i) => series.data[i] += 1,
            None => series.push(proto.to_string(), 1),
        }
    }
    series
}
