//! Folds parsed events into a [`Snapshot`].
//!
//! The aggregator is rebuilt from the first line of the log on every read;
//! nothing carries over between snapshots. Rankings are a stable sort by
//! descending count, so equal counts keep the order in which the key first
//! appeared in the file and an unchanged log always ranks identically.

use crate::event::Event;
use crate::geo::{GeoLookup, NoGeo};
use chrono::{DateTime, Duration, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::hash::Hash;

/// Output bounds for the ranked and recent sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub top: usize,
    pub recent: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self { top: 10, recent: 50 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpCount {
    pub ip: String,
    pub count: u64,
    #[serde(rename = "lastSeen", default)]
    pub last_seen: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortCount {
    pub port: u16,
    pub count: u64,
}

/// Map marker source. `lat`/`lon` may be missing when the cache only knows
/// the country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoIp {
    pub ip: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub country: Option<String>,
    pub count: u64,
}

/// Everything `/api/stats` returns. Missing keys deserialize as empty so a
/// client can read the minimal `{ipCounts, portCounts, lastSeen}` form too.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub ip_counts: BTreeMap<String, u64>,
    #[serde(default)]
    pub port_counts: BTreeMap<u16, u64>,
    #[serde(default)]
    pub last_seen: BTreeMap<String, String>,
    #[serde(default)]
    pub total_events: u64,
    #[serde(rename = "last24h", default)]
    pub last_24h: u64,
    #[serde(rename = "topIPs", default)]
    pub top_ips: Vec<IpCount>,
    #[serde(default)]
    pub top_ports: Vec<PortCount>,
    #[serde(default)]
    pub recent_events: Vec<Event>,
    #[serde(rename = "geoIPs", default)]
    pub geo_ips: Vec<GeoIp>,
}

/// Insertion-ordered counter.
#[derive(Debug)]
struct Tally<K> {
    order: Vec<(K, u64)>,
    index: HashMap<K, usize>,
}

impl<K: Eq + Hash + Clone> Tally<K> {
    fn new() -> Self {
        Self {
            order: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn bump(&mut self, key: &K) {
        match self.index.get(key) {
            Some(&i) => self.order[i].1 += 1,
            None => {
                self.index.insert(key.clone(), self.order.len());
                self.order.push((key.clone(), 1));
            }
        }
    }

    /// All keys by descending count; ties in first-seen order.
    fn ranked(&self) -> Vec<(K, u64)> {
        let mut ranked = self.order.clone();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }
}

/// Single-pass accumulator. Feed it with [`Aggregator::push`] in file order.
#[derive(Debug)]
pub struct Aggregator {
    limits: Limits,
    now: DateTime<Utc>,
    cutoff: DateTime<Utc>,
    ips: Tally<String>,
    ports: Tally<u16>,
    last_seen: HashMap<String, String>,
    recent: VecDeque<Event>,
    total: u64,
    last_24h: u64,
}

impl Aggregator {
    /// `now` anchors the 24-hour window `(now - 24h, now]`.
    pub fn new(limits: Limits, now: DateTime<Utc>) -> Self {
        Self {
            limits,
            now,
            cutoff: now - Duration::hours(24),
            ips: Tally::new(),
            ports: Tally::new(),
            last_seen: HashMap::new(),
            recent: VecDeque::with_capacity(limits.recent),
            total: 0,
            last_24h: 0,
        }
    }

    pub fn push(&mut self, event: Event) {
        self.total += 1;

        if let Some(ip) = &event.source_ip {
            self.ips.bump(ip);
            if let Some(ts) = &event.timestamp {
                self.last_seen.insert(ip.clone(), ts.clone());
            }
        }
        if let Some(port) = event.dest_port {
            self.ports.bump(&port);
        }
        if event
            .timestamp
            .as_deref()
            .and_then(parse_timestamp)
            .is_some_and(|ts| self.cutoff < ts && ts <= self.now)
        {
            self.last_24h += 1;
        }

        if self.limits.recent == 0 {
            return;
        }
        if self.recent.len() == self.limits.recent {
            self.recent.pop_front();
        }
        self.recent.push_back(event);
    }

    /// Build the snapshot without geo enrichment.
    pub fn finish(self) -> Snapshot {
        self.finish_with_geo(&NoGeo)
    }

    /// Build the snapshot, resolving every counted IP through `geo`.
    ///
    /// `geoIPs` follows the full ranking (not truncated to the top limit) and
    /// holds only IPs the lookup knows about.
    pub fn finish_with_geo(self, geo: &dyn GeoLookup) -> Snapshot {
        let ranked_ips = self.ips.ranked();

        let geo_ips = ranked_ips
            .iter()
            .filter_map(|(ip, count)| {
                geo.lookup(ip).map(|loc| GeoIp {
                    ip: ip.clone(),
                    lat: loc.latitude,
                    lon: loc.longitude,
                    country: loc.country,
                    count: *count,
                })
            })
            .collect();

        let top_ips = ranked_ips
            .iter()
            .take(self.limits.top)
            .map(|(ip, count)| IpCount {
                ip: ip.clone(),
                count: *count,
                last_seen: self.last_seen.get(ip).cloned(),
            })
            .collect();

        let top_ports = self
            .ports
            .ranked()
            .into_iter()
            .take(self.limits.top)
            .map(|(port, count)| PortCount { port, count })
            .collect();

        Snapshot {
            ip_counts: self.ips.order.into_iter().collect(),
            port_counts: self.ports.order.into_iter().collect(),
            last_seen: self.last_seen.into_iter().collect(),
            total_events: self.total,
            last_24h: self.last_24h,
            top_ips,
            top_ports,
            // newest first
            recent_events: self.recent.into_iter().rev().collect(),
            geo_ips,
        }
    }
}

/// Aggregate a whole event sequence.
pub fn aggregate<I>(events: I, limits: Limits, now: DateTime<Utc>) -> Snapshot
where
    I: IntoIterator<Item = Event>,
{
    let mut agg = Aggregator::new(limits, now);
    for event in events {
        agg.push(event);
    }
    agg.finish()
}

/// Parse the timestamp forms the line parser accepts: RFC 3339 plus offsets
/// written without a colon (`+0100`).
pub fn parse_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .or_else(|_| DateTime::<FixedOffset>::parse_from_str(ts, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
