use serde::{Deserialize, Serialize};

/// One parsed log line.
///
/// Every field is independently optional: a line that only carries a port
/// still yields an `Event` with `dest_port` set and everything else `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(rename = "sourceIP", default)]
    pub source_ip: Option<String>,
    #[serde(default)]
    pub dest_port: Option<u16>,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub src_port: Option<u16>,
    #[serde(default)]
    pub event_type: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub banner_sent: Option<bool>,
}

impl Event {
    /// True when no field could be extracted.
    pub fn is_empty(&self) -> bool {
        *self == Event::default()
    }
}

/// Well-known honeypot listener ports and the service each one imitates.
const SERVICES: &[(u16, &str)] = &[
    (21, "FTP"),
    (22, "SSH"),
    (80, "HTTP"),
    (443, "HTTPS"),
    (3306, "MySQL"),
    (3389, "RDP"),
    (5021, "FTP"),
    (5022, "SSH"),
    (6379, "Redis"),
    (8080, "HTTP"),
    (27017, "MongoDB"),
    (53306, "MySQL"),
    (53389, "RDP"),
    (56379, "Redis"),
    (57017, "MongoDB"),
];

/// Service name for a destination port, if it is one of the trap listeners.
pub fn service_for_port(port: u16) -> Option<&'static str> {
    SERVICES
        .binary_search_by_key(&port, |(p, _)| *p)
        .ok()
        .map(|i| SERVICES[i].1)
}
