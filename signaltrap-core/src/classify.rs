use serde::Serialize;

/// Display bucket for a source IP. Cosmetic only; never used for counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IpClass {
    /// Loopback or the 172.16.0.0/12 private range.
    Internal,
    /// 192.168.0.0/16.
    Lan,
    External,
}

impl IpClass {
    /// Classify a dotted-quad string. Rules are checked in order and the
    /// first match wins.
    pub fn of(ip: &str) -> Self {
        if ip.starts_with("127.") {
            IpClass::Internal
        } else if ip.starts_with("192.168.") {
            IpClass::Lan
        } else if in_private_172(ip) {
            IpClass::Internal
        } else {
            IpClass::External
        }
    }

    /// CSS class used by the table renderer.
    pub fn css_class(self) -> &'static str {
        match self {
            IpClass::Internal | IpClass::Lan => "ip-internal",
            IpClass::External => "ip-external",
        }
    }

    /// Suffix shown next to the IP, empty for external addresses.
    pub fn label(self) -> &'static str {
        match self {
            IpClass::Internal => "internal",
            IpClass::Lan => "LAN",
            IpClass::External => "",
        }
    }
}

/// `172.16.` through `172.31.` inclusive.
fn in_private_172(ip: &str) -> bool {
    let Some(rest) = ip.strip_prefix("172.") else {
        return false;
    };
    let Some((second, _)) = rest.split_once('.') else {
        return false;
    };
    second.len() == 2 && matches!(second.parse::<u8>(), Ok(16..=31))
}
