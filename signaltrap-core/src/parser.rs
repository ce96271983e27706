//! Line parser for the connection log.
//!
//! Lines look like firewall or honeypot entries:
//!
//! ```text
//! 2025-11-21T12:34:56Z SRC=1.2.3.4 DSTPORT=22
//! 2025-11-21T12:35:02.120+01:00 SRC=5.6.7.8 SPT=40122 DSTPORT=8080 PROTO=HTTP METHOD=GET PATH=/wp-login.php UA="curl/8.0"
//! ```
//!
//! Each field is matched on its own, first occurrence only. A line that
//! matches nothing is not an error; it yields an empty [`Event`].

use crate::event::{Event, service_for_port};
use regex::Regex;
use std::sync::LazyLock;

static TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:?\d{2}))(?:\s|$)")
        .expect("timestamp pattern")
});
static SOURCE_IP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"SRC=([0-9.]+)").expect("source ip pattern"));
static DEST_PORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"DSTPORT=(\d{1,5})").expect("dest port pattern"));

// Dashboard-level tokens. Anchored to a token start so `SPT=` never matches
// inside a longer key.
static SRC_PORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)SPT=(\d{1,5})").expect("src port pattern"));
static PROTOCOL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)PROTO=([A-Za-z0-9]+)").expect("protocol pattern"));
static METHOD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)METHOD=([A-Za-z]+)").expect("method pattern"));
static PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)PATH=(\S+)").expect("path pattern"));
static EVENT_TYPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)TYPE=(\S+)").expect("event type pattern"));
static BANNER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)BANNER=(true|false)\b").expect("banner pattern"));
static USER_AGENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?:^|\s)UA="([^"]*)""#).expect("user agent pattern"));

/// First capture group of `re` in `line`.
fn capture<'a>(re: &Regex, line: &'a str) -> Option<&'a str> {
    re.captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

fn capture_port(re: &Regex, line: &str) -> Option<u16> {
    // 5 digits can overflow u16 (e.g. 99999); such ports are dropped.
    capture(re, line).and_then(|s| s.parse().ok())
}

/// Parse one raw log line. Never fails.
pub fn parse_line(line: &str) -> Event {
    let dest_port = capture_port(&DEST_PORT, line);
    let protocol = capture(&PROTOCOL, line)
        .map(str::to_string)
        .or_else(|| dest_port.and_then(service_for_port).map(str::to_string));

    Event {
        timestamp: capture(&TIMESTAMP, line).map(str::to_string),
        source_ip: capture(&SOURCE_IP, line).map(str::to_string),
        dest_port,
        protocol,
        method: capture(&METHOD, line).map(str::to_string),
        path: capture(&PATH, line).map(str::to_string),
        src_port: capture_port(&SRC_PORT, line),
        event_type: capture(&EVENT_TYPE, line).map(str::to_string),
        user_agent: capture(&USER_AGENT, line).map(str::to_string),
        banner_sent: capture(&BANNER, line).map(|b| b == "true"),
    }
}

/// Parse every non-empty line of `text`, in file order.
pub fn parse_log(text: &str) -> impl Iterator<Item = Event> + '_ {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(parse_line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_canonical_line() {
        let ev = parse_line("2025-11-21T12:34:56Z SRC=1.2.3.4 DSTPORT=22");
        assert_eq!(ev.timestamp.as_deref(), Some("2025-11-21T12:34:56Z"));
        assert_eq!(ev.source_ip.as_deref(), Some("1.2.3.4"));
        assert_eq!(ev.dest_port, Some(22));
        assert_eq!(ev.protocol.as_deref(), Some("SSH"));
    }

    #[test]
    fn timestamp_accepts_fraction_and_offsets() {
        for (line, want) in [
            ("2025-01-01T00:00:00.123Z x", "2025-01-01T00:00:00.123Z"),
            ("2025-01-01T00:00:00+01:00 x", "2025-01-01T00:00:00+01:00"),
            ("2025-01-01T00:00:00-0500", "2025-01-01T00:00:00-0500"),
        ] {
            assert_eq!(parse_line(line).timestamp.as_deref(), Some(want), "line: {line}");
        }
    }

    #[test]
    fn timestamp_must_be_followed_by_a_separator() {
        assert!(parse_line("2025-01-01T00:00:00ZSRC=1.1.1.1").timestamp.is_none());
        assert!(parse_line("2025-01-01T00:00:00 SRC=1.1.1.1").timestamp.is_none());
    }

    #[test]
    fn first_occurrence_wins() {
        let ev = parse_line("SRC=1.1.1.1 SRC=2.2.2.2 DSTPORT=80 DSTPORT=443");
        assert_eq!(ev.source_ip.as_deref(), Some("1.1.1.1"));
        assert_eq!(ev.dest_port, Some(80));
    }

    #[test]
    fn fields_are_independent() {
        let ev = parse_line("kernel: DSTPORT=3389");
        assert!(ev.source_ip.is_none());
        assert!(ev.timestamp.is_none());
        assert_eq!(ev.dest_port, Some(3389));
    }

    #[test]
    fn source_ip_stops_at_non_digit() {
        let ev = parse_line("SRC=10.0.0.7,DSTPORT=22");
        assert_eq!(ev.source_ip.as_deref(), Some("10.0.0.7"));
    }

    #[test]
    fn port_takes_at_most_five_digits_and_drops_overflow() {
        assert_eq!(parse_line("DSTPORT=123456").dest_port, Some(12345));
        assert_eq!(parse_line("DSTPORT=99999").dest_port, None);
        assert_eq!(parse_line("DSTPORT=0").dest_port, Some(0));
    }

    #[test]
    fn garbage_yields_empty_event() {
        assert!(parse_line("hello world").is_empty());
        assert!(parse_line("").is_empty());
    }

    #[test]
    fn dashboard_tokens_are_extracted() {
        let ev = parse_line(
            r#"2025-01-01T00:00:00Z SRC=5.6.7.8 SPT=40122 DSTPORT=8080 PROTO=HTTP METHOD=GET PATH=/wp-login.php TYPE=probe BANNER=false UA="Mozilla/5.0 (X11)""#,
        );
        assert_eq!(ev.src_port, Some(40122));
        assert_eq!(ev.protocol.as_deref(), Some("HTTP"));
        assert_eq!(ev.method.as_deref(), Some("GET"));
        assert_eq!(ev.path.as_deref(), Some("/wp-login.php"));
        assert_eq!(ev.event_type.as_deref(), Some("probe"));
        assert_eq!(ev.banner_sent, Some(false));
        assert_eq!(ev.user_agent.as_deref(), Some("Mozilla/5.0 (X11)"));
    }

    #[test]
    fn explicit_protocol_beats_port_table() {
        let ev = parse_line("DSTPORT=22 PROTO=TCP");
        assert_eq!(ev.protocol.as_deref(), Some("TCP"));
    }

    #[test]
    fn spt_does_not_match_inside_dstport() {
        assert!(parse_line("DSTPORT=22").src_port.is_none());
    }

    #[test]
    fn parse_log_skips_blank_lines() {
        let events: Vec<_> = parse_log("SRC=1.1.1.1\n\n   \nDSTPORT=22\n").collect();
        assert_eq!(events.len(), 2);
    }
}
