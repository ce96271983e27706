//! HTML table bodies for the three dashboard tables.
//!
//! Every string that came off the wire goes through [`escape_html`] before it
//! is placed in markup; log lines are attacker-controlled.

use serde::Serialize;
use signaltrap_core::aggregate::{IpCount, PortCount, Snapshot};
use signaltrap_core::classify::IpClass;
use signaltrap_core::event::Event;
use std::fmt::Write;

/// Rendered `<tbody>` contents, rebuilt from scratch on every tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tables {
    pub top_ips: String,
    pub top_ports: String,
    pub recent_events: String,
}

impl Tables {
    pub fn from_snapshot(snapshot: &Snapshot) -> Self {
        Self {
            top_ips: top_ip_rows(&snapshot.top_ips),
            top_ports: top_port_rows(&snapshot.top_ports),
            recent_events: recent_event_rows(&snapshot.recent_events),
        }
    }
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// `<td>` for an IP, styled by class; internal and LAN addresses get a label.
pub fn ip_cell(ip: &str) -> String {
    let class = IpClass::of(ip);
    let label = class.label();
    let ip = escape_html(ip);
    if label.is_empty() {
        format!("<td class=\"{}\">{ip}</td>", class.css_class())
    } else {
        format!(
            "<td class=\"{}\">{ip} <span class=\"ip-label\">({label})</span></td>",
            class.css_class()
        )
    }
}

/// Human-readable summary line for a recent event.
pub fn event_message(event: &Event) -> String {
    let ip = event.source_ip.as_deref().unwrap_or("unknown");
    match event.protocol.as_deref() {
        Some("HTTP") => format!(
            "HTTP {} {} from {ip}",
            event.method.as_deref().unwrap_or(""),
            event.path.as_deref().unwrap_or(""),
        ),
        proto => {
            let port = event.src_port.map(|p| format!(":{p}")).unwrap_or_default();
            format!(
                "Connection from {ip}{port} via {}",
                proto.unwrap_or("unknown")
            )
        }
    }
}

fn text_cell(out: &mut String, value: Option<&str>) {
    let _ = write!(out, "<td>{}</td>", escape_html(value.unwrap_or("-")));
}

pub fn top_ip_rows(top: &[IpCount]) -> String {
    let mut out = String::new();
    for entry in top {
        let _ = write!(out, "<tr>{}<td>{}</td></tr>", ip_cell(&entry.ip), entry.count);
    }
    out
}

pub fn top_port_rows(top: &[PortCount]) -> String {
    let mut out = String::new();
    for entry in top {
        let _ = write!(out, "<tr><td>{}</td><td>{}</td></tr>", entry.port, entry.count);
    }
    out
}

pub fn recent_event_rows(events: &[Event]) -> String {
    let mut out = String::new();
    for event in events {
        out.push_str("<tr>");
        text_cell(&mut out, event.timestamp.as_deref());
        match event.source_ip.as_deref() {
            Some(ip) => out.push_str(&ip_cell(ip)),
            None => text_cell(&mut out, None),
        }
        text_cell(&mut out, event.dest_port.map(|p| p.to_string()).as_deref());
        text_cell(&mut out, event.src_port.map(|p| p.to_string()).as_deref());
        text_cell(&mut out, event.protocol.as_deref());
        text_cell(&mut out, event.event_type.as_deref());
        text_cell(&mut out, Some(&event_message(event)));
        text_cell(&mut out, event.user_agent.as_deref());
        text_cell(
            &mut out,
            event.banner_sent.map(|b| if b { "true" } else { "false" }),
        );
        out.push_str("</tr>");
    }
    out
}
