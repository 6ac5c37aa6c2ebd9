//! Parser for Windows-style `route print` dumps
//!
//! The dump is free-form text: an interface list, then the IPv4 route table
//! (active + persistent sections), then the IPv6 route table (same two
//! sections). Parsing is a single forward pass with section-state tracking.
//!
//! Parsing is best-effort by policy: a malformed line never fails the whole
//! fetch, it is skipped and logged at debug level. The output degrades to
//! fewer records instead.

use super::{IpVersion, RouteRecord};
use tracing::debug;

/// Column-header fragments that must not be mistaken for route rows.
const COLUMN_HEADERS: [&str; 4] = ["Network Destination", "Network Address", "Network", "If"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    None,
    Active,
    Persistent,
}

/// Parse the IPv4 route tables out of a full dump.
pub fn parse_ipv4(dump: &str) -> Vec<RouteRecord> {
    let mut routes = Vec::new();
    let mut section = Section::None;

    for raw in dump.lines() {
        let line = raw.trim();

        if line.starts_with("Active Routes:") {
            section = Section::Active;
            continue;
        }
        if line.starts_with("Persistent Routes:") {
            section = Section::Persistent;
            continue;
        }
        // The interface list trails the route tables in some dumps; once we
        // are inside an active section it marks the end of route data. An
        // interface list BEFORE any route section must not stop the parse.
        if line.starts_with("Interface List") && section == Section::Active {
            break;
        }

        if section == Section::None || line.is_empty() || is_column_header(line) {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        match section {
            Section::Active => {
                if parts.len() >= 5 && plausible_destination(parts[0]) {
                    routes.push(RouteRecord {
                        destination: parts[0].to_string(),
                        mask_or_prefix: parts[1].to_string(),
                        gateway: parts[2].to_string(),
                        interface: parts[3].to_string(),
                        metric: parts[4].to_string(),
                        persistent: false,
                        ip_version: IpVersion::V4,
                    });
                } else {
                    debug!("Skipping active-route line: {:?}", line);
                }
            }
            Section::Persistent => {
                // Persistent rows have no interface column.
                if parts.len() >= 4 && plausible_destination(parts[0]) {
                    routes.push(RouteRecord {
                        destination: parts[0].to_string(),
                        mask_or_prefix: parts[1].to_string(),
                        gateway: parts[2].to_string(),
                        interface: String::new(),
                        metric: parts[3].to_string(),
                        persistent: true,
                        ip_version: IpVersion::V4,
                    });
                } else {
                    debug!("Skipping persistent-route line: {:?}", line);
                }
            }
            Section::None => unreachable!(),
        }
    }

    routes
}

/// Parse the IPv6 route tables out of a full dump.
///
/// IPv6 rows are `If Metric Network-Destination [Gateway]`: the first numeric
/// token after the interface column is the metric, and everything after it is
/// the network part. A missing gateway means on-link.
pub fn parse_ipv6(dump: &str) -> Vec<RouteRecord> {
    let mut routes = Vec::new();
    let mut in_active = false;
    let mut in_persistent = false;

    for raw in dump.lines() {
        let line = raw.trim();

        if line.contains("IPv6 Route Table") {
            in_active = true;
            in_persistent = false;
            continue;
        }
        if in_active && line.contains("Persistent Routes:") {
            in_active = false;
            in_persistent = true;
            continue;
        }
        if (in_active || in_persistent)
            && (line.starts_with("Interface List") || line.starts_with("IPv4 Route Table"))
        {
            break;
        }

        if !(in_active || in_persistent) || line.is_empty() || is_column_header(line) {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 3 {
            debug!("Skipping short IPv6 line: {:?}", line);
            continue;
        }

        let interface = parts[0].to_string();

        let mut metric = String::new();
        let mut network: &[&str] = &parts[1..];
        for (i, part) in parts.iter().enumerate().skip(1) {
            if part.chars().all(|c| c.is_ascii_digit()) {
                metric = part.to_string();
                network = &parts[i + 1..];
                break;
            }
        }

        let Some(&dest_token) = network.first() else {
            debug!("Skipping IPv6 line without destination: {:?}", line);
            continue;
        };
        let gateway = network
            .get(1)
            .map(|s| s.to_string())
            .unwrap_or_else(|| "On-link".to_string());

        let (destination, prefix) = match dest_token.split_once('/') {
            Some((addr, prefix)) => (addr.to_string(), prefix.to_string()),
            None => (dest_token.to_string(), String::new()),
        };
        if destination.is_empty() {
            debug!("Skipping IPv6 line without destination: {:?}", line);
            continue;
        }

        routes.push(RouteRecord {
            destination,
            mask_or_prefix: prefix,
            gateway,
            interface,
            metric,
            persistent: in_persistent,
            ip_version: IpVersion::V6,
        });
    }

    routes
}

fn is_column_header(line: &str) -> bool {
    COLUMN_HEADERS.iter().any(|h| line.starts_with(h))
}

/// Accept only tokens that can open a route row: the literal `On-link`, or a
/// dot-delimited run of 1-4 numeric octets in 0-255. Rejects stray header and
/// separator lines ("None", "=====", "Default Gateway:") that slipped past
/// the header filter.
fn plausible_destination(token: &str) -> bool {
    if token == "On-link" {
        return true;
    }
    let octets: Vec<&str> = token.split('.').collect();
    if octets.is_empty() || octets.len() > 4 {
        return false;
    }
    octets
        .iter()
        .all(|o| !o.is_empty() && o.parse::<u16>().is_ok_and(|n| n <= 255))
}
