//! Parsers for adapter inventory text
//!
//! Two independent parse paths, selected by what source text is available:
//!
//! - Fast path ([`parse_interface_list`]): the "Interface List" block of a
//!   route dump. One line per interface carrying a numeric id, a MAC token
//!   run and a display name; up to two IPv4 addresses are opportunistically
//!   scraped from other dump lines that mention the interface id.
//! - Detailed path ([`parse_ip_config`]): a full IP-configuration dump, one
//!   block per adapter header, with addresses, gateway, DNS and DHCP state.
//!
//! [`parse_ip_addr`] is the partial Unix analog over `ip addr show` output.
//!
//! Like the route parser, everything here is best-effort: unrecognized lines
//! are skipped at debug level, never reported as errors.

use super::{InterfaceRecord, LinkStatus};
use std::net::Ipv4Addr;
use tracing::debug;

/// Parse the "Interface List" block of a route dump.
pub fn parse_interface_list(dump: &str) -> Vec<InterfaceRecord> {
    let mut records = Vec::new();
    let mut in_list = false;

    for raw in dump.lines() {
        let line = raw.trim();

        if line.contains("Interface List") {
            in_list = true;
            continue;
        }
        if in_list
            && (is_separator(line)
                || line.contains("IPv4 Route Table")
                || line.contains("IPv6 Route Table"))
        {
            break;
        }

        if in_list && !line.is_empty() && line.contains("...") {
            match parse_interface_row(line) {
                Some(record) => records.push(record),
                None => debug!("Skipping interface-list line: {:?}", line),
            }
        }
    }

    for record in &mut records {
        record.ipv4_addresses = scrape_ipv4(dump, &record.number);
        if !record.ipv4_addresses.is_empty() {
            record.status = LinkStatus::Connected;
        }
    }

    records.sort_by(|a, b| a.number.cmp(&b.number));
    records
}

/// One interface-list row: `12...00 1c 42 9f 6e 7d ......Intel(R) ...`.
///
/// The numeric id leads, a run of dots separates it from an optional MAC
/// token run, and the final run of dots precedes the display name.
fn parse_interface_row(line: &str) -> Option<InterfaceRecord> {
    let digits_end = line
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(line.len());
    if digits_end == 0 {
        return None;
    }
    let number = &line[..digits_end];
    let rest = &line[digits_end..];
    if !rest.starts_with('.') {
        return None;
    }

    let runs = dot_runs(rest);
    let last = *runs.last()?;

    let name_raw = rest[last.1..].trim();
    let name = strip_mac_substring(name_raw.trim_matches(|c| c == '.' || c == ':').trim());
    if name.is_empty() {
        return None;
    }

    let mac = if runs.len() >= 2 {
        parse_mac_tokens(&rest[runs[0].1..last.0])
    } else {
        None
    };

    let mut record = InterfaceRecord::new(number.to_string(), name);
    record.mac_address = mac;
    Some(record)
}

/// Byte ranges of runs of two or more consecutive dots.
fn dot_runs(s: &str) -> Vec<(usize, usize)> {
    let bytes = s.as_bytes();
    let mut runs = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'.' {
            let start = i;
            while i < bytes.len() && bytes[i] == b'.' {
                i += 1;
            }
            if i - start >= 2 {
                runs.push((start, i));
            }
        } else {
            i += 1;
        }
    }
    runs
}

fn is_hex_pair(token: &str) -> bool {
    token.len() == 2 && token.chars().all(|c| c.is_ascii_hexdigit())
}

/// Join six space-separated hex pairs into `aa-bb-cc-dd-ee-ff` form.
fn parse_mac_tokens(segment: &str) -> Option<String> {
    let tokens: Vec<&str> = segment.split_whitespace().collect();
    if tokens.len() == 6 && tokens.iter().all(|t| is_hex_pair(t)) {
        Some(tokens.join("-"))
    } else {
        None
    }
}

/// Remove MAC-address substrings from a display name.
///
/// Handles both the space-separated form (`00 1c 42 9f 6e 7d`) and the
/// dash-separated form (`00-1c-42-9f-6e-7d`).
fn strip_mac_substring(name: &str) -> String {
    let mut tokens: Vec<&str> = name.split_whitespace().collect();

    loop {
        let mut removed = false;

        if let Some(pos) = tokens
            .windows(6)
            .position(|w| w.iter().all(|t| is_hex_pair(t)))
        {
            tokens.drain(pos..pos + 6);
            removed = true;
        }
        if let Some(pos) = tokens.iter().position(|t| {
            let pairs: Vec<&str> = t.split('-').collect();
            pairs.len() == 6 && pairs.iter().all(|p| is_hex_pair(p))
        }) {
            tokens.remove(pos);
            removed = true;
        }

        if !removed {
            break;
        }
    }

    tokens.join(" ")
}

/// Collect up to two IPv4 addresses from dump lines mentioning `number`.
fn scrape_ipv4(dump: &str, number: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();

    for line in dump.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if !tokens.iter().any(|t| *t == number) {
            continue;
        }
        for token in tokens {
            if found.len() == 2 {
                return found;
            }
            if token == "127.0.0.1" || token == "0.0.0.0" {
                continue;
            }
            if token.parse::<Ipv4Addr>().is_ok() && !found.iter().any(|f| f == token) {
                found.push(token.to_string());
            }
        }
    }

    found
}

fn is_separator(line: &str) -> bool {
    line.len() >= 8 && line.chars().all(|c| c == '=')
}

/// What a continuation line (no key, deep indent) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Continuation {
    None,
    DnsServers,
    DefaultGateway,
}

/// Accumulator for one adapter block of the detailed dump.
struct AdapterBlock {
    record: InterfaceRecord,
    link_local_v6: Vec<String>,
    global_v6: Vec<String>,
    saw_address: bool,
}

impl AdapterBlock {
    fn new(name: String) -> Self {
        Self {
            record: InterfaceRecord::new(String::new(), name),
            link_local_v6: Vec::new(),
            global_v6: Vec::new(),
            saw_address: false,
        }
    }

    fn mark_address(&mut self) {
        self.saw_address = true;
        if self.record.status == LinkStatus::Unknown {
            self.record.status = LinkStatus::Connected;
        }
    }

    fn finish(mut self) -> InterfaceRecord {
        // Link-local addresses are noise next to real ones; keep them only
        // when the adapter has nothing else.
        if self.record.ipv4_addresses.is_empty() && self.global_v6.is_empty() {
            self.record.ipv6_addresses = self.link_local_v6;
        } else {
            self.record.ipv6_addresses = self.global_v6;
        }
        if self.record.status == LinkStatus::Unknown && self.saw_address {
            self.record.status = LinkStatus::Connected;
        }
        self.record
    }
}

/// Parse a full IP-configuration dump (detailed path).
pub fn parse_ip_config(dump: &str) -> Vec<InterfaceRecord> {
    let mut records = Vec::new();
    let mut current: Option<AdapterBlock> = None;
    let mut continuation = Continuation::None;

    for raw in dump.lines() {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            continue;
        }

        // Adapter header: non-indented, ends with a colon.
        if !raw.starts_with(' ') && !raw.starts_with('\t') && trimmed.ends_with(':') {
            if let Some(block) = current.take() {
                records.push(block.finish());
            }
            let header = trimmed.trim_end_matches(':');
            let name = match header.find(" adapter ") {
                Some(idx) => &header[idx + " adapter ".len()..],
                None => header,
            };
            current = Some(AdapterBlock::new(name.to_string()));
            continuation = Continuation::None;
            continue;
        }

        let Some(block) = current.as_mut() else {
            continue;
        };

        // Field lines carry a dotted leader before the colon; anything else
        // with a colon in it (an IPv6 address, say) is a continuation value.
        let field = trimmed
            .split_once(':')
            .filter(|(key, _)| key.contains(" . ") || key.trim_end().ends_with('.'));
        match field {
            Some((key_raw, value_raw)) => {
                let key = key_raw.trim_end_matches(|c| c == '.' || c == ' ');
                let value = clean_value(value_raw);
                continuation = Continuation::None;

                if key.starts_with("Media State") {
                    if value.to_lowercase().contains("disconnected") {
                        block.record.status = LinkStatus::Disconnected;
                    }
                } else if key.starts_with("Physical Address") {
                    if !value.is_empty() {
                        block.record.mac_address = Some(value);
                    }
                } else if key.starts_with("IPv4 Address")
                    || key.starts_with("Autoconfiguration IPv4 Address")
                {
                    if !value.is_empty() {
                        block.record.ipv4_addresses.push(value);
                        block.mark_address();
                    }
                } else if key.starts_with("Link-local IPv6 Address") {
                    if !value.is_empty() {
                        if block.record.number.is_empty() {
                            if let Some(zone) = zone_index(&value) {
                                block.record.number = zone;
                            }
                        }
                        block.link_local_v6.push(value);
                        block.mark_address();
                    }
                } else if key.contains("IPv6 Address") {
                    if !value.is_empty() {
                        block.global_v6.push(value);
                        block.mark_address();
                    }
                } else if key.starts_with("Default Gateway") {
                    if value.is_empty() {
                        continuation = Continuation::DefaultGateway;
                    } else {
                        block.record.default_gateway = Some(value);
                    }
                } else if key.starts_with("DNS Servers") {
                    if !value.is_empty() {
                        block.record.dns_servers.push(value);
                    }
                    continuation = Continuation::DnsServers;
                } else if key.starts_with("DHCP Enabled") {
                    block.record.dhcp_enabled = value.eq_ignore_ascii_case("yes");
                } else if key.starts_with("DHCP Server") {
                    if !value.is_empty() {
                        block.record.dhcp_server = Some(value);
                    }
                }
            }
            None => {
                // Keyless indented line: continuation of a list field.
                let value = clean_value(trimmed);
                if value.is_empty() {
                    continue;
                }
                match continuation {
                    Continuation::DnsServers => block.record.dns_servers.push(value),
                    Continuation::DefaultGateway => {
                        if block.record.default_gateway.is_none() {
                            block.record.default_gateway = Some(value);
                        }
                    }
                    Continuation::None => debug!("Skipping IP-config line: {:?}", trimmed),
                }
            }
        }
    }

    if let Some(block) = current.take() {
        records.push(block.finish());
    }

    records.sort_by(|a, b| a.number.cmp(&b.number));
    records
}

/// Drop trailing annotations such as `(Preferred)`.
fn clean_value(value: &str) -> String {
    match value.find('(') {
        Some(idx) => value[..idx].trim().to_string(),
        None => value.trim().to_string(),
    }
}

/// Zone index digits of a scoped IPv6 address (`fe80::1%12` -> `12`).
fn zone_index(addr: &str) -> Option<String> {
    let (_, zone) = addr.split_once('%')?;
    let digits: String = zone.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() { None } else { Some(digits) }
}

/// Partial Unix analog: parse `ip addr show` output.
pub fn parse_ip_addr(dump: &str) -> Vec<InterfaceRecord> {
    let mut records = Vec::new();
    let mut current: Option<AdapterBlock> = None;

    for raw in dump.lines() {
        let trimmed = raw.trim();

        // Interface header: `2: eth0: <BROADCAST,...> mtu 1500 ... state UP`
        if !raw.starts_with(' ') && !raw.starts_with('\t') && trimmed.contains(':') {
            let mut parts = trimmed.splitn(3, ':');
            let number = parts.next().unwrap_or("").trim();
            let name = parts.next().unwrap_or("").trim();
            if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) || name.is_empty()
            {
                continue;
            }
            if let Some(block) = current.take() {
                records.push(block.finish());
            }

            let name = name.split('@').next().unwrap_or(name);
            let mut block = AdapterBlock::new(name.to_string());
            block.record.number = number.to_string();
            let tokens: Vec<&str> = trimmed.split_whitespace().collect();
            if let Some(idx) = tokens.iter().position(|t| *t == "state") {
                block.record.status = match tokens.get(idx + 1).copied() {
                    Some("UP") => LinkStatus::Connected,
                    Some("DOWN") => LinkStatus::Disconnected,
                    _ => LinkStatus::Unknown,
                };
            }
            current = Some(block);
            continue;
        }

        let Some(block) = current.as_mut() else {
            continue;
        };
        let tokens: Vec<&str> = trimmed.split_whitespace().collect();
        match tokens.first().copied() {
            Some("link/ether") => {
                if let Some(mac) = tokens.get(1) {
                    block.record.mac_address = Some(mac.to_string());
                }
            }
            Some("inet") => {
                if let Some(addr) = tokens.get(1) {
                    let addr = addr.split('/').next().unwrap_or(addr);
                    block.record.ipv4_addresses.push(addr.to_string());
                    block.mark_address();
                }
            }
            Some("inet6") => {
                if let Some(addr) = tokens.get(1) {
                    let addr = addr.split('/').next().unwrap_or(addr).to_string();
                    if trimmed.contains("scope link") {
                        block.link_local_v6.push(addr);
                    } else {
                        block.global_v6.push(addr);
                    }
                    block.mark_address();
                }
            }
            _ => {}
        }
    }

    if let Some(block) = current.take() {
        records.push(block.finish());
    }

    records.sort_by(|a, b| a.number.cmp(&b.number));
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROUTE_DUMP: &str = "\
===========================================================================
Interface List
 12...00 1c 42 9f 6e 7d ......Intel(R) 82574L Gigabit Network Connection
  1...........................Software Loopback Interface 1
===========================================================================

IPv4 Route Table
===========================================================================
Active Routes:
Network Destination        Netmask          Gateway       Interface  Metric
          0.0.0.0          0.0.0.0      192.168.1.1     192.168.1.50     25
===========================================================================

IPv6 Route Table
===========================================================================
Active Routes:
 If Metric Network Destination      Gateway
 12    281 fe80::/64                On-link
";

    #[test]
    fn test_parse_interface_list() {
        let records = parse_interface_list(ROUTE_DUMP);
        assert_eq!(records.len(), 2);

        // Lexical sort by number string.
        assert_eq!(records[0].number, "1");
        assert_eq!(records[0].name, "Software Loopback Interface 1");
        assert_eq!(records[0].mac_address, None);

        assert_eq!(records[1].number, "12");
        assert_eq!(
            records[1].name,
            "Intel(R) 82574L Gigabit Network Connection"
        );
        assert_eq!(
            records[1].mac_address.as_deref(),
            Some("00-1c-42-9f-6e-7d")
        );
    }

    #[test]
    fn test_interface_list_stops_at_separator() {
        // The IPv4 route rows must not leak into the interface list.
        let records = parse_interface_list(ROUTE_DUMP);
        assert!(records.iter().all(|r| !r.name.contains("0.0.0.0")));
    }

    #[test]
    fn test_strip_mac_substring() {
        assert_eq!(
            strip_mac_substring("00 1c 42 9f 6e 7d Realtek PCIe GbE"),
            "Realtek PCIe GbE"
        );
        assert_eq!(
            strip_mac_substring("Realtek PCIe GbE 00-1c-42-9f-6e-7d"),
            "Realtek PCIe GbE"
        );
        assert_eq!(
            strip_mac_substring("Intel(R) 82574L Gigabit Network Connection"),
            "Intel(R) 82574L Gigabit Network Connection"
        );
    }

    #[test]
    fn test_scrape_ipv4_limit_two() {
        let dump = "\
 7  10.0.0.5  10.0.0.6  10.0.0.7
";
        let addrs = scrape_ipv4(dump, "7");
        assert_eq!(addrs, ["10.0.0.5", "10.0.0.6"]);
    }

    #[test]
    fn test_scrape_ipv4_skips_loopback_and_unspecified() {
        let dump = " 3  127.0.0.1  0.0.0.0  192.168.7.2\n";
        assert_eq!(scrape_ipv4(dump, "3"), ["192.168.7.2"]);
        assert!(scrape_ipv4(dump, "99").is_empty());
    }

    const IP_CONFIG_DUMP: &str = "\
Windows IP Configuration

   Host Name . . . . . . . . . . . . : testbox

Ethernet adapter Ethernet0:

   Connection-specific DNS Suffix  . : example.net
   Physical Address. . . . . . . . . : 00-1C-42-9F-6E-7D
   DHCP Enabled. . . . . . . . . . . : Yes
   DHCP Server . . . . . . . . . . . : 192.168.1.1
   Link-local IPv6 Address . . . . . : fe80::e87b:2a5d:1f90:4a22%12(Preferred)
   IPv6 Address. . . . . . . . . . . : 2001:db8:0:1::5(Preferred)
   IPv4 Address. . . . . . . . . . . : 192.168.1.50(Preferred)
   Subnet Mask . . . . . . . . . . . : 255.255.255.0
   Default Gateway . . . . . . . . . : 192.168.1.1
   DNS Servers . . . . . . . . . . . : 8.8.8.8
                                       8.8.4.4

Ethernet adapter Ethernet1:

   Media State . . . . . . . . . . . : Media disconnected
   Physical Address. . . . . . . . . : 00-50-56-C0-00-08
   DHCP Enabled. . . . . . . . . . . : No

Tunnel adapter isatap.example.net:

   Media State . . . . . . . . . . . : Media disconnected
   Connection-specific DNS Suffix  . : example.net
";

    #[test]
    fn test_parse_ip_config_connected_adapter() {
        let records = parse_ip_config(IP_CONFIG_DUMP);
        assert_eq!(records.len(), 3);

        let eth0 = records.iter().find(|r| r.name == "Ethernet0").unwrap();
        assert_eq!(eth0.number, "12");
        assert_eq!(eth0.mac_address.as_deref(), Some("00-1C-42-9F-6E-7D"));
        assert_eq!(eth0.ipv4_addresses, ["192.168.1.50"]);
        // Link-local suppressed: a global IPv6 address is present.
        assert_eq!(eth0.ipv6_addresses, ["2001:db8:0:1::5"]);
        assert_eq!(eth0.default_gateway.as_deref(), Some("192.168.1.1"));
        assert_eq!(eth0.dns_servers, ["8.8.8.8", "8.8.4.4"]);
        assert!(eth0.dhcp_enabled);
        assert_eq!(eth0.dhcp_server.as_deref(), Some("192.168.1.1"));
        assert_eq!(eth0.status, LinkStatus::Connected);
    }

    #[test]
    fn test_parse_ip_config_disconnected_adapter() {
        let records = parse_ip_config(IP_CONFIG_DUMP);
        let eth1 = records.iter().find(|r| r.name == "Ethernet1").unwrap();
        assert_eq!(eth1.status, LinkStatus::Disconnected);
        assert!(!eth1.dhcp_enabled);
        assert!(eth1.ipv4_addresses.is_empty());
    }

    #[test]
    fn test_disconnected_never_overridden_by_address() {
        let dump = "\
Ethernet adapter Ethernet2:

   Media State . . . . . . . . . . . : Media disconnected
   Autoconfiguration IPv4 Address. . : 169.254.13.7(Preferred)
";
        let records = parse_ip_config(dump);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, LinkStatus::Disconnected);
        assert_eq!(records[0].ipv4_addresses, ["169.254.13.7"]);
    }

    #[test]
    fn test_link_local_kept_when_only_address() {
        let dump = "\
Ethernet adapter Ethernet3:

   Link-local IPv6 Address . . . . . : fe80::1234:5678:9abc:def0%7(Preferred)
";
        let records = parse_ip_config(dump);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].ipv6_addresses, ["fe80::1234:5678:9abc:def0%7"]);
        assert_eq!(records[0].number, "7");
        assert_eq!(records[0].status, LinkStatus::Connected);
    }

    #[test]
    fn test_gateway_on_continuation_line() {
        let dump = "\
Ethernet adapter Ethernet4:

   Link-local IPv6 Address . . . . . : fe80::1%3(Preferred)
   IPv4 Address. . . . . . . . . . . : 10.1.2.3(Preferred)
   Default Gateway . . . . . . . . . :
                                       10.1.2.1
";
        let records = parse_ip_config(dump);
        assert_eq!(records[0].default_gateway.as_deref(), Some("10.1.2.1"));
    }

    #[test]
    fn test_ipv6_continuation_values_not_mistaken_for_fields() {
        let dump = "\
Ethernet adapter Ethernet5:

   IPv4 Address. . . . . . . . . . . : 10.4.5.6(Preferred)
   Default Gateway . . . . . . . . . :
                                       fe80::1%9
                                       10.4.5.1
   DNS Servers . . . . . . . . . . . : 2001:4860:4860::8888
                                       8.8.8.8
";
        let records = parse_ip_config(dump);
        assert_eq!(records[0].default_gateway.as_deref(), Some("fe80::1%9"));
        assert_eq!(
            records[0].dns_servers,
            ["2001:4860:4860::8888", "8.8.8.8"]
        );
    }

    #[test]
    fn test_parse_ip_config_sorted_by_number() {
        let records = parse_ip_config(IP_CONFIG_DUMP);
        // Adapters without a zone index sort first on the empty string.
        assert_eq!(records[0].number, "");
        assert_eq!(records[2].number, "12");
    }

    const IP_ADDR_DUMP: &str = "\
1: lo: <LOOPBACK,UP,LOWER_UP> mtu 65536 qdisc noqueue state UNKNOWN group default qlen 1000
    link/loopback 00:00:00:00:00:00 brd 00:00:00:00:00:00
    inet 127.0.0.1/8 scope host lo
       valid_lft forever preferred_lft forever
2: eth0: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 1500 qdisc fq_codel state UP group default qlen 1000
    link/ether 00:1c:42:9f:6e:7d brd ff:ff:ff:ff:ff:ff
    inet 192.168.1.100/24 brd 192.168.1.255 scope global dynamic eth0
       valid_lft 86031sec preferred_lft 86031sec
    inet6 2001:db8::100/64 scope global
       valid_lft forever preferred_lft forever
    inet6 fe80::21c:42ff:fe9f:6e7d/64 scope link
       valid_lft forever preferred_lft forever
3: wlan0: <BROADCAST,MULTICAST> mtu 1500 qdisc noop state DOWN group default qlen 1000
    link/ether aa:bb:cc:dd:ee:ff brd ff:ff:ff:ff:ff:ff
";

    #[test]
    fn test_parse_ip_addr() {
        let records = parse_ip_addr(IP_ADDR_DUMP);
        assert_eq!(records.len(), 3);

        let eth0 = records.iter().find(|r| r.name == "eth0").unwrap();
        assert_eq!(eth0.number, "2");
        assert_eq!(eth0.mac_address.as_deref(), Some("00:1c:42:9f:6e:7d"));
        assert_eq!(eth0.ipv4_addresses, ["192.168.1.100"]);
        assert_eq!(eth0.ipv6_addresses, ["2001:db8::100"]);
        assert_eq!(eth0.status, LinkStatus::Connected);

        let wlan0 = records.iter().find(|r| r.name == "wlan0").unwrap();
        assert_eq!(wlan0.status, LinkStatus::Disconnected);
        assert!(wlan0.ipv4_addresses.is_empty());
    }

    #[test]
    fn test_parse_ip_addr_vlan_name() {
        let dump = "4: eth0.100@eth0: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 1500 state UP\n";
        let records = parse_ip_addr(dump);
        assert_eq!(records[0].name, "eth0.100");
    }

    #[test]
    fn test_display_label() {
        let mut record = InterfaceRecord::new("12".to_string(), "Intel(R) 82574L".to_string());
        assert_eq!(record.display(), "12 - Intel(R) 82574L");
        record.ipv4_addresses = vec!["192.168.1.50".to_string(), "10.0.0.2".to_string()];
        assert_eq!(record.display(), "12 - Intel(R) 82574L (192.168.1.50, 10.0.0.2)");
    }
}
