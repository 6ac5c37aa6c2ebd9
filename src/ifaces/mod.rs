// Interfaces module - adapter inventory model and dump parsing

pub mod parser;

use serde::{Deserialize, Serialize};

/// Link status inferred from the IP-configuration dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    Connected,
    Disconnected,
    Unknown,
}

/// One network adapter as seen by the platform tools.
///
/// The fast parse path (route-dump interface list) fills `number`, `name`,
/// `mac_address` and up to two scraped IPv4 addresses; the detailed path
/// (IP-configuration dump) fills everything it can find.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceRecord {
    /// Platform interface identifier, as used in route commands.
    pub number: String,
    pub name: String,
    pub mac_address: Option<String>,
    pub ipv4_addresses: Vec<String>,
    /// Link-local entries are suppressed unless they are the only addresses.
    pub ipv6_addresses: Vec<String>,
    pub default_gateway: Option<String>,
    pub dns_servers: Vec<String>,
    pub dhcp_enabled: bool,
    pub dhcp_server: Option<String>,
    pub status: LinkStatus,
}

impl InterfaceRecord {
    pub fn new(number: String, name: String) -> Self {
        Self {
            number,
            name,
            mac_address: None,
            ipv4_addresses: Vec::new(),
            ipv6_addresses: Vec::new(),
            default_gateway: None,
            dns_servers: Vec::new(),
            dhcp_enabled: false,
            dhcp_server: None,
            status: LinkStatus::Unknown,
        }
    }

    /// Label used by interface pickers: `number - name (addr, addr)`.
    pub fn display(&self) -> String {
        if self.ipv4_addresses.is_empty() {
            format!("{} - {}", self.number, self.name)
        } else {
            let shown: Vec<&str> = self
                .ipv4_addresses
                .iter()
                .take(2)
                .map(|s| s.as_str())
                .collect();
            format!("{} - {} ({})", self.number, self.name, shown.join(", "))
        }
    }
}
