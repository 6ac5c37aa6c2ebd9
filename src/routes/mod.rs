// Routes module - route record model and route-table dump parsing

pub mod parser;

use serde::{Deserialize, Serialize};
use std::fmt;

/// IP family a route or snapshot belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IpVersion {
    V4,
    V6,
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IpVersion::V4 => write!(f, "IPv4"),
            IpVersion::V6 => write!(f, "IPv6"),
        }
    }
}

/// One entry of the host routing table, as printed by the platform tool.
///
/// `interface` and `metric` keep the dump's own convention: an empty string
/// means the column was absent (persistent routes commonly have no interface).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRecord {
    pub destination: String,
    /// Subnet mask (IPv4) or prefix length (IPv6).
    pub mask_or_prefix: String,
    /// Next-hop address, or the literal `"On-link"`.
    pub gateway: String,
    pub interface: String,
    pub metric: String,
    /// True when the entry came from a "Persistent Routes" section.
    pub persistent: bool,
    pub ip_version: IpVersion,
}
