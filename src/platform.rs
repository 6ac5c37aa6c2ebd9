//! Platform toolsets
//!
//! One platform family is driven at a time: the Windows-style `route` /
//! `ipconfig` pair is the primary target, with a partial Unix analog
//! (interface inventory via `ip addr show`; no route dump or mutation).
//!
//! A toolset pairs each dump command with the parser that understands its
//! output, so the service layer never has to know which family it is on.

use crate::exec::RenderedCommand;
use crate::ifaces::{parser as iface_parser, InterfaceRecord};
use crate::mutation::{command, DeleteRequest, RouteChange};
use crate::routes::{parser as route_parser, IpVersion, RouteRecord};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("{0} is not supported on this platform family")]
    Unsupported(&'static str),
    #[error("Unsupported platform")]
    UnsupportedPlatform,
}

/// Commands and matching parsers for one platform family.
pub trait PlatformTools: Send + Sync {
    /// Command that dumps the full route table text.
    fn route_dump(&self) -> Result<RenderedCommand, PlatformError>;
    fn parse_routes(&self, dump: &str, version: IpVersion) -> Vec<RouteRecord>;

    /// Command behind the fast interface listing.
    fn interface_dump(&self) -> Result<RenderedCommand, PlatformError>;
    fn parse_interfaces(&self, dump: &str) -> Vec<InterfaceRecord>;

    /// Command behind the detailed IP-configuration view.
    fn ip_config_dump(&self) -> Result<RenderedCommand, PlatformError>;
    fn parse_ip_config(&self, dump: &str) -> Vec<InterfaceRecord>;

    fn render_add(&self, change: &RouteChange) -> Result<RenderedCommand, PlatformError>;
    fn render_delete(&self, request: &DeleteRequest) -> Result<RenderedCommand, PlatformError>;
}

/// The Windows family: `route print`, `ipconfig /all`, `route add/delete`.
pub struct WindowsTools;

impl WindowsTools {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WindowsTools {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformTools for WindowsTools {
    fn route_dump(&self) -> Result<RenderedCommand, PlatformError> {
        Ok(RenderedCommand::new("route", vec!["print".to_string()]))
    }

    fn parse_routes(&self, dump: &str, version: IpVersion) -> Vec<RouteRecord> {
        match version {
            IpVersion::V4 => route_parser::parse_ipv4(dump),
            IpVersion::V6 => route_parser::parse_ipv6(dump),
        }
    }

    fn interface_dump(&self) -> Result<RenderedCommand, PlatformError> {
        // The interface list rides along in the route dump.
        self.route_dump()
    }

    fn parse_interfaces(&self, dump: &str) -> Vec<InterfaceRecord> {
        iface_parser::parse_interface_list(dump)
    }

    fn ip_config_dump(&self) -> Result<RenderedCommand, PlatformError> {
        Ok(RenderedCommand::new("ipconfig", vec!["/all".to_string()]))
    }

    fn parse_ip_config(&self, dump: &str) -> Vec<InterfaceRecord> {
        iface_parser::parse_ip_config(dump)
    }

    fn render_add(&self, change: &RouteChange) -> Result<RenderedCommand, PlatformError> {
        Ok(command::render_add(change))
    }

    fn render_delete(&self, request: &DeleteRequest) -> Result<RenderedCommand, PlatformError> {
        Ok(command::render_delete(request))
    }
}

/// Partial Unix analog: interface inventory only.
pub struct UnixTools;

impl UnixTools {
    pub fn new() -> Self {
        Self
    }
}

impl Default for UnixTools {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformTools for UnixTools {
    fn route_dump(&self) -> Result<RenderedCommand, PlatformError> {
        Err(PlatformError::Unsupported("route table dump"))
    }

    fn parse_routes(&self, _dump: &str, _version: IpVersion) -> Vec<RouteRecord> {
        Vec::new()
    }

    fn interface_dump(&self) -> Result<RenderedCommand, PlatformError> {
        Ok(RenderedCommand::new(
            "ip",
            vec!["addr".to_string(), "show".to_string()],
        ))
    }

    fn parse_interfaces(&self, dump: &str) -> Vec<InterfaceRecord> {
        iface_parser::parse_ip_addr(dump)
    }

    fn ip_config_dump(&self) -> Result<RenderedCommand, PlatformError> {
        Err(PlatformError::Unsupported("detailed interface dump"))
    }

    fn parse_ip_config(&self, _dump: &str) -> Vec<InterfaceRecord> {
        Vec::new()
    }

    fn render_add(&self, _change: &RouteChange) -> Result<RenderedCommand, PlatformError> {
        Err(PlatformError::Unsupported("route mutation"))
    }

    fn render_delete(&self, _request: &DeleteRequest) -> Result<RenderedCommand, PlatformError> {
        Err(PlatformError::Unsupported("route mutation"))
    }
}

/// Get the toolset for the current platform.
pub fn native_tools() -> Result<Box<dyn PlatformTools>, PlatformError> {
    #[cfg(target_os = "windows")]
    {
        Ok(Box::new(WindowsTools::new()))
    }

    #[cfg(unix)]
    {
        Ok(Box::new(UnixTools::new()))
    }

    #[cfg(not(any(target_os = "windows", unix)))]
    {
        Err(PlatformError::UnsupportedPlatform)
    }
}
