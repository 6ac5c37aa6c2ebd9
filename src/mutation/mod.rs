//! Route mutation requests and validation
//!
//! A mutation runs Validate -> Confirm -> Render -> Execute -> Classify.
//! This module owns the request types and the Validate stage: every field is
//! checked locally, with a field-specific message, before any command is
//! built. Rendering lives in [`command`]; execution and classification are
//! orchestrated by the service layer.

pub mod command;

use crate::diagnose::FailureKind;
use crate::routes::IpVersion;
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, Ipv6Addr};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("destination network is required")]
    MissingDestination,
    #[error("subnet mask is required")]
    MissingMask,
    #[error("prefix length is required")]
    MissingPrefix,
    #[error("destination is not a valid {0} address: {1}")]
    InvalidDestination(IpVersion, String),
    #[error("subnet mask is not a valid netmask: {0}")]
    InvalidMask(String),
    #[error("prefix length must be an integer between 0 and 128")]
    InvalidPrefix,
    #[error("gateway is not a valid {0} address: {1}")]
    InvalidGateway(IpVersion, String),
    #[error("interface must be a positive integer")]
    InvalidInterface,
    #[error("metric must be a non-negative integer")]
    InvalidMetric,
}

/// A proposed route addition.
///
/// Optional fields treat `None` and the empty string the same way: absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteChange {
    pub version: IpVersion,
    pub destination: String,
    /// IPv4 subnet mask, or IPv6 prefix length.
    pub mask_or_prefix: String,
    /// Next-hop address; absent or `"On-link"` means directly attached.
    pub gateway: Option<String>,
    pub interface: Option<String>,
    pub metric: Option<String>,
    pub persistent: bool,
}

/// A proposed route deletion, keyed the way the tool expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub version: IpVersion,
    pub destination: String,
    /// IPv6 prefix length; ignored for IPv4 deletes.
    pub mask_or_prefix: Option<String>,
}

/// Normalize the absent-field convention: empty strings count as absent.
pub(crate) fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Check every field of an addition before a command is built.
pub fn validate(change: &RouteChange) -> Result<(), ValidationError> {
    let destination = change.destination.trim();
    if destination.is_empty() {
        return Err(ValidationError::MissingDestination);
    }

    match change.version {
        IpVersion::V4 => {
            let mask = change.mask_or_prefix.trim();
            if mask.is_empty() {
                return Err(ValidationError::MissingMask);
            }
            destination.parse::<Ipv4Addr>().map_err(|_| {
                ValidationError::InvalidDestination(IpVersion::V4, destination.to_string())
            })?;
            let mask_addr = mask
                .parse::<Ipv4Addr>()
                .map_err(|_| ValidationError::InvalidMask(mask.to_string()))?;
            // Host bits under the mask are tolerated; the mask itself must be
            // a contiguous run of ones.
            if !valid_netmask(mask_addr) {
                return Err(ValidationError::InvalidMask(mask.to_string()));
            }
        }
        IpVersion::V6 => {
            let prefix = change.mask_or_prefix.trim();
            if prefix.is_empty() {
                return Err(ValidationError::MissingPrefix);
            }
            let value: u32 = prefix
                .parse()
                .map_err(|_| ValidationError::InvalidPrefix)?;
            if value > 128 {
                return Err(ValidationError::InvalidPrefix);
            }
            destination.parse::<Ipv6Addr>().map_err(|_| {
                ValidationError::InvalidDestination(IpVersion::V6, destination.to_string())
            })?;
        }
    }

    if let Some(gateway) = present(&change.gateway) {
        if gateway != "On-link" {
            let ok = match change.version {
                IpVersion::V4 => gateway.parse::<Ipv4Addr>().is_ok(),
                IpVersion::V6 => gateway.parse::<Ipv6Addr>().is_ok(),
            };
            if !ok {
                return Err(ValidationError::InvalidGateway(
                    change.version,
                    gateway.to_string(),
                ));
            }
        }
    }

    if let Some(interface) = present(&change.interface) {
        let ok = interface.parse::<u32>().is_ok_and(|n| n >= 1);
        if !ok {
            return Err(ValidationError::InvalidInterface);
        }
    }

    if let Some(metric) = present(&change.metric) {
        if metric.parse::<u32>().is_err() {
            return Err(ValidationError::InvalidMetric);
        }
    }

    Ok(())
}

/// Light validation for deletions; the key fields usually come straight out
/// of a parsed table row.
pub fn validate_delete(request: &DeleteRequest) -> Result<(), ValidationError> {
    let destination = request.destination.trim();
    if destination.is_empty() {
        return Err(ValidationError::MissingDestination);
    }

    match request.version {
        IpVersion::V4 => {
            destination.parse::<Ipv4Addr>().map_err(|_| {
                ValidationError::InvalidDestination(IpVersion::V4, destination.to_string())
            })?;
        }
        IpVersion::V6 => {
            destination.parse::<Ipv6Addr>().map_err(|_| {
                ValidationError::InvalidDestination(IpVersion::V6, destination.to_string())
            })?;
            if let Some(prefix) = present(&request.mask_or_prefix) {
                let ok = prefix.parse::<u32>().is_ok_and(|n| n <= 128);
                if !ok {
                    return Err(ValidationError::InvalidPrefix);
                }
            }
        }
    }

    Ok(())
}

fn valid_netmask(mask: Ipv4Addr) -> bool {
    let bits = u32::from(mask);
    bits.leading_ones() + bits.trailing_zeros() == 32
}

/// Outcome of an executed mutation, always carrying the attempted command.
#[derive(Debug, Clone, Serialize)]
pub struct MutationReport {
    /// The command text as it was run.
    pub command: String,
    pub outcome: Outcome,
}

impl MutationReport {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, Outcome::Applied)
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Outcome {
    /// Exit code 0; the route caches have been invalidated.
    Applied,
    /// The tool rejected the command; diagnosed from stderr.
    Rejected {
        kind: FailureKind,
        stderr: String,
        hint: &'static str,
    },
    /// The tool did not finish within its timeout.
    TimedOut { hint: &'static str },
    /// The tool could not be started at all.
    LaunchFailed { detail: String },
}
