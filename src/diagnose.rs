//! Classification of routing-tool failures
//!
//! The routing tool reports everything on stderr with no stable error codes,
//! so failures are mapped onto a closed taxonomy by case-insensitive
//! substring matching, including the localized strings some systems emit.
//! Classification never fails; anything unrecognized is `Unknown`.

use serde::Serialize;
use std::fmt;

/// Closed set of diagnosed failure causes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The gateway does not exist or is not reachable on any interface.
    GatewayUnreachable,
    /// The command needs administrator/root privileges.
    PermissionDenied,
    /// Malformed address, mask, or option.
    InvalidParameter,
    /// The route is already present.
    AlreadyExists,
    Unknown,
}

impl FailureKind {
    /// Fixed remediation hint shown next to the raw tool output.
    pub fn hint(&self) -> &'static str {
        match self {
            FailureKind::GatewayUnreachable => {
                "Gateway not reachable. Use 'On-link' or a gateway that already exists in the table."
            }
            FailureKind::PermissionDenied => {
                "Insufficient privileges. Re-run from an elevated (administrator) shell."
            }
            FailureKind::InvalidParameter => {
                "Parameter rejected. Check the destination, mask/prefix, and option values."
            }
            FailureKind::AlreadyExists => {
                "The route already exists. Delete it first if you meant to change it."
            }
            FailureKind::Unknown => {
                "Unrecognized tool error. Try the command manually to see the full output."
            }
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::GatewayUnreachable => write!(f, "gateway unreachable"),
            FailureKind::PermissionDenied => write!(f, "permission denied"),
            FailureKind::InvalidParameter => write!(f, "invalid parameter"),
            FailureKind::AlreadyExists => write!(f, "route already exists"),
            FailureKind::Unknown => write!(f, "unknown failure"),
        }
    }
}

/// Map raw stderr text onto a [`FailureKind`].
pub fn classify(stderr: &str) -> FailureKind {
    let lower = stderr.to_lowercase();

    if lower.contains("element not found") {
        FailureKind::GatewayUnreachable
    } else if lower.contains("access is denied")
        || lower.contains("requires elevation")
        || stderr.contains("拒绝访问")
    {
        FailureKind::PermissionDenied
    } else if lower.contains("invalid parameter") || stderr.contains("参数无效") {
        FailureKind::InvalidParameter
    } else if lower.contains("already exists") || stderr.contains("已存在") {
        FailureKind::AlreadyExists
    } else {
        FailureKind::Unknown
    }
}
