//! Deterministic rendering of route mutations into tool commands
//!
//! Commands are produced as structured argument lists; the single-string
//! form exists only for confirmation prompts and logs.
//!
//! Grammar:
//! - IPv4 add:    `route -4 add <dest> mask <mask> <gateway> [-p] [IF <n>] [metric <m>]`
//! - IPv6 add:    `route -6 add <dest>/<prefix> [<gateway>] [-p] [IF <n>] [metric <m>]`
//! - IPv4 delete: `route -4 delete <dest>`
//! - IPv6 delete: `route -6 delete <dest>[/<prefix>]`

use super::{present, DeleteRequest, RouteChange};
use crate::exec::RenderedCommand;
use crate::routes::IpVersion;

pub const ROUTE_TOOL: &str = "route";

pub fn render_add(change: &RouteChange) -> RenderedCommand {
    let mut args: Vec<String> = Vec::new();

    match change.version {
        IpVersion::V4 => {
            args.push("-4".to_string());
            args.push("add".to_string());
            args.push(change.destination.trim().to_string());
            args.push("mask".to_string());
            args.push(change.mask_or_prefix.trim().to_string());
            // The gateway token is always present for IPv4; absent means
            // directly attached.
            args.push(present(&change.gateway).unwrap_or("On-link").to_string());
        }
        IpVersion::V6 => {
            args.push("-6".to_string());
            args.push("add".to_string());
            args.push(format!(
                "{}/{}",
                change.destination.trim(),
                change.mask_or_prefix.trim()
            ));
            if let Some(gateway) = present(&change.gateway) {
                if gateway != "On-link" {
                    args.push(gateway.to_string());
                }
            }
        }
    }

    if change.persistent {
        args.push("-p".to_string());
    }
    if let Some(interface) = present(&change.interface) {
        args.push("IF".to_string());
        args.push(interface.to_string());
    }
    if let Some(metric) = present(&change.metric) {
        args.push("metric".to_string());
        args.push(metric.to_string());
    }

    RenderedCommand::new(ROUTE_TOOL, args)
}

pub fn render_delete(request: &DeleteRequest) -> RenderedCommand {
    let destination = request.destination.trim();
    let args = match request.version {
        IpVersion::V4 => vec![
            "-4".to_string(),
            "delete".to_string(),
            destination.to_string(),
        ],
        IpVersion::V6 => {
            let target = match present(&request.mask_or_prefix) {
                Some(prefix) if !destination.contains('/') => {
                    format!("{destination}/{prefix}")
                }
                _ => destination.to_string(),
            };
            vec!["-6".to_string(), "delete".to_string(), target]
        }
    };

    RenderedCommand::new(ROUTE_TOOL, args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_ipv4_add_persistent_on_link() {
        let change = RouteChange {
            version: IpVersion::V4,
            destination: "192.168.100.0".to_string(),
            mask_or_prefix: "255.255.255.0".to_string(),
            gateway: Some("On-link".to_string()),
            interface: None,
            metric: None,
            persistent: true,
        };
        assert_eq!(
            render_add(&change).to_string(),
            "route -4 add 192.168.100.0 mask 255.255.255.0 On-link -p"
        );
    }

    #[test]
    fn test_render_ipv4_add_all_options() {
        let change = RouteChange {
            version: IpVersion::V4,
            destination: "10.20.0.0".to_string(),
            mask_or_prefix: "255.255.0.0".to_string(),
            gateway: Some("192.168.1.1".to_string()),
            interface: Some("12".to_string()),
            metric: Some("5".to_string()),
            persistent: false,
        };
        assert_eq!(
            render_add(&change).to_string(),
            "route -4 add 10.20.0.0 mask 255.255.0.0 192.168.1.1 IF 12 metric 5"
        );
    }

    #[test]
    fn test_render_ipv4_add_absent_gateway_defaults_on_link() {
        let change = RouteChange {
            version: IpVersion::V4,
            destination: "10.0.0.0".to_string(),
            mask_or_prefix: "255.0.0.0".to_string(),
            gateway: None,
            interface: None,
            metric: None,
            persistent: false,
        };
        assert_eq!(
            render_add(&change).to_string(),
            "route -4 add 10.0.0.0 mask 255.0.0.0 On-link"
        );
    }

    #[test]
    fn test_render_ipv6_add_with_gateway() {
        let change = RouteChange {
            version: IpVersion::V6,
            destination: "2001:db8::".to_string(),
            mask_or_prefix: "32".to_string(),
            gateway: Some("fe80::1".to_string()),
            interface: Some("12".to_string()),
            metric: None,
            persistent: true,
        };
        assert_eq!(
            render_add(&change).to_string(),
            "route -6 add 2001:db8::/32 fe80::1 -p IF 12"
        );
    }

    #[test]
    fn test_render_ipv6_add_on_link_omits_gateway() {
        let change = RouteChange {
            version: IpVersion::V6,
            destination: "2001:db8::".to_string(),
            mask_or_prefix: "64".to_string(),
            gateway: Some("On-link".to_string()),
            interface: None,
            metric: None,
            persistent: false,
        };
        assert_eq!(
            render_add(&change).to_string(),
            "route -6 add 2001:db8::/64"
        );
    }

    #[test]
    fn test_render_ipv4_delete() {
        let request = DeleteRequest {
            version: IpVersion::V4,
            destination: "192.168.100.0".to_string(),
            mask_or_prefix: Some("255.255.255.0".to_string()),
        };
        // IPv4 deletes are keyed by destination only.
        assert_eq!(
            render_delete(&request).to_string(),
            "route -4 delete 192.168.100.0"
        );
    }

    #[test]
    fn test_render_ipv6_delete_with_prefix() {
        let request = DeleteRequest {
            version: IpVersion::V6,
            destination: "2001:db8::".to_string(),
            mask_or_prefix: Some("32".to_string()),
        };
        assert_eq!(
            render_delete(&request).to_string(),
            "route -6 delete 2001:db8::/32"
        );
    }

    #[test]
    fn test_render_ipv6_delete_without_prefix() {
        let request = DeleteRequest {
            version: IpVersion::V6,
            destination: "2001:db8::1".to_string(),
            mask_or_prefix: None,
        };
        assert_eq!(
            render_delete(&request).to_string(),
            "route -6 delete 2001:db8::1"
        );
    }

    #[test]
    fn test_structured_args_never_split_tokens() {
        let change = RouteChange {
            version: IpVersion::V4,
            destination: "10.0.0.0".to_string(),
            mask_or_prefix: "255.0.0.0".to_string(),
            gateway: None,
            interface: None,
            metric: None,
            persistent: false,
        };
        let command = render_add(&change);
        assert_eq!(command.program, "route");
        assert_eq!(command.args.len(), 6);
        assert!(command.args.iter().all(|a| !a.contains(' ')));
    }
}
