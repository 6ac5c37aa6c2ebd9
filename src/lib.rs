//! routectl - Route table console for Windows-style routing tools
//!
//! This crate inventories and edits the host's static route entries by
//! driving the platform's command-line routing tool. It turns the tool's
//! free-form text dumps into typed route and interface records, serves them
//! through a time-boxed snapshot cache, and mediates add/delete mutations
//! with validation, explicit confirmation, and structured failure diagnosis.
//!
//! # Architecture
//!
//! - `exec`: subprocess execution with timeouts (the only OS boundary)
//! - `routes`: route record model and route-table dump parsing
//! - `ifaces`: interface inventory model and parsing (fast + detailed paths)
//! - `cache`: snapshot cache with TTL and duplicate-fetch suppression
//! - `mutation`: change requests, validation, command rendering
//! - `diagnose`: stderr classification with remediation hints
//! - `platform`: toolset per platform family (Windows primary, partial Unix)
//! - `service`: the `RoutePanel` facade consumed by the CLI
//! - `config`: configuration file handling (TOML)

pub mod cache;
pub mod config;
pub mod diagnose;
pub mod exec;
pub mod ifaces;
pub mod mutation;
pub mod platform;
pub mod routes;
pub mod service;

pub use config::Config;
pub use ifaces::{InterfaceRecord, LinkStatus};
pub use mutation::{DeleteRequest, MutationReport, Outcome, RouteChange};
pub use routes::{IpVersion, RouteRecord};
pub use service::RoutePanel;
