//! Route panel service
//!
//! `RoutePanel` is the downstream surface of the core: cached route and
//! interface reads, the plan/apply mutation pipeline, and the connectivity
//! probe. It owns the caches and the platform toolset; callers (CLI, UI)
//! hold one instance for the session.
//!
//! Mutations are never silent: `plan_add`/`plan_delete` return the rendered
//! command for explicit approval, and only `apply` executes it. A failed
//! mutation comes back as a structured report, never as a panic or a raw
//! error bubbling through the caller.

use crate::cache::{Cache, CacheRead};
use crate::config::Config;
use crate::diagnose;
use crate::exec::{self, ExecError, RenderedCommand};
use crate::ifaces::InterfaceRecord;
use crate::mutation::{
    self, DeleteRequest, MutationReport, Outcome, RouteChange, ValidationError,
};
use crate::platform::{self, PlatformError, PlatformTools};
use crate::routes::{IpVersion, RouteRecord};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

const TIMEOUT_HINT: &str =
    "The command did not finish in time. Check system responsiveness and retry.";

/// Throwaway probe route used to sanity-check the execution path.
const PROBE_DESTINATION: &str = "169.254.200.0";
const PROBE_MASK: &str = "255.255.255.0";
const PROBE_GATEWAY: &str = "169.254.1.1";

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),
    #[error("Execution error: {0}")]
    Exec(#[from] ExecError),
    #[error("{command} failed (exit {code:?}): {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
}

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),
}

/// An approved-pending mutation: the exact command that `apply` will run.
#[derive(Debug, Clone)]
pub struct MutationPlan {
    command: RenderedCommand,
}

impl MutationPlan {
    /// Command text to show the user before they approve.
    pub fn preview(&self) -> String {
        self.command.to_string()
    }
}

/// Result of the connectivity probe: the add, and the cleanup delete that
/// only runs when the add succeeded.
#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub add: MutationReport,
    pub cleanup: Option<MutationReport>,
}

impl ProbeReport {
    pub fn succeeded(&self) -> bool {
        self.add.succeeded() && self.cleanup.as_ref().is_some_and(|r| r.succeeded())
    }
}

pub struct RoutePanel {
    tools: Box<dyn PlatformTools>,
    table_timeout: Duration,
    probe_timeout: Duration,
    routes_v4: Cache<RouteRecord>,
    routes_v6: Cache<RouteRecord>,
    interfaces: Cache<InterfaceRecord>,
    interfaces_detailed: Cache<InterfaceRecord>,
}

impl RoutePanel {
    /// Panel for the current platform.
    pub fn new(config: &Config) -> Result<Self, PlatformError> {
        Ok(Self::with_tools(platform::native_tools()?, config))
    }

    /// Panel with an explicit toolset (tests, cross-family inspection).
    pub fn with_tools(tools: Box<dyn PlatformTools>, config: &Config) -> Self {
        let interface_ttl = Duration::from_secs(config.cache.interface_ttl_secs);
        Self {
            tools,
            table_timeout: Duration::from_secs(config.exec.table_timeout_secs),
            probe_timeout: Duration::from_secs(config.exec.probe_timeout_secs),
            routes_v4: Cache::new(Duration::from_secs(config.cache.route_ttl_secs)),
            routes_v6: Cache::new(Duration::from_secs(config.cache.route_ttl_secs)),
            interfaces: Cache::new(interface_ttl),
            interfaces_detailed: Cache::new(interface_ttl),
        }
    }

    /// Current route table for one IP version, served from cache when fresh.
    pub async fn routes(
        &self,
        version: IpVersion,
        force: bool,
    ) -> Result<CacheRead<RouteRecord>, FetchError> {
        let cache = match version {
            IpVersion::V4 => &self.routes_v4,
            IpVersion::V6 => &self.routes_v6,
        };
        cache
            .get_with(force, move || self.fetch_routes(version))
            .await
    }

    async fn fetch_routes(&self, version: IpVersion) -> Result<Vec<RouteRecord>, FetchError> {
        let command = self.tools.route_dump()?;
        let output = exec::run(&command, self.table_timeout).await?;
        if !output.success() {
            return Err(FetchError::CommandFailed {
                command: command.to_string(),
                code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            });
        }
        let records = self.tools.parse_routes(&output.stdout, version);
        info!("Parsed {} {} routes", records.len(), version);
        Ok(records)
    }

    /// Fast interface listing (route-dump interface list).
    pub async fn interfaces(
        &self,
        force: bool,
    ) -> Result<CacheRead<InterfaceRecord>, FetchError> {
        self.interfaces
            .get_with(force, move || async move {
                let command = self.tools.interface_dump()?;
                let output = exec::run(&command, self.probe_timeout).await?;
                if !output.success() {
                    return Err(FetchError::CommandFailed {
                        command: command.to_string(),
                        code: output.exit_code,
                        stderr: output.stderr.trim().to_string(),
                    });
                }
                let records = self.tools.parse_interfaces(&output.stdout);
                info!("Parsed {} interfaces (fast path)", records.len());
                Ok(records)
            })
            .await
    }

    /// Detailed interface inventory (IP-configuration dump).
    pub async fn interfaces_detailed(
        &self,
        force: bool,
    ) -> Result<CacheRead<InterfaceRecord>, FetchError> {
        self.interfaces_detailed
            .get_with(force, move || async move {
                let command = self.tools.ip_config_dump()?;
                let output = exec::run(&command, self.table_timeout).await?;
                if !output.success() {
                    return Err(FetchError::CommandFailed {
                        command: command.to_string(),
                        code: output.exit_code,
                        stderr: output.stderr.trim().to_string(),
                    });
                }
                let records = self.tools.parse_ip_config(&output.stdout);
                info!("Parsed {} interfaces (detailed path)", records.len());
                Ok(records)
            })
            .await
    }

    /// Validate an addition and render its command for approval.
    pub fn plan_add(&self, change: &RouteChange) -> Result<MutationPlan, PlanError> {
        mutation::validate(change)?;
        let command = self.tools.render_add(change)?;
        Ok(MutationPlan { command })
    }

    /// Validate a deletion and render its command for approval.
    pub fn plan_delete(&self, request: &DeleteRequest) -> Result<MutationPlan, PlanError> {
        mutation::validate_delete(request)?;
        let command = self.tools.render_delete(request)?;
        Ok(MutationPlan { command })
    }

    /// Execute an approved plan and classify the result.
    ///
    /// Success invalidates the route caches so the next read refetches.
    pub async fn apply(&self, plan: &MutationPlan) -> MutationReport {
        let command_text = plan.command.to_string();
        info!("Applying mutation: {}", command_text);

        match exec::run(&plan.command, self.table_timeout).await {
            Ok(output) if output.success() => {
                self.invalidate_routes();
                MutationReport {
                    command: command_text,
                    outcome: Outcome::Applied,
                }
            }
            Ok(output) => {
                // The tool occasionally reports errors on stdout.
                let text = if output.stderr.trim().is_empty() {
                    output.stdout.trim().to_string()
                } else {
                    output.stderr.trim().to_string()
                };
                let kind = diagnose::classify(&text);
                warn!("Mutation rejected ({}): {}", kind, text);
                MutationReport {
                    command: command_text,
                    outcome: Outcome::Rejected {
                        kind,
                        stderr: text,
                        hint: kind.hint(),
                    },
                }
            }
            Err(ExecError::Timeout { .. }) => {
                warn!("Mutation timed out: {}", command_text);
                MutationReport {
                    command: command_text,
                    outcome: Outcome::TimedOut { hint: TIMEOUT_HINT },
                }
            }
            Err(ExecError::Launch { source, .. }) => {
                warn!("Mutation could not launch: {}", source);
                MutationReport {
                    command: command_text,
                    outcome: Outcome::LaunchFailed {
                        detail: source.to_string(),
                    },
                }
            }
        }
    }

    /// Add and immediately remove a throwaway route to verify that the
    /// execution path works end to end.
    pub async fn probe(&self) -> Result<ProbeReport, PlanError> {
        let change = RouteChange {
            version: IpVersion::V4,
            destination: PROBE_DESTINATION.to_string(),
            mask_or_prefix: PROBE_MASK.to_string(),
            gateway: Some(PROBE_GATEWAY.to_string()),
            interface: None,
            metric: None,
            persistent: false,
        };
        let add_plan = self.plan_add(&change)?;
        let add = self.apply(&add_plan).await;

        let cleanup = if add.succeeded() {
            let delete_plan = self.plan_delete(&DeleteRequest {
                version: IpVersion::V4,
                destination: PROBE_DESTINATION.to_string(),
                mask_or_prefix: None,
            })?;
            Some(self.apply(&delete_plan).await)
        } else {
            None
        };

        Ok(ProbeReport { add, cleanup })
    }

    /// Force the next route reads to refetch, both IP versions.
    pub fn invalidate_routes(&self) {
        self.routes_v4.invalidate();
        self.routes_v6.invalidate();
    }
}
