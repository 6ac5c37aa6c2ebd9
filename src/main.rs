use clap::{Parser, Subcommand};
use routectl::mutation::Outcome;
use routectl::service::{MutationPlan, RoutePanel};
use routectl::{Config, DeleteRequest, IpVersion, LinkStatus, MutationReport, RouteChange};
use std::io::{self, Write};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "routectl")]
#[command(about = "Route table console for Windows-style routing tools")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the active and persistent route tables
    Routes {
        /// Show the IPv6 table instead of IPv4
        #[arg(long)]
        ipv6: bool,
        /// Bypass the snapshot cache
        #[arg(short, long)]
        force: bool,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show the network interface inventory
    Interfaces {
        /// Parse the full IP-configuration dump instead of the fast listing
        #[arg(short, long)]
        detail: bool,
        /// Bypass the snapshot cache
        #[arg(short, long)]
        force: bool,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Add a route (IPv4 with --mask, IPv6 with --prefix)
    Add {
        /// Destination network address
        destination: String,
        /// IPv4 subnet mask, e.g. 255.255.255.0
        #[arg(long)]
        mask: Option<String>,
        /// IPv6 prefix length, e.g. 64
        #[arg(long)]
        prefix: Option<String>,
        /// Next-hop address, or "On-link"
        #[arg(short, long)]
        gateway: Option<String>,
        /// Interface number to bind the route to
        #[arg(short, long)]
        interface: Option<String>,
        /// Route metric
        #[arg(short, long)]
        metric: Option<String>,
        /// Register the route persistently (survives reboot)
        #[arg(short, long)]
        persistent: bool,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Delete a route
    Delete {
        /// Destination network address
        destination: String,
        /// IPv6 prefix length of the entry to delete
        #[arg(long)]
        prefix: Option<String>,
        /// Treat the destination as IPv6
        #[arg(long)]
        ipv6: bool,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Add and remove a throwaway route to check the execution path
    Probe {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Generate default config file
    Init,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if let Commands::Init = cli.command {
        let config = Config::default();
        let path = std::path::PathBuf::from("routectl.toml");
        config.save(&path)?;
        println!("Created default config: routectl.toml");
        return Ok(());
    }

    let config = Config::discover();
    let panel = RoutePanel::new(&config)?;

    match cli.command {
        Commands::Routes { ipv6, force, json } => {
            let version = if ipv6 { IpVersion::V6 } else { IpVersion::V4 };
            let read = panel.routes(version, force).await?;
            if let Some(warning) = &read.warning {
                eprintln!("warning: {}", warning);
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&read.snapshot.records)?);
            } else {
                print_routes(version, &read.snapshot.records);
            }
        }
        Commands::Interfaces { detail, force, json } => {
            let read = if detail {
                panel.interfaces_detailed(force).await?
            } else {
                panel.interfaces(force).await?
            };
            if let Some(warning) = &read.warning {
                eprintln!("warning: {}", warning);
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&read.snapshot.records)?);
            } else if detail {
                print_interfaces_detailed(&read.snapshot.records);
            } else {
                for record in &read.snapshot.records {
                    println!("{}", record.display());
                }
            }
        }
        Commands::Add {
            destination,
            mask,
            prefix,
            gateway,
            interface,
            metric,
            persistent,
            yes,
        } => {
            let version = if prefix.is_some() {
                IpVersion::V6
            } else {
                IpVersion::V4
            };
            let change = RouteChange {
                version,
                destination,
                mask_or_prefix: prefix.or(mask).unwrap_or_default(),
                gateway,
                interface,
                metric,
                persistent,
            };
            let plan = panel.plan_add(&change)?;
            run_plan(&panel, plan, yes).await;
        }
        Commands::Delete {
            destination,
            prefix,
            ipv6,
            yes,
        } => {
            let version = if ipv6 || prefix.is_some() {
                IpVersion::V6
            } else {
                IpVersion::V4
            };
            let request = DeleteRequest {
                version,
                destination,
                mask_or_prefix: prefix,
            };
            let plan = panel.plan_delete(&request)?;
            run_plan(&panel, plan, yes).await;
        }
        Commands::Probe { yes } => {
            if !confirm("route add/delete of a throwaway 169.254.200.0/24 entry", yes) {
                println!("Cancelled");
                return Ok(());
            }
            let report = panel.probe().await?;
            print_report(&report.add);
            if let Some(cleanup) = &report.cleanup {
                print_report(cleanup);
            }
            if report.succeeded() {
                println!("Execution path OK");
            } else {
                std::process::exit(1);
            }
        }
        Commands::Init => unreachable!(),
    }

    Ok(())
}

/// The Confirm stage: a mutation never runs without explicit approval.
fn confirm(what: &str, yes: bool) -> bool {
    if yes {
        return true;
    }
    print!("About to run: {}\nProceed? [y/N] ", what);
    let _ = io::stdout().flush();

    let mut line = String::new();
    if io::stdin().read_line(&mut line).is_err() {
        return false;
    }
    matches!(line.trim(), "y" | "Y" | "yes" | "Yes")
}

async fn run_plan(panel: &RoutePanel, plan: MutationPlan, yes: bool) {
    if !confirm(&plan.preview(), yes) {
        println!("Cancelled");
        return;
    }
    let report = panel.apply(&plan).await;
    print_report(&report);
    if !report.succeeded() {
        std::process::exit(1);
    }
    info!("Route table updated");
}

fn print_report(report: &MutationReport) {
    match &report.outcome {
        Outcome::Applied => println!("ok: {}", report.command),
        Outcome::Rejected { kind, stderr, hint } => {
            eprintln!("failed ({}): {}", kind, report.command);
            if !stderr.is_empty() {
                eprintln!("  tool output: {}", stderr);
            }
            eprintln!("  {}", hint);
        }
        Outcome::TimedOut { hint } => {
            eprintln!("timed out: {}", report.command);
            eprintln!("  {}", hint);
        }
        Outcome::LaunchFailed { detail } => {
            eprintln!("could not launch: {}", report.command);
            eprintln!("  {}", detail);
        }
    }
}

fn print_routes(version: IpVersion, records: &[routectl::RouteRecord]) {
    let (active, persistent): (Vec<_>, Vec<_>) = records.iter().partition(|r| !r.persistent);

    let mask_header = match version {
        IpVersion::V4 => "Netmask",
        IpVersion::V6 => "Prefix",
    };

    println!("Active Routes ({} entries)", active.len());
    println!(
        "  {:<24} {:<18} {:<24} {:<10} {:<6}",
        "Destination", mask_header, "Gateway", "Interface", "Metric"
    );
    for r in &active {
        println!(
            "  {:<24} {:<18} {:<24} {:<10} {:<6}",
            r.destination, r.mask_or_prefix, r.gateway, r.interface, r.metric
        );
    }

    println!();
    println!("Persistent Routes ({} entries)", persistent.len());
    println!(
        "  {:<24} {:<18} {:<24} {:<6}",
        "Destination", mask_header, "Gateway", "Metric"
    );
    for r in &persistent {
        println!(
            "  {:<24} {:<18} {:<24} {:<6}",
            r.destination, r.mask_or_prefix, r.gateway, r.metric
        );
    }
}

fn print_interfaces_detailed(records: &[routectl::InterfaceRecord]) {
    for record in records {
        let status = match record.status {
            LinkStatus::Connected => "connected",
            LinkStatus::Disconnected => "disconnected",
            LinkStatus::Unknown => "unknown",
        };
        println!("{} [{}]", record.name, status);
        if !record.number.is_empty() {
            println!("  Interface number: {}", record.number);
        }
        if let Some(mac) = &record.mac_address {
            println!("  MAC:              {}", mac);
        }
        for addr in &record.ipv4_addresses {
            println!("  IPv4:             {}", addr);
        }
        for addr in &record.ipv6_addresses {
            println!("  IPv6:             {}", addr);
        }
        if let Some(gateway) = &record.default_gateway {
            println!("  Gateway:          {}", gateway);
        }
        if !record.dns_servers.is_empty() {
            println!("  DNS:              {}", record.dns_servers.join(", "));
        }
        if record.dhcp_enabled {
            match &record.dhcp_server {
                Some(server) => println!("  DHCP:             enabled ({})", server),
                None => println!("  DHCP:             enabled"),
            }
        }
        println!();
    }
}
