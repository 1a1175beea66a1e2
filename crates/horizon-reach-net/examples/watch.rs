//! Watch reachability of a host and print every change.
//!
//! Run with: cargo run -p horizon-reach-net --example watch -- api.example.com
//!
//! Without an argument the general internet connection is watched. Set
//! `RUST_LOG=horizon_reach_net=debug` for lifecycle logs. Press Ctrl+C to
//! exit.

use std::time::Duration;

use horizon_reach_net::dns::AddressResolver;
use horizon_reach_net::notification::{NotificationBus, StatusChange};
use horizon_reach_net::reachability::{ReachabilityMonitor, Target};
use tracing_subscriber::EnvFilter;

fn print_change(change: &StatusChange) {
    println!(
        "[{}] {} -> {} (flags {})",
        change.monitor.target(),
        change.previous,
        change.status,
        change.flags
    );
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("horizon_reach_net=info")),
        )
        .init();

    let host = std::env::args().nth(1);

    let monitor = match host.as_deref() {
        Some(host) => {
            let addresses = AddressResolver::system().resolve_sync(host, Duration::from_secs(2));
            match &addresses {
                Ok(addresses) => println!("{host} resolves to {addresses:?}"),
                Err(e) => println!("{host} does not resolve yet: {e}"),
            }
            ReachabilityMonitor::builder(Target::host_name(host)?).build()?
        }
        None => ReachabilityMonitor::internet(),
    };

    NotificationBus::global().subscribe_fn(print_change);

    monitor.start()?;
    println!(
        "watching {}: {} (flags {})",
        monitor.target(),
        monitor.status(),
        monitor.flags()
    );

    loop {
        std::thread::sleep(Duration::from_secs(60));
    }
}
