//! `folio health`: probe the model backend once.

use folio_agent::HealthMonitor;
use std::path::Path;

pub async fn run(path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(path)?;
    let client = folio_providers::build_client(&config.inference)?;
    let monitor = HealthMonitor::new(client, config.health.clone());

    let healthy = monitor.probe().await;
    let snapshot = monitor.snapshot();

    println!("Folio backend health");
    println!("====================");
    println!("  Provider:  {}", snapshot.provider);
    println!("  Endpoint:  {}", config.inference.base_url);
    println!("  Model:     {}", snapshot.model);
    if healthy {
        println!("\n  Backend reachable");
        Ok(())
    } else {
        let reason = snapshot.last_error.unwrap_or_else(|| "unknown error".into());
        println!("\n  Backend unreachable: {reason}");
        Err(format!("health probe failed: {reason}").into())
    }
}
