//! `folio serve`: start the HTTP API server.

use std::path::Path;

pub async fn run(
    path: Option<&Path>,
    port_override: Option<u16>,
    host_override: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config(path)?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }
    if let Some(host) = host_override {
        config.gateway.host = host;
    }

    println!("Folio gateway");
    println!("  Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("  Backend:   {} ({})", config.inference.provider, config.inference.model);
    println!("  Store:     {}", config.store.backend);

    folio_gateway::start(config).await?;

    Ok(())
}
