//! `folio status`: show configuration and store contents.

use folio_core::Category;
use std::path::Path;

pub async fn run(path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = super::config_path(path);
    let config = super::load_config(path)?;

    println!("Folio status");
    println!("============");
    println!("  Config:       {}", config_path.display());
    println!("  Profile:      {}", config.profile_name);
    println!("  Provider:     {}", config.inference.provider);
    println!("  Endpoint:     {}", config.inference.base_url);
    println!("  Model:        {}", config.inference.model);
    println!("  Timeout:      {}s", config.inference.timeout_secs);
    println!(
        "  Health:       probe every {}s, degrade after {} failures",
        config.health.probe_interval_secs, config.health.failure_threshold
    );
    println!("  Prompt:       {} chars max", config.prompt.max_chars);
    println!("  Gateway:      {}:{}", config.gateway.host, config.gateway.port);

    match config.store.backend.as_str() {
        "sqlite" => println!("  Store:        sqlite ({})", config.store.database_path().display()),
        other => println!("  Store:        {other}"),
    }

    match folio_store::open(&config.store).await {
        Ok(store) => {
            let skills = store.skills(config.retrieval.skills_limit).await?.len();
            let experiences = store.experiences().await?.len();
            let projects = store
                .projects(config.retrieval.projects_limit, config.retrieval.featured_projects_only)
                .await?
                .len();
            let about = store.about().await?.is_some();
            let contact = store.contact().await?.is_some();

            println!("\n  Records served per category:");
            println!("    {:<11} {skills}", Category::Skills.as_str());
            println!("    {:<11} {experiences}", Category::Experience.as_str());
            println!("    {:<11} {projects}", Category::Projects.as_str());
            println!("    {:<11} {}", Category::About.as_str(), if about { 1 } else { 0 });
            println!("    {:<11} {}", Category::Contact.as_str(), if contact { 1 } else { 0 });
            if skills + experiences + projects == 0 && !about && !contact {
                println!("\n  Store is empty; run `folio seed` first");
            }
        }
        Err(e) => println!("\n  Store unavailable: {e}"),
    }

    if !config_path.exists() {
        println!("\n  No config file; run `folio init` to create one");
    }

    Ok(())
}
