//! `folio ask`: answer one question through the full pipeline.

use folio_core::ChatQuery;
use folio_gateway::GatewayState;
use std::path::Path;

pub async fn run(
    path: Option<&Path>,
    question: &str,
    show_prompt: bool,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(path)?;
    let state = GatewayState::from_config(&config).await?;

    if show_prompt {
        let (categories, assembled) = state.orchestrator.build_prompt(question).await;
        let names: Vec<&str> = categories.iter().map(|c| c.as_str()).collect();
        let meta = &assembled.metadata;
        eprintln!("--- categories: {}", names.join(", "));
        eprintln!(
            "--- prompt: {} / {} chars ({:.0}%), ~{} tokens",
            meta.total_chars, meta.budget, meta.utilization_pct, meta.estimated_tokens
        );
        for drop in &meta.drops {
            eprintln!(
                "--- dropped {}: {} chars, {} items",
                drop.category, drop.chars_dropped, drop.items_dropped
            );
        }
        eprintln!("{}\n---", assembled.prompt);
    }

    let response = state.orchestrator.chat(ChatQuery::new(question)).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("{}", response.response);
        eprintln!(
            "\n  [model: {} | sources: {}]",
            response.model,
            response.sources.join(", ")
        );
    }

    Ok(())
}
