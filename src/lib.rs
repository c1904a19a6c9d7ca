pub mod assistant;
pub mod chunk;
pub mod config;
pub mod content;
pub mod logging;
pub mod model;
pub mod prompt;
pub mod providers;
pub mod repl;

use anyhow::{Context, Result};
use reqwest::Client;
use std::env;
use tracing::info;

use assistant::Assistant;
use config::Config;
use repl::run_repl;

pub async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init();

    let cfg = Config::from_env();
    info!(
        provider = %cfg.model_provider,
        model = %cfg.model,
        source_urls = cfg.source_urls.len(),
        "loaded runtime configuration"
    );

    let client = Client::builder()
        .build()
        .context("Failed to initialize HTTP client")?;

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        run_repl(&client, &cfg).await
    } else {
        let mut assistant = Assistant::new(&client, &cfg);
        let question = args.join(" ");
        if let Some(answer) = assistant.run_turn(&question).await {
            println!("{}", answer.trim());
        }
        Ok(())
    }
}
