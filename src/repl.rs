use anyhow::{Context, Result};
use reqwest::Client;
use std::io::{self, Write};

use crate::assistant::Assistant;
use crate::config::Config;
use crate::model::Message;

pub async fn run_repl(client: &Client, cfg: &Config) -> Result<()> {
    let mut assistant = Assistant::new(client, cfg);

    println!("crumb site assistant");
    println!("model: {} ({})", cfg.model, cfg.model_provider);
    if let Some(welcome) = assistant.greeting() {
        println!("{welcome}");
    }
    println!("type a question, '/history' to inspect the conversation, '/reset' to start over, or 'exit' to quit");

    loop {
        print!("> ");
        io::stdout().flush().context("Failed to flush stdout")?;

        let mut input = String::new();
        let read = io::stdin()
            .read_line(&mut input)
            .context("Failed to read stdin")?;
        if read == 0 {
            break;
        }

        let question = input.trim();
        if question.is_empty() {
            continue;
        }
        if question.eq_ignore_ascii_case("exit") || question.eq_ignore_ascii_case("quit") {
            break;
        }
        if question.eq_ignore_ascii_case("/reset") {
            assistant.reset();
            println!("conversation reset\n");
            continue;
        }
        if question.eq_ignore_ascii_case("/history") {
            print_history(assistant.transcript());
            continue;
        }

        if let Some(answer) = assistant.run_turn(question).await {
            println!("{answer}\n");
        }
    }

    Ok(())
}

fn print_history(history: &[Message]) {
    if history.is_empty() {
        println!("(history is empty)\n");
        return;
    }

    for (idx, msg) in history.iter().enumerate() {
        println!("[{}] {}: {}", idx, msg.role.as_str(), msg.content);
    }
    println!();
}
