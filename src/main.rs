use anyhow::{Context, Result};
use clap::Parser;
use meme_crypt::config::{Config, setup_logging};
use meme_crypt::llm::OpenAiChat;
use meme_crypt::transport::HttpTransport;
use meme_crypt::workflow::{RunOutcome, run};
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(err) = dotenvy::dotenv() {
        // a missing .env is fine, everything can come from the environment
        if !err.not_found() {
            eprintln!("Failed to load .env: {err}");
        }
    }

    let cli = meme_crypt::cli::CliOptions::parse();

    if let Err(err) = setup_logging(cli.debug) {
        eprintln!("Continuing without logging: {err}");
    }

    let config = Config::from_cli(&cli).context("Invalid configuration")?;
    debug!("Using model {} at {}", config.model, config.openai_base_url);

    println!("\n🚀 Meme Crypt 🚀\n");
    let message = meme_crypt::cli::prompt_secret_message(
        &mut std::io::stdin().lock(),
        &mut std::io::stdout(),
    )
    .context("Failed to read the secret message")?;

    let client = reqwest::Client::new();
    let transport = HttpTransport::new(client.clone());
    let model = OpenAiChat::new(client, &config);

    match run(&config, &transport, &model, &message).await {
        RunOutcome::NoMessage => println!("❌ No message. Abort!"),
        RunOutcome::NoTemplates => println!("❌ No templates. Abort!"),
        RunOutcome::Completed { folder, .. } => {
            println!("✅ Meme components saved in folder: {}", folder.display());
        }
    }
    Ok(())
}
