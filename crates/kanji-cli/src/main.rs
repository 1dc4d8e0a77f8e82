//! Kanji CLI: command-line client for the Kanji OCR API.
//!
//! Set KANJI_API_URL (or pass --api-url) to point at a running server.

use anyhow::Context;
use clap::{Parser, Subcommand};
use futures::stream::{self, StreamExt};
use kanji_api_client::{ApiClient, ClientError, DEFAULT_API_URL};
use kanji_cli::{distinct_characters, format_entry, format_ocr, init_tracing};
use serde::Serialize;
use std::path::PathBuf;

/// Lookups issued at once by `scan`
const SCAN_CONCURRENCY: usize = 4;

#[derive(Parser)]
#[command(name = "kanji", about = "Kanji OCR API CLI")]
struct Cli {
    /// Base URL of the API server
    #[arg(long, env = "KANJI_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Print raw JSON responses
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload an image and print the recognized characters
    Upload {
        /// Path to the image
        file: PathBuf,
    },
    /// Look up a single character
    Lookup {
        character: String,
    },
    /// Send a message to the language partner
    Chat {
        message: String,
    },
    /// Upload an image, then look up every recognized character
    Scan {
        /// Path to the image
        file: PathBuf,
    },
    /// Check that the server is up
    Health,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let client = ApiClient::new(cli.api_url.as_str())
        .context("Failed to create API client. Check --api-url or KANJI_API_URL")?;

    match cli.command {
        Commands::Upload { file } => {
            let response = client.upload_path(&file).await?;
            if cli.json {
                print_json(&response)?;
            } else {
                println!("{}", response.message);
                println!("{}", format_ocr(&response.ocr_results));
            }
        }
        Commands::Lookup { character } => match client.lookup(&character).await {
            Ok(response) if cli.json => print_json(&response)?,
            Ok(response) => println!("{}", format_entry(&response.kanji, &response.data)),
            Err(err) if err.is_missing_entry() && !cli.json => {
                println!("No dictionary entry for '{}'", character);
            }
            Err(err) => return Err(err.into()),
        },
        Commands::Chat { message } => {
            let response = client.chat(&message).await?;
            if cli.json {
                print_json(&response)?;
            } else {
                println!("{}", response.response);
            }
        }
        Commands::Scan { file } => {
            let upload = client.upload_path(&file).await?;
            let characters = distinct_characters(&upload.ocr_results);
            tracing::debug!(count = characters.len(), "Looking up recognized characters");

            let lookups: Vec<(String, Result<_, ClientError>)> = stream::iter(characters)
                .map(|character| {
                    let client = client.clone();
                    async move {
                        let result = client.lookup(&character).await;
                        (character, result)
                    }
                })
                .buffered(SCAN_CONCURRENCY)
                .collect()
                .await;

            if cli.json {
                let entries: Vec<_> = lookups
                    .iter()
                    .map(|(character, result)| match result {
                        Ok(response) => serde_json::json!({ "kanji": character, "data": response.data }),
                        Err(err) => serde_json::json!({ "kanji": character, "error": err.to_string() }),
                    })
                    .collect();
                print_json(&serde_json::json!({ "upload": upload, "lookups": entries }))?;
            } else {
                println!("{}", format_ocr(&upload.ocr_results));
                for (character, result) in &lookups {
                    println!();
                    match result {
                        Ok(response) => println!("{}", format_entry(character, &response.data)),
                        Err(err) if err.is_missing_entry() => {
                            println!("{}  (no dictionary entry)", character)
                        }
                        Err(err) => println!("{}  lookup failed: {}", character, err),
                    }
                }
            }
        }
        Commands::Health => {
            let health = client.health().await?;
            if cli.json {
                print_json(&health)?;
            } else {
                println!("{} {} is {}", health.service, health.version, health.status);
            }
        }
    }

    Ok(())
}
