//! Mood Mirror CLI
//!
//! Command-line interface for Mood Mirror operations:
//! - Extract an Apple Health export into the health CSV table
//! - Summarize a week of health data locally
//! - Reflect, chat and narrate through a running API server
//! - Browse the journal history

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use moodmirror::health::{
    extract_path, read_csv_path, summarize, type_counts, write_csv_path, WeeklyWindow,
    TIMESTAMP_FORMAT,
};
use moodmirror::journal::Mood;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "moodmirror")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Reflective journaling that connects your mood with your health data")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// API server URL (default: from config)
    #[arg(long, global = true)]
    pub api_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract whitelisted records from an Apple Health export
    Extract {
        /// export.xml or the exported ZIP archive
        #[arg(default_value = "export.xml")]
        input: PathBuf,
        /// Output CSV
        #[arg(short, long, default_value = "mental_health_fitness_data.csv")]
        output: PathBuf,
        /// Rows to preview
        #[arg(long, default_value = "5")]
        head: usize,
    },

    /// Summarize one week of a health CSV
    Summary {
        /// Health CSV table
        csv: PathBuf,
        /// First day of the week (YYYY-MM-DD)
        #[arg(short, long)]
        week_start: NaiveDate,
    },

    /// Upload a health CSV to the server
    Upload {
        /// Health CSV table
        csv: PathBuf,
    },

    /// Generate and record a weekly reflection
    Reflect {
        /// First day of the week (YYYY-MM-DD)
        #[arg(short, long)]
        week_start: NaiveDate,
        /// happy, neutral, sad, anxious or angry
        #[arg(short, long)]
        mood: Mood,
        /// What happened this week
        #[arg(short, long)]
        journal: String,
        /// Upload this health CSV first
        #[arg(long)]
        health_csv: Option<PathBuf>,
    },

    /// Send a chat message
    Chat {
        message: String,
    },

    /// Start a new conversation
    NewChat,

    /// Toggle the casual Gen-Z tone
    Style {
        #[arg(value_enum)]
        mode: Toggle,
    },

    /// Show the journal history
    History {
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },

    /// Narrate an assistant message to an MP3 file
    Say {
        /// Position in the conversation (0-based)
        index: usize,
        #[arg(short, long, default_value = "reflection.mp3")]
        output: PathBuf,
    },

    /// Show server status
    Status,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let api_url = cli
        .api_url
        .clone()
        .unwrap_or_else(|| moodmirror::config::Config::load_default().api.base_url());
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Extract {
            input,
            output,
            head,
        } => {
            let records = extract_path(&input)
                .with_context(|| format!("Failed to extract {:?}", input))?;
            write_csv_path(&records, &output)?;

            let mut counts: Vec<_> = type_counts(&records).into_iter().collect();
            counts.sort_by(|a, b| b.1.cmp(&a.1));

            println!("{:<52} {}", "type", "count");
            for (record_type, count) in counts {
                println!("{:<52} {}", record_type.identifier(), count);
            }
            println!();

            for record in records.iter().take(head) {
                println!(
                    "{} | {} {} | {} | {}",
                    record.record_type.identifier(),
                    record.value,
                    record.unit,
                    record.start_date.format(TIMESTAMP_FORMAT),
                    record.source
                );
            }
            println!();
            println!("Wrote {} records to {:?}", records.len(), output);
        }

        Commands::Summary { csv, week_start } => {
            let records = read_csv_path(&csv).with_context(|| format!("Failed to read {:?}", csv))?;
            let window = WeeklyWindow::starting(week_start);

            println!("Week {}", window);
            println!("{}", summarize(&records, window).render());
        }

        Commands::Upload { csv } => {
            let loaded = upload_csv(&client, &api_url, &csv).await?;
            println!("Loaded {} health records", loaded);
        }

        Commands::Reflect {
            week_start,
            mood,
            journal,
            health_csv,
        } => {
            if let Some(csv) = health_csv {
                upload_csv(&client, &api_url, &csv).await?;
            }

            let body = serde_json::json!({
                "week_start": week_start,
                "mood": mood,
                "journal": journal,
            });
            let response = client
                .post(format!("{}/api/v1/reflect", api_url))
                .json(&body)
                .send()
                .await?;
            let data: serde_json::Value = check(response).await?.json().await?;

            println!("{}", data["message"].as_str().unwrap_or_default());
        }

        Commands::Chat { message } => {
            let response = client
                .post(format!("{}/api/v1/chat", api_url))
                .json(&serde_json::json!({ "message": message }))
                .send()
                .await?;
            let data: serde_json::Value = check(response).await?.json().await?;

            println!("{}", data["reply"].as_str().unwrap_or_default());
        }

        Commands::NewChat => {
            let response = client
                .post(format!("{}/api/v1/chat/reset", api_url))
                .send()
                .await?;
            check(response).await?;
            println!("Started a new conversation");
        }

        Commands::Style { mode } => {
            let enabled = matches!(mode, Toggle::On);
            let response = client
                .put(format!("{}/api/v1/settings", api_url))
                .json(&serde_json::json!({ "style_modifier": enabled }))
                .send()
                .await?;
            check(response).await?;
            println!("Gen-Z mode {}", if enabled { "on" } else { "off" });
        }

        Commands::History { json } => {
            let response = client
                .get(format!("{}/api/v1/history", api_url))
                .send()
                .await?;
            let data: serde_json::Value = check(response).await?.json().await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&data["entries"])?);
                return Ok(());
            }

            let entries = data["entries"].as_array().cloned().unwrap_or_default();
            if entries.is_empty() {
                println!("No reflections yet.");
                println!();
                println!("Record your first week with:");
                println!("  moodmirror reflect --week-start 2024-01-01 --mood happy --journal \"...\"");
            }

            for entry in entries {
                let mood = entry["mood"]
                    .as_str()
                    .and_then(|m| m.parse::<Mood>().ok())
                    .map(|m| m.label())
                    .unwrap_or("-");
                println!(
                    "{} to {}  {}",
                    entry["week_start"].as_str().unwrap_or("-"),
                    entry["week_end"].as_str().unwrap_or("-"),
                    mood
                );
                println!("  {}", entry["reflection"].as_str().unwrap_or_default());
                println!();
            }
        }

        Commands::Say { index, output } => {
            let response = client
                .get(format!("{}/api/v1/chat/{}/audio", api_url, index))
                .send()
                .await?;
            let audio = check(response).await?.bytes().await?;

            std::fs::write(&output, &audio)?;
            println!("Saved {} bytes of audio to {:?}", audio.len(), output);
        }

        Commands::Status => {
            let response = client.get(format!("{}/health", api_url)).send().await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    let health: serde_json::Value = resp.json().await?;

                    println!("Mood Mirror v{}", env!("CARGO_PKG_VERSION"));
                    println!();
                    println!("API Status: {}", health["status"].as_str().unwrap_or("unknown"));
                    println!(
                        "Text service: {}",
                        health["text_service"].as_str().unwrap_or("unknown")
                    );
                    println!(
                        "Journal entries: {}",
                        health["journal_entries"].as_u64().unwrap_or(0)
                    );
                    match health["health_records"].as_u64() {
                        Some(n) => println!("Health records loaded: {}", n),
                        None => println!("Health records loaded: none"),
                    }

                    if let Some(uptime) = health["uptime_seconds"].as_u64() {
                        println!();
                        println!("Uptime: {}", format_duration(uptime));
                    }
                }
                Ok(resp) => bail!("API returned error: {}", resp.status()),
                Err(e) => {
                    eprintln!("Cannot connect to Mood Mirror API at {}", api_url);
                    eprintln!();
                    eprintln!("Make sure the API server is running:");
                    eprintln!("  cargo run --bin moodmirror-api");
                    return Err(e.into());
                }
            }
        }

        Commands::Config { output } => {
            let config = moodmirror::config::generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

/// Upload a health CSV, returning the number of records loaded
async fn upload_csv(
    client: &reqwest::Client,
    api_url: &str,
    csv: &Path,
) -> anyhow::Result<u64> {
    let text = std::fs::read_to_string(csv).with_context(|| format!("Failed to read {:?}", csv))?;

    let response = client
        .post(format!("{}/api/v1/health-data", api_url))
        .json(&serde_json::json!({ "csv": text }))
        .send()
        .await?;
    let data: serde_json::Value = check(response).await?.json().await?;

    Ok(data["records"].as_u64().unwrap_or(0))
}

/// Turn an error response into an error carrying the server's message
async fn check(response: reqwest::Response) -> anyhow::Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(String::from))
        .unwrap_or(text);

    bail!("{} ({})", message, status)
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}
