//! Export saved letters to JSON, CSV or plain text
//!
//! Usage:
//!   cargo run -p export_letters -- --db ~/.typewriter/letters.redb --format json
//!   cargo run -p export_letters -- --url https://example.supabase.co --key anon --format txt
//!   cargo run -p export_letters -- --db letters.redb --format csv --output letters.csv

use clap::Parser;
use std::path::PathBuf;
use typewriter_core::{Letter, LetterStore, RemoteConfig};

#[derive(Parser, Debug)]
#[command(name = "export_letters")]
#[command(about = "Export saved letters to JSON, CSV or plain text")]
struct Args {
    /// Path to the letter database
    #[arg(short, long, conflicts_with = "url")]
    db: Option<PathBuf>,

    /// Base URL of the hosted letter table
    #[arg(long, requires = "key", env = "TYPEWRITER_STORE_URL")]
    url: Option<String>,

    /// API key for the hosted letter table
    #[arg(long, env = "TYPEWRITER_STORE_KEY", hide_env_values = true)]
    key: Option<String>,

    /// Output format: json, csv or txt
    #[arg(short, long, default_value = "json")]
    format: String,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let store = match (&args.db, &args.url, &args.key) {
        (Some(db), _, _) => LetterStore::new_redb(db)
            .map_err(|e| anyhow::anyhow!("Failed to open letter database: {}", e))?,
        (None, Some(url), Some(key)) => {
            LetterStore::new_remote(RemoteConfig::new(url.as_str(), key.as_str()))?
        }
        _ => anyhow::bail!("Pass --db PATH, or --url and --key for the hosted table"),
    };

    // Newest first
    let letters = store.try_get_letters()?;

    let output = match args.format.as_str() {
        "json" => export_json(&letters)?,
        "csv" => export_csv(&letters),
        "txt" => export_txt(&letters),
        _ => anyhow::bail!("Unsupported format: {}. Use 'json', 'csv' or 'txt'", args.format),
    };

    if let Some(path) = args.output {
        std::fs::write(path, output)?;
    } else {
        print!("{}", output);
    }

    Ok(())
}

fn export_json(letters: &[Letter]) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(letters)?;
    json.push('\n');
    Ok(json)
}

fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// One row per letter; lines are joined with `\n` inside the quoted field.
fn export_csv(letters: &[Letter]) -> String {
    let mut output = String::from("id,created_at,theme,content\n");
    for letter in letters {
        output.push_str(&format!(
            "{},{},{},{}\n",
            csv_field(&letter.id),
            letter.created_at.to_rfc3339(),
            csv_field(&letter.theme),
            csv_field(&letter.text())
        ));
    }
    output
}

fn export_txt(letters: &[Letter]) -> String {
    let mut output = String::new();
    for letter in letters {
        output.push_str(&format!(
            "== {} ({}) ==\n",
            letter.created_at.format("%B %-d, %Y %H:%M"),
            letter.theme
        ));
        output.push_str(&letter.text());
        output.push_str("\n\n");
    }
    output
}
