use anyhow::{Context, bail};
use clap::Parser;
use serde::Deserialize;
use serde_json::json;

const DEFAULT_URL: &str = "http://127.0.0.1:5000/get-recommendations";

/// Ask the art recommendation service what to look at for a given mood
#[derive(Debug, Parser)]
#[command(name = "mood-client", version)]
struct Args {
    /// Recommendation endpoint
    #[arg(long, env = "MOOD_SERVICE_URL", default_value = DEFAULT_URL)]
    url: String,

    /// How are you feeling today? (e.g. happy, calm)
    #[arg(required = true)]
    mood: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ArtPiece {
    title: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

fn render(pieces: &[ArtPiece]) -> String {
    if pieces.is_empty() {
        return "No recommendations.".to_string();
    }

    let mut out = String::from("Recommended Art:\n");
    for art in pieces {
        out.push_str(&format!("• {}\n  Description: {}\n", art.title, art.description));
    }
    out
}

/// Error text to show for a non-200 response.
fn error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => format!("Server returned {status}: {}", parsed.error),
        Err(_) => format!("Invalid server response ({status})"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mood = args.mood.join(" ");

    let response = reqwest::Client::new()
        .post(&args.url)
        .json(&json!({ "text": mood }))
        .send()
        .await
        .with_context(|| format!("Failed to fetch recommendations from {}", args.url))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .context("Failed to read server response")?;

    if !status.is_success() {
        bail!(error_message(status.as_u16(), &body));
    }

    let pieces: Vec<ArtPiece> =
        serde_json::from_str(&body).context("Failed to decode server response")?;
    print!("{}", render(&pieces));

    Ok(())
}
