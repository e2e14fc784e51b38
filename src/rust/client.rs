use anyhow::Context;
use clap::Parser;
use log::info;
use sentiment_api::{init_logger, PredictRequest, Prediction};

const EXAMPLE_TEXT: &str = "these is anti-incumbency sentiments against the current government!";

#[derive(Parser)]
#[command(author, version, about = "Sends a text to a running sentiment server", long_about = None)]
struct Args {
    /// Prediction endpoint to call
    #[arg(long, env = "SENTIMENT_API_URL", default_value = "http://127.0.0.1:8000/predict_sentiment")]
    url: String,

    /// Text to classify
    #[arg(default_value = EXAMPLE_TEXT)]
    text: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();
    let args = Args::parse();

    info!("Posting {} chars to {}", args.text.len(), args.url);
    let response = reqwest::Client::new()
        .post(&args.url)
        .json(&PredictRequest { text: args.text })
        .send()
        .await
        .with_context(|| format!("Request to {} failed", args.url))?;

    let status = response.status();
    if status.is_success() {
        let prediction: Prediction = response.json().await.context("Malformed response body")?;
        println!("API Response: {}", serde_json::to_string(&prediction)?);
        Ok(())
    } else {
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("{}, {}", status.as_u16(), body)
    }
}
