//! EmbedGuard CLI
//!
//! Command-line interface for classifying a single HTTP request against a
//! model directory. Prints the verdict as JSON on stdout.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

use embedguard::{Classifier, ModelDir, RequestParts};

/// Version information
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "embedguard")]
#[command(about = "Embedding-based HTTP request attack classifier")]
struct Args {
    /// Path to the model directory (vocab, configs, pattern corpus)
    #[arg(long, env = "EMBEDGUARD_MODEL_DIR")]
    model_dir: PathBuf,

    /// HTTP method
    #[arg(long, default_value = "GET")]
    method: String,

    /// Request path
    #[arg(long, default_value = "/")]
    path: String,

    /// Request body
    #[arg(long, default_value = "")]
    body: String,

    /// User-Agent header value
    #[arg(long, default_value = "")]
    user_agent: String,

    /// Query/form parameter as key=value (repeatable)
    #[arg(long = "param")]
    params: Vec<String>,

    /// Request header as name=value (repeatable)
    #[arg(long = "header")]
    headers: Vec<String>,

    /// Neighbor count for the vote
    #[arg(short, long, env = "EMBEDGUARD_K")]
    k: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long, env = "EMBEDGUARD_VERBOSE")]
    verbose: bool,
}

impl Args {
    fn to_parts(&self) -> Result<RequestParts> {
        let mut parts = RequestParts::new(self.method.clone(), self.path.clone());
        parts.body = self.body.clone();
        parts.user_agent = self.user_agent.clone();
        for raw in &self.params {
            let (key, value) = split_pair(raw).context("--param expects key=value")?;
            parts.params.insert(key, value);
        }
        for raw in &self.headers {
            let (key, value) = split_pair(raw).context("--header expects name=value")?;
            parts.headers.insert(key, value);
        }
        Ok(parts)
    }
}

fn split_pair(raw: &str) -> Option<(String, String)> {
    let (key, value) = raw.split_once('=')?;
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), value.to_string()))
}

/// Install panic hook for production diagnostics
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| {
                panic_info
                    .payload()
                    .downcast_ref::<String>()
                    .map(|s| s.as_str())
            })
            .unwrap_or("Unknown panic payload");

        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown location".to_string());

        // Use eprintln for panic logging as tracing may not work during panic
        eprintln!("PANIC: classifier panicked at {}: {}", location, payload);

        error!(
            panic_payload = %payload,
            panic_location = %location,
            "classifier panicked"
        );

        default_hook(panic_info);
    }));
}

fn main() -> Result<()> {
    install_panic_hook();

    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(format!("{}={}", env!("CARGO_CRATE_NAME"), log_level))
        .json()
        .with_writer(std::io::stderr)
        .init();

    info!(version = VERSION, model_dir = %args.model_dir.display(), "starting classifier");

    let classifier = Classifier::from_model_dir(&ModelDir::new(&args.model_dir))
        .context("failed to load model directory")?;

    let parts = args.to_parts()?;
    let result = classifier
        .classify_request(&parts, args.k)
        .context("classification failed")?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_pair() {
        assert_eq!(
            split_pair("q=hello=world"),
            Some(("q".to_string(), "hello=world".to_string()))
        );
        assert_eq!(split_pair("novalue"), None);
        assert_eq!(split_pair("=x"), None);
    }
}
