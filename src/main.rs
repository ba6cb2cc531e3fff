use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use gisul_client::token::decode_claims;
use gisul_client::{
    classify_error_text, ClientConfig, ProgressUpdate, SearchClient, SearchError, SearchRequest,
};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "gisul")]
#[command(about = "Client for the GISUL talent-matching API")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search trainers by free-text skills, streaming results as they arrive
    Search {
        query: String,
        #[arg(long, default_value = "")]
        location: String,
        #[arg(long)]
        top_k: Option<u32>,
        #[arg(long)]
        skill_domain: Option<String>,
    },
    /// Expand a skill domain into related keywords
    Expand { domain: String },
    /// Show the identity embedded in the configured bearer token
    Whoami,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env()?;

    match cli.command {
        Command::Search {
            query,
            location,
            top_k,
            skill_domain,
        } => {
            let mut request = SearchRequest::new(query, location);
            if let Some(top_k) = top_k {
                request = request.with_top_k(top_k);
            }
            if let Some(domain) = skill_domain {
                request = request.with_skill_domain(domain);
            }
            run_search(config, request).await
        }
        Command::Expand { domain } => {
            let client = SearchClient::new(config)?;
            let expanded = client.expand_domain(&domain).await;
            println!(
                "{} -> {} keyword(s){}",
                expanded.domain,
                expanded.keywords.len(),
                if expanded.cached { " (cached)" } else { "" }
            );
            for keyword in &expanded.keywords {
                println!("  {}", keyword);
            }
            Ok(())
        }
        Command::Whoami => {
            let token = config
                .token
                .ok_or_else(|| anyhow::anyhow!("GISUL_TOKEN environment variable not set"))?;
            let claims = decode_claims(&token)?;
            println!("{} ({})", claims.email, claims.role);
            Ok(())
        }
    }
}

async fn run_search(config: ClientConfig, request: SearchRequest) -> Result<()> {
    let client = SearchClient::new(config)?;

    // Ctrl-C abandons the in-flight stream instead of killing the process
    // mid-line.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let outcome = client
        .search_by_text_streaming(
            &request,
            |update| match update {
                ProgressUpdate::Perfect { matches, .. } => {
                    println!("★ {} perfect match(es)", matches.len());
                    for record in &matches {
                        println!("  {}", summarize(record));
                    }
                }
                ProgressUpdate::Progressive { record, total } => {
                    println!("{:>3}. {}", total, summarize(&record));
                }
            },
            &cancel,
        )
        .await;

    match outcome {
        Ok(results) => {
            println!("\n{} match(es) total", results.total_matches);
            if !results.expanded_terms.is_empty() {
                println!("expanded terms: {}", results.expanded_terms.join(", "));
            }
            if let Some(ms) = results.search_time_ms {
                println!("search took {:.0} ms", ms);
            }
            Ok(())
        }
        Err(SearchError::Stream(message)) => {
            eprintln!("{}", classify_error_text(&message).user_message());
            Err(anyhow::anyhow!("search failed: {}", message))
        }
        Err(e) => Err(e.into()),
    }
}

/// One-line rendering of an opaque match record.
fn summarize(record: &Value) -> String {
    let name = record
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or("(unnamed)");
    match record.get("location").and_then(Value::as_str) {
        Some(location) if !location.is_empty() => format!("{} ({})", name, location),
        _ => name.to_string(),
    }
}
