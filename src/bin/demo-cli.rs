use std::collections::BTreeMap;

use clap::{Parser, Subcommand};
use futures_util::{stream, StreamExt};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "demo-cli")]
#[command(about = "Client for the instrumented multi-tier demo", long_about = None)]
struct Cli {
    /// Base URL of the tier to talk to.
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Full URL of the scrape endpoint.
    #[arg(short, long, default_value = "http://localhost:9464/metrics")]
    metrics_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current metrics
    Scrape {
        /// Only show this metric family (e.g. http_requests_total)
        #[arg(long)]
        metric: Option<String>,
    },
    /// Send a batch of GET requests and tally the status codes
    Hit {
        #[arg(short, long, default_value = "/")]
        path: String,

        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,

        #[arg(short, long, default_value_t = 4)]
        concurrency: usize,
    },
    /// Walk the tier chain and print each tier's report
    Chain,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Scrape { metric } => {
            let res = client.get(&cli.metrics_url).send().await?;
            let status = res.status();
            let text = res.text().await?;
            if !status.is_success() {
                eprintln!("Error: scrape endpoint returned status {}", status);
                eprintln!("Response: {}", text);
                return Ok(());
            }

            match metric {
                Some(name) => {
                    for line in family_lines(&text, &name) {
                        println!("{}", line);
                    }
                }
                None => print!("{}", text),
            }
        }
        Commands::Hit { path, count, concurrency } => {
            let url = format!("{}{}", cli.url.trim_end_matches('/'), path);
            let outcomes: Vec<String> = stream::iter(0..count)
                .map(|_| {
                    let client = client.clone();
                    let url = url.clone();
                    async move {
                        match client.get(&url).send().await {
                            Ok(res) => res.status().as_u16().to_string(),
                            Err(e) if e.is_timeout() => "timeout".to_string(),
                            Err(_) => "error".to_string(),
                        }
                    }
                })
                .buffer_unordered(concurrency.max(1))
                .collect()
                .await;

            let mut tally: BTreeMap<String, usize> = BTreeMap::new();
            for outcome in outcomes {
                *tally.entry(outcome).or_default() += 1;
            }

            println!("GET {} x{} (concurrency {})", url, count, concurrency.max(1));
            for (outcome, n) in tally {
                println!("  {:>7}  {}", outcome, n);
            }
        }
        Commands::Chain => {
            let res = client.get(format!("{}/chain", cli.url.trim_end_matches('/'))).send().await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

/// Lines of the exposition text that belong to the metric family `name`.
fn family_lines<'a>(text: &'a str, name: &'a str) -> impl Iterator<Item = &'a str> {
    text.lines().filter(move |line| {
        let sample = line
            .strip_prefix("# HELP ")
            .or_else(|| line.strip_prefix("# TYPE "))
            .unwrap_or(line);
        sample
            .strip_prefix(name)
            .is_some_and(|rest| rest.starts_with(['{', ' ']))
    })
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: tier returned status {}", status);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
