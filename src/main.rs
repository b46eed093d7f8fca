use anyhow::{Context, Result};
use clap::Parser;
use refetch::client::RetryingClient;
use refetch::retry::RetryPolicy;
use refetch::transport::{Method, RequestOptions};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::io::Write;
use std::time::Duration;

/// refetch - fetch a URL with automatic retries
///
/// Performs one HTTP request, retrying transport failures (connect errors,
/// timeouts, resets) with exponential backoff and jitter before giving up.
/// The response body is written to stdout.
///
/// Examples:
///   refetch GET https://example.com/
///   refetch POST https://example.com/api -H 'content-type: application/json' -d '{}'
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// HTTP method (GET, POST, PUT, DELETE, OPTIONS, HEAD, TRACE, PATCH, QUERY)
    #[arg(value_name = "METHOD")]
    method: Method,

    /// URL to request
    #[arg(value_name = "URL")]
    url: String,

    /// Extra request header in 'name: value' form (repeatable)
    #[arg(long = "header", short = 'H', value_name = "NAME: VALUE")]
    headers: Vec<String>,

    /// Request body sent verbatim
    #[arg(long = "data", short = 'd', value_name = "DATA")]
    body: Option<String>,

    /// Timeout for a single attempt, in seconds
    #[arg(long, value_name = "SECONDS")]
    timeout: Option<f64>,

    /// Total attempts allowed before giving up (also via REFETCH_MAX_RETRIES)
    #[arg(
        long,
        env = "REFETCH_MAX_RETRIES",
        default_value_t = 3,
        value_name = "N"
    )]
    max_retries: u32,

    /// Delay before the first retry, in seconds
    #[arg(long, default_value_t = 1.0, value_name = "SECONDS")]
    initial_delay: f64,

    /// Multiplier applied to the delay after each failed attempt
    #[arg(long, default_value_t = 2.0, value_name = "FACTOR")]
    backoff_factor: f64,
}

fn parse_header(raw: &str) -> Result<(HeaderName, HeaderValue)> {
    let (name, value) = raw
        .split_once(':')
        .with_context(|| format!("Invalid header {:?}. Expected 'name: value'.", raw))?;
    let name = HeaderName::from_bytes(name.trim().as_bytes())
        .with_context(|| format!("Invalid header name in {:?}", raw))?;
    let value = HeaderValue::from_str(value.trim())
        .with_context(|| format!("Invalid header value in {:?}", raw))?;
    Ok((name, value))
}

fn build_options(cli: &Cli) -> Result<RequestOptions> {
    let mut headers = HeaderMap::new();
    for raw in &cli.headers {
        let (name, value) = parse_header(raw)?;
        headers.insert(name, value);
    }

    anyhow::ensure!(
        cli.timeout.map_or(true, |t| t >= 0.0),
        "timeout must not be negative"
    );

    Ok(RequestOptions {
        headers,
        query: Vec::new(),
        body: cli.body.as_ref().map(|b| b.clone().into_bytes()),
        timeout: cli.timeout.map(Duration::from_secs_f64),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    anyhow::ensure!(
        cli.initial_delay >= 0.0,
        "initial delay must not be negative"
    );
    let policy = RetryPolicy::new(
        cli.max_retries,
        Duration::from_secs_f64(cli.initial_delay),
        cli.backoff_factor,
    )?;
    let options = build_options(&cli)?;

    let client = RetryingClient::new(reqwest::Client::new(), policy);
    let response = client.execute(cli.method, &cli.url, &options).await?;

    log::info!("{} {} -> {}", cli.method, cli.url, response.status());
    std::io::stdout()
        .write_all(response.body())
        .context("Failed to write response body")?;

    Ok(())
}
