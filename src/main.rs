//! resilient-http command line client.
//!
//! Sends one request through a named client from the configuration and
//! prints the response body.
//!
//! ```text
//! resilient-http https://api.github.com/users/octocat --format json
//! resilient-http -X POST https://httpbin.org/post --body '{"a":"1"}' --content-type form
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use reqwest::Method;
use serde_json::Value;

use resilient_http::config::{load_config, HttpConfig, DEFAULT_CLIENT};
use resilient_http::observability::{logging, metrics};
use resilient_http::{HttpService, SendOptions};

#[derive(Parser)]
#[command(name = "resilient-http")]
#[command(about = "Send an HTTP request through a resilient client", long_about = None)]
struct Cli {
    /// Target URL
    url: String,

    #[arg(short = 'X', long, default_value = "GET")]
    method: String,

    /// TOML configuration file (built-in defaults when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_CLIENT)]
    client: String,

    #[arg(long)]
    bearer: Option<String>,

    #[arg(long, value_name = "USER:PASS")]
    basic: Option<String>,

    /// Request body as JSON; encoded with --content-type
    #[arg(short, long)]
    body: Option<String>,

    #[arg(long, default_value = "json")]
    content_type: String,

    #[arg(short, long, value_enum, default_value_t = Output::Text)]
    format: Output,
}

#[derive(Clone, Copy, ValueEnum)]
enum Output {
    /// Decode as JSON and pretty-print
    Json,
    /// Print the raw body
    Text,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => HttpConfig::default(),
    };

    logging::init_logging(&config.observability);

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let service = HttpService::from_config(&config)?;
    tracing::debug!(clients = ?service.registry().names(), "Clients ready");

    let method = Method::from_bytes(cli.method.to_uppercase().as_bytes())?;
    let body: Option<Value> = cli.body.as_deref().map(serde_json::from_str::<Value>).transpose()?;

    let mut options = SendOptions::new().content_type(cli.content_type.as_str());
    options.bearer_token = cli.bearer.clone();
    if let Some(basic) = &cli.basic {
        let (user, pass) = basic.split_once(':').ok_or("--basic expects USER:PASS")?;
        options = options.basic(user, pass);
    }

    match cli.format {
        Output::Json => {
            let value: Value = service
                .send(&cli.client, method, &cli.url, body.as_ref(), &options)
                .await?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Output::Text => {
            let text = service
                .send_text(&cli.client, method, &cli.url, body.as_ref(), &options)
                .await?;
            println!("{}", text);
        }
    }

    Ok(())
}
