//! Command line interface
//!
//! Each invocation wires a fresh gateway from configuration. Quota counters
//! and cached responses persist across invocations only with the redis
//! store backend.

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use serde_json::{Map, Value, json};
use std::path::PathBuf;
use tollgate_application::GatewayServiceInterface;
use tollgate_domain::error::GatewayError;
use tollgate_domain::value_objects::{HttpMethod, RequestContext, RequestParams};
use tollgate_infrastructure::config::{AppConfig, ConfigLoader};
use tollgate_infrastructure::di::{TollgateContext, init_app};
use tollgate_infrastructure::logging::init_logging;
use tracing::debug;

/// Command line interface for Tollgate
#[derive(Parser, Debug)]
#[command(name = "tollgate")]
#[command(about = "Tollgate - Resilient gateway for metered third-party APIs")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Simulate upstreams; caching and rate limiting are bypassed
    #[arg(long)]
    pub stub: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Gateway operations
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Execute one request through the gateway
    Call {
        /// Provider name
        provider: String,
        /// Endpoint path relative to the provider base URL
        endpoint: String,
        /// HTTP method
        #[arg(short = 'X', long, default_value = "GET")]
        method: HttpMethod,
        /// Request parameter as key=value (value parsed as JSON when possible)
        #[arg(short = 'p', long = "param", value_parser = parse_param)]
        params: Vec<(String, Value)>,
        /// Raw request body
        #[arg(long)]
        body: Option<String>,
    },
    /// Store reachability and per-provider circuit and quota state
    Health,
    /// Daily quota usage for one provider, or all of them
    Usage {
        /// Provider name
        provider: Option<String>,
    },
    /// Clear a provider's quota counters, cached responses and breaker
    Reset {
        /// Provider name
        provider: String,
    },
    /// Prometheus text exposition
    Metrics {
        /// List collectors and their series counts instead
        #[arg(long)]
        summary: bool,
    },
    /// Print the effective configuration as TOML
    Config,
}

/// Parse a `key=value` parameter
pub fn parse_param(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    if key.is_empty() {
        return Err(format!("empty parameter name in '{raw}'"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

fn load_config(cli: &Cli) -> anyhow::Result<AppConfig> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_config_path(path);
    }
    let mut config = loader.load().context("Failed to load configuration")?;
    if cli.stub {
        config.stub_mode = true;
    }
    Ok(config)
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Run one CLI command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    init_logging(&config.logging)?;

    if let Command::Config = cli.command {
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    let context = init_app(config).await?;
    debug!(?context, "Gateway ready");

    match cli.command {
        Command::Call {
            provider,
            endpoint,
            method,
            params,
            body,
        } => call(&context, provider, endpoint, method, params, body).await,
        Command::Health => {
            let report = context.health_report().await;
            print_json(&report)
        }
        Command::Usage { provider } => {
            let gateway = context.gateway();
            let names: Vec<String> = match provider {
                Some(name) => vec![name],
                None => gateway.catalog().names().map(str::to_string).collect(),
            };
            let mut usage = Vec::with_capacity(names.len());
            for name in &names {
                usage.push(gateway.usage(name).await?);
            }
            print_json(&usage)
        }
        Command::Reset { provider } => {
            let summary = context.gateway().reset_provider(&provider).await?;
            print_json(&json!({
                "provider": provider,
                "cache_entries_removed": summary.cache_entries_removed,
            }))
        }
        Command::Metrics { summary } => {
            if summary {
                let collectors: Vec<Value> = context
                    .usage_summary()
                    .into_iter()
                    .map(|c| json!({"name": c.name, "help": c.help, "series": c.series}))
                    .collect();
                return print_json(&collectors);
            }
            match context.metrics_text() {
                Some(text) => {
                    print!("{}", text?);
                    Ok(())
                }
                None => bail!("Metrics are disabled in configuration"),
            }
        }
        Command::Config => Ok(()),
    }
}

async fn call(
    context: &TollgateContext,
    provider: String,
    endpoint: String,
    method: HttpMethod,
    params: Vec<(String, Value)>,
    body: Option<String>,
) -> anyhow::Result<()> {
    let params: RequestParams = params.into_iter().collect::<Map<String, Value>>();
    let request = RequestContext::new(
        provider,
        method,
        endpoint,
        params,
        body.map(String::into_bytes),
    );

    match context.gateway().execute(request).await {
        Ok(response) => print_json(&json!({
            "status": response.status,
            "cached": response.cached,
            "body": response.body,
        })),
        Err(err) => {
            print_json(&error_json(&err))?;
            Err(err.into())
        }
    }
}

fn error_json(err: &GatewayError) -> Value {
    let mut value = json!({
        "error": err.kind(),
        "message": err.to_string(),
        "retryable": err.is_retryable(),
    });
    if let Some(retry_after) = err.retry_after() {
        value["retry_after_secs"] = json!(retry_after.as_secs_f64());
    }
    if let GatewayError::RateLimitExceeded { usage, .. } = err {
        value["usage"] = json!(usage);
    }
    value
}
