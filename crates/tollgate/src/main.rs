//! Tollgate - Entry Point
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `tollgate call <provider> <endpoint>` | Execute one request through the gateway |
//! | `tollgate health` | Store reachability and per-provider circuit/quota state |
//! | `tollgate usage [provider]` | Daily quota usage |
//! | `tollgate reset <provider>` | Clear quota counters, cached responses and the breaker |
//! | `tollgate metrics` | Prometheus exposition or collector summary |
//! | `tollgate config` | Print the effective configuration |

use clap::Parser;
use tollgate::cli::{Cli, run};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run(cli).await
}
