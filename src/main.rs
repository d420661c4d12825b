//! Companion gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────┐
//!                      │                 GATEWAY                      │
//!     Browser          │  ┌──────────┐   ┌──────────┐   ┌──────────┐  │
//!     ─────────────────┼─▶│  http    │──▶│ session  │──▶│  proxy   │──┼──▶ Backend
//!     (cookie)         │  │ server   │   │  gate    │   │ forward  │  │    (bearer)
//!                      │  └──────────┘   └──────────┘   └────┬─────┘  │
//!                      │                                     ▼        │
//!     ◀────────────────┼─── response + Set-Cookie ◀── translator      │
//!                      │                                              │
//!                      │  config (hot reload) · observability ·       │
//!                      │  lifecycle (signals, shutdown)               │
//!                      └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use companion_gateway::lifecycle::startup;

#[derive(Parser)]
#[command(name = "companion-gateway", version)]
#[command(about = "Session-aware gateway for the companion dashboard", long_about = None)]
struct Args {
    /// TOML configuration file; watched for changes.
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    startup::run(args.config.as_deref()).await?;
    Ok(())
}
