use clap::{Parser, Subcommand};
use serde_json::Value;
use url::Url;

use companion_gateway::dashboard::{DashboardClient, ViewState};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Inspect a running companion gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: Url,

    /// Session token sent as the session cookie.
    #[arg(short, long, env = "GATEWAY_SESSION")]
    session: Option<String>,

    #[arg(long, default_value = "app_jwt")]
    cookie_name: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway health
    Status,
    /// Show the development diagnostics
    Env,
    /// Fetch a gateway API path (e.g. /api/mail/labels)
    Get { path: String },
    /// Fetch mail labels and threads together
    Overview,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut client = DashboardClient::new(cli.url)?;
    if let Some(token) = &cli.session {
        client = client.with_session(&cli.cookie_name, token);
    }

    match cli.command {
        Commands::Status => print_state(&client.fetch("/healthz").await)?,
        Commands::Env => print_state(&client.fetch("/api/_dev").await)?,
        Commands::Get { path } => print_state(&client.fetch(&path).await)?,
        Commands::Overview => {
            let overview = client.overview().await;
            println!("{}", serde_json::to_string_pretty(&overview)?);
        }
    }

    Ok(())
}

fn print_state(state: &ViewState) -> Result<(), Box<dyn std::error::Error>> {
    match state {
        ViewState::Authenticated(data) => print_json(data)?,
        ViewState::Unauthenticated { message } => {
            eprintln!("Not logged in: {}", message);
            eprintln!("Pass --session <token> or set GATEWAY_SESSION.");
        }
        ViewState::Error(message) => eprintln!("Error: {}", message),
        ViewState::Loading => {}
    }
    Ok(())
}

fn print_json(value: &Value) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
