//! crmdesk - command-line client for the internal IT CRM.
//!
//! Signs in against the CRM backend, keeps the session token between runs,
//! and issues authenticated requests on behalf of the signed-in employee.

mod commands;

use std::io;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crmdesk_core::auth::MemoryTokenStore;
use crmdesk_core::config::Config;
use crmdesk_core::models::{Role, DEPARTMENTS};
use crmdesk_core::{HttpClient, SessionStore, TokenStore};

#[derive(Debug, Parser)]
#[command(name = "crmdesk", version, about = "Command-line client for the crmdesk IT CRM")]
struct Cli {
    /// Backend URL, overriding CRMDESK_API_URL and the config file
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Keep the session in memory only (nothing is read from or written to disk)
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sign in with email and password
    Login {
        #[arg(long, env = "CRMDESK_EMAIL")]
        email: Option<String>,
        #[arg(long, env = "CRMDESK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create an account and sign in with it
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, value_parser = DEPARTMENTS)]
        department: String,
        #[arg(long, default_value = "employee")]
        role: Role,
        #[arg(long, env = "CRMDESK_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Show what a route would display for the current session
    Open {
        /// Route path, e.g. /customers
        path: String,
    },
    /// GET an API resource with the session credentials and print the JSON
    Get {
        /// API path, e.g. /api/customers
        path: String,
    },
}

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    let cli = Cli::parse();

    let mut config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        }
    };

    let http = match cli.api_url {
        Some(ref url) => HttpClient::with_timeout(url.as_str(), config.request_timeout())?,
        None => config.http_client()?,
    };
    info!(base_url = http.base_url(), "crmdesk starting");

    let tokens: Arc<dyn TokenStore> = if cli.ephemeral {
        Arc::new(MemoryTokenStore::new())
    } else {
        config.token_store()?
    };
    let session = Arc::new(SessionStore::new(Arc::new(http), tokens));
    session.initialize().await;

    match cli.command {
        Command::Login { email, password } => {
            commands::login(&session, &mut config, email, password).await
        }
        Command::Register {
            name,
            email,
            department,
            role,
            password,
        } => {
            commands::register(&session, &mut config, name, email, department, role, password)
                .await
        }
        Command::Logout => {
            commands::logout(&session);
            Ok(())
        }
        Command::Whoami => {
            commands::whoami(&session);
            Ok(())
        }
        Command::Open { path } => {
            commands::open(&session, &path);
            Ok(())
        }
        Command::Get { path } => commands::get(&session, &path).await,
    }
}

// ============================================================================
// Tests
// ============================================================================
