use std::sync::Arc;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use emailer_legend::{
    cli::{self, Cli, Commands},
    config::{Config, LogFormat},
    gemini::GeminiClient,
    output::SystemClipboard,
    session::Session,
    storage::SqliteStorage,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    // Load configuration
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(&config);

    info!(version = env!("CARGO_PKG_VERSION"), "Emailer Legend starting");

    // Initialize storage
    let storage = match SqliteStorage::new(&config.database).await {
        Ok(s) => {
            info!(path = %config.database.path.display(), "Database initialized");
            s
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize database");
            return Err(e.into());
        }
    };

    // Initialize Gemini client
    let gemini = match GeminiClient::new(&config.gemini, config.request.clone()) {
        Ok(c) => {
            info!(
                base_url = %c.base_url(),
                model = %c.model(),
                api_key_set = config.gemini.api_key.is_some(),
                "Gemini client initialized"
            );
            c
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize Gemini client");
            return Err(e.into());
        }
    };

    let mut session = match Session::hydrate(Arc::new(storage), Arc::new(gemini)).await {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "Failed to load session state");
            return Err(e.into());
        }
    };
    let mut clipboard = SystemClipboard;

    if let Commands::Interactive = args.command {
        cli::interactive::run(&mut session, &mut clipboard).await?;
        info!("Interactive session ended");
        return Ok(());
    }

    let result = cli::execute_command(args.command, &mut session, &mut clipboard).await;
    if result.exit_code == 0 {
        println!("{}", result.message.trim_end());
    } else {
        eprintln!("{}", result.message);
    }
    std::process::exit(result.exit_code);
}

/// Initialize tracing/logging
fn init_logging(config: &Config) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}
