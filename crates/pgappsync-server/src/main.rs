mod cli;

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use pgappsync_server::config::AppConfig;
use pgappsync_server::config::loader::load_config;
use pgappsync_server::observability;
use pgappsync_server::resolver::{InvocationEvent, PostgresBackend, RequestAdapter};
use pgappsync_server::server::run_server;
use pgappsync_server::sync::{SyncOptions, run_sync};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    // Load .env file if present (before anything else)
    if let Err(e) = dotenvy::dotenv() {
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound) {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    observability::init_tracing();

    let cli = Cli::parse();

    let cfg = match load_config(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(2);
        }
    };
    observability::apply_logging_level(&cfg.logging.level);
    tracing::info!(
        path = cli.config.as_deref().unwrap_or(pgappsync_server::config::DEFAULT_CONFIG_FILE),
        "Configuration loaded"
    );

    if let Err(e) = run(cli.command, &cfg).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(command: Commands, cfg: &AppConfig) -> anyhow::Result<()> {
    match command {
        Commands::Serve => run_server(cfg).await,
        Commands::Sync(args) => {
            let options = SyncOptions {
                dry_run: args.dry_run,
                print_sdl: args.print_sdl,
            };
            run_sync(cfg, options).await
        }
        Commands::Resolve(args) => resolve(cfg, &args.event).await,
    }
}

async fn resolve(cfg: &AppConfig, path: &Path) -> anyhow::Result<()> {
    let raw = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading event from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
    };
    let event: InvocationEvent = serde_json::from_str(&raw).context("decoding invocation event")?;

    let backend = Arc::new(
        PostgresBackend::from_config(&cfg.postgres, cfg.schema.read_mode())
            .await
            .context("configuring database backend")?,
    );
    let adapter = RequestAdapter::new(backend.clone(), cfg.server.execution_timeout());
    let result = adapter.handle(&event).await;
    backend.close().await;

    let value = result.with_context(|| format!("resolving {}", event.coordinate()))?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
