use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pgappsync")]
#[command(about = "Serve and publish a PostgreSQL GraphQL schema through AWS AppSync")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to ./pgappsync.toml when present)
    #[arg(short, long, global = true, env = "PGAPPSYNC_CONFIG")]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the invocation endpoint
    Serve,
    /// Publish the schema and reconcile resolvers
    Sync(SyncArgs),
    /// Resolve a single invocation event and print the result
    Resolve(ResolveArgs),
}

#[derive(clap::Args)]
pub struct SyncArgs {
    /// Print the SDL and resolver plan without calling AppSync
    #[arg(long)]
    pub dry_run: bool,
    /// Print the published SDL
    #[arg(long)]
    pub print_sdl: bool,
}

#[derive(clap::Args)]
pub struct ResolveArgs {
    /// Event JSON file, or `-` for stdin
    pub event: PathBuf,
}
