use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{
    ConfigCommand, PullCommand, PushAllCommand, PushCommand, StatusCommand, WatchCommand,
};
use possync::config::Config;
use possync::db::init_db;

#[derive(Parser)]
#[command(name = "possync")]
#[command(version)]
#[command(about = "Sync point-of-sale bills, menu and settings with a remote sheet", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Push unsynced bills, or single records
    Push(PushCommand),

    /// Upload every local record in one snapshot
    PushAll(PushAllCommand),

    /// Replace local data with the remote copy
    Pull(PullCommand),

    /// Show local counts and sync status
    Status(StatusCommand),

    /// Run auto-sync until Ctrl-C
    Watch(WatchCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "possync=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config)?;

    let Some(command) = cli.command else {
        println!("Use --help to see available commands");
        return Ok(());
    };

    if let Commands::Config(cmd) = &command {
        return cmd.run(&config);
    }

    let pool = init_db(&config.database_path.value).await?;
    match command {
        Commands::Push(cmd) => cmd.run(&pool, &config).await?,
        Commands::PushAll(cmd) => cmd.run(&pool, &config).await?,
        Commands::Pull(cmd) => cmd.run(&pool, &config).await?,
        Commands::Status(cmd) => cmd.run(&pool, &config).await?,
        Commands::Watch(cmd) => cmd.run(&pool, &config).await?,
        Commands::Config(_) => {}
    }

    Ok(())
}
