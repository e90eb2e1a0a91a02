use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use line_gemini_gateway::api::ApiServerBuilder;
use line_gemini_gateway::media::{DEFAULT_DELETE_DELAY, MediaStore, STALE_UPLOAD_AGE, TempFileReaper};
use line_gemini_gateway::{Config, Dispatcher, GeminiClient, LineChannel};

/// LINE messaging gateway answering text and files with Gemini
#[derive(Parser)]
#[command(name = "line-gemini", version, about)]
struct Cli {
    /// Port to listen on (overrides PORT)
    #[arg(long)]
    port: Option<u16>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Delete old files from the upload directory and exit
    Cleanup {
        /// Upload directory
        #[arg(long, env = "UPLOAD_DIR", default_value = "./uploads")]
        dir: PathBuf,

        /// Remove files older than this many hours
        #[arg(long, default_value = "24")]
        max_age_hours: u64,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity; RUST_LOG wins when set
    let filter = match cli.verbose {
        0 => "info,line_gemini_gateway=info",
        1 => "info,line_gemini_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if let Some(cmd) = cli.command {
        return match cmd {
            Command::Cleanup { dir, max_age_hours } => cmd_cleanup(dir, max_age_hours).await,
        };
    }

    let mut config = Config::load()?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    tracing::info!(
        port = config.server.port,
        base_path = %config.server.base_path,
        environment = %config.server.environment,
        model = %config.gemini.model,
        upload_dir = %config.upload.dir.display(),
        "starting LINE gateway"
    );

    let line = LineChannel::new(&config.line)?;
    let gemini = GeminiClient::new(&config.gemini)?;

    let media = MediaStore::new(config.upload.dir.clone());
    media.ensure_dir().await?;
    match media.cleanup_older_than(STALE_UPLOAD_AGE).await {
        Ok(swept) => tracing::debug!(swept, "startup upload sweep complete"),
        Err(e) => tracing::warn!(error = %e, "startup upload sweep failed"),
    }

    let reaper = TempFileReaper::new(media.clone(), DEFAULT_DELETE_DELAY);
    let dispatcher = Arc::new(Dispatcher::new(
        Arc::new(line),
        Arc::new(gemini),
        media.clone(),
        reaper.clone(),
        config.upload.policy(),
    ));

    let server = ApiServerBuilder::new(dispatcher, media, config.server.port)
        .channel_secret(config.line.channel_secret.clone())
        .admin_secret(config.line.webhook_secret.clone())
        .base_path(config.server.base_path.clone())
        .environment(config.server.environment.clone())
        .build();

    server.run(shutdown_signal()).await?;

    tracing::info!(pending = reaper.pending(), "shutting down");
    reaper.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}

async fn cmd_cleanup(dir: PathBuf, max_age_hours: u64) -> anyhow::Result<()> {
    let store = MediaStore::new(dir);
    let deleted = store
        .cleanup_older_than(Duration::from_secs(max_age_hours.saturating_mul(3600)))
        .await?;
    println!("Deleted {deleted} file(s) from {}", store.dir().display());
    Ok(())
}
