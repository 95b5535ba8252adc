use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use crawler::services::ClassSchedule;
use crawler::{print_banner, AppState, AssetClass, Catalog, Config, ProbeResult};
use notify::{Channel, Delivery, Dispatcher};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const STARTUP_DELAY: Duration = Duration::from_secs(3);
const TEST_MESSAGE: &str = "🔍 Image Crawler Test: Discord integration is working!";

#[derive(Parser)]
#[command(name = "skinwatch", version, about = "Watches content servers for new game assets")]
struct Cli {
    /// Disable log output
    #[arg(long, global = true)]
    no_log: bool,

    /// Data root (overrides DATA_PATH)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Catalog file (overrides SKINWATCH_CATALOG)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Crawl skin art forever
    Art,
    /// Crawl skin labels forever
    Label,
    /// Run one joystick pass
    #[command(alias = "joytick")]
    Joystick,
    /// Run one avatar frame pass
    Frame,
    /// Run every crawler concurrently
    All {
        /// Serve the operator API on this address (overrides SKINWATCH_LISTEN)
        #[arg(long)]
        listen: Option<SocketAddr>,
    },
    /// Fetch one asset through the server fallback without recording it
    Fetch {
        class: AssetClass,
        id: String,
        /// Output file (default `<id>.<ext>`)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Send a test message to every configured webhook
    CheckWebhooks,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    if !cli.no_log {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    print_banner(env!("CARGO_PKG_VERSION"));

    let mut config = Config::from_env()?;
    if let Some(data_dir) = cli.data_dir {
        config = config.with_data_path(data_dir);
    }
    if let Some(catalog) = cli.catalog {
        config = config.with_catalog_path(catalog);
    }

    tokio::select! {
        result = run(cli.command, config) => result,
        _ = shutdown_signal() => {
            tracing::info!("Shutting down gracefully...");
            Ok(())
        }
    }
}

async fn run(command: Command, mut config: Config) -> anyhow::Result<()> {
    if let Command::CheckWebhooks = command {
        return check_webhooks(&config).await;
    }
    if let Command::All {
        listen: Some(listen),
    } = command
    {
        config = config.with_listen(listen);
    }

    let catalog = Catalog::load(&config.catalog_path).await?;
    let state = AppState::new(config, catalog)?;

    match command {
        Command::Art => crawl_forever(state, AssetClass::Art).await,
        Command::Label => crawl_forever(state, AssetClass::Label).await,
        Command::Joystick => crawl_once(state, AssetClass::Joystick).await,
        Command::Frame => crawl_once(state, AssetClass::Frame).await,
        Command::All { .. } => crawl_all(state).await,
        Command::Fetch { class, id, out } => fetch(state, class, &id, out).await,
        Command::CheckWebhooks => Ok(()),
    }
}

async fn crawl_forever(state: AppState, class: AssetClass) -> anyhow::Result<()> {
    state.store.ensure_class_dirs().await?;
    tracing::info!(
        "Starting {} crawler in 3 seconds... PRESS CTRL + C TO STOP...",
        class
    );
    tokio::time::sleep(STARTUP_DELAY).await;

    state
        .orchestrator
        .run_forever(ClassSchedule::for_class(class))
        .await;
    Ok(())
}

async fn crawl_once(state: AppState, class: AssetClass) -> anyhow::Result<()> {
    state.store.ensure_class_dirs().await?;

    let report = state.orchestrator.run_pass(class).await?;
    tracing::info!(
        "{} scan completed with {} new assets.",
        class,
        report.discoveries.len()
    );

    // Let queued announcements go out before exiting.
    state.notifications.queue().on_idle().await;
    Ok(())
}

async fn crawl_all(state: AppState) -> anyhow::Result<()> {
    state.store.ensure_class_dirs().await?;
    tracing::info!("Starting ALL crawlers in 3 seconds... PRESS CTRL + C TO STOP...");
    tokio::time::sleep(STARTUP_DELAY).await;

    let handles = state.orchestrator.spawn_loops(&AssetClass::ALL);
    let loops = async {
        for handle in handles {
            handle.await?;
        }
        Ok::<_, anyhow::Error>(())
    };

    match state.config.listen {
        Some(addr) => {
            tokio::select! {
                result = loops => result,
                result = crawler::run_api(addr, state.clone()) => {
                    result.context("operator API stopped")
                }
            }
        }
        None => loops.await,
    }
}

async fn fetch(
    state: AppState,
    class: AssetClass,
    id: &str,
    out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let asset = match state.lookup.fetch_asset(class, id).await {
        ProbeResult::Found(asset) => asset,
        ProbeResult::NotFound => bail!("{} {} not found in any server", class, id),
    };

    let out = out.unwrap_or_else(|| PathBuf::from(format!("{}.{}", id, class.extension())));
    tokio::fs::write(&out, &asset.bytes)
        .await
        .with_context(|| format!("failed to write {}", out.display()))?;

    match state.lookup.display_name(class, id) {
        Some(name) => tracing::info!(
            "Fetched {} {} - {} from {} into {}",
            class,
            id,
            name,
            asset.server,
            out.display()
        ),
        None => tracing::info!(
            "Fetched {} {} from {} into {}",
            class,
            id,
            asset.server,
            out.display()
        ),
    }
    Ok(())
}

async fn check_webhooks(config: &Config) -> anyhow::Result<()> {
    let dispatcher = Dispatcher::new(&config.notification, reqwest::Client::new());

    let mut failed = Vec::new();
    for channel in Channel::ALL {
        match dispatcher.send(channel, TEST_MESSAGE).await {
            Delivery::Sent | Delivery::FellBack => {
                tracing::info!("✅ {} webhook notification sent successfully!", channel)
            }
            Delivery::Skipped => {}
            Delivery::Failed => failed.push(channel),
        }
    }

    if !failed.is_empty() {
        bail!(
            "failed to reach webhooks for {:?}; check the DISCORD_*_URL settings",
            failed
        );
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
