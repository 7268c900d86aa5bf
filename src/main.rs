use anyhow::{Context, Result};
use clap::Parser;
use miners_runtime::config::{Args, RuntimeConfig};
use miners_runtime::console::{self, Command};
use miners_runtime::persist::{GameStore, MemoryStore, RonStore};
use miners_runtime::runtime::game_loop::GameLoop;
use miners_runtime::runtime::manager::GameManager;
use miners_runtime::runtime::metrics::PurchaseMetrics;
use miners_runtime::runtime::sessions::SessionTracker;
use miners_runtime::runtime::tasks::{BackgroundTasks, unix_now};
use prometheus_client::encoding::text::encode;
use prometheus_client::registry::Registry;
use std::io::{self, BufRead};
use std::sync::Arc;
use std::thread;
use tokio::sync::mpsc;
use tokio::task;
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt().with_max_level(args.log_level).init();
    let config = RuntimeConfig::try_from(&args).context("invalid configuration")?;

    let store: Arc<dyn GameStore> = if args.in_memory {
        info!("saves kept in memory only");
        Arc::new(MemoryStore::new())
    } else {
        info!(dir = %args.data_dir.display(), "saves stored as RON");
        Arc::new(RonStore::new(&args.data_dir))
    };

    let mut registry = Registry::default();
    let metrics = PurchaseMetrics::new();
    metrics.register(&mut registry);

    let game_loop = Arc::new(GameLoop::new());
    let sessions = Arc::new(SessionTracker::new(config.session_timeout_secs));
    let manager = Arc::new(GameManager::new(
        store,
        game_loop.clone(),
        sessions,
        metrics,
        config.grace_secs,
    ));

    let tasks = BackgroundTasks::spawn(manager.clone(), game_loop, &config);
    info!(
        tick_ms = config.tick_interval.as_millis() as u64,
        session_timeout_secs = config.session_timeout_secs,
        "runtime started"
    );

    let result = run(manager.clone(), !args.no_console).await;

    tasks.stop().await;
    let drain = manager.clone();
    let report = task::spawn_blocking(move || drain.flush_all())
        .await
        .context("final flush panicked")?;
    if report.failed > 0 {
        warn!(failed = report.failed, "some games could not be saved on shutdown");
    }
    info!(saved = report.saved, "games saves complete");

    let mut exported = String::new();
    if encode(&mut exported, &registry).is_ok() {
        debug!(metrics = %exported, "purchase metrics");
    }

    result
}

async fn run(manager: Arc<GameManager>, console_enabled: bool) -> Result<()> {
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();
    if console_enabled {
        // A plain thread: a blocked stdin read must not hold up runtime shutdown.
        thread::spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if input_tx.send(line).is_err() {
                    break;
                }
            }
        });
    } else {
        drop(input_tx);
    }

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("shutdown signal received");
                break;
            }
            Some(line) = input_rx.recv() => {
                if handle_line(&manager, &line).await? {
                    break;
                }
            }
        }
    }

    Ok(())
}

async fn handle_line(manager: &Arc<GameManager>, line: &str) -> Result<bool> {
    let command = match console::parse_command(line) {
        Ok(command) => command,
        Err(console::CommandError::Empty) => return Ok(false),
        Err(err) => {
            println!("{err}");
            return Ok(false);
        }
    };
    if command == Command::Quit {
        return Ok(true);
    }

    let manager = manager.clone();
    let reply = task::spawn_blocking(move || console::execute(&manager, &command, unix_now()))
        .await
        .context("console command panicked")?;
    println!("{reply}");
    Ok(false)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(%err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                warn!(%err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
