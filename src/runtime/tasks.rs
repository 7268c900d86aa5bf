use super::game_loop::GameLoop;
use super::manager::GameManager;
use crate::config::RuntimeConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::{self, JoinHandle};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, warn};

pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

pub struct BackgroundTasks {
    stop_tx: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl BackgroundTasks {
    pub fn spawn(
        manager: Arc<GameManager>,
        game_loop: Arc<GameLoop>,
        config: &RuntimeConfig,
    ) -> Self {
        let (stop_tx, stop_rx) = watch::channel(false);

        let tick = spawn_periodic("tick", config.tick_interval, stop_rx.clone(), move || {
            game_loop.tick(unix_now());
        });
        let sweep_manager = manager.clone();
        let sweep = spawn_periodic("sweep", config.sweep_interval, stop_rx.clone(), move || {
            sweep_manager.sweep_expired_sessions(unix_now());
        });
        let flush = spawn_periodic("flush", config.flush_interval, stop_rx, move || {
            manager.flush_all();
        });

        Self {
            stop_tx,
            handles: vec![tick, sweep, flush],
        }
    }

    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        for handle in self.handles {
            if let Err(err) = handle.await {
                warn!(%err, "background task ended abnormally");
            }
        }
    }
}

fn spawn_periodic<F>(
    name: &'static str,
    period: Duration,
    mut stop_rx: watch::Receiver<bool>,
    job: F,
) -> JoinHandle<()>
where
    F: Fn() + Send + Sync + 'static,
{
    let job = Arc::new(job);
    tokio::spawn(async move {
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; start one period in.
        interval.tick().await;
        loop {
            tokio::select! {
                _ = stop_rx.changed() => break,
                _ = interval.tick() => {
                    let job = job.clone();
                    if let Err(err) = task::spawn_blocking(move || (*job)()).await {
                        warn!(task = name, %err, "periodic job panicked");
                    }
                }
            }
        }
        debug!(task = name, "periodic task stopped");
    })
}
