//! Heartbeat scheduling loop driving all subscription polls.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use super::pipeline::poll_subscription;
use crate::config::{HeartbeatConfig, SharedHeartbeat, DEFAULT_INTERVAL_MINUTES};
use crate::db::SubscriptionStore;
use crate::feed::FeedSource;
use crate::notify::Notifier;

/// The background sync engine.
///
/// One task polls every subscription sequentially, sleeps for the
/// configured heartbeat interval measured from the end of one cycle to the
/// start of the next, and repeats until stopped.
pub struct SyncEngine {
    store: Arc<dyn SubscriptionStore>,
    source: Arc<dyn FeedSource>,
    notifier: Arc<dyn Notifier>,
    heartbeat: SharedHeartbeat,
}

/// Handle to a running engine.
pub struct EngineHandle {
    shutdown: watch::Sender<()>,
    task: JoinHandle<()>,
}

impl EngineHandle {
    /// Signal the engine to stop and wait for it to finish.
    ///
    /// The inter-cycle sleep is cancelled immediately; a cycle that is
    /// already running completes first.
    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.task.await {
            error!("sync engine task failed: {}", e);
        }
    }
}

impl SyncEngine {
    /// Create a new engine over the given collaborators.
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        source: Arc<dyn FeedSource>,
        notifier: Arc<dyn Notifier>,
        heartbeat: SharedHeartbeat,
    ) -> Self {
        Self {
            store,
            source,
            notifier,
            heartbeat,
        }
    }

    /// Start the loop on the runtime and return a handle for stopping it.
    pub fn start(self) -> EngineHandle {
        let (shutdown, receiver) = watch::channel(());
        let task = tokio::spawn(async move {
            self.run(receiver).await;
        });
        EngineHandle { shutdown, task }
    }

    async fn run(self, mut shutdown: watch::Receiver<()>) {
        info!("sync engine started");

        loop {
            let settings = self.heartbeat.snapshot();
            let minutes = match settings.interval_minutes() {
                Ok(minutes) => minutes,
                Err(e) => {
                    error!("{}; using {} minutes", e, DEFAULT_INTERVAL_MINUTES);
                    DEFAULT_INTERVAL_MINUTES
                }
            };

            self.run_cycle(&settings).await;

            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(minutes * 60)) => {}
                _ = shutdown.changed() => {
                    info!("sync engine stopping");
                    break;
                }
            }
        }
    }

    /// Run one poll cycle over every subscription.
    ///
    /// A failure to enumerate subscriptions skips the cycle; a failure in
    /// one subscription's pipeline never affects the others.
    async fn run_cycle(&self, settings: &HeartbeatConfig) {
        let subscriptions = match self.store.list().await {
            Ok(subscriptions) => subscriptions,
            Err(e) => {
                error!("failed to load subscriptions: {}", e);
                return;
            }
        };

        debug!("processing {} subscription(s)", subscriptions.len());

        for mut subscription in subscriptions {
            match poll_subscription(
                self.source.as_ref(),
                self.notifier.as_ref(),
                self.store.as_ref(),
                settings,
                &mut subscription,
            )
            .await
            {
                Ok(outcome) if outcome.new_items > 0 => {
                    info!(
                        "subscription {}: {} new item(s), {} notified, committed: {}",
                        subscription.id, outcome.new_items, outcome.notified, outcome.committed
                    );
                }
                Ok(_) => {}
                Err(e) => {
                    error!("subscription {}: poll failed: {}", subscription.id, e);
                }
            }
        }
    }
}
