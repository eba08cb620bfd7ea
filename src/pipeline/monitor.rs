//! # Blocker Monitor
//!
//! Background re-evaluation of one factory's blockers. Each tick reloads the
//! factory through [`FactoryService::reevaluate`], which persists a move into
//! or out of BLOCKED and leaves finished factories alone. The loop ends when
//! [`BlockerMonitor::stop`] is called or the monitor is dropped.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::constants::system::DEFAULT_BLOCKER_POLL_INTERVAL;
use crate::services::FactoryService;

#[derive(Debug, Clone)]
pub struct BlockerMonitorConfig {
    pub enabled: bool,
    pub poll_interval: Duration,
}

impl Default for BlockerMonitorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            poll_interval: DEFAULT_BLOCKER_POLL_INTERVAL,
        }
    }
}

impl From<&PipelineConfig> for BlockerMonitorConfig {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            enabled: config.monitor_enabled,
            poll_interval: config.blocker_poll_interval(),
        }
    }
}

/// Counters readable while the monitor runs
#[derive(Debug, Default)]
pub struct MonitorStats {
    pub ticks: AtomicU64,
    pub errors: AtomicU64,
}

#[derive(Debug)]
pub struct BlockerMonitor {
    id: Uuid,
    config: BlockerMonitorConfig,
    is_running: Arc<AtomicBool>,
    stats: Arc<MonitorStats>,
    shutdown: Arc<Notify>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl BlockerMonitor {
    pub fn new(config: BlockerMonitorConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            is_running: Arc::new(AtomicBool::new(false)),
            stats: Arc::new(MonitorStats::default()),
            shutdown: Arc::new(Notify::new()),
            handle: Mutex::new(None),
        }
    }

    /// Begin polling `factory_id`.
    ///
    /// Returns `false` without spawning when the monitor is disabled or
    /// already running.
    pub fn start(&self, service: Arc<FactoryService>, factory_id: Uuid) -> bool {
        if !self.config.enabled {
            info!(monitor_id = %self.id, "⏸️ MONITOR: Blocker monitor disabled by configuration");
            return false;
        }
        if self.is_running.swap(true, Ordering::SeqCst) {
            debug!(monitor_id = %self.id, "Blocker monitor already running");
            return false;
        }

        info!(
            monitor_id = %self.id,
            factory_id = %factory_id,
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            "🔄 MONITOR: Starting blocker monitor"
        );

        let is_running = self.is_running.clone();
        let stats = self.stats.clone();
        let shutdown = self.shutdown.clone();
        let poll_interval = self.config.poll_interval;

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(poll_interval);
            // First tick completes immediately
            interval.tick().await;

            while is_running.load(Ordering::SeqCst) {
                tokio::select! {
                    _ = interval.tick() => {
                        stats.ticks.fetch_add(1, Ordering::Relaxed);
                        if let Err(e) = service.reevaluate(factory_id).await {
                            stats.errors.fetch_add(1, Ordering::Relaxed);
                            warn!(
                                factory_id = %factory_id,
                                error = %e,
                                "Blocker re-evaluation failed"
                            );
                        }
                    }
                    _ = shutdown.notified() => {
                        break;
                    }
                }
            }
            debug!(factory_id = %factory_id, "Blocker monitor loop exited");
        });

        *self.handle.lock() = Some(handle);
        true
    }

    /// Stop the loop; safe to call when not running
    pub fn stop(&self) {
        if !self.is_running.swap(false, Ordering::SeqCst) {
            return;
        }
        self.shutdown.notify_waiters();
        if let Some(handle) = self.handle.lock().take() {
            handle.abort();
        }
        info!(
            monitor_id = %self.id,
            ticks = self.ticks(),
            errors = self.errors(),
            "🛑 MONITOR: Blocker monitor stopped"
        );
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }

    pub fn ticks(&self) -> u64 {
        self.stats.ticks.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> u64 {
        self.stats.errors.load(Ordering::Relaxed)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Drop for BlockerMonitor {
    fn drop(&mut self) {
        self.is_running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.lock().take() {
            handle.abort();
        }
    }
}
