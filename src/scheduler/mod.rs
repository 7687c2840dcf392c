//! Recurring auto-ping of one selected region
//!
//! [`Scheduler`] owns a timer task that probes the currently selected
//! region once per interval and appends the outcome to a [`ProbeLog`].
//! The first tick comes one full interval after enabling. Ticks never
//! overlap: a probe that outlasts the interval delays the next tick.
//! Disabling stops future ticks only; a probe already in flight still
//! completes and is logged.

mod log;

pub use log::ProbeLog;

use crate::{
    directory::EndpointDirectory,
    error::{AppError, Result},
    logging::ProbeLogger,
    models::Config,
    prober::{probe_region, Prober},
    report::ReportingSurface,
    types::Region,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Whether auto-ping runs and which region it targets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoPingState {
    pub enabled: bool,
    pub selected_region: Region,
}

/// Timing for the auto-ping timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Tick period
    pub interval: Duration,
    /// Bound on each probe
    pub timeout: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: crate::defaults::DEFAULT_INTERVAL,
            timeout: crate::defaults::DEFAULT_TIMEOUT,
        }
    }
}

impl From<&Config> for SchedulerConfig {
    fn from(config: &Config) -> Self {
        Self {
            interval: config.interval(),
            timeout: config.timeout(),
        }
    }
}

/// State shared with the timer task
struct Shared {
    directory: Arc<EndpointDirectory>,
    prober: Arc<dyn Prober>,
    surface: Arc<dyn ReportingSurface>,
    state: RwLock<AutoPingState>,
    log: ProbeLog,
    config: SchedulerConfig,
    logger: ProbeLogger,
}

impl Shared {
    /// One tick: probe whatever is selected right now and log it
    async fn tick(&self) {
        let region = self.state.read().await.selected_region.clone();
        let outcome = probe_region(&self.directory, self.prober.as_ref(), &region, self.config.timeout).await;

        let record = self.log.append(region, outcome).await;
        self.logger.log_tick(&record).await;
        self.surface.record_appended(&record);
    }
}

struct RunningTimer {
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

#[derive(Default)]
struct TimerSlot {
    running: Option<RunningTimer>,
    /// Stopped timers that may still be finishing a probe
    draining: Vec<JoinHandle<()>>,
}

/// Auto-ping controller
pub struct Scheduler {
    shared: Arc<Shared>,
    timer: Mutex<TimerSlot>,
}

impl Scheduler {
    /// Create a stopped scheduler targeting `initial_region`
    pub fn new(
        directory: Arc<EndpointDirectory>,
        prober: Arc<dyn Prober>,
        surface: Arc<dyn ReportingSurface>,
        config: SchedulerConfig,
        initial_region: Region,
    ) -> Result<Self> {
        if config.interval.is_zero() {
            return Err(AppError::scheduler("Auto-ping interval must be greater than zero"));
        }

        let shared = Shared {
            directory,
            prober,
            surface,
            state: RwLock::new(AutoPingState {
                enabled: false,
                selected_region: initial_region,
            }),
            log: ProbeLog::new(),
            config,
            logger: ProbeLogger::silent(),
        };

        Ok(Self {
            shared: Arc::new(shared),
            timer: Mutex::new(TimerSlot::default()),
        })
    }

    /// Must be called before the scheduler is first enabled
    pub fn with_logger(mut self, logger: ProbeLogger) -> Self {
        if let Some(shared) = Arc::get_mut(&mut self.shared) {
            shared.logger = logger;
        }
        self
    }

    /// Start or stop the timer. Enabling while running is a no-op.
    pub async fn set_enabled(&self, enabled: bool) {
        let mut slot = self.timer.lock().await;

        if enabled {
            if slot.running.is_some() {
                return;
            }
            slot.running = Some(self.spawn_timer());
        } else {
            let Some(timer) = slot.running.take() else {
                return;
            };
            // The task may already be gone if the runtime is shutting down
            let _ = timer.stop.send(());
            slot.draining.retain(|task| !task.is_finished());
            slot.draining.push(timer.task);
        }

        let region = {
            let mut state = self.shared.state.write().await;
            state.enabled = enabled;
            state.selected_region.clone()
        };
        self.shared.logger.log_auto_ping_state(enabled, &region).await;
    }

    /// Change the target. The running timer keeps its phase.
    pub async fn select_region(&self, region: Region) {
        self.shared.state.write().await.selected_region = region;
    }

    pub async fn selected_region(&self) -> Region {
        self.shared.state.read().await.selected_region.clone()
    }

    pub async fn is_running(&self) -> bool {
        self.shared.state.read().await.enabled
    }

    pub async fn state(&self) -> AutoPingState {
        self.shared.state.read().await.clone()
    }

    /// The log every tick appends to
    pub fn log(&self) -> &ProbeLog {
        &self.shared.log
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.shared.config
    }

    /// Wait for stopped timers to finish their in-flight probe
    pub async fn wait_idle(&self) -> Result<()> {
        let draining = std::mem::take(&mut self.timer.lock().await.draining);
        for task in draining {
            task.await?;
        }
        Ok(())
    }

    fn spawn_timer(&self) -> RunningTimer {
        let (stop, mut stopped) = oneshot::channel::<()>();
        let shared = Arc::clone(&self.shared);
        let period = shared.config.interval;

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    // Fires on an explicit stop and when the scheduler is dropped
                    _ = &mut stopped => break,
                    _ = ticker.tick() => {}
                }
                shared.tick().await;
            }
        });

        RunningTimer { stop, task }
    }
}
