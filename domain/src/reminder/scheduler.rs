use super::dispatcher::{ReminderDispatcher, TickReport};
use super::window::{ReminderKind, ReminderWindow};
use crate::cache::Clock;
use log::*;
use service::config::Config;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

const MIN_INTERVAL: Duration = Duration::from_secs(1);

/// One periodic check: which window to look at and how often.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReminderJob {
    pub window: ReminderWindow,
    pub interval: Duration,
}

/// Runs each [`ReminderJob`] on its own timer until cancelled.
///
/// Jobs never share a tick: each runs as a separate task and a slow pass only
/// delays the next tick of the same job.
pub struct ReminderScheduler {
    dispatcher: Arc<ReminderDispatcher>,
    clock: Arc<dyn Clock>,
    jobs: Vec<ReminderJob>,
}

impl ReminderScheduler {
    pub fn new(dispatcher: Arc<ReminderDispatcher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            dispatcher,
            clock,
            jobs: Vec::new(),
        }
    }

    /// The 24-hour and 1-hour checks with intervals and widths from `config`.
    pub fn from_config(
        config: &Config,
        dispatcher: Arc<ReminderDispatcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self::new(dispatcher, clock)
            .with_job(
                ReminderWindow::day_from_config(config),
                config.reminder_24h_interval(),
            )
            .with_job(
                ReminderWindow::hour_from_config(config),
                config.reminder_1h_interval(),
            )
    }

    pub fn with_job(mut self, window: ReminderWindow, interval: Duration) -> Self {
        let interval = if interval < MIN_INTERVAL {
            warn!("{} interval {interval:?} too short, using {MIN_INTERVAL:?}", window.kind);
            MIN_INTERVAL
        } else {
            interval
        };
        self.jobs.push(ReminderJob { window, interval });
        self
    }

    pub fn jobs(&self) -> &[ReminderJob] {
        &self.jobs
    }

    /// Runs the job for `kind` once, right now. Returns `None` when no such job
    /// is configured.
    pub async fn tick(&self, kind: ReminderKind) -> Option<TickReport> {
        let job = self.jobs.iter().find(|job| job.window.kind == kind)?;
        Some(self.dispatcher.tick(&job.window, self.clock.now()).await)
    }

    /// Starts one task per job. Each task finishes after `cancel` fires; a pass
    /// already in progress completes first.
    pub fn spawn(&self, cancel: CancellationToken) -> Vec<JoinHandle<()>> {
        self.jobs
            .iter()
            .map(|job| {
                tokio::spawn(run_job(
                    *job,
                    Arc::clone(&self.dispatcher),
                    Arc::clone(&self.clock),
                    cancel.clone(),
                ))
            })
            .collect()
    }
}

async fn run_job(
    job: ReminderJob,
    dispatcher: Arc<ReminderDispatcher>,
    clock: Arc<dyn Clock>,
    cancel: CancellationToken,
) {
    info!("Starting {} check every {:?}", job.window.kind, job.interval);

    let mut ticker = interval_at(Instant::now() + job.interval, job.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("{} check shutting down", job.window.kind);
                break;
            }
            _ = ticker.tick() => {
                dispatcher.tick(&job.window, clock.now()).await;
            }
        }
    }
}
