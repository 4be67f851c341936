use crate::{
    reminder::send_due_reminders::{SendDueRemindersUseCase, TickReport},
    shared::usecase::execute,
};
use actix_web::rt::time::{interval_at, Instant};
use eventhub_infra::EventHubContext;
use std::{
    convert::TryFrom,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{sync::watch, time::MissedTickBehavior};
use tracing::{info, warn};

/// Millis from `now_ts` until the next multiple of `interval_secs` on the
/// wall clock. A timestamp that is right on a boundary waits a full interval.
pub fn get_start_delay(now_ts: i64, interval_secs: u64) -> u64 {
    let interval_millis =
        i64::try_from(interval_secs.max(1).saturating_mul(1000)).unwrap_or(i64::MAX);
    (interval_millis - now_ts.rem_euclid(interval_millis)) as u64
}

/// Runs the `SendDueRemindersUseCase` at a fixed cadence until stopped.
///
/// Ticks never overlap: a tick that fires while the previous one is still
/// running is skipped.
pub struct ReminderScheduler {
    ctx: EventHubContext,
    tick_in_progress: Arc<AtomicBool>,
    shutdown: Option<watch::Sender<bool>>,
}

impl ReminderScheduler {
    pub fn new(ctx: EventHubContext) -> Self {
        Self {
            ctx,
            tick_in_progress: Arc::new(AtomicBool::new(false)),
            shutdown: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.shutdown.is_some()
    }

    pub fn start(&mut self) {
        if self.is_running() {
            warn!("Reminder scheduler is already running");
            return;
        }

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let ctx = self.ctx.clone();
        let tick_in_progress = self.tick_in_progress.clone();

        actix_web::rt::spawn(async move {
            let interval_secs = ctx.config.reminder_tick_interval_secs.max(1);
            let start_delay = get_start_delay(ctx.sys.get_timestamp_millis(), interval_secs);
            info!(
                "Reminder scheduler starting in {} ms, running every {} seconds",
                start_delay, interval_secs
            );

            let start = Instant::now() + Duration::from_millis(start_delay);
            let mut ticks = interval_at(start, Duration::from_secs(interval_secs));
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticks.tick() => {
                        let ctx = ctx.clone();
                        let tick_in_progress = tick_in_progress.clone();
                        actix_web::rt::spawn(async move {
                            run_tick(&ctx, &tick_in_progress).await;
                        });
                    }
                    _ = shutdown_rx.changed() => break,
                }
            }
            info!("Reminder scheduler stopped");
        });

        self.shutdown = Some(shutdown_tx);
    }

    /// Stops scheduling new ticks. A tick that is already running is
    /// allowed to finish.
    pub fn stop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(true);
        }
    }

    /// Runs a single tick right away. Returns `None` if another tick was
    /// already running or the due reminders could not be queried.
    pub async fn tick(&self) -> Option<TickReport> {
        run_tick(&self.ctx, &self.tick_in_progress).await
    }
}

struct TickGuard<'a>(&'a AtomicBool);

impl Drop for TickGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

async fn run_tick(ctx: &EventHubContext, tick_in_progress: &AtomicBool) -> Option<TickReport> {
    if tick_in_progress
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        warn!("Previous reminder tick is still running, skipping this tick");
        return None;
    }
    let _guard = TickGuard(tick_in_progress);

    // Query failures are logged by `execute`, the next tick tries again
    execute(SendDueRemindersUseCase::new(&ctx.config), ctx)
        .await
        .ok()
}
