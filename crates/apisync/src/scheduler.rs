//! Drift-corrected poll scheduling.
//!
//! The scheduler owns the start/stop lifecycle and the timing loop. Cadence
//! is kept by tracking the *expected* fire time of each cycle and arming a
//! one-shot timer for the remainder of the interval, so the long-run average
//! period stays equal to `poll_interval` no matter how long individual
//! cycles take. A repeating-interval primitive cannot encode that math, so
//! the loop recomputes the deadline on every pass.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime};

use futures::future::join_all;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::PollingConfig;
use crate::fetch::Fetch;
use crate::poller::EndpointPoller;
use crate::sink::SyncLogSink;

/// Aggregated outcome of one poll cycle
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CycleSummary {
    /// Endpoints whose poll succeeded within the retry budget
    pub succeeded: usize,

    /// Endpoints whose retry budget was exhausted
    pub failed: usize,
}

/// Mutable scheduler state. The shutdown handle and task exist iff
/// `running` is true.
#[derive(Default)]
struct SchedulerState {
    running: bool,
    next_fire_time: Option<SystemTime>,
    shutdown: Option<watch::Sender<bool>>,
    task: Option<JoinHandle<()>>,
}

/// Polling scheduler.
///
/// Each instance owns its state exclusively, so independent schedulers can
/// coexist in one process. Dropping a running scheduler drops the shutdown
/// handle, which ends the polling loop at its next wait.
pub struct PollScheduler {
    config: Arc<PollingConfig>,
    poller: Arc<EndpointPoller>,
    state: Arc<Mutex<SchedulerState>>,
}

impl PollScheduler {
    /// Create a scheduler over the given transport and sync-log sink
    pub fn new(
        config: PollingConfig,
        fetcher: Arc<dyn Fetch>,
        sink: Arc<dyn SyncLogSink>,
    ) -> Self {
        let config = Arc::new(config);
        let poller = Arc::new(EndpointPoller::new(Arc::clone(&config), fetcher, sink));

        Self { config, poller, state: Arc::new(Mutex::new(SchedulerState::default())) }
    }

    /// Start polling. Performs an immediate poll cycle, then keeps firing on
    /// the configured cadence. Warns and leaves state unchanged when already
    /// running. Returns immediately; must be called within a Tokio runtime.
    pub fn start(&self) {
        let mut state = self.state.lock().unwrap();

        if state.running {
            warn!("poll scheduler is already running");
            return;
        }

        info!(
            endpoints = self.config.endpoints.len(),
            interval_ms = self.config.poll_interval.as_millis() as u64,
            "starting poll scheduler"
        );

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run_loop(
            Arc::clone(&self.config),
            Arc::clone(&self.poller),
            Arc::clone(&self.state),
            shutdown_rx,
        ));

        state.running = true;
        state.shutdown = Some(shutdown_tx);
        state.task = Some(task);
    }

    /// Stop polling. Cancels the pending inter-cycle timer so no further
    /// cycle starts; an in-flight cycle's fetches are allowed to drain.
    /// Idempotent: a second call is a silent no-op.
    pub fn stop(&self) {
        let mut state = self.state.lock().unwrap();

        if !state.running {
            return;
        }

        info!("stopping poll scheduler");

        if let Some(shutdown) = state.shutdown.take() {
            let _ = shutdown.send(true);
        }

        // Detach rather than abort: the loop exits at its next checkpoint.
        drop(state.task.take());
        state.running = false;
        state.next_fire_time = None;
    }

    /// Whether the scheduler is currently running
    pub fn is_running(&self) -> bool {
        self.state.lock().unwrap().running
    }

    /// Wall-clock time the pending timer will fire, while running
    pub fn next_fire_time(&self) -> Option<SystemTime> {
        self.state.lock().unwrap().next_fire_time
    }
}

/// The self-rescheduling polling loop: poll, compute the drift-corrected
/// deadline, sleep until it, repeat. Shutdown is observed at the wait point,
/// so a cycle in flight always settles before the loop exits.
async fn run_loop(
    config: Arc<PollingConfig>,
    poller: Arc<EndpointPoller>,
    state: Arc<Mutex<SchedulerState>>,
    mut shutdown: watch::Receiver<bool>,
) {
    let interval = config.poll_interval;
    let mut last_expected: Option<Instant> = None;

    loop {
        let cycle_start = Instant::now();
        let (deadline, expected) = next_deadline(cycle_start, last_expected, interval);
        last_expected = Some(expected);

        {
            let delay = deadline.saturating_duration_since(cycle_start);
            let mut state = state.lock().unwrap();
            state.next_fire_time = Some(SystemTime::now() + delay);
        }

        let summary = run_cycle(&config, &poller).await;
        info!(succeeded = summary.succeeded, failed = summary.failed, "poll cycle completed");

        tokio::select! {
            _ = tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)) => {}
            _ = shutdown.changed() => break,
        }

        if *shutdown.borrow() {
            break;
        }
    }
}

/// Dispatch one poll per configured endpoint, all concurrently, and wait for
/// every one to settle. Endpoint outcomes are independent: one exhausted
/// failure neither blocks the others nor the next cycle.
async fn run_cycle(config: &PollingConfig, poller: &EndpointPoller) -> CycleSummary {
    debug!(endpoints = config.endpoints.len(), "starting poll cycle");

    let polls = config.endpoints.iter().map(|endpoint| poller.poll_endpoint(endpoint));
    let results = join_all(polls).await;

    let mut summary = CycleSummary::default();
    for result in &results {
        if result.success {
            debug!(
                endpoint = %result.endpoint,
                records = ?result.record_count,
                "endpoint poll succeeded"
            );
            summary.succeeded += 1;
        } else {
            warn!(
                endpoint = %result.endpoint,
                error = ?result.error,
                "endpoint poll failed"
            );
            summary.failed += 1;
        }
    }

    summary
}

/// Compute the next timer deadline and this cycle's expected fire time.
///
/// `expected` advances by exactly one interval per cycle regardless of how
/// long the cycle's work took; the delay compensates for the drift between
/// the actual and expected fire time. The delay bottoms out at zero when a
/// cycle overran the whole interval: back-to-back cycles are preferred over
/// skipped ones.
fn next_deadline(
    cycle_start: Instant,
    last_expected: Option<Instant>,
    interval: Duration,
) -> (Instant, Instant) {
    let expected = match last_expected {
        Some(prev) => prev + interval,
        None => cycle_start + interval,
    };

    let next_delay = if cycle_start >= expected {
        interval.saturating_sub(cycle_start - expected)
    } else {
        // Fired early: negative drift stretches the delay.
        interval + (expected - cycle_start)
    };

    (cycle_start + next_delay, expected)
}
