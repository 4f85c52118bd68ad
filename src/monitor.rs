//! Polling loops that drive fetch → partition → classify → notify.
//!
//! Two instances of the same loop run side by side:
//!
//! - the **tracker** follows the user's selections (region, feed window,
//!   magnitude floor). Its cadence follows the window: 30 s for `hour`,
//!   300 s for `day`, 600 s for `week`. Any selection change or a manual
//!   refresh cancels the pending tick and polls immediately.
//! - the **sentinel** watches a fixed region on the hourly feed every
//!   120 s (configurable) and only reports unseen nearby events.
//!
//! # State Machine
//!
//! ```text
//!        tick / command            fetch ok
//!  Idle ───────────────► Fetching ──────────► Idle
//!   ▲                       │
//!   │      next tick        │ fetch failed
//!   └──────────────────── Error
//! ```
//!
//! Each loop is one task that awaits its fetch inline, so a loop never has
//! two requests in flight and the next tick is only scheduled once the
//! previous poll has settled. Commands sent during a fetch are applied after
//! it settles; a stop request cancels the fetch instead. A failed poll keeps
//! the last good lists and is retried on the regular cadence.

use crate::alert::notifier::Notifier;
use crate::alert::{sentinel, thresholds};
use crate::analysis::proximity::{Partition, partition};
use crate::ingest::FeedFetcher;
use crate::logging::{self, Component};
use crate::model::{FeedWindow, PROXIMITY_RADIUS_KM, Region, SeismicEvent};
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

/// User-visible text for any failed poll.
pub const FEED_ERROR_MESSAGE: &str = "Failed to load earthquake data";

/// Default cadence of the background sentinel.
pub const SENTINEL_INTERVAL: Duration = Duration::from_secs(120);

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorKind {
    Tracker,
    Sentinel,
}

impl MonitorKind {
    fn component(&self) -> Component {
        match self {
            MonitorKind::Tracker => Component::Tracker,
            MonitorKind::Sentinel => Component::Sentinel,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorStatus {
    Idle,
    Fetching,
    Error,
}

/// What the presentation layer reads from a loop.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorSnapshot {
    pub status: MonitorStatus,
    pub nearby: Vec<SeismicEvent>,
    pub global: Vec<SeismicEvent>,
    /// Set while the last poll failed; cleared by the next success.
    pub error: Option<String>,
    pub region: Region,
    pub window: FeedWindow,
    pub magnitude_floor: f64,
    pub last_updated: Option<DateTime<Utc>>,
    /// Polls settled so far, successful or not.
    pub polls: u64,
}

impl MonitorSnapshot {
    pub fn is_loading(&self) -> bool {
        self.status == MonitorStatus::Fetching
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetRegion(Region),
    SetWindow(FeedWindow),
    SetMagnitudeFloor(f64),
    Refresh,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    /// The loop has already stopped.
    Stopped,
    /// The sentinel's region, window and floor cannot be changed.
    FixedSettings,
    InvalidMagnitudeFloor(f64),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::Stopped => write!(f, "monitor has stopped"),
            CommandError::FixedSettings => write!(f, "sentinel settings are fixed"),
            CommandError::InvalidMagnitudeFloor(floor) => {
                write!(f, "{} is not a non-negative magnitude", floor)
            }
        }
    }
}

impl std::error::Error for CommandError {}

// ---------------------------------------------------------------------------
// Handle
// ---------------------------------------------------------------------------

/// Owner of a running loop. Dropping the handle aborts the loop; use
/// `shutdown` to stop it and wait for it to finish.
pub struct MonitorHandle {
    kind: MonitorKind,
    commands: mpsc::UnboundedSender<Command>,
    stop: watch::Sender<bool>,
    snapshot: watch::Receiver<MonitorSnapshot>,
    task: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    pub fn snapshot(&self) -> MonitorSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<MonitorSnapshot> {
        self.snapshot.clone()
    }

    pub fn set_region(&self, region: Region) -> Result<(), CommandError> {
        self.require_tracker()?;
        self.send(Command::SetRegion(region))
    }

    pub fn set_window(&self, window: FeedWindow) -> Result<(), CommandError> {
        self.require_tracker()?;
        self.send(Command::SetWindow(window))
    }

    pub fn set_magnitude_floor(&self, floor: f64) -> Result<(), CommandError> {
        self.require_tracker()?;
        if !floor.is_finite() || floor < 0.0 {
            return Err(CommandError::InvalidMagnitudeFloor(floor));
        }
        self.send(Command::SetMagnitudeFloor(floor))
    }

    /// Polls now and restarts the cadence from the end of that poll.
    pub fn refresh(&self) -> Result<(), CommandError> {
        self.send(Command::Refresh)
    }

    /// Stops the loop and waits for it. An in-flight fetch is dropped
    /// without publishing a result; no tick is scheduled afterwards.
    pub async fn shutdown(mut self) {
        let _ = self.stop.send(true);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }

    fn require_tracker(&self) -> Result<(), CommandError> {
        match self.kind {
            MonitorKind::Tracker => Ok(()),
            MonitorKind::Sentinel => Err(CommandError::FixedSettings),
        }
    }

    fn send(&self, command: Command) -> Result<(), CommandError> {
        self.commands.send(command).map_err(|_| CommandError::Stopped)
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// Spawning
// ---------------------------------------------------------------------------

/// Starts the foreground tracker. The first poll happens immediately.
pub fn spawn_tracker<F: FeedFetcher>(
    fetcher: F,
    notifier: Notifier,
    region: Region,
    window: FeedWindow,
    magnitude_floor: f64,
) -> MonitorHandle {
    spawn_loop(MonitorKind::Tracker, fetcher, notifier, region, window, magnitude_floor, None)
}

/// Starts the background sentinel on the hourly feed. The first poll
/// happens immediately.
pub fn spawn_sentinel<F: FeedFetcher>(
    fetcher: F,
    notifier: Notifier,
    region: Region,
    magnitude_floor: f64,
    interval: Duration,
) -> MonitorHandle {
    spawn_loop(
        MonitorKind::Sentinel,
        fetcher,
        notifier,
        region,
        FeedWindow::Hour,
        magnitude_floor,
        Some(interval),
    )
}

fn spawn_loop<F: FeedFetcher>(
    kind: MonitorKind,
    fetcher: F,
    notifier: Notifier,
    region: Region,
    window: FeedWindow,
    magnitude_floor: f64,
    fixed_interval: Option<Duration>,
) -> MonitorHandle {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (stop_tx, stop_rx) = watch::channel(false);
    let (snapshot_tx, snapshot_rx) = watch::channel(MonitorSnapshot {
        status: MonitorStatus::Idle,
        nearby: Vec::new(),
        global: Vec::new(),
        error: None,
        region: region.clone(),
        window,
        magnitude_floor,
        last_updated: None,
        polls: 0,
    });

    let polling = PollingLoop {
        kind,
        fetcher,
        notifier,
        region,
        window,
        magnitude_floor,
        fixed_interval,
        last_checked_ms: 0,
        snapshot: snapshot_tx,
        commands: command_rx,
        stop: stop_rx,
    };

    MonitorHandle {
        kind,
        commands: command_tx,
        stop: stop_tx,
        snapshot: snapshot_rx,
        task: Some(tokio::spawn(polling.run())),
    }
}

// ---------------------------------------------------------------------------
// Loop
// ---------------------------------------------------------------------------

struct PollingLoop<F> {
    kind: MonitorKind,
    fetcher: F,
    notifier: Notifier,
    region: Region,
    window: FeedWindow,
    magnitude_floor: f64,
    /// `None` follows the window's cadence.
    fixed_interval: Option<Duration>,
    /// Sentinel only: newest event time already examined.
    last_checked_ms: i64,
    snapshot: watch::Sender<MonitorSnapshot>,
    commands: mpsc::UnboundedReceiver<Command>,
    stop: watch::Receiver<bool>,
}

/// Resolves once a stop is requested or the handle is gone.
async fn stop_requested(stop: &mut watch::Receiver<bool>) {
    let _ = stop.wait_for(|stopped| *stopped).await;
}

impl<F: FeedFetcher> PollingLoop<F> {
    async fn run(mut self) {
        let component = self.kind.component();
        logging::info(
            component,
            Some(&self.region.name),
            &format!("Monitoring {} feed every {}s", self.window, self.interval().as_secs()),
        );

        let mut stop = self.stop.clone();
        let mut next_poll = Instant::now();
        loop {
            tokio::select! {
                _ = stop_requested(&mut stop) => break,
                _ = time::sleep_until(next_poll) => {
                    tokio::select! {
                        _ = self.poll() => {}
                        _ = stop_requested(&mut stop) => break,
                    }
                    next_poll = Instant::now() + self.interval();
                }
                command = self.commands.recv() => match command {
                    None => break,
                    Some(command) => {
                        self.apply(command);
                        next_poll = Instant::now();
                    }
                },
            }
        }

        logging::info(component, Some(&self.region.name), "Monitoring stopped");
    }

    fn interval(&self) -> Duration {
        self.fixed_interval
            .unwrap_or_else(|| self.window.refresh_interval())
    }

    /// Applies a command. The caller polls right after.
    fn apply(&mut self, command: Command) {
        let component = self.kind.component();
        match command {
            Command::Refresh => {
                logging::debug(component, Some(&self.region.name), "Manual refresh");
            }
            Command::SetRegion(region) => {
                logging::info(component, Some(&region.name), "Region selected");
                self.region = region;
            }
            Command::SetWindow(window) => {
                logging::info(component, Some(window.as_str()), "Feed window selected");
                self.window = window;
            }
            Command::SetMagnitudeFloor(floor) => {
                logging::info(component, None, &format!("Magnitude floor set to {}", floor));
                self.magnitude_floor = floor;
            }
        }
    }

    async fn poll(&mut self) {
        let component = self.kind.component();
        let (region, window, floor) = (self.region.clone(), self.window, self.magnitude_floor);
        self.snapshot.send_modify(|s| {
            s.status = MonitorStatus::Fetching;
            s.region = region;
            s.window = window;
            s.magnitude_floor = floor;
        });

        match self.fetcher.fetch(self.window).await {
            Ok(events) => {
                let Partition { nearby, global } =
                    partition(&events, &self.region, PROXIMITY_RADIUS_KM, self.magnitude_floor);
                logging::log_poll_summary(
                    component,
                    &self.region.name,
                    events.len(),
                    nearby.len(),
                    global.len(),
                );
                self.evaluate(&events, &nearby, &global);

                self.snapshot.send_modify(|s| {
                    s.status = MonitorStatus::Idle;
                    s.nearby = nearby;
                    s.global = global;
                    s.error = None;
                    s.last_updated = Some(Utc::now());
                    s.polls += 1;
                });
            }
            Err(err) => {
                logging::log_feed_failure(component, self.window.as_str(), &err);
                self.snapshot.send_modify(|s| {
                    s.status = MonitorStatus::Error;
                    s.error = Some(FEED_ERROR_MESSAGE.to_string());
                    s.polls += 1;
                });
            }
        }
    }

    fn evaluate(&mut self, events: &[SeismicEvent], nearby: &[SeismicEvent], global: &[SeismicEvent]) {
        match self.kind {
            MonitorKind::Tracker => {
                let previous = self.notifier.current().last_observed_magnitude;
                let outcome = thresholds::classify(nearby, global, &self.region, previous);
                if let Some(magnitude) = outcome.previous_magnitude {
                    self.notifier.record_magnitude(magnitude);
                }
                if let Some(alert) = outcome.alert {
                    self.notifier.raise(alert);
                }
            }
            MonitorKind::Sentinel => {
                let verdict =
                    sentinel::evaluate(events, &self.region, self.magnitude_floor, self.last_checked_ms);
                self.last_checked_ms = verdict.last_checked_ms;
                if let Some(alert) = verdict.alert {
                    self.notifier.raise(alert);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
