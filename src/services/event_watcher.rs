//! Centralized polling of event open/closed state.
//!
//! One background task per event feeds a `watch` channel; every interested view subscribes
//! to the same channel instead of running its own timer. The task stops on its own once
//! the event is closed and is aborted when the last subscription is dropped.

use std::{
    sync::{
        Arc, Weak,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use dashmap::DashMap;
use rand::Rng;
use tokio::{sync::watch, task::JoinHandle, time::sleep};
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info};
use uuid::Uuid;

use crate::dao::scoring_api::ScoringApi;

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(30);
/// Shortest delay allowed between two polls of the same event.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Last known state of a watched event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStatus {
    /// No successful poll yet.
    Unknown,
    /// Last poll saw the event open.
    Open,
    /// Terminal.
    Closed,
}

/// Timing of the polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Delay between polls while the API answers.
    pub interval: Duration,
    /// Upper bound of the retry delay after consecutive failures.
    pub max_backoff: Duration,
}

impl PollSettings {
    /// Raise the interval to [`MIN_POLL_INTERVAL`] and the backoff cap to the interval.
    pub fn clamped(self) -> Self {
        let interval = self.interval.max(MIN_POLL_INTERVAL);
        Self {
            interval,
            max_backoff: self.max_backoff.max(interval),
        }
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            max_backoff: DEFAULT_MAX_BACKOFF,
        }
    }
}

struct WatchEntry {
    event_id: Uuid,
    status: watch::Receiver<EventStatus>,
    task: JoinHandle<()>,
    registry: Weak<WatchersInner>,
}

impl Drop for WatchEntry {
    fn drop(&mut self) {
        self.task.abort();
        if let Some(registry) = self.registry.upgrade() {
            // a newer subscription may already own the slot
            registry
                .entries
                .remove_if(&self.event_id, |_, slot| slot.strong_count() == 0);
        }
        debug!(event_id = %self.event_id, "event watcher stopped");
    }
}

struct WatchersInner {
    api: Arc<dyn ScoringApi>,
    settings: PollSettings,
    entries: DashMap<Uuid, Weak<WatchEntry>>,
}

impl Drop for WatchersInner {
    fn drop(&mut self) {
        for entry in self.entries.iter() {
            if let Some(entry) = entry.value().upgrade() {
                entry.task.abort();
            }
        }
    }
}

/// Registry handing out one shared poller per event.
#[derive(Clone)]
pub struct EventWatchers {
    inner: Arc<WatchersInner>,
}

impl EventWatchers {
    /// Registry polling through `api`. Settings are clamped to the allowed floor.
    pub fn new(api: Arc<dyn ScoringApi>, settings: PollSettings) -> Self {
        Self {
            inner: Arc::new(WatchersInner {
                api,
                settings: settings.clamped(),
                entries: DashMap::new(),
            }),
        }
    }

    /// Effective polling timing.
    pub fn settings(&self) -> PollSettings {
        self.inner.settings
    }

    /// Subscribe to `event_id`, starting its poller if nobody watches it yet.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn subscribe(&self, event_id: Uuid) -> EventSubscription {
        let mut slot = self.inner.entries.entry(event_id).or_default();
        if let Some(entry) = slot.upgrade() {
            return EventSubscription { entry };
        }

        let (tx, rx) = watch::channel(EventStatus::Unknown);
        let task = tokio::spawn(poll_event(
            self.inner.api.clone(),
            event_id,
            self.inner.settings,
            tx,
        ));
        debug!(%event_id, "event watcher started");

        let entry = Arc::new(WatchEntry {
            event_id,
            status: rx,
            task,
            registry: Arc::downgrade(&self.inner),
        });
        *slot = Arc::downgrade(&entry);
        EventSubscription { entry }
    }

    /// Number of events currently being polled.
    pub fn active_count(&self) -> usize {
        self.inner
            .entries
            .iter()
            .filter(|entry| entry.value().strong_count() > 0)
            .count()
    }
}

/// Handle on the status of one watched event.
#[derive(Clone)]
pub struct EventSubscription {
    entry: Arc<WatchEntry>,
}

impl EventSubscription {
    /// Watched event.
    pub fn event_id(&self) -> Uuid {
        self.entry.event_id
    }

    /// Last status observed.
    pub fn status(&self) -> EventStatus {
        *self.entry.status.borrow()
    }

    /// Receiver of every status change.
    pub fn receiver(&self) -> watch::Receiver<EventStatus> {
        self.entry.status.clone()
    }

    /// Resolve once the event is observed closed. Returns `false` if polling ended first.
    pub async fn closed(&self) -> bool {
        let mut status = self.receiver();
        status
            .wait_for(|status| *status == EventStatus::Closed)
            .await
            .is_ok()
    }

    /// Stream of statuses, starting with the current one.
    pub fn changes(&self) -> WatchStream<EventStatus> {
        WatchStream::new(self.receiver())
    }
}

/// Latch guaranteeing a close reaction runs at most once.
#[derive(Debug, Clone, Default)]
pub struct CloseSignal {
    fired: Arc<AtomicBool>,
}

impl CloseSignal {
    /// Unfired latch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` for the first caller only.
    pub fn fire(&self) -> bool {
        self.fired
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Whether some caller already fired the latch.
    pub fn has_fired(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }
}

async fn poll_event(
    api: Arc<dyn ScoringApi>,
    event_id: Uuid,
    settings: PollSettings,
    status: watch::Sender<EventStatus>,
) {
    let mut retry_delay = settings.interval;

    loop {
        match api.list_events().await {
            Ok(events) => {
                // an event missing from the listing was deleted, which also ends it
                let is_open = events
                    .iter()
                    .find(|event| event.id == event_id)
                    .is_some_and(|event| event.is_open);
                if !is_open {
                    info!(%event_id, "event closed");
                    status.send_replace(EventStatus::Closed);
                    return;
                }

                status.send_if_modified(|current| {
                    let changed = *current != EventStatus::Open;
                    *current = EventStatus::Open;
                    changed
                });
                retry_delay = settings.interval;
                sleep(settings.interval).await;
            }
            Err(err) => {
                let wait = retry_delay + jitter(retry_delay);
                debug!(%event_id, error = %err, retry_in = ?wait, "event poll failed");
                sleep(wait).await;
                retry_delay = (retry_delay * 2).min(settings.max_backoff);
            }
        }
    }
}

/// Up to a tenth of `base`, so that many clients do not retry in lockstep.
fn jitter(base: Duration) -> Duration {
    let max_ms = u64::try_from(base.as_millis() / 10).unwrap_or(u64::MAX);
    if max_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::rng().random_range(0..=max_ms))
}
