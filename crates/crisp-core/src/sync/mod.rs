//! Background synchronization engine.
//!
//! Keeps a displayed collection reasonably fresh without manual reloads: a
//! lightweight "what changed" report is polled on an interval and compared
//! against a locally remembered cursor; only a strictly newer server
//! timestamp triggers a silent re-fetch, which is then acknowledged with an
//! explicit mark-seen call so concurrent pollers skip the same signal.
//!
//! Polling is a best-effort freshness aid: every failure on this path is
//! swallowed and logged, and a failed lightweight check falls back to an
//! unconditional silent re-fetch (fail open, never fail closed on staleness).

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;

use crate::error::Result;
use crate::models::ResourceKind;

/// Per-resource latest-modification timestamps reported by the server.
///
/// Keys follow the `<resource>_updated` convention, e.g.
/// `indicators_updated`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateReport {
    #[serde(flatten)]
    pub updated: BTreeMap<String, DateTime<Utc>>,
}

impl UpdateReport {
    /// Reported timestamp for one resource kind, if present.
    #[must_use]
    pub fn reported_for(&self, kind: ResourceKind) -> Option<DateTime<Utc>> {
        self.updated.get(&kind.report_key()).copied()
    }

    /// Builder used by tests and fixtures.
    #[must_use]
    pub fn with(mut self, kind: ResourceKind, reported: DateTime<Utc>) -> Self {
        self.updated.insert(kind.report_key(), reported);
        self
    }
}

/// Last update timestamp this client has acknowledged for one resource.
///
/// Lives only for the lifetime of its engine; never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncCursor {
    last_seen: Option<DateTime<Utc>>,
}

/// Outcome of comparing a server report against the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncDecision {
    /// No cursor yet, or the server reported a strictly newer timestamp.
    Refresh { reported: DateTime<Utc> },
    /// Nothing newer than what was already acknowledged.
    UpToDate,
}

impl SyncCursor {
    #[must_use]
    pub const fn last_seen(&self) -> Option<DateTime<Utc>> {
        self.last_seen
    }

    /// Decide whether a reported timestamp warrants a re-fetch.
    #[must_use]
    pub fn evaluate(&self, reported: Option<DateTime<Utc>>) -> SyncDecision {
        let Some(reported) = reported else {
            return SyncDecision::UpToDate;
        };
        match self.last_seen {
            Some(last_seen) if reported <= last_seen => SyncDecision::UpToDate,
            _ => SyncDecision::Refresh { reported },
        }
    }

    /// Advance the cursor; never moves backwards.
    pub fn mark_seen(&mut self, seen: DateTime<Utc>) {
        self.last_seen = Some(match self.last_seen {
            Some(last_seen) => last_seen.max(seen),
            None => seen,
        });
    }
}

/// Seam between the engine and whatever serves reports and re-fetches.
///
/// The API client adapter implements this in production; tests substitute
/// counting mocks.
pub trait UpdateSource {
    /// Fetch the lightweight update report.
    fn fetch_report(&self) -> impl std::future::Future<Output = Result<UpdateReport>> + Send;

    /// Silently re-fetch the tracked collection (must not flip loading UI).
    fn refresh(&self) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Acknowledge a reported timestamp as processed.
    fn mark_seen(
        &self,
        seen: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// What one poll pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Newer data fetched and acknowledged; the cursor now equals this value.
    Refreshed(DateTime<Utc>),
    /// Server reported nothing newer.
    UpToDate,
    /// The lightweight check failed; an unconditional refresh was attempted.
    FailedOpen,
    /// Refresh or mark-seen failed; the cursor was left unchanged so the next
    /// tick retries the same signal.
    Deferred,
}

/// Cooperative "a write just happened elsewhere" signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteSignal;

pub type WriteSignalSender = mpsc::Sender<WriteSignal>;

/// Create the write-signal channel shared between mutating commands and a
/// running engine.
#[must_use]
pub fn write_signal_channel() -> (WriteSignalSender, mpsc::Receiver<WriteSignal>) {
    mpsc::channel(16)
}

/// Create the shutdown handle owned by the component that spawned the engine.
#[must_use]
pub fn shutdown_channel() -> (watch::Sender<bool>, watch::Receiver<bool>) {
    watch::channel(false)
}

pub struct SyncEngine<U: UpdateSource> {
    source: U,
    kind: ResourceKind,
    interval: Duration,
    cursor: SyncCursor,
}

impl<U: UpdateSource> SyncEngine<U> {
    #[must_use]
    pub fn new(source: U, kind: ResourceKind, interval: Duration) -> Self {
        Self {
            source,
            kind,
            interval,
            cursor: SyncCursor::default(),
        }
    }

    #[must_use]
    pub const fn last_seen(&self) -> Option<DateTime<Utc>> {
        self.cursor.last_seen()
    }

    /// One poll pass: check, compare, maybe silently refresh and acknowledge.
    ///
    /// The cursor advances only after the full refresh + mark-seen pair
    /// succeeded; a half-completed pass is retried on the next tick.
    pub async fn poll_once(&mut self) -> PollOutcome {
        let report = match self.source.fetch_report().await {
            Ok(report) => report,
            Err(error) => {
                tracing::warn!(resource = %self.kind, "update check failed, refreshing unconditionally: {error}");
                if let Err(error) = self.source.refresh().await {
                    tracing::warn!(resource = %self.kind, "fallback refresh failed: {error}");
                }
                return PollOutcome::FailedOpen;
            }
        };

        match self.cursor.evaluate(report.reported_for(self.kind)) {
            SyncDecision::UpToDate => PollOutcome::UpToDate,
            SyncDecision::Refresh { reported } => {
                if let Err(error) = self.source.refresh().await {
                    tracing::warn!(resource = %self.kind, "silent refresh failed: {error}");
                    return PollOutcome::Deferred;
                }
                if let Err(error) = self.source.mark_seen(reported).await {
                    tracing::warn!(resource = %self.kind, "mark-seen failed: {error}");
                    return PollOutcome::Deferred;
                }
                self.cursor.mark_seen(reported);
                PollOutcome::Refreshed(reported)
            }
        }
    }

    /// Manual, user-triggered refresh; bypasses the cursor comparison.
    ///
    /// Unlike polling this is user-initiated, so errors propagate.
    pub async fn refresh_now(&self) -> Result<()> {
        self.source.refresh().await
    }

    /// Poll loop: interval ticks, cooperative write signals, and shutdown.
    ///
    /// The loop is owned by the spawning component's lifetime; dropping the
    /// shutdown sender (or sending `true`) terminates it, so no request
    /// outlives its view.
    pub async fn run(
        mut self,
        mut signals: mpsc::Receiver<WriteSignal>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut signals_open = true;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let outcome = self.poll_once().await;
                    tracing::debug!(resource = %self.kind, ?outcome, "poll tick");
                }
                signal = signals.recv(), if signals_open => {
                    match signal {
                        Some(WriteSignal) => {
                            if let Err(error) = self.source.refresh().await {
                                tracing::warn!(resource = %self.kind, "write-signal refresh failed: {error}");
                            }
                        }
                        None => signals_open = false,
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::Error;

    #[derive(Clone, Default)]
    struct MockSource {
        report: Arc<Mutex<Option<UpdateReport>>>,
        fail_report: Arc<AtomicBool>,
        fail_refresh: Arc<AtomicBool>,
        refreshes: Arc<AtomicUsize>,
        seen: Arc<Mutex<Vec<DateTime<Utc>>>>,
    }

    impl MockSource {
        fn reporting(report: UpdateReport) -> Self {
            let source = Self::default();
            *source.report.lock().unwrap() = Some(report);
            source
        }

        fn refresh_count(&self) -> usize {
            self.refreshes.load(Ordering::SeqCst)
        }

        fn seen_calls(&self) -> Vec<DateTime<Utc>> {
            self.seen.lock().unwrap().clone()
        }
    }

    impl UpdateSource for MockSource {
        async fn fetch_report(&self) -> crate::Result<UpdateReport> {
            if self.fail_report.load(Ordering::SeqCst) {
                return Err(Error::Api("connection reset".to_string()));
            }
            Ok(self.report.lock().unwrap().clone().unwrap_or_default())
        }

        async fn refresh(&self) -> crate::Result<()> {
            if self.fail_refresh.load(Ordering::SeqCst) {
                return Err(Error::Api("refresh failed".to_string()));
            }
            self.refreshes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn mark_seen(&self, seen: DateTime<Utc>) -> crate::Result<()> {
            self.seen.lock().unwrap().push(seen);
            Ok(())
        }
    }

    fn ts(second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, second).unwrap()
    }

    #[test]
    fn cursor_triggers_only_on_strictly_newer_timestamps() {
        let mut cursor = SyncCursor::default();
        assert_eq!(
            cursor.evaluate(Some(ts(0))),
            SyncDecision::Refresh { reported: ts(0) }
        );

        cursor.mark_seen(ts(5));
        assert_eq!(cursor.evaluate(Some(ts(5))), SyncDecision::UpToDate);
        assert_eq!(cursor.evaluate(Some(ts(3))), SyncDecision::UpToDate);
        assert_eq!(
            cursor.evaluate(Some(ts(6))),
            SyncDecision::Refresh { reported: ts(6) }
        );
        assert_eq!(cursor.evaluate(None), SyncDecision::UpToDate);
    }

    #[test]
    fn cursor_never_moves_backwards() {
        let mut cursor = SyncCursor::default();
        cursor.mark_seen(ts(10));
        cursor.mark_seen(ts(4));
        assert_eq!(cursor.last_seen(), Some(ts(10)));
    }

    #[tokio::test]
    async fn poll_with_stale_report_is_a_no_op() {
        let report = UpdateReport::default().with(ResourceKind::Indicators, ts(0));
        let source = MockSource::reporting(report);
        let mut engine =
            SyncEngine::new(source.clone(), ResourceKind::Indicators, Duration::from_secs(600));

        // Seed the cursor, then poll again with the same timestamp.
        assert_eq!(engine.poll_once().await, PollOutcome::Refreshed(ts(0)));
        assert_eq!(engine.poll_once().await, PollOutcome::UpToDate);
        assert_eq!(source.refresh_count(), 1);
        assert_eq!(source.seen_calls().len(), 1);
    }

    #[tokio::test]
    async fn poll_with_newer_report_refreshes_once_and_advances_cursor() {
        let report = UpdateReport::default().with(ResourceKind::Indicators, ts(0));
        let source = MockSource::reporting(report);
        let mut engine =
            SyncEngine::new(source.clone(), ResourceKind::Indicators, Duration::from_secs(600));
        engine.poll_once().await;

        // Server now reports 2025-01-01T00:00:05Z against a cursor at ...:00Z.
        *source.report.lock().unwrap() =
            Some(UpdateReport::default().with(ResourceKind::Indicators, ts(5)));

        assert_eq!(engine.poll_once().await, PollOutcome::Refreshed(ts(5)));
        assert_eq!(source.refresh_count(), 2);
        assert_eq!(source.seen_calls(), vec![ts(0), ts(5)]);
        assert_eq!(engine.last_seen(), Some(ts(5)));
    }

    #[tokio::test]
    async fn report_for_other_resources_does_not_trigger() {
        let report = UpdateReport::default().with(ResourceKind::Users, ts(5));
        let source = MockSource::reporting(report);
        let mut engine =
            SyncEngine::new(source.clone(), ResourceKind::Indicators, Duration::from_secs(600));

        assert_eq!(engine.poll_once().await, PollOutcome::UpToDate);
        assert_eq!(source.refresh_count(), 0);
        assert!(source.seen_calls().is_empty());
    }

    #[tokio::test]
    async fn transport_failure_falls_open_to_unconditional_refresh() {
        let source = MockSource::default();
        source.fail_report.store(true, Ordering::SeqCst);
        let mut engine =
            SyncEngine::new(source.clone(), ResourceKind::Indicators, Duration::from_secs(600));

        assert_eq!(engine.poll_once().await, PollOutcome::FailedOpen);
        assert_eq!(source.refresh_count(), 1);
        assert!(source.seen_calls().is_empty());
        assert_eq!(engine.last_seen(), None);
    }

    #[tokio::test]
    async fn failed_refresh_defers_without_advancing_cursor() {
        let report = UpdateReport::default().with(ResourceKind::Indicators, ts(5));
        let source = MockSource::reporting(report);
        source.fail_refresh.store(true, Ordering::SeqCst);
        let mut engine =
            SyncEngine::new(source.clone(), ResourceKind::Indicators, Duration::from_secs(600));

        assert_eq!(engine.poll_once().await, PollOutcome::Deferred);
        assert!(source.seen_calls().is_empty());
        assert_eq!(engine.last_seen(), None);

        // Next tick retries the same signal once refreshes succeed again.
        source.fail_refresh.store(false, Ordering::SeqCst);
        assert_eq!(engine.poll_once().await, PollOutcome::Refreshed(ts(5)));
    }

    #[tokio::test]
    async fn refresh_now_bypasses_cursor_comparison() {
        let report = UpdateReport::default().with(ResourceKind::Indicators, ts(0));
        let source = MockSource::reporting(report);
        let mut engine =
            SyncEngine::new(source.clone(), ResourceKind::Indicators, Duration::from_secs(600));
        engine.poll_once().await;
        assert_eq!(engine.poll_once().await, PollOutcome::UpToDate);

        engine.refresh_now().await.unwrap();
        assert_eq!(source.refresh_count(), 2);
        // Cursor untouched by the manual path.
        assert_eq!(engine.last_seen(), Some(ts(0)));
    }

    #[tokio::test]
    async fn write_signal_triggers_silent_refresh_and_shutdown_stops_loop() {
        let report = UpdateReport::default().with(ResourceKind::Indicators, ts(0));
        let source = MockSource::reporting(report);
        let engine =
            SyncEngine::new(source.clone(), ResourceKind::Indicators, Duration::from_secs(3600));

        let (signal_tx, signal_rx) = write_signal_channel();
        let (shutdown_tx, shutdown_rx) = shutdown_channel();
        let task = tokio::spawn(engine.run(signal_rx, shutdown_rx));

        signal_tx.send(WriteSignal).await.unwrap();
        // Give the loop a chance to process the signal before stopping it.
        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown_tx.send(true).unwrap();
        task.await.unwrap();

        // First interval tick fires immediately (one refresh + mark-seen),
        // the write signal adds a second refresh.
        assert_eq!(source.refresh_count(), 2);
    }

    #[test]
    fn update_report_round_trips_flattened_keys() {
        let report = UpdateReport::default()
            .with(ResourceKind::Indicators, ts(5))
            .with(ResourceKind::Users, ts(3));
        let raw = serde_json::to_string(&report).unwrap();
        assert!(raw.contains("indicators_updated"));

        let parsed: UpdateReport = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.reported_for(ResourceKind::Indicators), Some(ts(5)));
        assert_eq!(parsed.reported_for(ResourceKind::Incidents), None);
    }
}
