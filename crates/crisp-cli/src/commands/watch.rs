//! `crisp watch`: foreground polling against the update report endpoint.

use std::time::Duration;

use chrono::{DateTime, Utc};
use crisp_core::api::{ApiClient, ListQuery};
use crisp_core::session::TokenStore;
use crisp_core::sync::{PollOutcome, SyncEngine, UpdateReport, UpdateSource};
use crisp_core::{ResourceKind, Result as CoreResult};
use serde_json::Value;
use tokio::time::MissedTickBehavior;

use crate::commands::common::AppContext;
use crate::error::CliError;

/// [`UpdateSource`] over the API client: the report endpoint for checks, a
/// listing fetch as the silent refresh.
struct CollectionRefreshSource<S: TokenStore> {
    client: ApiClient<S>,
    kind: ResourceKind,
}

impl<S: TokenStore> UpdateSource for CollectionRefreshSource<S> {
    async fn fetch_report(&self) -> CoreResult<UpdateReport> {
        self.client.fetch_updates().await
    }

    async fn refresh(&self) -> CoreResult<()> {
        // The report said the server is newer, so the listing must come
        // from the network, not a fresh-by-TTL cache entry.
        self.client.invalidate_cached(self.kind)?;
        let _rows: Vec<Value> = self.client.list(self.kind, &ListQuery::default()).await?;
        Ok(())
    }

    async fn mark_seen(&self, seen: DateTime<Utc>) -> CoreResult<()> {
        self.client.mark_seen(self.kind, seen).await
    }
}

pub async fn run_watch(
    context: &AppContext,
    kind: ResourceKind,
    interval_secs: Option<u64>,
) -> Result<(), CliError> {
    if interval_secs == Some(0) {
        return Err(CliError::ZeroInterval);
    }
    let interval =
        interval_secs.map_or_else(|| context.config.poll_interval(), Duration::from_secs);

    let source = CollectionRefreshSource {
        client: context.client.clone(),
        kind,
    };
    let mut engine = SyncEngine::new(source, kind, interval);

    // Initial snapshot is user-initiated, so a failure here is fatal.
    engine.refresh_now().await?;
    println!(
        "Watching {kind} every {}s (Ctrl-C to stop)",
        interval.as_secs()
    );

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick fires immediately; the snapshot above already covers it.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => match engine.poll_once().await {
                PollOutcome::Refreshed(reported) => {
                    println!("{kind} changed at {reported}; refreshed");
                }
                PollOutcome::UpToDate => {
                    tracing::debug!(resource = %kind, "up to date");
                }
                PollOutcome::FailedOpen => {
                    println!("Update check failed; refreshed unconditionally");
                }
                PollOutcome::Deferred => {
                    println!("Refresh failed; retrying on the next interval");
                }
            },
            result = tokio::signal::ctrl_c() => {
                result?;
                println!("Stopped.");
                return Ok(());
            }
        }
    }
}
