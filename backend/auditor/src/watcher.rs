//! Long-running background task that polls the Soroban RPC and writes
//! decoded escrow events to the database.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::db;
use crate::errors::Result;
use crate::rpc;

pub struct WatcherState {
    pub pool: SqlitePool,
    pub config: Config,
    pub client: Client,
}

/// Poll until `shutdown` is cancelled. Poll errors are logged and the loop
/// carries on from the last persisted position.
pub async fn run(state: Arc<WatcherState>, shutdown: CancellationToken) {
    info!("Watcher starting, contract: {}", state.config.contract_id);

    // Load the cursor from the DB; fall back to config start_ledger.
    let last_ledger = match db::get_last_ledger(&state.pool).await {
        Ok(ledger) => ledger,
        Err(e) => {
            warn!("Could not read saved ledger, starting from config: {e}");
            0
        }
    };
    let mut cursor = match db::get_cursor_string(&state.pool).await {
        Ok(cursor) => cursor,
        Err(e) => {
            warn!("Could not read saved cursor: {e}");
            None
        }
    };

    let mut current_ledger = u32::try_from(last_ledger)
        .ok()
        .filter(|l| *l > 0)
        .unwrap_or(state.config.start_ledger);

    info!("Resuming from ledger {current_ledger}");

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            polled = poll_once(
                &state.pool,
                &state.client,
                &state.config,
                current_ledger,
                cursor.as_deref(),
            ) => match polled {
                Ok((next_ledger, next_cursor)) => {
                    current_ledger = next_ledger;
                    cursor = next_cursor;
                }
                Err(e) => error!("Watcher poll error: {e}"),
            },
        }

        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(Duration::from_secs(state.config.poll_interval_secs)) => {}
        }
    }

    info!("Watcher stopped at ledger {current_ledger}");
}

/// Perform a single poll iteration.
///
/// Returns `(next_start_ledger, next_cursor)`.
async fn poll_once(
    pool: &SqlitePool,
    client: &Client,
    config: &Config,
    start_ledger: u32,
    cursor: Option<&str>,
) -> Result<(u32, Option<String>)> {
    let (raw_events, next_cursor, latest_ledger) = rpc::fetch_events(
        client,
        &config.rpc_url,
        &config.contract_id,
        start_ledger,
        cursor,
        config.events_per_page,
    )
    .await?;

    if !raw_events.is_empty() {
        let decoded = rpc::decode_events(&raw_events, &config.contract_id);
        let inserted = db::insert_events(pool, &decoded).await?;
        info!(
            raw = raw_events.len(),
            decoded = decoded.len(),
            inserted,
            "Stored escrow events"
        );
    }

    let last_event_ledger = raw_events.iter().filter_map(|e| e.ledger).max();
    let next_ledger = next_start_ledger(
        start_ledger,
        latest_ledger,
        next_cursor.is_some(),
        last_event_ledger,
    );

    // Persist cursor so restarts are deterministic.
    db::save_cursor(pool, i64::from(next_ledger), next_cursor.as_deref()).await?;

    Ok((next_ledger, next_cursor))
}

/// Where the next poll should start when it has to fall back on a ledger.
///
/// With a cursor the RPC continues the page sequence itself. Without one,
/// a page that returned events restarts from the last event's ledger, since
/// anything past the page limit is still unread; re-delivered events are
/// dropped by the `event_id` constraint. An empty page means the range up to
/// `latest_ledger` has been read.
fn next_start_ledger(
    start_ledger: u32,
    latest_ledger: Option<u64>,
    has_cursor: bool,
    last_event_ledger: Option<u64>,
) -> u32 {
    let resume_from = match (has_cursor, last_event_ledger) {
        (false, Some(last)) => Some(last),
        _ => latest_ledger,
    };
    resume_from
        .and_then(|l| u32::try_from(l).ok())
        .map(|l| l.max(start_ledger))
        .unwrap_or(start_ledger)
}
