// Server-Sent Events plumbing for pushing snapshot updates to clients
use std::convert::Infallible;
use std::sync::Arc;

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use crate::domain::snapshot::Snapshot;

/// Turns a broadcast receiver of snapshots into an SSE response. Every
/// update is sent as a `data` event carrying the truncated snapshot, the
/// same payload the initial `/api/all` request returns.
pub fn snapshot_events(
    mut receiver: broadcast::Receiver<Arc<Snapshot>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = async_stream::stream! {
        let mut event_id: u64 = 0;
        loop {
            match receiver.recv().await {
                Ok(snapshot) => {
                    event_id += 1;
                    match Event::default()
                        .event("data")
                        .id(event_id.to_string())
                        .json_data(snapshot.truncated())
                    {
                        Ok(event) => yield Ok(event),
                        Err(e) => tracing::error!("serializing snapshot event failed: {}", e),
                    }
                }
                // A slow client only ever needs the latest snapshot, so
                // skipped intermediate updates are fine.
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!("SSE client lagged, skipped {} updates", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    };
    Sse::new(stream).keep_alive(KeepAlive::default())
}
