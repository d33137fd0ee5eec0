use crate::models::Snapshot;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Issue order of a fetch. Later fetches hold larger tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Default)]
struct StoreState {
    snapshot: Arc<Snapshot>,
    applied_ticket: u64,
    last_refreshed: Option<DateTime<Utc>>,
}

/// Holds the displayed snapshot. A completed fetch replaces it only when no
/// fetch issued after it has already been applied.
#[derive(Clone, Default)]
pub struct SnapshotStore {
    state: Arc<RwLock<StoreState>>,
    next_ticket: Arc<AtomicU64>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Must be taken before the request is sent.
    pub fn begin_fetch(&self) -> FetchTicket {
        FetchTicket(self.next_ticket.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Returns whether `snapshot` became the current one.
    pub async fn commit(
        &self,
        ticket: FetchTicket,
        snapshot: Snapshot,
        accepted_at: DateTime<Utc>,
    ) -> bool {
        let mut state = self.state.write().await;
        if ticket.0 <= state.applied_ticket {
            return false;
        }
        state.snapshot = Arc::new(snapshot);
        state.applied_ticket = ticket.0;
        state.last_refreshed = Some(accepted_at);
        true
    }

    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.state.read().await.snapshot.clone()
    }

    pub async fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.state.read().await.last_refreshed
    }
}
