use crate::collector::CollectorSource;
use crate::errors::{AppError, AppResult};
use crate::export::write_export;
use crate::models::{
    AcceptedResponse, DisplayRow, ExportResponse, FetchOutcome, Record, Snapshot, SortKey,
    ViewState,
};
use crate::store::SnapshotStore;
use crate::view::{derive_view, display_rows};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Owns the displayed snapshot and the user's view state and drives the
/// collector on their behalf.
#[derive(Clone)]
pub struct Dashboard {
    collector: Arc<dyn CollectorSource>,
    store: SnapshotStore,
    view_state: Arc<RwLock<ViewState>>,
    export_dir: PathBuf,
}

impl Dashboard {
    pub fn new(collector: Arc<dyn CollectorSource>, export_dir: PathBuf) -> Self {
        Self {
            collector,
            store: SnapshotStore::new(),
            view_state: Arc::new(RwLock::new(ViewState::default())),
            export_dir,
        }
    }

    /// Fetches and, unless a newer fetch already landed, replaces the
    /// snapshot. On failure the current snapshot stays as it was.
    pub async fn fetch_snapshot(&self) -> AppResult<FetchOutcome> {
        let ticket = self.store.begin_fetch();
        let snapshot = match self.collector.fetch_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                tracing::warn!(ticket = ticket.value(), error = %error, "snapshot fetch failed");
                return Err(error);
            }
        };

        let record_count = snapshot.len();
        let applied = self.store.commit(ticket, snapshot, Utc::now()).await;
        if applied {
            tracing::info!(ticket = ticket.value(), record_count, "snapshot applied");
        } else {
            tracing::info!(
                ticket = ticket.value(),
                record_count,
                "discarded response from superseded fetch"
            );
        }

        Ok(FetchOutcome {
            applied,
            record_count,
            last_refreshed: self.store.last_refreshed().await,
        })
    }

    /// Asks the collector to recompute. Local state is never touched.
    pub async fn request_refresh(&self) -> AppResult<AcceptedResponse> {
        match self.collector.request_refresh().await {
            Ok(()) => {
                tracing::info!("collector refresh requested");
                Ok(AcceptedResponse { accepted: true })
            }
            Err(error) => {
                tracing::warn!(error = %error, "collector refresh request failed");
                Err(error)
            }
        }
    }

    /// Records currently on screen, derived from the latest snapshot and
    /// view state on every call.
    pub async fn records(&self) -> Vec<Record> {
        let snapshot = self.store.snapshot().await;
        let view_state = self.view_state.read().await.clone();
        derive_view(&snapshot, &view_state)
    }

    pub async fn view(&self) -> Vec<DisplayRow> {
        display_rows(&self.records().await)
    }

    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.store.snapshot().await
    }

    pub async fn view_state(&self) -> ViewState {
        self.view_state.read().await.clone()
    }

    pub async fn set_search_term(&self, term: &str) -> ViewState {
        let mut view_state = self.view_state.write().await;
        view_state.search_term = term.to_string();
        view_state.clone()
    }

    pub async fn request_sort(&self, key: SortKey) -> ViewState {
        let mut view_state = self.view_state.write().await;
        view_state.request_sort(key);
        view_state.clone()
    }

    pub async fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        self.store.last_refreshed().await
    }

    /// Exports the collector's full data set, fetched fresh. The displayed
    /// snapshot and view state play no part and are left unchanged.
    pub async fn export_csv(&self) -> AppResult<ExportResponse> {
        let snapshot = self.collector.fetch_snapshot().await.map_err(|error| {
            tracing::warn!(error = %error, "export fetch failed");
            error
        })?;
        let response = write_export(&self.export_dir, &snapshot).await?;
        if let Some(warning) = &response.warning {
            tracing::warn!(path = %response.path, warning = %warning, "exported empty data set");
        } else {
            tracing::info!(path = %response.path, rows = response.row_count, "export written");
        }
        Ok(response)
    }

    /// Historical data sits behind a permission nobody can hold yet.
    pub fn request_historical_data(&self) -> AppResult<()> {
        Err(AppError::PermissionRequired(
            "Permissions are required to view historical data".to_string(),
        ))
    }
}
