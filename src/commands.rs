//! Entry points for a presentation shell. Each one forwards to the
//! [`Dashboard`] and flattens errors into client-facing strings.

use crate::dashboard::Dashboard;
use crate::models::{AcceptedResponse, DisplayRow, ExportResponse, FetchOutcome, SortKey, ViewState};
use chrono::{DateTime, Utc};

#[derive(Clone)]
pub struct AppState {
    pub dashboard: Dashboard,
}

pub async fn fetch_streamers(state: &AppState) -> Result<FetchOutcome, String> {
    state.dashboard.fetch_snapshot().await.map_err(to_client_error)
}

pub async fn refresh_streamers(state: &AppState) -> Result<AcceptedResponse, String> {
    state.dashboard.request_refresh().await.map_err(to_client_error)
}

pub async fn list_streamers(state: &AppState) -> Result<Vec<DisplayRow>, String> {
    Ok(state.dashboard.view().await)
}

pub async fn set_search_term(state: &AppState, term: String) -> Result<ViewState, String> {
    Ok(state.dashboard.set_search_term(&term).await)
}

pub async fn request_sort(state: &AppState, key: SortKey) -> Result<ViewState, String> {
    Ok(state.dashboard.request_sort(key).await)
}

pub async fn get_view_state(state: &AppState) -> Result<ViewState, String> {
    Ok(state.dashboard.view_state().await)
}

pub async fn get_last_refreshed(state: &AppState) -> Result<Option<DateTime<Utc>>, String> {
    Ok(state.dashboard.last_refreshed().await)
}

pub async fn export_streamers_csv(state: &AppState) -> Result<ExportResponse, String> {
    state.dashboard.export_csv().await.map_err(to_client_error)
}

pub fn view_historical_data(state: &AppState) -> Result<(), String> {
    state.dashboard.request_historical_data().map_err(to_client_error)
}

pub(crate) fn to_client_error(error: impl std::fmt::Display) -> String {
    error.to_string()
}
