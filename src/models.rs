use crate::numeric::{format_js_number, parse_metric};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A viewership metric as the collector sends it: a plain number, a
/// separator-formatted string such as `"12,345"`, or nothing at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
    #[default]
    Missing,
}

impl MetricValue {
    /// Numeric value used for ordering. Unparseable text and missing values
    /// yield `NaN`.
    pub fn to_number(&self) -> f64 {
        match self {
            Self::Number(value) => *value,
            Self::Text(text) => parse_metric(text),
            Self::Missing => f64::NAN,
        }
    }

    /// Text form used by exports and display formatting.
    pub fn to_text(&self) -> String {
        match self {
            Self::Number(value) => format_js_number(*value),
            Self::Text(text) => text.clone(),
            Self::Missing => String::new(),
        }
    }
}

impl From<f64> for MetricValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for MetricValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(rename = "_id", alias = "id", deserialize_with = "deserialize_record_id")]
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub average_viewers: MetricValue,
    #[serde(default)]
    pub peak_viewers: MetricValue,
    #[serde(default)]
    pub hours_watched: MetricValue,
    #[serde(rename = "__v", default, skip_serializing_if = "Option::is_none")]
    pub revision: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Record {
    pub fn new(
        id: impl Into<String>,
        username: impl Into<String>,
        average_viewers: impl Into<MetricValue>,
        peak_viewers: impl Into<MetricValue>,
        hours_watched: impl Into<MetricValue>,
    ) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            average_viewers: average_viewers.into(),
            peak_viewers: peak_viewers.into(),
            hours_watched: hours_watched.into(),
            revision: None,
            updated_at: None,
        }
    }

    /// Metric column for a numeric sort key; `None` for `username`.
    pub fn metric(&self, key: SortKey) -> Option<&MetricValue> {
        match key {
            SortKey::Username => None,
            SortKey::AverageViewers => Some(&self.average_viewers),
            SortKey::PeakViewers => Some(&self.peak_viewers),
            SortKey::HoursWatched => Some(&self.hours_watched),
        }
    }
}

fn deserialize_record_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(value) => Ok(value),
        serde_json::Value::Number(value) => Ok(value.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "record id must be a string or number, got {}",
            other
        ))),
    }
}

/// The full record set as last received from the collector.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    records: Vec<Record>,
}

impl Snapshot {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl From<Vec<Record>> for Snapshot {
    fn from(records: Vec<Record>) -> Self {
        Self::new(records)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    Username,
    AverageViewers,
    PeakViewers,
    HoursWatched,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [
        SortKey::Username,
        SortKey::AverageViewers,
        SortKey::PeakViewers,
        SortKey::HoursWatched,
    ];

    /// Field name as it appears on the wire and in export headers.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::AverageViewers => "averageViewers",
            Self::PeakViewers => "peakViewers",
            Self::HoursWatched => "hoursWatched",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub search_term: String,
    pub sort_key: SortKey,
    pub sort_direction: SortDirection,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            search_term: String::new(),
            sort_key: SortKey::Username,
            sort_direction: SortDirection::Ascending,
        }
    }
}

impl ViewState {
    /// Column header click: the active ascending column flips to descending,
    /// anything else selects `key` ascending.
    pub fn request_sort(&mut self, key: SortKey) {
        let is_ascending = self.sort_key == key && self.sort_direction == SortDirection::Ascending;
        self.sort_direction = if is_ascending {
            SortDirection::Descending
        } else {
            SortDirection::Ascending
        };
        self.sort_key = key;
    }
}

/// One table row ready for display, metrics formatted with separators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayRow {
    pub id: String,
    pub username: String,
    pub average_viewers: String,
    pub peak_viewers: String,
    pub hours_watched: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchOutcome {
    pub applied: bool,
    pub record_count: usize,
    pub last_refreshed: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptedResponse {
    pub accepted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResponse {
    pub path: String,
    pub row_count: usize,
    pub warning: Option<String>,
}
