use crate::errors::{AppError, AppResult};
use crate::models::{ExportResponse, MetricValue, Record, Snapshot, SortKey};
use std::path::Path;

pub const EXPORT_FILE_NAME: &str = "streamers.csv";

const EXPORT_COLUMNS: [SortKey; 4] = SortKey::ALL;

/// Header line of every export, also the whole export of an empty snapshot.
pub fn header_line() -> String {
    EXPORT_COLUMNS
        .iter()
        .map(|column| column.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

/// Serializes the whole snapshot, in snapshot order, as CSV. Values are always
/// quoted and embedded quotes are backslash-escaped (`Jo"e` becomes
/// `"Jo\"e"`), which downstream consumers of this file rely on. Rows are joined
/// by `\n` with no trailing newline.
pub fn encode(snapshot: &Snapshot) -> String {
    let mut lines = Vec::with_capacity(snapshot.len() + 1);
    lines.push(header_line());
    lines.extend(snapshot.records().iter().map(encode_record));
    lines.join("\n")
}

fn encode_record(record: &Record) -> String {
    EXPORT_COLUMNS
        .iter()
        .map(|column| quote(&column_text(record, *column)))
        .collect::<Vec<_>>()
        .join(",")
}

fn column_text(record: &Record, column: SortKey) -> String {
    record
        .metric(column)
        .map(MetricValue::to_text)
        .unwrap_or_else(|| record.username.clone())
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\\\""))
}

/// Writes the encoded snapshot to `streamers.csv` under `export_dir`. An empty
/// snapshot still produces the header-only file, reported as a warning.
pub async fn write_export(export_dir: &Path, snapshot: &Snapshot) -> AppResult<ExportResponse> {
    tokio::fs::create_dir_all(export_dir).await?;

    let output_path = export_dir.join(EXPORT_FILE_NAME);
    tokio::fs::write(&output_path, encode(snapshot)).await?;

    let warning = snapshot.is_empty().then(|| {
        AppError::EmptyDataset("collector returned no records; exported header only".to_string())
            .to_string()
    });

    Ok(ExportResponse {
        path: output_path.to_string_lossy().to_string(),
        row_count: snapshot.len(),
        warning,
    })
}

#[cfg(test)]
mod tests {
    use super::{encode, header_line, write_export, EXPORT_FILE_NAME};
    use crate::errors::AppError;
    use crate::models::{MetricValue, Record, Snapshot};

    #[test]
    fn encodes_header_and_quoted_rows_in_snapshot_order() {
        let snapshot = Snapshot::new(vec![
            Record::new("1", "Bravo", "2,000", "3,000", "10"),
            Record::new("2", "alpha", 500.0, 600.0, 5.5),
        ]);
        let csv = encode(&snapshot);
        assert_eq!(
            csv,
            "username,averageViewers,peakViewers,hoursWatched\n\
             \"Bravo\",\"2,000\",\"3,000\",\"10\"\n\
             \"alpha\",\"500\",\"600\",\"5.5\""
        );
    }

    #[test]
    fn escapes_quotes_with_backslash() {
        let snapshot = Snapshot::new(vec![Record::new("1", "Jo\"e", 1.0, 2.0, 3.0)]);
        let csv = encode(&snapshot);
        let row = csv.lines().nth(1).expect("data row");
        assert!(row.starts_with("\"Jo\\\"e\","));
    }

    #[test]
    fn every_line_has_four_columns() {
        let snapshot = Snapshot::new(vec![
            Record::new("1", "one", 1.0, 2.0, 3.0),
            Record::new("2", "two", "4", "5", "6"),
        ]);
        let csv = encode(&snapshot);
        let mut lines = csv.lines();
        assert_eq!(lines.next().map(|line| line.split(',').count()), Some(4));
        for line in lines {
            assert_eq!(line.matches("\",\"").count(), 3);
            assert!(line.starts_with('"') && line.ends_with('"'));
        }
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn omits_identifier_and_audit_fields() {
        let mut record = Record::new("secret-id", "host", 1.0, 2.0, 3.0);
        record.revision = Some(7);
        record.updated_at = Some("2024-05-01T00:00:00Z".to_string());
        let csv = encode(&Snapshot::new(vec![record]));
        assert!(!csv.contains("secret-id"));
        assert!(!csv.contains("2024-05-01"));
        assert!(!csv.contains("_id"));
    }

    #[test]
    fn missing_metric_exports_as_empty_field() {
        let mut record = Record::new("1", "host", 1.0, 2.0, 3.0);
        record.hours_watched = MetricValue::Missing;
        let csv = encode(&Snapshot::new(vec![record]));
        assert!(csv.ends_with("\"2\",\"\""));
    }

    #[test]
    fn empty_snapshot_encodes_header_only() {
        assert_eq!(encode(&Snapshot::default()), header_line());
    }

    #[tokio::test]
    async fn writes_export_file() {
        let temp = tempfile::tempdir().expect("temp dir");
        let export_dir = temp.path().join("exports");
        let snapshot = Snapshot::new(vec![Record::new("1", "host", 1.0, 2.0, 3.0)]);

        let response = write_export(&export_dir, &snapshot).await.expect("write export");
        assert_eq!(response.row_count, 1);
        assert!(response.warning.is_none());
        assert!(response.path.ends_with(EXPORT_FILE_NAME));

        let written = std::fs::read_to_string(&response.path).expect("read export");
        assert_eq!(written, encode(&snapshot));
    }

    #[tokio::test]
    async fn unwritable_export_dir_is_an_io_failure() {
        let temp = tempfile::tempdir().expect("temp dir");
        let blocker = temp.path().join("exports");
        std::fs::write(&blocker, "not a directory").expect("write blocker file");

        let error = write_export(&blocker, &Snapshot::default())
            .await
            .expect_err("a file is in the way");
        assert!(matches!(error, AppError::Io(_)), "got {}", error);
    }

    #[tokio::test]
    async fn empty_export_carries_warning() {
        let temp = tempfile::tempdir().expect("temp dir");
        let response = write_export(temp.path(), &Snapshot::default())
            .await
            .expect("write export");
        assert_eq!(response.row_count, 0);
        let warning = response.warning.expect("empty dataset warning");
        assert!(warning.starts_with("EMPTY_DATASET"));
    }
}
