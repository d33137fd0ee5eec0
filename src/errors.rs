use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("TRANSPORT: {0}")]
    Transport(String),
    #[error("DECODE: {0}")]
    Decode(String),
    #[error("EMPTY_DATASET: {0}")]
    EmptyDataset(String),
    #[error("PERMISSION_REQUIRED: {0}")]
    PermissionRequired(String),
    #[error("CONFIG_INVALID: {0}")]
    Config(String),
    #[error("IO_FAILURE: {0}")]
    Io(String),
    #[error("INTERNAL: {0}")]
    Internal(String),
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_decode() {
            Self::Decode(value.to_string())
        } else {
            Self::Transport(value.to_string())
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::{AppError, AppResult};

    fn read_missing_file(path: &std::path::Path) -> AppResult<String> {
        Ok(std::fs::read_to_string(path)?)
    }

    fn parse_record_count(body: &str) -> AppResult<usize> {
        let values: Vec<serde_json::Value> = serde_json::from_str(body)?;
        Ok(values.len())
    }

    #[test]
    fn io_errors_convert_to_io_failures() {
        let temp = tempfile::tempdir().expect("temp dir");
        let error = read_missing_file(&temp.path().join("absent")).expect_err("missing file");
        assert!(matches!(error, AppError::Io(_)));
        assert!(error.to_string().starts_with("IO_FAILURE: "));
    }

    #[test]
    fn json_errors_convert_to_decode_failures() {
        let error = parse_record_count("{not json").expect_err("invalid json");
        assert!(matches!(error, AppError::Decode(_)));
        assert_eq!(parse_record_count("[1,2]").expect("array"), 2);
    }
}
