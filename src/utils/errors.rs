use thiserror::Error;

/// Reasons an embedded chart payload is rejected
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PayloadError {
    #[error("Invalid JSON: {0}")]
    Syntax(String),
    #[error("Not a chart payload (type = {0:?})")]
    WrongType(String),
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("Unknown period: '{0}'")]
    UnknownPeriod(String),
    #[error("Schema mismatch: {0}")]
    Schema(String),
}

/// Chart rendering errors
#[derive(Debug, Error)]
pub enum ChartError {
    /// Payload that never went through extraction and breaks its invariants
    #[error("Invalid chart payload: {0}")]
    InvalidPayload(String),
    #[error("Failed to draw chart: {0}")]
    Drawing(String),
    #[error("Chart file error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),
    #[error("Invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
}

/// Reduce an error string to something safe to show in a chat embed
///
/// Drops a leading ❌ marker (the dispatcher adds its own) and caps the
/// length at what fits comfortably in an embed description.
pub fn extract_clean_error(error_msg: &str) -> String {
    const MAX_LEN: usize = 300;

    let trimmed = error_msg.trim().trim_start_matches('❌').trim();
    if trimmed.chars().count() <= MAX_LEN {
        return trimmed.to_string();
    }
    let mut clipped: String = trimmed.chars().take(MAX_LEN).collect();
    clipped.push('…');
    clipped
}
