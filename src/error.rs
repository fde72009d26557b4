use thiserror::Error;

#[derive(Debug, Error)]
pub enum SelectorError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Evaluation error: {0}")]
    Evaluation(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Date parse error: {0}")]
    DateParse(#[from] chrono::ParseError),
}

impl SelectorError {
    pub fn config(msg: impl Into<String>) -> Self {
        SelectorError::Configuration(msg.into())
    }

    pub fn evaluation(msg: impl Into<String>) -> Self {
        SelectorError::Evaluation(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, SelectorError>;

/// Reject scores the search cannot order.
pub fn checked_score(score: f64) -> Result<f64> {
    if score.is_finite() {
        Ok(score)
    } else {
        Err(SelectorError::evaluation(format!(
            "evaluation returned a non-finite score ({})",
            score
        )))
    }
}
