// src/error.rs
//! Error taxonomy for retrieval and aggregation.
//!
//! Everything here is recovered *inside* the provider or session layer and
//! reduced to an empty/partial output plus a diagnostic log line. The only
//! error that crosses the aggregate entry point is [`ValidationError`].

use thiserror::Error;

/// Internal failure categories for retrieval paths.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Transport-level failure (DNS, connect, timeout, non-success status).
    #[error("network failure: {0}")]
    Network(String),

    /// A fetched document was retrieved but the expected structure is absent.
    #[error("parse failure: {0}")]
    Parse(String),

    /// The browser-automation handle is unusable.
    #[error("session invalid: {0}")]
    SessionInvalid(String),

    /// Well-formed response, nothing relevant extracted.
    #[error("no data found for {0}")]
    NoData(String),

    /// The retrieved document scored too low to be about the query entity.
    #[error("ambiguous entity: {0}")]
    AmbiguousEntity(String),
}

impl ScrapeError {
    /// Short stable label used in log lines and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ScrapeError::Network(_) => "network",
            ScrapeError::Parse(_) => "parse",
            ScrapeError::SessionInvalid(_) => "session_invalid",
            ScrapeError::NoData(_) => "no_data",
            ScrapeError::AmbiguousEntity(_) => "ambiguous_entity",
        }
    }
}

/// Missing required input at the aggregate entry point.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_labels_are_stable() {
        assert_eq!(ScrapeError::Network("x".into()).kind(), "network");
        assert_eq!(ScrapeError::Parse("x".into()).kind(), "parse");
        assert_eq!(
            ScrapeError::SessionInvalid("x".into()).kind(),
            "session_invalid"
        );
        assert_eq!(ScrapeError::NoData("x".into()).kind(), "no_data");
        assert_eq!(
            ScrapeError::AmbiguousEntity("x".into()).kind(),
            "ambiguous_entity"
        );
    }
}
