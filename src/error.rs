use reqwest::StatusCode;
use thiserror::Error;

/// Failures the edge scan can report to the operator.
///
/// Only `MissingCredential` blocks a run. The retrieval variants are raised
/// per league and the pipeline skips that league and keeps going.
#[derive(Debug, Error)]
pub enum EdgeError {
    #[error("no Odds API key: paste one into the panel or set ODDS_API_KEY")]
    MissingCredential,

    #[error("failed to reach the Odds API for {league}: {source}")]
    Request {
        league: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Odds API returned {status} for {league}")]
    Status { league: String, status: StatusCode },

    #[error("failed to decode the odds board for {league}: {source}")]
    Decode {
        league: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl EdgeError {
    /// True for the per-league failures that the pipeline skips over.
    pub fn is_retrieval(&self) -> bool {
        matches!(
            self,
            EdgeError::Request { .. } | EdgeError::Status { .. } | EdgeError::Decode { .. }
        )
    }
}
