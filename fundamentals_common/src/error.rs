//! Error types shared by the fetch and score binaries.
//!
//! The `FundamentalsError` enum covers the whole failure taxonomy of a run:
//! authentication, per-symbol fetch and parse failures, invalid symbols and
//! the ambient I/O and JSON errors, so every crate propagates a single type.
use std::io;

use thiserror::Error;

/// Unified error type shared by the library and both binaries.
#[derive(Error, Debug)]
pub enum FundamentalsError {
    /// Token endpoint unreachable, rejected the request, or returned an empty token.
    #[error("Auth error: {0}")]
    Auth(String),

    /// Non-recoverable HTTP status for one symbol, or the retry budget ran out.
    ///
    /// `status` is the last observed HTTP status, `None` when the last failure
    /// happened below HTTP (connect, timeout).
    #[error("Fetch failed for {symbol}: {reason}")]
    Fetch {
        /// Symbol whose fetch failed.
        symbol: String,
        /// Last observed HTTP status, if any.
        status: Option<u16>,
        /// Human-readable reason, e.g. `503 Service Unavailable`.
        reason: String,
    },

    /// The payload lacks the `quoteSummary.result` wrapper.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Blank or placeholder symbol text; no request is made for it.
    #[error("Invalid symbol: {0:?}")]
    InvalidSymbol(String),

    /// Low-level HTTP failure (connect, timeout, body read).
    #[error("Transport error: {0}")]
    Transport(String),

    /// I/O error while reading or writing table files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),

    /// Malformed input table or other validation failure.
    #[error("Format error: {0}")]
    Format(String),
}

impl FundamentalsError {
    /// Last observed HTTP status carried by a `Fetch` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            FundamentalsError::Fetch { status, .. } => *status,
            _ => None,
        }
    }

    /// `true` for errors that only invalidate the current symbol.
    ///
    /// `Auth` is reported as not per-symbol; the orchestrator decides whether
    /// it is fatal based on whether a token was ever acquired.
    pub fn is_per_symbol(&self) -> bool {
        matches!(
            self,
            FundamentalsError::Fetch { .. }
                | FundamentalsError::Parse(_)
                | FundamentalsError::InvalidSymbol(_)
                | FundamentalsError::Transport(_)
                | FundamentalsError::SerdeJson(_)
        )
    }
}

impl From<reqwest::Error> for FundamentalsError {
    fn from(err: reqwest::Error) -> Self {
        FundamentalsError::Transport(err.to_string())
    }
}
