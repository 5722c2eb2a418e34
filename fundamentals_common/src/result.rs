//! Result type alias shared across the workspace.
//!
//! This module defines a convenient alias that defaults the error type to the
//! common `FundamentalsError`, so functions can simply return `Result<T>`.
use crate::error::FundamentalsError;

/// Workspace-wide `Result` alias with `FundamentalsError` as the default error.
pub type Result<T, E = FundamentalsError> = std::result::Result<T, E>;
