//!
//! Fundamentals fetching and population-relative scoring.
//!
//! This crate aggregates:
//! - `error`: unified error type `FundamentalsError` used across the workspace.
//! - `result`: handy `Result<T, FundamentalsError>` alias.
//! - `metric`: static metric specifications (direction, transform, payload path).
//! - `payload`: total metric extraction from quote summary payloads.
//! - `scoring`: batch percentile scoring with average-rank ties.
//! - `client`: authenticated quote client with retry and token refresh.
//! - `symbols`: symbol validation and symbol-list parsing.
//! - `table`: the batch table and its JSON row format.
//! - `ranking`: blended ranking across score columns.
//! - `net`: quote service endpoints and request constants.
#![warn(missing_docs)]
pub mod client;
pub mod error;
pub mod metric;
pub mod net;
pub mod payload;
pub mod ranking;
pub mod result;
pub mod scoring;
pub mod symbols;
pub mod table;

pub use client::QuoteClient;
pub use error::FundamentalsError;
pub use result::Result;
pub use table::{Security, Table};
