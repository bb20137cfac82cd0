#![warn(clippy::all, missing_docs)]

//! Core logic for the pbtui draw entry front end.
//!
//! This crate hosts the segmented entry controller, the client for the
//! prediction/result service, the prediction list model, and configuration
//! handling used by the terminal UI.

pub mod api;
pub mod config;
pub mod entry;
pub mod models;
pub mod predictions;

pub use api::{ApiError, DrawService, PowerballClient};
pub use config::AppConfig;
pub use entry::EntryForm;
pub use models::{DrawResult, Prediction};
pub use predictions::PredictionBook;
