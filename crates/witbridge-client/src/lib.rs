//! witbridge-client: The work item access layer.
//!
//! Translates high-level intents (search, fetch, create, update, raw WIQL)
//! into authenticated calls against the remote tracking service's
//! `/_apis/wit` REST endpoints. One `WitClient` is built from a
//! `ClientConfig` and shared immutably across all operations.

pub mod client;
pub mod config;
pub mod error;

pub use client::{ChunkFailure, HydrateOutcome, UpdateOutcome, WitClient, BATCH_CHUNK_SIZE};
pub use config::ClientConfig;
pub use error::{ClientError, Result};
