//! Storage layer for tableau-sim
//!
//! Only the CLI configuration is persisted; simulated server state lives in
//! memory for the lifetime of the server.

use crate::error::StorageError;

pub mod config;

type Result<T> = std::result::Result<T, StorageError>;
