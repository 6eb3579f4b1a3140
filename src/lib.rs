//! # tableau-sim
//!
//! In-memory simulation of the Tableau Server REST API for exercising
//! migration clients without a real server.
//!
//! The simulator keeps every entity (users, groups, projects, workbooks,
//! views, data sources, schedules, subscriptions, permissions) in memory and
//! answers requests in the `tsResponse` XML or JSON dialect the real server
//! uses, including its error envelopes and paging.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tableau_sim::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> tableau_sim::Result<()> {
//!     let server = SimulatedServer::start(SimulatorConfig::default()).await;
//!     seed_demo(server.data());
//!
//!     // Point a client at server.uri() and sign in as "admin".
//!     println!("{}", server.site_uri());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │          Server Layer               │  wiremock adapter, error arming
//! ├─────────────────────────────────────┤
//! │           Core Layer                │  routes, pipeline, handlers, state
//! ├─────────────────────────────────────┤
//! │            API Layer                │  DTOs, envelopes, XML/JSON codec
//! ├─────────────────────────────────────┤
//! │   Storage / Utils / Display         │  config file, validation, tables
//! └─────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`api`]: Wire types, `tsResponse` envelopes and error documents
//! - [`core`]: Route table, request pipeline, handlers and in-memory state
//! - [`server`]: HTTP front end on top of `wiremock`
//! - [`storage`]: TOML configuration
//! - [`cli`]: The `tableau-sim` command line
//! - [`display`]: Terminal tables
//! - [`error`]: Error hierarchy with severity and troubleshooting hints

pub use error::AppError;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use tableau_sim::prelude::*;
/// ```
pub mod prelude {
    pub use crate::Result;
    pub use crate::error::AppError;

    pub use crate::api::{MediaType, RestError};
    pub use crate::core::routes::RouteId;
    pub use crate::core::seed::seed_demo;
    pub use crate::core::simulator::Simulator;
    pub use crate::core::store::TableauData;
    pub use crate::core::request::{SimulatedRequest, SimulatedResponse};
    pub use crate::server::SimulatedServer;
    pub use crate::storage::config::SimulatorConfig;
    pub use crate::utils::form::MultipartBuilder;
}

/// API layer - wire types and their encoding.
pub mod api;

/// Command-line interface used by the `tableau-sim` binary.
pub mod cli;

/// Core layer - route table, request pipeline, handlers and state.
///
/// - [`core::routes`]: Operation table and path matching
/// - [`core::simulator`]: Request pipeline and error arming
/// - [`core::store`]: In-memory entity state
pub mod core;

/// Display layer - output formatting for the CLI.
pub mod display;

/// Error handling - hierarchical error types with troubleshooting hints.
pub mod error;

/// Server layer - HTTP listener serving the simulator.
pub mod server;

/// Storage layer - configuration persistence.
pub mod storage;

/// Utilities layer - logging, validation and form encoding.
pub mod utils;

pub type Result<T> = std::result::Result<T, AppError>;
