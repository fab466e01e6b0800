//! Common utilities and shared types for aduan.
//!
//! This crate provides foundational components used across all aduan crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based identifiers via [`IdGenerator`]
//! - **Telemetry**: Tracing subscriber setup via [`init_tracing`]
//!
//! # Example
//!
//! ```no_run
//! use aduan_common::{Config, IdGenerator, AppResult, init_tracing};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config.logging)?;
//!     let id = IdGenerator::new().generate_complaint_id();
//!     tracing::info!(%id, "Generated complaint ID");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;
pub mod telemetry;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use telemetry::init_tracing;
