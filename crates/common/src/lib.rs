//! Common utilities and shared types for PAWS.
//!
//! This crate provides foundational components used across all PAWS crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Geography**: Coordinates and haversine distance via [`GeoPoint`]
//!
//! # Example
//!
//! ```no_run
//! use paws_common::{Config, IdGenerator, AppResult};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     let id = id_gen.generate();
//!     println!("Listening on port {} ({id})", config.server.port);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod geo;
pub mod id;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use geo::GeoPoint;
pub use id::IdGenerator;
