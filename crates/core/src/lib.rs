//! Core business logic for PAWS.
//!
//! Services sit between the HTTP layer and the repositories: they enforce
//! role and ownership guards, drive the report lifecycle and emit
//! notifications as side effects of transitions.

pub mod services;

pub use services::*;
