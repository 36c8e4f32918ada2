//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! environment variables / CLI flags
//!     → schema.rs (clap parse, syntactic checks: port range, booleans)
//!     → validation.rs (semantic checks: route shapes, collisions)
//!     → RelayConfig (validated, immutable)
//!     → shared by value with the server and forwarding engine
//! ```
//!
//! # Design Decisions
//! - Config is resolved once at startup and never reloaded
//! - Every field has a default so an empty environment is a valid setup
//! - Validation separates syntactic (clap) from semantic checks

pub mod schema;
pub mod validation;

pub use schema::{LogFormat, RelayConfig};
pub use validation::{validate_config, ValidationError};
