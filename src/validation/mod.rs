//! Validation helpers
//!
//! - Path normalization and containment (`path`)
//! - Mapping and configuration invariants (`config`)

pub mod config;
pub mod path;

pub use config::*;
pub use path::*;

use crate::error::SyncError;

/// Trait for validatable types
pub trait Validator {
	/// Returns Ok(()) if valid, the first violated invariant otherwise
	fn validate(&self) -> Result<(), SyncError>;
}

// vim: ts=4
