//! Resolution policy enums
//!
//! Each enum parses from the CLI/config spelling via `FromStr`, prints back
//! through `Display`, and serializes in kebab-case.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// MATCH POLICY
// ============================================================================

/// Which mapping wins when several mapping sources contain the same path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum MatchPolicy {
	/// Longest source prefix wins; ties go to the earlier mapping (default)
	#[default]
	MostSpecific,

	/// First matching mapping in configuration order
	FirstMatch,

	/// Last matching mapping in configuration order (legacy behavior)
	LastMatch,
}

impl FromStr for MatchPolicy {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"most-specific" | "longest" => Ok(Self::MostSpecific),
			"first-match" | "first" => Ok(Self::FirstMatch),
			"last-match" | "last" | "legacy" => Ok(Self::LastMatch),
			_ => Err(format!(
				"Unknown match policy: {}. Valid options: most-specific, first-match, last-match",
				s
			)),
		}
	}
}

impl std::fmt::Display for MatchPolicy {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::MostSpecific => write!(f, "most-specific"),
			Self::FirstMatch => write!(f, "first-match"),
			Self::LastMatch => write!(f, "last-match"),
		}
	}
}

// ============================================================================
// BATCH POLICY
// ============================================================================

/// How a batch of paths is judged syncable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BatchPolicy {
	/// Syncable if any path in the batch is syncable (default)
	#[default]
	AnyPath,

	/// Only the last path of the batch decides (legacy behavior)
	LastPath,
}

impl FromStr for BatchPolicy {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_lowercase().as_str() {
			"any-path" | "any" => Ok(Self::AnyPath),
			"last-path" | "last" | "legacy" => Ok(Self::LastPath),
			_ => Err(format!("Unknown batch policy: {}. Valid options: any-path, last-path", s)),
		}
	}
}

impl std::fmt::Display for BatchPolicy {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::AnyPath => write!(f, "any-path"),
			Self::LastPath => write!(f, "last-path"),
		}
	}
}


// vim: ts=4
