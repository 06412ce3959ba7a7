//! Error types for FileSync operations

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Main error type for mapping and sync operations
#[derive(Debug)]
pub enum SyncError {
	/// Mapping source and destination resolve to the same directory
	InvalidMapping { source: PathBuf, destination: PathBuf },

	/// Directory creation or copy failed
	IoFailure { path: PathBuf, source: io::Error },

	/// Destination is the source file itself (symlinked directory or hard link)
	SameFile { source: PathBuf, destination: PathBuf },

	/// An exclude glob could not be compiled
	InvalidPattern { pattern: String, message: String },

	/// Settings store failure (nested)
	Config(ConfigError),
}

impl SyncError {
	/// Wrap an I/O error together with the path it happened on
	pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
		SyncError::IoFailure { path: path.into(), source }
	}

	/// Path the error refers to, if any
	pub fn path(&self) -> Option<&PathBuf> {
		match self {
			SyncError::InvalidMapping { source, .. } => Some(source),
			SyncError::IoFailure { path, .. } => Some(path),
			SyncError::SameFile { source, .. } => Some(source),
			SyncError::InvalidPattern { .. } | SyncError::Config(_) => None,
		}
	}
}

impl fmt::Display for SyncError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SyncError::InvalidMapping { source, destination } => write!(
				f,
				"Invalid mapping: source {} and destination {} are the same directory",
				source.display(),
				destination.display()
			),
			SyncError::IoFailure { path, source } => {
				write!(f, "I/O failure on {}: {}", path.display(), source)
			}
			SyncError::SameFile { source, destination } => write!(
				f,
				"Refusing to copy {} onto itself (destination {})",
				source.display(),
				destination.display()
			),
			SyncError::InvalidPattern { pattern, message } => {
				write!(f, "Invalid exclude pattern '{}': {}", pattern, message)
			}
			SyncError::Config(e) => write!(f, "Settings error: {}", e),
		}
	}
}

impl Error for SyncError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			SyncError::IoFailure { source, .. } => Some(source),
			SyncError::Config(e) => Some(e),
			_ => None,
		}
	}
}

impl From<ConfigError> for SyncError {
	fn from(e: ConfigError) -> Self {
		SyncError::Config(e)
	}
}

/// Settings store errors
#[derive(Debug)]
pub enum ConfigError {
	/// Failed to read the settings file
	ReadFailed { path: PathBuf, source: io::Error },

	/// Settings file content is not valid
	ParseFailed { path: PathBuf, message: String },

	/// Failed to write the settings file
	WriteFailed { path: PathBuf, source: io::Error },

	/// Failed to serialize settings
	SerializeFailed { message: String },
}

impl fmt::Display for ConfigError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ConfigError::ReadFailed { path, source } => {
				write!(f, "Failed to read {}: {}", path.display(), source)
			}
			ConfigError::ParseFailed { path, message } => {
				write!(f, "Failed to parse {}: {}", path.display(), message)
			}
			ConfigError::WriteFailed { path, source } => {
				write!(f, "Failed to write {}: {}", path.display(), source)
			}
			ConfigError::SerializeFailed { message } => {
				write!(f, "Failed to serialize settings: {}", message)
			}
		}
	}
}

impl Error for ConfigError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			ConfigError::ReadFailed { source, .. } | ConfigError::WriteFailed { source, .. } => {
				Some(source)
			}
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_io_failure_display_and_source() {
		let err = SyncError::io(
			"/deploy/a.txt",
			io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
		);
		assert!(err.to_string().contains("/deploy/a.txt"));
		assert!(err.to_string().contains("denied"));
		assert!(err.source().is_some());
		assert_eq!(err.path(), Some(&PathBuf::from("/deploy/a.txt")));
	}

	#[test]
	fn test_invalid_mapping_display() {
		let err = SyncError::InvalidMapping {
			source: PathBuf::from("/same"),
			destination: PathBuf::from("/same"),
		};
		assert!(err.to_string().contains("same directory"));
		assert!(err.source().is_none());
	}

	#[test]
	fn test_same_file_display() {
		let err = SyncError::SameFile {
			source: PathBuf::from("/proj/a.txt"),
			destination: PathBuf::from("/deploy/a.txt"),
		};
		assert!(err.to_string().contains("onto itself"));
		assert_eq!(err.path(), Some(&PathBuf::from("/proj/a.txt")));
		assert!(err.source().is_none());
	}

	#[test]
	fn test_config_error_nests() {
		let err: SyncError = ConfigError::SerializeFailed { message: "boom".to_string() }.into();
		assert!(matches!(err, SyncError::Config(_)));
		assert!(err.to_string().contains("boom"));
		assert!(err.path().is_none());
	}
}

// vim: ts=4
