//! Path normalization and containment checks

use std::path::{Component, Path, PathBuf};

/// Make a path absolute and fold `.` and `..` components lexically
///
/// Relative paths are joined onto the current directory. Symlinks are not
/// resolved, and `..` at the root stays at the root. If the current directory
/// cannot be determined the path is folded as given.
pub fn normalize_path(path: &Path) -> PathBuf {
	let joined = if path.is_absolute() {
		path.to_path_buf()
	} else {
		match std::env::current_dir() {
			Ok(cwd) => cwd.join(path),
			Err(_) => path.to_path_buf(),
		}
	};

	let mut out = PathBuf::new();
	for component in joined.components() {
		match component {
			Component::Prefix(p) => out.push(p.as_os_str()),
			Component::RootDir => out.push(Component::RootDir.as_os_str()),
			Component::CurDir => {}
			Component::ParentDir => {
				// pop() refuses to remove the root, so "/.." folds to "/"
				if !out.pop() && !out.has_root() {
					out.push("..");
				}
			}
			Component::Normal(name) => out.push(name),
		}
	}
	out
}

/// Check if path is within a root directory
///
/// Component-wise: `/proj/src` contains `/proj/src/a.rs` and itself, but not
/// `/proj/srcfoo/a.rs`.
pub fn is_path_within_root(path: &Path, root: &Path) -> bool {
	path.starts_with(root)
}

/// Swap the `from` prefix of `path` for `to`
///
/// Returns `None` when `path` is not under `from`.
pub fn rebase_path(path: &Path, from: &Path, to: &Path) -> Option<PathBuf> {
	let rest = path.strip_prefix(from).ok()?;
	if rest.as_os_str().is_empty() {
		Some(to.to_path_buf())
	} else {
		Some(to.join(rest))
	}
}


// vim: ts=4
