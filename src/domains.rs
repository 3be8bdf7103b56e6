use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// The input list could not be loaded
#[derive(Debug, Error)]
pub enum InputError {
	#[error("File not found: {}", .0.display())]
	NotFound(PathBuf),
	#[error("Error reading file '{}': {}", .path.display(), .source)]
	Unreadable {
		path: PathBuf,
		#[source]
		source: io::Error,
	},
}

/// Split file content into domains, one per line.
///
/// Surrounding whitespace is trimmed; blank lines and lines starting with
/// '#' are skipped.
pub fn parse_domains(content: &str) -> Vec<String> {
	content.lines()
		.map(|line| line.trim())
		.filter(|line| !line.is_empty() && !line.starts_with('#'))
		.map(String::from)
		.collect()
}

/// Read domains from a file, one per line.
pub fn read_domain_file(path: &Path) -> Result<Vec<String>, InputError> {
	let content = std::fs::read_to_string(path).map_err(|e| {
		if e.kind() == io::ErrorKind::NotFound {
			InputError::NotFound(path.to_path_buf())
		} else {
			InputError::Unreadable { path: path.to_path_buf(), source: e }
		}
	})?;
	Ok(parse_domains(&content))
}
