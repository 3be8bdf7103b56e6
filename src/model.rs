use std::net::IpAddr;
use std::time::Duration;

use thiserror::Error;

/// Default number of concurrent lookups
pub const DEFAULT_THREADS: usize = 10;

/// Default per-lookup timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: f64 = 5.0;

/// Why a single domain failed to resolve.
///
/// The Display strings are what ends up in the `error` column of the output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
	#[error("Empty domain")]
	EmptyDomain,
	#[error("DNS error: {0}")]
	Dns(String),
	#[error("Timeout")]
	Timeout,
	#[error("{0}")]
	Other(String),
}

/// Outcome of resolving one domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionResult {
	/// Position of the domain in the input list
	pub index: usize,
	pub domain: String,
	pub ip: Option<IpAddr>,
	pub error: Option<ResolutionError>,
}

impl ResolutionResult {
	pub fn resolved(index: usize, domain: impl Into<String>, ip: IpAddr) -> Self {
		Self { index, domain: domain.into(), ip: Some(ip), error: None }
	}

	pub fn failed(index: usize, domain: impl Into<String>, error: ResolutionError) -> Self {
		Self { index, domain: domain.into(), ip: None, error: Some(error) }
	}

	pub fn is_resolved(&self) -> bool {
		self.ip.is_some()
	}
}

/// Results of one batch run, in the order they were collected
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
	results: Vec<ResolutionResult>,
}

impl ResultSet {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn push(&mut self, result: ResolutionResult) {
		self.results.push(result);
	}

	pub fn len(&self) -> usize {
		self.results.len()
	}

	pub fn is_empty(&self) -> bool {
		self.results.is_empty()
	}

	pub fn resolved_count(&self) -> usize {
		self.results.iter().filter(|r| r.is_resolved()).count()
	}

	pub fn iter(&self) -> std::slice::Iter<'_, ResolutionResult> {
		self.results.iter()
	}

	pub fn retain<F>(&mut self, keep: F)
	where
		F: FnMut(&ResolutionResult) -> bool,
	{
		self.results.retain(keep);
	}

	/// Re-sort the collected results by their original input position.
	pub fn sort_by_input_order(&mut self) {
		self.results.sort_by_key(|r| r.index);
	}
}

impl FromIterator<ResolutionResult> for ResultSet {
	fn from_iter<I: IntoIterator<Item = ResolutionResult>>(iter: I) -> Self {
		Self { results: iter.into_iter().collect() }
	}
}

impl<'a> IntoIterator for &'a ResultSet {
	type Item = &'a ResolutionResult;
	type IntoIter = std::slice::Iter<'a, ResolutionResult>;

	fn into_iter(self) -> Self::IntoIter {
		self.results.iter()
	}
}

/// Batch configuration, fixed for the whole run
#[derive(Debug, Clone)]
pub struct BatchConfig {
	pub thread_count: usize,
	pub timeout: Duration,
	pub include_errors: bool,
}

impl BatchConfig {
	/// Build a config, clamping the worker count to at least one.
	pub fn new(thread_count: usize, timeout: Duration, include_errors: bool) -> Self {
		Self {
			thread_count: thread_count.max(1),
			timeout,
			include_errors,
		}
	}
}
