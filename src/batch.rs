use std::sync::Arc;

use tokio::sync::{mpsc, Semaphore};

use crate::model::{BatchConfig, ResolutionError, ResolutionResult, ResultSet};
use crate::resolver::{resolve, Lookup};

/// Outcome of a batch run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
	/// No domains were supplied; nothing was resolved
	NoInput,
	/// Every domain was attempted, results in completion order
	Completed(ResultSet),
}

/// Resolve every domain concurrently.
///
/// At most `config.thread_count` lookups run at once, counting lookups that
/// timed out but are still running; the remaining units wait for a permit. Each finished lookup is sent to a single collector, so
/// results arrive in completion order. Returns once every unit has finished.
pub async fn run_batch(
	lookup: Arc<dyn Lookup>,
	domains: &[String],
	config: &BatchConfig,
) -> BatchOutcome {
	if domains.is_empty() {
		return BatchOutcome::NoInput;
	}

	let semaphore = Arc::new(Semaphore::new(config.thread_count.max(1)));
	let (tx, mut rx) = mpsc::unbounded_channel::<ResolutionResult>();

	let mut handles = Vec::with_capacity(domains.len());
	for (index, domain) in domains.iter().enumerate() {
		let sem = semaphore.clone();
		let lookup = lookup.clone();
		let tx = tx.clone();
		let domain = domain.clone();
		let timeout = config.timeout;

		handles.push((index, tokio::spawn(async move {
			// The semaphore is never closed, so acquire cannot fail
			let Ok(permit) = sem.acquire_owned().await else {
				return;
			};
			// The lookup keeps the permit until it has really finished, even
			// past the timeout
			let result = resolve(lookup.as_ref(), permit, index, &domain, timeout).await;
			// Receiver outlives every task
			let _ = tx.send(result);
		})));
	}
	// Only the task clones remain; the channel closes when the last task ends
	drop(tx);

	let mut results = ResultSet::new();
	while let Some(result) = rx.recv().await {
		results.push(result);
	}

	// A task that panicked never reported back; record it so the batch still
	// yields one result per input domain.
	for (index, handle) in handles {
		if let Err(e) = handle.await {
			tracing::warn!("resolution task for '{}' failed: {}", domains[index].trim(), e);
			results.push(ResolutionResult::failed(
				index,
				domains[index].trim(),
				ResolutionError::Other(format!("task failed: {}", e)),
			));
		}
	}

	BatchOutcome::Completed(results)
}

/// Keep failed resolutions only when errors were requested.
pub fn filter_results(mut results: ResultSet, include_errors: bool) -> ResultSet {
	if !include_errors {
		results.retain(|r| r.is_resolved());
	}
	results
}

#[cfg(test)]
mod tests {
	use std::collections::HashMap;
	use std::sync::atomic::Ordering;
	use std::time::Duration;

	use super::*;
	use crate::resolver::mock::{BlockingLookup, MockLookup};
	use crate::resolver::{LookupError, Lookups, Slot};

	impl BatchOutcome {
		fn into_results(self) -> ResultSet {
			match self {
				BatchOutcome::NoInput => ResultSet::new(),
				BatchOutcome::Completed(results) => results,
			}
		}
	}

	fn domains(list: &[&str]) -> Vec<String> {
		list.iter().map(|s| s.to_string()).collect()
	}

	fn config(threads: usize, include_errors: bool) -> BatchConfig {
		BatchConfig::new(threads, Duration::from_secs(2), include_errors)
	}

	fn mixed_lookup() -> MockLookup {
		MockLookup::new()
			.answer("example.com", "93.184.216.34")
			.answer("example.org", "93.184.216.35")
			.answer("slow.example", "192.0.2.1")
			.delay("slow.example", Duration::from_millis(30))
			.fail("broken.example", LookupError::Other("socket closed".to_string()))
	}

	#[tokio::test]
	async fn test_empty_input_signals_no_input() {
		let lookup = Arc::new(MockLookup::new());
		let outcome = run_batch(lookup.clone(), &[], &config(4, true)).await;
		assert_eq!(outcome, BatchOutcome::NoInput);
		assert!(outcome.into_results().is_empty());
		assert_eq!(lookup.call_count(), 0);
	}

	#[tokio::test]
	async fn test_one_result_per_domain() {
		let input = domains(&[
			"example.com", "nope.invalid", "slow.example",
			"broken.example", "example.org", "",
		]);
		let lookup = Arc::new(mixed_lookup());
		let results = run_batch(lookup.clone(), &input, &config(3, true)).await.into_results();
		assert_eq!(results.len(), input.len());
		assert_eq!(results.resolved_count(), 3);
		// The blank entry never reaches the facility
		assert_eq!(lookup.call_count(), input.len() - 1);

		let filtered = filter_results(results, false);
		assert_eq!(filtered.len(), 3);
		assert!(filtered.iter().all(|r| r.ip.is_some() && r.error.is_none()));
	}

	#[tokio::test]
	async fn test_pool_size_bounds_in_flight() {
		let input: Vec<String> = (0..20).map(|i| format!("host{}.test", i)).collect();
		let mut lookup = MockLookup::new();
		for d in &input {
			lookup = lookup.answer(d, "10.0.0.1").delay(d, Duration::from_millis(10));
		}
		let lookup = Arc::new(lookup);
		let results = run_batch(lookup.clone(), &input, &config(4, true)).await.into_results();
		assert_eq!(results.len(), 20);
		let peak = lookup.max_in_flight.load(Ordering::SeqCst);
		assert!(peak <= 4, "peak in-flight {} exceeds pool size", peak);
		assert!(peak >= 1);
	}

	#[tokio::test]
	async fn test_timed_out_lookups_still_count_against_pool() {
		let input: Vec<String> = (0..8).map(|i| format!("stuck{}.test", i)).collect();
		let lookup = Arc::new(BlockingLookup::new(Duration::from_millis(40)));
		let config = BatchConfig::new(1, Duration::from_millis(10), true);
		let results = run_batch(lookup.clone(), &input, &config).await.into_results();
		assert_eq!(results.len(), 8);
		assert!(results.iter().all(|r| r.error == Some(ResolutionError::Timeout)));
		assert_eq!(lookup.peak(), 1, "blocking lookups overlapped past their timeout");
	}

	#[tokio::test]
	async fn test_thread_count_does_not_change_results() {
		let input = domains(&[
			"example.com", "nope.invalid", "slow.example",
			"broken.example", "example.org", "other.invalid",
		]);
		let mut single = run_batch(Arc::new(mixed_lookup()), &input, &config(1, true))
			.await
			.into_results();
		let mut wide = run_batch(Arc::new(mixed_lookup()), &input, &config(50, true))
			.await
			.into_results();
		single.sort_by_input_order();
		wide.sort_by_input_order();
		assert_eq!(single, wide);
	}

	#[tokio::test]
	async fn test_completion_order_and_input_order() {
		let input = domains(&["slow.example", "example.com"]);
		let mut results = run_batch(Arc::new(mixed_lookup()), &input, &config(2, true))
			.await
			.into_results();
		// The fast lookup finishes first
		let collected: Vec<&str> = results.iter().map(|r| r.domain.as_str()).collect();
		assert_eq!(collected, vec!["example.com", "slow.example"]);
		results.sort_by_input_order();
		let ordered: Vec<&str> = results.iter().map(|r| r.domain.as_str()).collect();
		assert_eq!(ordered, vec!["slow.example", "example.com"]);
	}

	#[tokio::test]
	async fn test_failing_domains_scenario() {
		let input = domains(&["a.invalid", "", "  b.invalid  "]);
		let lookup = Arc::new(MockLookup::new());
		let mut results = run_batch(lookup.clone(), &input, &config(10, true))
			.await
			.into_results();
		results.sort_by_input_order();
		assert_eq!(lookup.call_count(), 2);

		let by_domain: HashMap<&str, &ResolutionResult> = results.iter()
			.map(|r| (r.domain.as_str(), r))
			.collect();
		assert!(matches!(by_domain["a.invalid"].error, Some(ResolutionError::Dns(_))));
		assert!(matches!(by_domain["b.invalid"].error, Some(ResolutionError::Dns(_))));
		assert_eq!(by_domain[""].error, Some(ResolutionError::EmptyDomain));

		assert!(filter_results(results, false).is_empty());
	}

	struct PanickingLookup;

	impl Lookup for PanickingLookup {
		fn lookup(&self, host: String, _slot: Slot) -> Lookups {
			Box::pin(async move {
				if host == "panic.test" {
					panic!("lookup exploded");
				}
				Ok(vec!["10.1.1.1".parse().unwrap()])
			})
		}
	}

	#[tokio::test]
	async fn test_panicking_task_recorded_as_error() {
		let input = domains(&["ok.test", "panic.test"]);
		let mut results = run_batch(Arc::new(PanickingLookup), &input, &config(2, true))
			.await
			.into_results();
		results.sort_by_input_order();
		assert_eq!(results.len(), 2);
		let items: Vec<&ResolutionResult> = results.iter().collect();
		assert!(items[0].ip.is_some());
		assert_eq!(items[1].domain, "panic.test");
		assert!(matches!(items[1].error, Some(ResolutionError::Other(_))));
	}

	#[test]
	fn test_filter_keeps_everything_with_errors() {
		let results: ResultSet = vec![
			ResolutionResult::failed(0, "a.invalid", ResolutionError::Timeout),
			ResolutionResult::resolved(1, "example.com", "93.184.216.34".parse().unwrap()),
		].into_iter().collect();
		assert_eq!(filter_results(results.clone(), true), results);
		let only_ok = filter_results(results, false);
		assert_eq!(only_ok.len(), 1);
	}
}
