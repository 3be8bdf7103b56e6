use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use crate::batch::{filter_results, run_batch, BatchOutcome};
use crate::cli::{Backend, Cli};
use crate::domains::read_domain_file;
use crate::model::BatchConfig;
use crate::output::write_results;
use crate::resolver::{HickoryLookup, Lookup, SystemLookup};

/// Construct the lookup facility selected on the command line.
pub fn build_lookup(backend: Backend, timeout: Duration) -> Arc<dyn Lookup> {
	match backend {
		Backend::System => Arc::new(SystemLookup),
		Backend::Hickory => Arc::new(HickoryLookup::new(timeout)),
	}
}

/// Load the input, resolve it, and write the formatted results to `out`.
///
/// An unreadable input file is returned as an error before any lookup runs
/// and before anything is written to `out`.
pub async fn run<W: Write>(
	cli: &Cli,
	config: &BatchConfig,
	lookup: Arc<dyn Lookup>,
	out: &mut W,
) -> Result<()> {
	tracing::info!("Resolving domains from: {}", cli.input.display());
	tracing::info!(
		"Threads: {}, Timeout: {}s",
		config.thread_count, config.timeout.as_secs_f64(),
	);

	let domains = read_domain_file(&cli.input)?;

	let mut results = match run_batch(lookup, &domains, config).await {
		BatchOutcome::NoInput => {
			tracing::warn!("No domains found in file");
			Default::default()
		}
		BatchOutcome::Completed(results) => {
			tracing::info!("Resolved {}/{} domains", results.resolved_count(), results.len());
			results
		}
	};

	if !cli.unordered {
		results.sort_by_input_order();
	}
	let results = filter_results(results, config.include_errors);

	write_results(out, &results, cli.format, cli.ip_only)?;
	out.flush()?;
	Ok(())
}
