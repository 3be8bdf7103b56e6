mod app;
mod batch;
mod cli;
mod domains;
mod logging;
mod model;
mod output;
mod resolver;

use std::process::ExitCode;

use clap::Parser;

use crate::cli::Cli;

fn main() -> ExitCode {
	let cli = Cli::parse();
	logging::init(cli.quiet);

	let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
		Ok(runtime) => runtime,
		Err(e) => {
			tracing::error!("failed to start runtime: {}", e);
			return ExitCode::FAILURE;
		}
	};

	let config = cli.batch_config();
	let code = runtime.block_on(async {
		let lookup = app::build_lookup(cli.backend, config.timeout);
		let mut stdout = std::io::stdout().lock();
		match app::run(&cli, &config, lookup, &mut stdout).await {
			Ok(()) => ExitCode::SUCCESS,
			Err(e) => {
				tracing::error!("{:#}", e);
				ExitCode::FAILURE
			}
		}
	});

	// Host lookups that outlived their timeout may still be blocking pool
	// threads; their results are already discarded, so don't wait for them.
	runtime.shutdown_background();
	code
}
