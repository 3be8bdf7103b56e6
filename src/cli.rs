use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::model::{BatchConfig, DEFAULT_THREADS, DEFAULT_TIMEOUT_SECS};
use crate::output::OutputFormat;

/// Name resolution backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
	/// Host resolver (getaddrinfo)
	System,
	/// hickory stub resolver using the system nameservers
	Hickory,
}

/// Bulk DNS resolution utility
#[derive(Parser, Debug)]
#[command(name = "resolveip")]
#[command(about = "Resolve domain names from a file to IP addresses")]
#[command(after_help = "\
Examples:
  resolveip domains.txt                  # Basic resolution
  resolveip domains.txt --ip-only        # Output IPs only
  resolveip domains.txt -f json          # JSON output
  resolveip domains.txt -t 20 -T 3       # 20 threads, 3s timeout")]
pub struct Cli {
	/// File containing domains to resolve (one per line)
	pub input: PathBuf,

	/// Output format
	#[arg(short = 'f', long = "format", value_enum, default_value = "plain")]
	pub format: OutputFormat,

	/// Output only IP addresses (or - for failures)
	#[arg(long = "ip-only")]
	pub ip_only: bool,

	/// Include failed resolutions in output
	#[arg(short = 'e', long = "errors")]
	pub errors: bool,

	/// Number of concurrent lookups
	#[arg(short = 't', long = "threads", default_value_t = DEFAULT_THREADS)]
	pub threads: usize,

	/// Resolution timeout in seconds
	#[arg(short = 'T', long = "timeout", default_value_t = DEFAULT_TIMEOUT_SECS, value_parser = parse_timeout)]
	pub timeout: f64,

	/// Name resolution backend
	#[arg(short = 'b', long = "backend", value_enum, default_value = "system")]
	pub backend: Backend,

	/// Emit results in completion order instead of input order
	#[arg(long = "unordered")]
	pub unordered: bool,

	/// Suppress informational messages
	#[arg(short = 'q', long = "quiet")]
	pub quiet: bool,
}

impl Cli {
	pub fn batch_config(&self) -> BatchConfig {
		BatchConfig::new(self.threads, Duration::from_secs_f64(self.timeout), self.errors)
	}
}

fn parse_timeout(s: &str) -> Result<f64, String> {
	let secs: f64 = s.parse().map_err(|_| format!("'{}' is not a number", s))?;
	match Duration::try_from_secs_f64(secs) {
		Ok(d) if !d.is_zero() => Ok(secs),
		_ => Err(format!("timeout must be a positive number of seconds, got {}", s)),
	}
}
