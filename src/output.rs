use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use crate::model::{ResolutionResult, ResultSet};

/// Output format for the result listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
	Plain,
	Csv,
	Json,
}

/// Write results as plain text, one line per result.
///
/// In IP-only mode each line is the address, or `-` when there is none.
pub fn write_plain<W: Write>(out: &mut W, results: &ResultSet, ip_only: bool) -> Result<()> {
	for r in results {
		if ip_only {
			match r.ip {
				Some(ip) => writeln!(out, "{}", ip)?,
				None => writeln!(out, "-")?,
			}
		} else if let Some(ip) = r.ip {
			writeln!(out, "{} -> {}", r.domain, ip)?;
		} else if let Some(err) = &r.error {
			writeln!(out, "{} -> ERROR: {}", r.domain, err)?;
		}
	}
	Ok(())
}

/// Write results as CSV with a `domain,ip,error` header.
pub fn write_csv<W: Write>(out: &mut W, results: &ResultSet) -> Result<()> {
	let mut writer = csv::Writer::from_writer(out);
	writer.write_record(["domain", "ip", "error"])?;
	for r in results {
		writer.write_record([
			r.domain.clone(),
			r.ip.map(|ip| ip.to_string()).unwrap_or_default(),
			r.error.as_ref().map(|e| e.to_string()).unwrap_or_default(),
		])?;
	}
	writer.flush()?;
	Ok(())
}

/// JSON view of one result; absent fields are left out entirely
#[derive(Serialize)]
struct JsonEntry<'a> {
	domain: &'a str,
	#[serde(skip_serializing_if = "Option::is_none")]
	ip: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	error: Option<String>,
}

impl<'a> From<&'a ResolutionResult> for JsonEntry<'a> {
	fn from(r: &'a ResolutionResult) -> Self {
		Self {
			domain: &r.domain,
			ip: r.ip.map(|ip| ip.to_string()),
			error: r.error.as_ref().map(|e| e.to_string()),
		}
	}
}

/// Write results as a pretty-printed JSON array.
pub fn write_json<W: Write>(out: &mut W, results: &ResultSet) -> Result<()> {
	let entries: Vec<JsonEntry> = results.iter().map(JsonEntry::from).collect();
	serde_json::to_writer_pretty(&mut *out, &entries)?;
	writeln!(out)?;
	Ok(())
}

/// Render results in the chosen format.
///
/// IP-only mode only applies to plain output.
pub fn write_results<W: Write>(
	out: &mut W,
	results: &ResultSet,
	format: OutputFormat,
	ip_only: bool,
) -> Result<()> {
	match format {
		OutputFormat::Plain => write_plain(out, results, ip_only),
		OutputFormat::Csv => write_csv(out, results),
		OutputFormat::Json => write_json(out, results),
	}
}
