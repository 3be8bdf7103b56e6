use std::fmt;

use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{self, Writer};
use tracing_subscriber::fmt::{FmtContext, FormatEvent};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

/// Prefixes each event with a bracketed status tag, e.g. `[*] Threads: 10`.
pub struct TagFormatter;

fn tag(level: &Level) -> &'static str {
	match *level {
		Level::TRACE => "[ ]",
		Level::DEBUG => "[?]",
		Level::INFO => "[*]",
		Level::WARN => "[!]",
		Level::ERROR => "[-]",
	}
}

impl<S, N> FormatEvent<S, N> for TagFormatter
where
	S: Subscriber + for<'a> LookupSpan<'a>,
	N: for<'a> format::FormatFields<'a> + 'static,
{
	fn format_event(
		&self,
		ctx: &FmtContext<'_, S, N>,
		mut writer: Writer<'_>,
		event: &Event<'_>,
	) -> fmt::Result {
		write!(writer, "{} ", tag(event.metadata().level()))?;
		ctx.field_format().format_fields(writer.by_ref(), event)?;
		writeln!(writer)
	}
}

/// Install the stderr subscriber.
///
/// `RUST_LOG` wins when set; otherwise quiet mode shows warnings and errors
/// only.
pub fn init(quiet: bool) {
	let default_level = if quiet { "warn" } else { "info" };
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(default_level));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.event_format(TagFormatter)
		.init();
}
