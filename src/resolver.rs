use std::future::Future;
use std::io;
use std::net::{IpAddr, ToSocketAddrs};
use std::pin::Pin;
use std::time::Duration;

use hickory_proto::rr::Name;
use hickory_proto::ProtoErrorKind;
use hickory_resolver::config::{LookupIpStrategy, ResolverConfig};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::{ResolveError, ResolveErrorKind, TokioResolver};
use thiserror::Error;
use tokio::sync::OwnedSemaphorePermit;

use crate::model::{ResolutionError, ResolutionResult};

/// Failure reported by a lookup backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
	/// The name does not exist, has no address records, or is malformed
	#[error("{0}")]
	NotFound(String),
	#[error("lookup timed out")]
	TimedOut,
	#[error("{0}")]
	Other(String),
}

/// Future returned by a lookup backend.
pub type Lookups = Pin<Box<dyn Future<Output = Result<Vec<IpAddr>, LookupError>> + Send>>;

/// Worker-pool slot. A backend must hold it until its lookup has really
/// stopped, which may be after the caller gave up on the result.
pub type Slot = OwnedSemaphorePermit;

/// A name-to-address facility.
///
/// Implementations must be usable from many workers at once and must not keep
/// per-call state (such as a timeout) anywhere shared.
pub trait Lookup: Send + Sync {
	fn lookup(&self, host: String, slot: Slot) -> Lookups;
}

/// Host resolver (getaddrinfo), run on tokio's blocking pool
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemLookup;

impl Lookup for SystemLookup {
	fn lookup(&self, host: String, slot: Slot) -> Lookups {
		// getaddrinfo cannot be cancelled, so the slot moves into the blocking
		// closure and is released only when the call returns.
		let task = tokio::task::spawn_blocking(move || {
			let _slot = slot;
			(host.as_str(), 0)
				.to_socket_addrs()
				.map(|addrs| addrs.map(|addr| addr.ip()).collect::<Vec<_>>())
		});
		Box::pin(async move {
			task.await
				.map_err(|e| LookupError::Other(format!("lookup task failed: {}", e)))?
				.map_err(classify_io_error)
		})
	}
}

/// getaddrinfo failures carry no OS error code; system-level failures
/// (EAI_SYSTEM) do.
fn classify_io_error(err: io::Error) -> LookupError {
	if err.kind() == io::ErrorKind::TimedOut {
		return LookupError::TimedOut;
	}
	match err.raw_os_error() {
		Some(_) => LookupError::Other(err.to_string()),
		None => LookupError::NotFound(err.to_string()),
	}
}

/// Stub resolver driven by hickory, configured from the system resolver
/// settings when they can be read.
#[derive(Clone)]
pub struct HickoryLookup {
	resolver: TokioResolver,
}

impl HickoryLookup {
	/// Build a resolver whose own per-query timeout matches ours, with a
	/// single attempt so the call-scoped deadline stays authoritative.
	pub fn new(timeout: Duration) -> Self {
		let mut builder = match TokioResolver::builder_tokio() {
			Ok(builder) => builder,
			Err(e) => {
				tracing::warn!("failed to read system DNS config, using defaults: {}", e);
				TokioResolver::builder_with_config(
					ResolverConfig::default(),
					TokioConnectionProvider::default(),
				)
			}
		};
		let opts = builder.options_mut();
		opts.ip_strategy = LookupIpStrategy::Ipv4thenIpv6;
		opts.timeout = timeout;
		opts.attempts = 1;
		opts.cache_size = 0;
		Self { resolver: builder.build() }
	}
}

impl Lookup for HickoryLookup {
	fn lookup(&self, host: String, slot: Slot) -> Lookups {
		let resolver = self.resolver.clone();
		// The lookup is async; dropping the future stops it and frees the slot
		Box::pin(async move {
			let _slot = slot;
			let name = parse_name(&host)?;
			let lookup = resolver.lookup_ip(name)
				.await
				.map_err(classify_resolve_error)?;
			Ok(lookup.iter().collect())
		})
	}
}

/// Malformed names are a resolution failure, caught before any query.
fn parse_name(host: &str) -> Result<Name, LookupError> {
	Name::from_utf8(host)
		.map_err(|e| LookupError::NotFound(format!("invalid domain name '{}': {}", host, e)))
}

/// Only answers about the name itself are resolution failures; transport,
/// connection and resolver-state errors are reported as other errors.
fn classify_resolve_error(err: ResolveError) -> LookupError {
	if err.is_nx_domain() || err.is_no_records_found() {
		return LookupError::NotFound(err.to_string());
	}
	match err.kind() {
		ResolveErrorKind::Proto(proto) if matches!(proto.kind(), ProtoErrorKind::Timeout) => {
			LookupError::TimedOut
		}
		_ => LookupError::Other(err.to_string()),
	}
}

/// Pick the address to report: first IPv4 if any, otherwise the first address.
fn pick_address(addrs: &[IpAddr]) -> Option<IpAddr> {
	addrs.iter()
		.find(|ip| ip.is_ipv4())
		.or_else(|| addrs.first())
		.copied()
}

/// Resolve a single domain to one address while holding a pool slot.
///
/// The domain is trimmed first; a blank domain fails with `EmptyDomain`
/// without touching the lookup facility. The timeout applies to this call
/// only. Every failure is returned inside the result.
pub async fn resolve(
	lookup: &dyn Lookup,
	slot: Slot,
	index: usize,
	domain: &str,
	timeout: Duration,
) -> ResolutionResult {
	let domain = domain.trim();
	if domain.is_empty() {
		return ResolutionResult::failed(index, domain, ResolutionError::EmptyDomain);
	}

	let outcome = tokio::time::timeout(timeout, lookup.lookup(domain.to_string(), slot)).await;
	let error = match outcome {
		Ok(Ok(addrs)) => match pick_address(&addrs) {
			Some(ip) => {
				tracing::debug!(domain = %domain, ip = %ip, "resolved");
				return ResolutionResult::resolved(index, domain, ip);
			}
			None => ResolutionError::Dns("no addresses returned".to_string()),
		},
		Ok(Err(LookupError::NotFound(detail))) => ResolutionError::Dns(detail),
		Ok(Err(LookupError::TimedOut)) | Err(_) => ResolutionError::Timeout,
		Ok(Err(LookupError::Other(detail))) => ResolutionError::Other(detail),
	};
	tracing::debug!(domain = %domain, error = %error, "lookup failed");
	ResolutionResult::failed(index, domain, error)
}
