//! Host lookups used to probe FIPS endpoint availability.

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::net::IpAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Default timeout for a single system lookup.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Resolver messages that mean the name does not exist, across libc flavors.
const NOT_FOUND_MARKERS: &[&str] = &[
    // glibc
    "name or service not known",
    "no address associated with hostname",
    // musl
    "name does not resolve",
    "name has no usable address",
    // macOS / BSD
    "nodename nor servname provided",
    // Windows, Go-style resolvers
    "no such host",
    "host not found",
];

/// Host lookup failures.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The name does not exist. This is the only "negative answer" class.
    #[error("no such host")]
    NotFound,

    /// The resolver did not answer in time.
    #[error("lookup timed out after {0:?}")]
    Timeout(Duration),

    /// Any other resolver failure.
    #[error("{0}")]
    Failed(String),

    /// I/O error from the system resolver.
    #[error(transparent)]
    Io(io::Error),
}

impl LookupError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// Sort an error from the system resolver into "not found" or everything else.
    pub fn from_io(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::NotFound {
            return Self::NotFound;
        }

        let message = err.to_string().to_lowercase();
        if NOT_FOUND_MARKERS.iter().any(|marker| message.contains(marker)) {
            Self::NotFound
        } else {
            Self::Io(err)
        }
    }
}

/// Resolves hostnames to addresses.
#[async_trait]
pub trait HostResolver: Send + Sync + fmt::Debug {
    /// Look up `hostname`. An empty answer must be reported as [`LookupError::NotFound`].
    async fn lookup_host(&self, hostname: &str) -> Result<Vec<IpAddr>, LookupError>;
}

#[async_trait]
impl<T: HostResolver + ?Sized> HostResolver for Arc<T> {
    async fn lookup_host(&self, hostname: &str) -> Result<Vec<IpAddr>, LookupError> {
        (**self).lookup_host(hostname).await
    }
}

/// Host resolver backed by the operating system (`getaddrinfo`).
#[derive(Debug, Clone)]
pub struct SystemHostResolver {
    timeout: Duration,
}

impl SystemHostResolver {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for SystemHostResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HostResolver for SystemHostResolver {
    async fn lookup_host(&self, hostname: &str) -> Result<Vec<IpAddr>, LookupError> {
        let lookup = tokio::net::lookup_host((hostname, 0));
        let addrs = tokio::time::timeout(self.timeout, lookup)
            .await
            .map_err(|_| LookupError::Timeout(self.timeout))?
            .map_err(LookupError::from_io)?;

        let ips: Vec<IpAddr> = addrs.map(|addr| addr.ip()).collect();
        if ips.is_empty() {
            Err(LookupError::NotFound)
        } else {
            Ok(ips)
        }
    }
}

/// Canned answer for one host in a [`StaticHostResolver`].
#[derive(Debug, Clone)]
pub enum HostAnswer {
    Addresses(Vec<IpAddr>),
    NotFound,
    Fail(String),
    /// Never answers; only the caller's context can end the lookup.
    Hang,
}

/// In-memory host resolver (for testing/development).
///
/// Hosts without an answer are reported as not found.
#[derive(Debug, Default)]
pub struct StaticHostResolver {
    answers: HashMap<String, HostAnswer>,
    lookups: AtomicUsize,
}

impl StaticHostResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `hostname` resolve to `127.0.0.1`.
    pub fn resolves(self, hostname: impl Into<String>) -> Self {
        self.answer(
            hostname,
            HostAnswer::Addresses(vec![IpAddr::from([127, 0, 0, 1])]),
        )
    }

    pub fn answer(mut self, hostname: impl Into<String>, answer: HostAnswer) -> Self {
        self.answers.insert(hostname.into(), answer);
        self
    }

    /// Number of lookups performed so far.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HostResolver for StaticHostResolver {
    async fn lookup_host(&self, hostname: &str) -> Result<Vec<IpAddr>, LookupError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);

        match self.answers.get(hostname) {
            Some(HostAnswer::Addresses(addrs)) if !addrs.is_empty() => Ok(addrs.clone()),
            Some(HostAnswer::Addresses(_)) | Some(HostAnswer::NotFound) | None => {
                Err(LookupError::NotFound)
            }
            Some(HostAnswer::Fail(message)) => Err(LookupError::Failed(message.clone())),
            Some(HostAnswer::Hang) => std::future::pending().await,
        }
    }
}
