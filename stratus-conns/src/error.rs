//! Connection error types.

use thiserror::Error;

use crate::context::Interrupted;
use crate::dns::LookupError;
use crate::package::SdkGeneration;

/// Result type for connection operations.
pub type Result<T> = std::result::Result<T, ConnsError>;

/// Boxed error returned by service package capabilities and default resolvers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while building clients or resolving endpoints.
#[derive(Debug, Error)]
pub enum ConnsError {
    /// No service package is registered under the name.
    #[error("unknown service package: {0}")]
    UnknownService(String),

    /// The package cannot construct a client for the requested generation.
    #[error("no AWS SDK {generation} API client factory: {service}")]
    UnsupportedGeneration {
        service: String,
        generation: SdkGeneration,
    },

    /// The package rejected client construction.
    #[error("creating {service} ({generation}) client: {source}")]
    Construction {
        service: String,
        generation: SdkGeneration,
        #[source]
        source: BoxError,
    },

    /// The post-construction hook failed; the client was discarded.
    #[error("customizing {service} ({generation}) client: {source}")]
    Customization {
        service: String,
        generation: SdkGeneration,
        #[source]
        source: BoxError,
    },

    /// The constructed client is not of the type the caller asked for.
    #[error("{service} ({generation}) client is not a {expected}")]
    ClientType {
        service: String,
        generation: SdkGeneration,
        expected: &'static str,
    },

    /// The default resolution primitive failed.
    #[error("resolving {service} endpoint: {source}")]
    EndpointResolution {
        service: String,
        #[source]
        source: BoxError,
    },

    /// The default resolver returned something that is not a URL with a host.
    #[error("resolved {service} endpoint {url:?} is not a valid URL")]
    InvalidEndpointUrl { service: String, url: String },

    /// A DNS failure other than "host not found" while probing a FIPS endpoint.
    #[error("looking up {service} endpoint {hostname:?}: {source}")]
    DnsProbe {
        service: String,
        hostname: String,
        #[source]
        source: LookupError,
    },

    /// The call context was cancelled or its deadline passed.
    #[error("{service}: {reason}")]
    Interrupted {
        service: String,
        #[source]
        reason: Interrupted,
    },

    /// Two packages were registered under the same name.
    #[error("service package registered twice: {0}")]
    DuplicateService(String),

    /// The ambient session or config for a generation has not been built.
    #[error("AWS SDK {0} ambient context is not initialized")]
    NotInitialized(SdkGeneration),

    /// Region not specified.
    #[error("AWS region not specified")]
    RegionNotSpecified,

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl ConnsError {
    pub(crate) fn interrupted(service: &str, reason: Interrupted) -> Self {
        Self::Interrupted {
            service: service.to_string(),
            reason,
        }
    }

    /// Name of the service the error is about, if any.
    pub fn service(&self) -> Option<&str> {
        match self {
            Self::UnknownService(service) | Self::DuplicateService(service) => Some(service),
            Self::UnsupportedGeneration { service, .. }
            | Self::Construction { service, .. }
            | Self::Customization { service, .. }
            | Self::ClientType { service, .. }
            | Self::EndpointResolution { service, .. }
            | Self::InvalidEndpointUrl { service, .. }
            | Self::DnsProbe { service, .. }
            | Self::Interrupted { service, .. } => Some(service),
            Self::NotInitialized(_) | Self::RegionNotSpecified | Self::Config(_) => None,
        }
    }

    /// Whether retrying the same call without changing inputs is pointless.
    ///
    /// DNS probe failures, default-resolver failures and interruptions may
    /// succeed on a later attempt; everything else is a configuration problem.
    pub fn is_permanent(&self) -> bool {
        !matches!(
            self,
            Self::DnsProbe { .. } | Self::EndpointResolution { .. } | Self::Interrupted { .. }
        )
    }

    /// Check if the call was cancelled or timed out through its context.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Interrupted { .. })
    }
}
