// Stratus - AWS client plumbing for an infrastructure-as-code provider
//
// This library builds API clients for both AWS SDK generations from a registry
// of service packages, resolves FIPS endpoints with a DNS probe, and derives
// partition-aware hostnames and constants.

// Re-export core functionality
pub use stratus_conns::*;

// Re-export optional crates
#[cfg(feature = "aws")]
pub use stratus_aws;

#[cfg(feature = "log")]
pub use stratus_log;

pub use async_trait::async_trait;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AnyClient,
        AwsClient,
        BoxError,
        CallContext,
        ConnsConfig,
        ConnsError,
        CustomizeClient,
        NewClient,
        ProtocolType,
        ResolutionOptions,
        ServicePackage,
        ServiceRegistry,
        Session,
        SharedConfig,
        async_trait,
        register_service_package,
    };

    #[cfg(feature = "aws")]
    pub use crate::stratus_aws::Conn;
}
