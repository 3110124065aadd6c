//! # Stratus Conns
//!
//! Client construction and endpoint resolution for the Stratus AWS provider.
//!
//! ## Features
//!
//! - A registry of service packages, each able to build API clients for the
//!   session-based (v1) SDK generation, the shared-config (v2) generation, or both
//! - One client factory per generation, with optional per-service customization
//! - FIPS-aware endpoint resolution that falls back to the standard endpoint
//!   when the FIPS hostname does not exist in DNS
//! - Partition-aware hostnames, invoke URLs and hosted zone IDs
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stratus_conns::{AwsClient, CallContext, ConnsConfig, ServiceRegistry};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConnsConfig::from_env()
//!         .account_id("123456789012")
//!         .use_fips_endpoint(true)
//!         .build();
//!
//!     let registry = Arc::new(ServiceRegistry::from_inventory()?);
//!     let mut aws = AwsClient::new(config, registry)?;
//!     aws.load_shared_config().await?;
//!
//!     let kms: aws_sdk_kms::Client = aws.client(&CallContext::background(), "kms").await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Registering a service package
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stratus_conns::{ServicePackage, register_service_package};
//!
//! struct Widget;
//!
//! impl ServicePackage for Widget {
//!     fn service_package_name(&self) -> &str {
//!         "widget"
//!     }
//! }
//!
//! fn widget() -> Arc<dyn ServicePackage> {
//!     Arc::new(Widget)
//! }
//!
//! register_service_package!("widget", widget);
//! ```

pub mod addressing;
mod client;
mod config;
mod context;
pub mod dns;
mod endpoint;
mod error;
mod factory;
mod package;
pub mod partition;
pub mod registry;
mod session;

pub use addressing::ProtocolType;
pub use client::AwsClient;
pub use config::{ConnsConfig, ConnsConfigBuilder, CredentialsSource, ENV_ENDPOINT_SERVICES};
pub use context::{CallContext, Interrupted};
pub use dns::{HostAnswer, HostResolver, LookupError, StaticHostResolver, SystemHostResolver};
pub use endpoint::{DefaultResolve, EndpointResolver, ResolutionOptions, ResolvedEndpoint};
pub use error::{BoxError, ConnsError, Result};
pub use factory::{build_client, client, conn};
pub use package::{
    Ambient, AnyClient, Capabilities, CustomizeClient, NewClient, SdkGeneration, ServicePackage,
    supports_v1_construction, supports_v1_customization, supports_v2_construction,
    supports_v2_customization,
};
pub use partition::{Partition, PartitionResolver, partition_for_region};
pub use registry::{ServiceRegistry, ServiceRegistryBuilder};
pub use session::{Session, SessionBuilder, SharedConfig};

// Re-export AWS types for convenience
pub use aws_config;
pub use aws_credential_types;
pub use aws_types;

#[doc(hidden)]
pub use inventory;
