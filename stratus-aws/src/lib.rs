//! # Stratus AWS
//!
//! AWS SDK service packages for the Stratus client factory.
//!
//! Every enabled service registers a package at link time. The package builds
//! `aws-sdk-*` clients for the shared-config (v2) generation, installing a
//! resolver that probes FIPS hostnames in DNS and falls back to the standard
//! endpoint where FIPS does not exist, and session-bound [`Conn`]s for the v1
//! generation.
//!
//! ## Features
//!
//! Only the services you enable are compiled and registered:
//!
//! ```toml
//! [dependencies]
//! stratus-aws = { version = "0.1", features = ["kms", "sqs"] }
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stratus_aws::ServiceRegistry;
//! use stratus_conns::{AwsClient, CallContext, ConnsConfig};
//!
//! let registry = Arc::new(ServiceRegistry::from_inventory()?);
//! let mut aws = AwsClient::new(ConnsConfig::from_env().use_fips_endpoint(true).build(), registry)?;
//! aws.load_shared_config().await?;
//!
//! let kms: aws_sdk_kms::Client = aws.client(&CallContext::background(), "kms").await?;
//! ```

#[macro_use]
mod service;

mod conn;

pub use conn::Conn;
pub use stratus_conns::{ServicePackage, ServiceRegistry};

#[cfg(feature = "cloudwatch")]
service_package! {
    /// Amazon CloudWatch.
    pub mod cloudwatch => aws_sdk_cloudwatch, "cloudwatch";
}

#[cfg(feature = "ecr")]
service_package! {
    /// Amazon Elastic Container Registry.
    pub mod ecr => aws_sdk_ecr, "ecr";
}

#[cfg(feature = "ecs")]
service_package! {
    /// Amazon Elastic Container Service.
    pub mod ecs => aws_sdk_ecs, "ecs";
}

#[cfg(feature = "emr")]
service_package! {
    /// Amazon EMR.
    pub mod emr => aws_sdk_emr, "emr";
}

#[cfg(feature = "kms")]
service_package! {
    /// AWS Key Management Service.
    pub mod kms => aws_sdk_kms, "kms";
}

#[cfg(feature = "lambda")]
service_package! {
    /// AWS Lambda.
    pub mod lambda => aws_sdk_lambda, "lambda";
}

#[cfg(feature = "secrets-manager")]
service_package! {
    /// AWS Secrets Manager.
    pub mod secretsmanager => aws_sdk_secretsmanager, "secretsmanager";
}

#[cfg(feature = "sns")]
service_package! {
    /// Amazon Simple Notification Service.
    pub mod sns => aws_sdk_sns, "sns";
}

#[cfg(feature = "sqs")]
service_package! {
    /// Amazon Simple Queue Service.
    pub mod sqs => aws_sdk_sqs, "sqs";
}

#[cfg(feature = "ssm")]
service_package! {
    /// AWS Systems Manager.
    pub mod ssm => aws_sdk_ssm, "ssm";
}

#[cfg(feature = "sts")]
service_package! {
    /// AWS Security Token Service.
    pub mod sts => aws_sdk_sts, "sts";
}

// Re-export enabled service clients
#[cfg(feature = "cloudwatch")]
pub use aws_sdk_cloudwatch;

#[cfg(feature = "ecr")]
pub use aws_sdk_ecr;

#[cfg(feature = "ecs")]
pub use aws_sdk_ecs;

#[cfg(feature = "emr")]
pub use aws_sdk_emr;

#[cfg(feature = "kms")]
pub use aws_sdk_kms;

#[cfg(feature = "lambda")]
pub use aws_sdk_lambda;

#[cfg(feature = "secrets-manager")]
pub use aws_sdk_secretsmanager;

#[cfg(feature = "sns")]
pub use aws_sdk_sns;

#[cfg(feature = "sqs")]
pub use aws_sdk_sqs;

#[cfg(feature = "ssm")]
pub use aws_sdk_ssm;

#[cfg(feature = "sts")]
pub use aws_sdk_sts;
