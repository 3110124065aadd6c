//! Connection configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

use crate::dns::DEFAULT_LOOKUP_TIMEOUT;

/// Services whose `AWS_ENDPOINT_URL_<SERVICE>` variable is read by [`ConnsConfig::from_env`].
pub const ENV_ENDPOINT_SERVICES: &[&str] = &[
    "cloudwatch",
    "ecr",
    "ecs",
    "emr",
    "kms",
    "lambda",
    "secretsmanager",
    "sns",
    "sqs",
    "ssm",
    "sts",
];

/// Credentials source for AWS authentication.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialsSource {
    /// Use AWS profile from ~/.aws/credentials.
    Profile(String),
    /// Use explicit credentials.
    Explicit {
        access_key_id: String,
        secret_access_key: String,
        session_token: Option<String>,
    },
    /// Default AWS SDK credential chain.
    #[default]
    Auto,
}

/// Configuration consumed when building the ambient session and config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnsConfig {
    /// AWS region.
    pub region: Option<String>,
    /// Account the provider operates in.
    pub account_id: Option<String>,
    /// Credentials source.
    #[serde(default)]
    pub credentials: CredentialsSource,
    /// Per-service endpoint overrides, keyed by service package name.
    #[serde(default)]
    pub endpoints: HashMap<String, String>,
    /// Request FIPS endpoints.
    #[serde(default)]
    pub use_fips_endpoint: bool,
    /// Request dual-stack endpoints.
    #[serde(default)]
    pub use_dualstack_endpoint: bool,
    /// Timeout for FIPS host lookups, in seconds.
    pub dns_timeout_secs: Option<u64>,
}

impl ConnsConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> ConnsConfigBuilder {
        ConnsConfigBuilder::new()
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> ConnsConfigBuilder {
        let mut builder = ConnsConfigBuilder::new();

        if let Ok(region) = std::env::var("AWS_REGION") {
            builder = builder.region(region);
        } else if let Ok(region) = std::env::var("AWS_DEFAULT_REGION") {
            builder = builder.region(region);
        }

        if let Ok(profile) = std::env::var("AWS_PROFILE") {
            builder = builder.profile(profile);
        }

        if let Ok(value) = std::env::var("AWS_USE_FIPS_ENDPOINT") {
            builder = builder.use_fips_endpoint(parse_flag(&value));
        }

        if let Ok(value) = std::env::var("AWS_USE_DUALSTACK_ENDPOINT") {
            builder = builder.use_dualstack_endpoint(parse_flag(&value));
        }

        for service in ENV_ENDPOINT_SERVICES {
            let var = format!("AWS_ENDPOINT_URL_{}", service.to_uppercase());
            if let Ok(url) = std::env::var(&var) {
                builder = builder.endpoint(*service, url);
            }
        }

        if let Some(secs) = std::env::var("STRATUS_DNS_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            builder = builder.dns_timeout(Duration::from_secs(secs));
        }

        builder
    }

    /// Timeout for FIPS host lookups.
    pub fn dns_timeout(&self) -> Duration {
        self.dns_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_LOOKUP_TIMEOUT)
    }
}

fn parse_flag(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

/// Builder for connection configuration.
#[derive(Default)]
pub struct ConnsConfigBuilder {
    config: ConnsConfig,
}

impl ConnsConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the AWS region.
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.config.region = Some(region.into());
        self
    }

    pub fn account_id(mut self, account_id: impl Into<String>) -> Self {
        self.config.account_id = Some(account_id.into());
        self
    }

    /// Set the credentials source.
    pub fn credentials(mut self, credentials: CredentialsSource) -> Self {
        self.config.credentials = credentials;
        self
    }

    /// Use explicit credentials.
    pub fn explicit_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.config.credentials = CredentialsSource::Explicit {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        };
        self
    }

    /// Use a named profile.
    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.config.credentials = CredentialsSource::Profile(profile.into());
        self
    }

    /// Override the endpoint of one service (LocalStack, VPC endpoints, ...).
    pub fn endpoint(mut self, service: impl Into<String>, url: impl Into<String>) -> Self {
        self.config.endpoints.insert(service.into(), url.into());
        self
    }

    pub fn use_fips_endpoint(mut self, enabled: bool) -> Self {
        self.config.use_fips_endpoint = enabled;
        self
    }

    pub fn use_dualstack_endpoint(mut self, enabled: bool) -> Self {
        self.config.use_dualstack_endpoint = enabled;
        self
    }

    pub fn dns_timeout(mut self, timeout: Duration) -> Self {
        self.config.dns_timeout_secs = Some(timeout.as_secs().max(1));
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ConnsConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = ConnsConfig::builder()
            .region("us-west-2")
            .account_id("123456789012")
            .endpoint("kms", "http://localhost:4566")
            .use_fips_endpoint(true)
            .dns_timeout(Duration::from_secs(2))
            .build();

        assert_eq!(config.region.as_deref(), Some("us-west-2"));
        assert_eq!(config.account_id.as_deref(), Some("123456789012"));
        assert_eq!(config.endpoints.get("kms").map(String::as_str), Some("http://localhost:4566"));
        assert!(config.use_fips_endpoint);
        assert_eq!(config.dns_timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_default_dns_timeout() {
        assert_eq!(ConnsConfig::new().dns_timeout(), DEFAULT_LOOKUP_TIMEOUT);
    }

    #[test]
    fn test_deserialize() {
        let config: ConnsConfig = serde_json::from_value(serde_json::json!({
            "region": "cn-north-1",
            "credentials": { "profile": "china" },
            "endpoints": { "sqs": "http://localhost:4566" },
            "use_fips_endpoint": true
        }))
        .unwrap();

        assert_eq!(config.credentials, CredentialsSource::Profile("china".to_string()));
        assert!(config.use_fips_endpoint);
        assert!(!config.use_dualstack_endpoint);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag("TRUE"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
    }
}
