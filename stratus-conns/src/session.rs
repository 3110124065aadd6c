//! Ambient contexts shared by every client of one SDK generation.

use std::collections::HashMap;
use std::sync::Arc;

use aws_credential_types::Credentials;
use tracing::info;

use crate::config::{ConnsConfig, CredentialsSource};
use crate::context::CallContext;
use crate::dns::{HostResolver, SystemHostResolver};
use crate::endpoint::{EndpointResolver, ResolutionOptions, ResolvedEndpoint};
use crate::error::Result;
use crate::partition::{Partition, PartitionResolver, partition_for_region};

/// Static credentials for an explicit credentials source.
pub(crate) fn explicit_credentials(source: &CredentialsSource) -> Option<Credentials> {
    match source {
        CredentialsSource::Explicit {
            access_key_id,
            secret_access_key,
            session_token,
        } => Some(Credentials::new(
            access_key_id,
            secret_access_key,
            session_token.clone(),
            None,
            "stratus-explicit",
        )),
        _ => None,
    }
}

/// Ambient context for session-based (v1) clients.
#[derive(Debug, Clone)]
pub struct Session {
    region: String,
    partition: &'static Partition,
    credentials: Option<Credentials>,
    http_client: reqwest::Client,
    use_fips: bool,
    use_dual_stack: bool,
    endpoints: HashMap<String, String>,
    host_resolver: Arc<dyn HostResolver>,
}

impl Session {
    pub fn builder(region: impl Into<String>) -> SessionBuilder {
        SessionBuilder::new(region)
    }

    /// Build a session from connection configuration.
    pub fn from_config(config: &ConnsConfig, http_client: Option<reqwest::Client>) -> Result<Self> {
        let region = config.region.clone().ok_or(crate::ConnsError::RegionNotSpecified)?;
        let host_resolver = Arc::new(SystemHostResolver::with_timeout(config.dns_timeout()));
        Ok(Self::configured(region, config, http_client, host_resolver))
    }

    /// Assemble the session for `region` from `config`, probing with `host_resolver`.
    pub(crate) fn configured(
        region: String,
        config: &ConnsConfig,
        http_client: Option<reqwest::Client>,
        host_resolver: Arc<dyn HostResolver>,
    ) -> Self {
        let mut builder = Session::builder(region)
            .use_fips(config.use_fips_endpoint)
            .use_dual_stack(config.use_dualstack_endpoint)
            .host_resolver(host_resolver);

        for (service, url) in &config.endpoints {
            builder = builder.endpoint(service, url);
        }

        if let Some(credentials) = explicit_credentials(&config.credentials) {
            builder = builder.credentials(credentials);
        }

        if let Some(client) = http_client {
            builder = builder.http_client(client);
        }

        let session = builder.build();
        info!(
            region = %session.region,
            partition = session.partition.id(),
            use_fips = session.use_fips,
            "AWS SDK v1 session initialized"
        );
        session
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn partition(&self) -> &'static Partition {
        self.partition
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// HTTP client clients built from this session should send requests with.
    pub fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }

    pub fn use_fips(&self) -> bool {
        self.use_fips
    }

    pub fn use_dual_stack(&self) -> bool {
        self.use_dual_stack
    }

    /// Endpoint override configured for `service`.
    pub fn endpoint_override(&self, service: &str) -> Option<&str> {
        self.endpoints.get(service).map(String::as_str)
    }

    pub fn host_resolver(&self) -> Arc<dyn HostResolver> {
        Arc::clone(&self.host_resolver)
    }

    /// Resolution options for `service` derived from this session.
    pub fn resolution_options(&self, service: &str) -> ResolutionOptions {
        let options = ResolutionOptions::new(self.region.clone())
            .with_fips(self.use_fips)
            .with_dual_stack(self.use_dual_stack);
        match self.endpoint_override(service) {
            Some(url) => options.with_endpoint(url),
            None => options,
        }
    }

    /// Endpoint resolver for `service` over the partition templates.
    pub fn endpoint_resolver(
        &self,
        service: &str,
    ) -> EndpointResolver<PartitionResolver, Arc<dyn HostResolver>> {
        EndpointResolver::with_host_resolver(service, PartitionResolver, self.host_resolver())
    }

    /// Resolve the endpoint `service` clients of this session should use.
    pub async fn resolve_endpoint(
        &self,
        ctx: &CallContext,
        service: &str,
    ) -> Result<ResolvedEndpoint> {
        self.endpoint_resolver(service)
            .resolve(ctx, self.resolution_options(service))
            .await
    }
}

/// Builder for [`Session`].
#[derive(Debug)]
pub struct SessionBuilder {
    region: String,
    credentials: Option<Credentials>,
    http_client: Option<reqwest::Client>,
    use_fips: bool,
    use_dual_stack: bool,
    endpoints: HashMap<String, String>,
    host_resolver: Option<Arc<dyn HostResolver>>,
}

impl SessionBuilder {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            credentials: None,
            http_client: None,
            use_fips: false,
            use_dual_stack: false,
            endpoints: HashMap::new(),
            host_resolver: None,
        }
    }

    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn use_fips(mut self, use_fips: bool) -> Self {
        self.use_fips = use_fips;
        self
    }

    pub fn use_dual_stack(mut self, use_dual_stack: bool) -> Self {
        self.use_dual_stack = use_dual_stack;
        self
    }

    pub fn endpoint(mut self, service: impl Into<String>, url: impl Into<String>) -> Self {
        self.endpoints.insert(service.into(), url.into());
        self
    }

    pub fn host_resolver(mut self, resolver: Arc<dyn HostResolver>) -> Self {
        self.host_resolver = Some(resolver);
        self
    }

    pub fn build(self) -> Session {
        let partition = partition_for_region(&self.region);
        Session {
            region: self.region,
            partition,
            credentials: self.credentials,
            http_client: self.http_client.unwrap_or_default(),
            use_fips: self.use_fips,
            use_dual_stack: self.use_dual_stack,
            endpoints: self.endpoints,
            host_resolver: self
                .host_resolver
                .unwrap_or_else(|| Arc::new(SystemHostResolver::new())),
        }
    }
}

/// Ambient context for shared-config (v2) clients.
#[derive(Debug, Clone)]
pub struct SharedConfig {
    sdk_config: aws_types::SdkConfig,
    endpoints: HashMap<String, String>,
    host_resolver: Arc<dyn HostResolver>,
}

impl SharedConfig {
    pub fn new(sdk_config: aws_types::SdkConfig) -> Self {
        Self {
            sdk_config,
            endpoints: HashMap::new(),
            host_resolver: Arc::new(SystemHostResolver::new()),
        }
    }

    pub fn with_endpoint(mut self, service: impl Into<String>, url: impl Into<String>) -> Self {
        self.endpoints.insert(service.into(), url.into());
        self
    }

    pub fn with_host_resolver(mut self, resolver: Arc<dyn HostResolver>) -> Self {
        self.host_resolver = resolver;
        self
    }

    /// Load the SDK configuration through the default provider chain.
    pub async fn load(config: &ConnsConfig) -> Result<Self> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());

        if let Some(region) = &config.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }

        match &config.credentials {
            CredentialsSource::Profile(profile) => {
                loader = loader.profile_name(profile);
            }
            CredentialsSource::Explicit { .. } => {
                if let Some(creds) = explicit_credentials(&config.credentials) {
                    loader = loader.credentials_provider(creds);
                }
            }
            CredentialsSource::Auto => {}
        }

        if config.use_fips_endpoint {
            loader = loader.use_fips(true);
        }
        if config.use_dualstack_endpoint {
            loader = loader.use_dual_stack(true);
        }

        let sdk_config = loader.load().await;
        info!(
            region = ?sdk_config.region(),
            use_fips = ?sdk_config.use_fips(),
            "AWS SDK v2 config loaded"
        );

        let mut shared = Self::new(sdk_config).with_host_resolver(Arc::new(
            SystemHostResolver::with_timeout(config.dns_timeout()),
        ));
        shared.endpoints = config.endpoints.clone();
        Ok(shared)
    }

    pub fn sdk_config(&self) -> &aws_types::SdkConfig {
        &self.sdk_config
    }

    pub fn region(&self) -> Option<&str> {
        self.sdk_config.region().map(|r| r.as_ref())
    }

    pub fn use_fips(&self) -> bool {
        self.sdk_config.use_fips().unwrap_or(false)
    }

    pub fn use_dual_stack(&self) -> bool {
        self.sdk_config.use_dual_stack().unwrap_or(false)
    }

    /// Endpoint override configured for `service`.
    pub fn endpoint_override(&self, service: &str) -> Option<&str> {
        self.endpoints
            .get(service)
            .map(String::as_str)
            .filter(|url| !url.is_empty())
    }

    pub fn host_resolver(&self) -> Arc<dyn HostResolver> {
        Arc::clone(&self.host_resolver)
    }
}
