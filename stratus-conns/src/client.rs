//! Client facade handed to resource managers.

use std::any::Any;
use std::sync::Arc;

use tracing::{debug, info};

use crate::addressing::{self, ProtocolType};
use crate::config::ConnsConfig;
use crate::context::CallContext;
use crate::dns::{HostResolver, SystemHostResolver};
use crate::endpoint::{EndpointResolver, ResolutionOptions, ResolvedEndpoint};
use crate::error::{ConnsError, Result};
use crate::factory;
use crate::package::SdkGeneration;
use crate::partition::{Partition, PartitionResolver, partition_for_region};
use crate::registry::ServiceRegistry;
use crate::session::{Session, SharedConfig};

/// Account, region and partition state plus the ambient contexts of both
/// SDK generations.
///
/// The ambient contexts are built once and shared read-only; every client
/// request threads them explicitly through the factory.
#[derive(Debug)]
pub struct AwsClient {
    config: ConnsConfig,
    account_id: String,
    region: String,
    partition: &'static Partition,
    registry: Arc<ServiceRegistry>,
    http_client: Option<reqwest::Client>,
    host_resolver: Arc<dyn HostResolver>,
    session: Option<Arc<Session>>,
    shared_config: Option<Arc<SharedConfig>>,
}

impl AwsClient {
    pub fn new(config: ConnsConfig, registry: Arc<ServiceRegistry>) -> Result<Self> {
        let region = config.region.clone().ok_or(ConnsError::RegionNotSpecified)?;
        let partition = partition_for_region(&region);
        let host_resolver: Arc<dyn HostResolver> =
            Arc::new(SystemHostResolver::with_timeout(config.dns_timeout()));

        info!(
            region = %region,
            partition = partition.id(),
            services = registry.len(),
            "AWS client created"
        );

        Ok(Self {
            account_id: config.account_id.clone().unwrap_or_default(),
            config,
            region,
            partition,
            registry,
            http_client: None,
            host_resolver,
            session: None,
            shared_config: None,
        })
    }

    /// Replace the resolver used for FIPS probing by [`AwsClient::resolve_endpoint`]
    /// and by the session built afterwards.
    pub fn with_host_resolver(mut self, resolver: Arc<dyn HostResolver>) -> Self {
        self.host_resolver = resolver;
        self
    }

    /// Set the HTTP client used for AWS API calls.
    ///
    /// Only has an effect before the session is created; afterwards the call is ignored.
    pub fn set_http_client(&mut self, client: reqwest::Client) {
        if self.session.is_none() {
            self.http_client = Some(client);
        } else {
            debug!("session already initialized, ignoring HTTP client");
        }
    }

    /// HTTP client used for AWS API calls, if one was injected.
    pub fn http_client(&self) -> Option<&reqwest::Client> {
        self.http_client.as_ref()
    }

    /// Build the v1 session. Later calls return the existing session.
    pub fn init_session(&mut self) -> Arc<Session> {
        if let Some(session) = &self.session {
            return Arc::clone(session);
        }

        let session = Arc::new(Session::configured(
            self.region.clone(),
            &self.config,
            self.http_client.clone(),
            Arc::clone(&self.host_resolver),
        ));
        self.session = Some(Arc::clone(&session));
        session
    }

    /// Install a prebuilt v2 config.
    pub fn set_shared_config(&mut self, config: SharedConfig) {
        self.shared_config = Some(Arc::new(config));
    }

    /// Load the v2 config through `aws-config`. Later calls return the existing config.
    pub async fn load_shared_config(&mut self) -> Result<Arc<SharedConfig>> {
        if let Some(config) = &self.shared_config {
            return Ok(Arc::clone(config));
        }

        let config = Arc::new(
            SharedConfig::load(&self.config)
                .await?
                .with_host_resolver(Arc::clone(&self.host_resolver)),
        );
        self.shared_config = Some(Arc::clone(&config));
        Ok(config)
    }

    pub fn session(&self) -> Option<&Arc<Session>> {
        self.session.as_ref()
    }

    pub fn shared_config(&self) -> Option<&Arc<SharedConfig>> {
        self.shared_config.as_ref()
    }

    pub fn registry(&self) -> &ServiceRegistry {
        &self.registry
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn partition(&self) -> &'static Partition {
        self.partition
    }

    pub fn dns_suffix(&self) -> &'static str {
        self.partition.dns_suffix()
    }

    /// The v1 API client for `service`.
    pub async fn conn<T: Any>(&self, ctx: &CallContext, service: &str) -> Result<T> {
        let session = self
            .session
            .as_deref()
            .ok_or(ConnsError::NotInitialized(SdkGeneration::V1))?;
        factory::conn(ctx, &self.registry, session, service).await
    }

    /// The v2 API client for `service`.
    pub async fn client<T: Any>(&self, ctx: &CallContext, service: &str) -> Result<T> {
        let config = self
            .shared_config
            .as_deref()
            .ok_or(ConnsError::NotInitialized(SdkGeneration::V2))?;
        factory::client(ctx, &self.registry, config, service).await
    }

    /// Resolve the endpoint of `service` using the partition templates.
    pub async fn resolve_endpoint(
        &self,
        ctx: &CallContext,
        service: &str,
        options: ResolutionOptions,
    ) -> Result<ResolvedEndpoint> {
        EndpointResolver::with_host_resolver(service, PartitionResolver, Arc::clone(&self.host_resolver))
            .resolve(ctx, options)
            .await
    }

    /// e.g. `PREFIX.amazonaws.com`.
    pub fn partition_hostname(&self, prefix: &str) -> String {
        addressing::partition_hostname(prefix, self.dns_suffix())
    }

    /// e.g. `PREFIX.us-west-2.amazonaws.com`.
    pub fn regional_hostname(&self, prefix: &str) -> String {
        addressing::regional_hostname(prefix, &self.region, self.dns_suffix())
    }

    pub fn api_gateway_invoke_url(&self, rest_api_id: &str, stage_name: &str) -> String {
        addressing::api_gateway_invoke_url(rest_api_id, stage_name, &self.region, self.dns_suffix())
    }

    pub fn api_gateway_v2_invoke_url(
        &self,
        protocol: ProtocolType,
        api_id: &str,
        stage_name: &str,
    ) -> String {
        addressing::api_gateway_v2_invoke_url(
            protocol,
            api_id,
            stage_name,
            &self.region,
            self.dns_suffix(),
        )
    }

    pub fn cloudfront_distribution_hosted_zone_id(&self) -> &'static str {
        addressing::cloudfront_distribution_hosted_zone_id(self.partition.id())
    }

    pub fn global_accelerator_hosted_zone_id(&self) -> &'static str {
        addressing::global_accelerator_hosted_zone_id()
    }

    pub fn default_kms_key_policy(&self) -> String {
        addressing::default_kms_key_policy(self.partition.id(), &self.account_id)
    }
}
