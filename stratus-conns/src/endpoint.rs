//! FIPS-aware endpoint resolution.
//!
//! Both SDK generations share one policy, parameterized by the generation's
//! default resolution primitive ([`DefaultResolve`]):
//!
//! 1. An explicit endpoint wins. A simultaneous FIPS request is logged and
//!    dropped, and no DNS lookup happens.
//! 2. Otherwise the default resolver is asked, with the FIPS flag as given.
//! 3. When FIPS was requested, the returned hostname is looked up. A host
//!    that does not exist means FIPS is unavailable for this region, so the
//!    default resolver is asked again without FIPS. Any other lookup failure
//!    is returned to the caller.

use async_trait::async_trait;
use tracing::debug;
use url::{Host, Url};

use crate::context::CallContext;
use crate::dns::{HostResolver, SystemHostResolver};
use crate::error::{BoxError, ConnsError, Result};

/// Inputs to a single endpoint resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionOptions {
    region: String,
    use_fips: bool,
    use_dual_stack: bool,
    explicit_endpoint: Option<String>,
}

impl ResolutionOptions {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            ..Self::default()
        }
    }

    pub fn with_fips(mut self, use_fips: bool) -> Self {
        self.use_fips = use_fips;
        self
    }

    pub fn with_dual_stack(mut self, use_dual_stack: bool) -> Self {
        self.use_dual_stack = use_dual_stack;
        self
    }

    /// Set an explicit endpoint. Empty strings are ignored.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        self.explicit_endpoint = (!endpoint.is_empty()).then_some(endpoint);
        self
    }

    /// A copy of these options with the FIPS flag cleared.
    pub fn without_fips(&self) -> Self {
        self.clone().with_fips(false)
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn use_fips(&self) -> bool {
        self.use_fips
    }

    pub fn use_dual_stack(&self) -> bool {
        self.use_dual_stack
    }

    pub fn explicit_endpoint(&self) -> Option<&str> {
        self.explicit_endpoint.as_deref()
    }
}

/// A generation's default endpoint resolution primitive.
#[async_trait]
pub trait DefaultResolve: Send + Sync {
    /// The generation's native endpoint value.
    type Endpoint: Send;

    async fn default_resolve(
        &self,
        service: &str,
        options: &ResolutionOptions,
    ) -> std::result::Result<Self::Endpoint, BoxError>;

    /// Wrap an explicitly configured endpoint URL.
    fn literal(&self, url: &str) -> std::result::Result<Self::Endpoint, BoxError>;

    fn url(endpoint: &Self::Endpoint) -> &str;
}

/// The endpoint a client should bind to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEndpoint<E = String> {
    endpoint: E,
    url: String,
    validated: bool,
}

impl<E> ResolvedEndpoint<E> {
    fn new(endpoint: E, url: impl Into<String>, validated: bool) -> Self {
        Self {
            endpoint,
            url: url.into(),
            validated,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// True when the endpoint is a FIPS endpoint whose host was found in DNS.
    pub fn validated(&self) -> bool {
        self.validated
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    pub fn into_endpoint(self) -> E {
        self.endpoint
    }
}

/// Endpoint resolver for one service, wrapping a default resolver.
#[derive(Debug, Clone)]
pub struct EndpointResolver<R, L = SystemHostResolver> {
    service: String,
    default_resolver: R,
    host_resolver: L,
}

impl<R: DefaultResolve> EndpointResolver<R, SystemHostResolver> {
    pub fn new(service: impl Into<String>, default_resolver: R) -> Self {
        Self::with_host_resolver(service, default_resolver, SystemHostResolver::new())
    }
}

impl<R, L> EndpointResolver<R, L>
where
    R: DefaultResolve,
    L: HostResolver,
{
    pub fn with_host_resolver(
        service: impl Into<String>,
        default_resolver: R,
        host_resolver: L,
    ) -> Self {
        Self {
            service: service.into(),
            default_resolver,
            host_resolver,
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Resolve the endpoint for `options`.
    pub async fn resolve(
        &self,
        ctx: &CallContext,
        options: ResolutionOptions,
    ) -> Result<ResolvedEndpoint<R::Endpoint>> {
        if let Some(url) = options.explicit_endpoint() {
            debug!(service = %self.service, endpoint = url, "setting endpoint");
            if options.use_fips() {
                debug!(service = %self.service, "endpoint set, ignoring UseFIPSEndpoint setting");
            }

            let endpoint = self
                .default_resolver
                .literal(url)
                .map_err(|source| self.resolution_error(source))?;
            return Ok(ResolvedEndpoint::new(endpoint, url, false));
        }

        let endpoint = self.default_resolve(ctx, &options).await?;
        let url = R::url(&endpoint).to_string();

        if !options.use_fips() {
            return Ok(ResolvedEndpoint::new(endpoint, url, false));
        }

        debug!(
            service = %self.service,
            use_fips = true,
            endpoint = %url,
            "endpoint resolved"
        );

        let hostname = hostname(&url).ok_or_else(|| ConnsError::InvalidEndpointUrl {
                service: self.service.clone(),
                url: url.clone(),
            })?;

        let lookup = ctx
            .run(self.host_resolver.lookup_host(&hostname))
            .await
            .map_err(|reason| ConnsError::interrupted(&self.service, reason))?;

        match lookup {
            Ok(_) => Ok(ResolvedEndpoint::new(endpoint, url, true)),
            Err(err) if err.is_not_found() => {
                debug!(
                    service = %self.service,
                    hostname = %hostname,
                    "default endpoint host not found, disabling FIPS"
                );
                let fallback = self.default_resolve(ctx, &options.without_fips()).await?;
                let url = R::url(&fallback).to_string();
                Ok(ResolvedEndpoint::new(fallback, url, false))
            }
            Err(source) => Err(ConnsError::DnsProbe {
                service: self.service.clone(),
                hostname,
                source,
            }),
        }
    }

    async fn default_resolve(
        &self,
        ctx: &CallContext,
        options: &ResolutionOptions,
    ) -> Result<R::Endpoint> {
        ctx.run(self.default_resolver.default_resolve(&self.service, options))
            .await
            .map_err(|reason| ConnsError::interrupted(&self.service, reason))?
            .map_err(|source| self.resolution_error(source))
    }

    fn resolution_error(&self, source: BoxError) -> ConnsError {
        ConnsError::EndpointResolution {
            service: self.service.clone(),
            source,
        }
    }
}

/// Host of `url` as a resolver expects it. IPv6 literals lose their brackets.
fn hostname(url: &str) -> Option<String> {
    match Url::parse(url).ok()?.host()? {
        Host::Domain(domain) => Some(domain.to_string()),
        Host::Ipv4(addr) => Some(addr.to_string()),
        Host::Ipv6(addr) => Some(addr.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::{HostAnswer, StaticHostResolver};
    use crate::partition::PartitionResolver;
    use std::sync::Arc;

    fn resolver(
        dns: StaticHostResolver,
    ) -> (
        EndpointResolver<PartitionResolver, Arc<StaticHostResolver>>,
        Arc<StaticHostResolver>,
    ) {
        let dns = Arc::new(dns);
        let resolver =
            EndpointResolver::with_host_resolver("emr", PartitionResolver, Arc::clone(&dns));
        (resolver, dns)
    }

    #[tokio::test]
    async fn test_plain_resolution_skips_dns() {
        let (resolver, dns) = resolver(StaticHostResolver::new());
        let ctx = CallContext::background();

        let endpoint = resolver
            .resolve(&ctx, ResolutionOptions::new("us-east-1"))
            .await
            .unwrap();

        assert_eq!(endpoint.url(), "https://emr.us-east-1.amazonaws.com");
        assert!(!endpoint.validated());
        assert_eq!(dns.lookups(), 0);
    }

    #[tokio::test]
    async fn test_explicit_endpoint_ignores_fips() {
        let (resolver, dns) = resolver(StaticHostResolver::new());
        let ctx = CallContext::background();
        let options = ResolutionOptions::new("us-east-1")
            .with_fips(true)
            .with_endpoint("http://localhost:4566");

        let endpoint = resolver.resolve(&ctx, options).await.unwrap();

        assert_eq!(endpoint.url(), "http://localhost:4566");
        assert_eq!(endpoint.endpoint(), "http://localhost:4566");
        assert_eq!(dns.lookups(), 0);
    }

    #[tokio::test]
    async fn test_fips_host_found() {
        let (resolver, dns) =
            resolver(StaticHostResolver::new().resolves("emr-fips.us-east-1.amazonaws.com"));
        let ctx = CallContext::background();

        let endpoint = resolver
            .resolve(&ctx, ResolutionOptions::new("us-east-1").with_fips(true))
            .await
            .unwrap();

        assert_eq!(endpoint.url(), "https://emr-fips.us-east-1.amazonaws.com");
        assert!(endpoint.validated());
        assert_eq!(dns.lookups(), 1);
    }

    #[tokio::test]
    async fn test_fips_host_not_found_falls_back() {
        let (resolver, _) = resolver(StaticHostResolver::new());
        let ctx = CallContext::background();

        let endpoint = resolver
            .resolve(&ctx, ResolutionOptions::new("cn-north-1").with_fips(true))
            .await
            .unwrap();

        assert_eq!(endpoint.url(), "https://emr.cn-north-1.amazonaws.com.cn");
        assert!(!endpoint.validated());
    }

    #[tokio::test]
    async fn test_fips_lookup_failure_is_fatal() {
        let (resolver, _) = resolver(StaticHostResolver::new().answer(
            "emr-fips.us-east-1.amazonaws.com",
            HostAnswer::Fail("connection refused".to_string()),
        ));
        let ctx = CallContext::background();

        let err = resolver
            .resolve(&ctx, ResolutionOptions::new("us-east-1").with_fips(true))
            .await
            .unwrap_err();

        match err {
            ConnsError::DnsProbe {
                service, hostname, ..
            } => {
                assert_eq!(service, "emr");
                assert_eq!(hostname, "emr-fips.us-east-1.amazonaws.com");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_default_resolver_failure() {
        let (resolver, _) = resolver(StaticHostResolver::new());
        let ctx = CallContext::background();

        let err = resolver
            .resolve(
                &ctx,
                ResolutionOptions::new("us-iso-east-1").with_dual_stack(true),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ConnsError::EndpointResolution { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_lookup_respects_deadline() {
        let (resolver, _) = resolver(
            StaticHostResolver::new()
                .answer("emr-fips.us-east-1.amazonaws.com", HostAnswer::Hang),
        );
        let ctx = CallContext::background().with_timeout(std::time::Duration::from_secs(1));

        let err = resolver
            .resolve(&ctx, ResolutionOptions::new("us-east-1").with_fips(true))
            .await
            .unwrap_err();

        assert!(err.is_cancellation());
    }

    #[test]
    fn test_empty_explicit_endpoint_is_ignored() {
        let options = ResolutionOptions::new("us-east-1").with_endpoint("");
        assert_eq!(options.explicit_endpoint(), None);
    }

    #[test]
    fn test_hostname_strips_ipv6_brackets() {
        assert_eq!(
            hostname("https://emr-fips.us-east-1.amazonaws.com/path").as_deref(),
            Some("emr-fips.us-east-1.amazonaws.com")
        );
        assert_eq!(hostname("https://[::1]:8443").as_deref(), Some("::1"));
        assert_eq!(hostname("http://10.0.0.5:4566").as_deref(), Some("10.0.0.5"));
        assert_eq!(hostname("not a url"), None);
    }

    #[derive(Debug)]
    struct Loopback;

    #[async_trait]
    impl DefaultResolve for Loopback {
        type Endpoint = String;

        async fn default_resolve(
            &self,
            _service: &str,
            _options: &ResolutionOptions,
        ) -> std::result::Result<String, BoxError> {
            Ok("https://[::1]:8443".to_string())
        }

        fn literal(&self, url: &str) -> std::result::Result<String, BoxError> {
            Ok(url.to_string())
        }

        fn url(endpoint: &String) -> &str {
            endpoint
        }
    }

    #[tokio::test]
    async fn test_fips_lookup_uses_bare_ipv6_host() {
        let dns = Arc::new(StaticHostResolver::new().resolves("::1"));
        let resolver = EndpointResolver::with_host_resolver("emr", Loopback, Arc::clone(&dns));

        let endpoint = resolver
            .resolve(
                &CallContext::background(),
                ResolutionOptions::new("us-east-1").with_fips(true),
            )
            .await
            .unwrap();

        assert_eq!(endpoint.url(), "https://[::1]:8443");
        assert!(endpoint.validated());
        assert_eq!(dns.lookups(), 1);
    }
}
