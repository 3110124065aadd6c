//! Service package generator.
//!
//! Each invocation produces a module holding the package registered under the
//! service name, the SDK's rule-based resolver adapted to
//! [`DefaultResolve`](stratus_conns::DefaultResolve), and a `FipsEndpointResolver`
//! the package installs on every v2 client it builds.

macro_rules! service_package {
    ($(#[$meta:meta])* pub mod $module:ident => $sdk:ident, $name:literal;) => {
        $(#[$meta])*
        pub mod $module {
            use std::fmt;
            use std::sync::Arc;

            use async_trait::async_trait;
            use $sdk::config::endpoint::{
                self as sdk_endpoint, Endpoint, EndpointFuture, Params, ResolveEndpoint as _,
            };
            use stratus_conns::{
                AnyClient, BoxError, CallContext, CustomizeClient, DefaultResolve, EndpointResolver,
                HostResolver, NewClient, ResolutionOptions, ServicePackage, Session, SharedConfig,
            };
            use tracing::debug;

            use crate::Conn;

            /// Name the package is registered under.
            pub const SERVICE: &str = $name;

            /// The SDK's rule-based endpoint resolver.
            pub struct DefaultResolver(sdk_endpoint::DefaultResolver);

            impl DefaultResolver {
                pub fn new() -> Self {
                    Self(sdk_endpoint::DefaultResolver::new())
                }
            }

            impl Default for DefaultResolver {
                fn default() -> Self {
                    Self::new()
                }
            }

            impl fmt::Debug for DefaultResolver {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.debug_tuple("DefaultResolver").field(&SERVICE).finish()
                }
            }

            #[async_trait]
            impl DefaultResolve for DefaultResolver {
                type Endpoint = Endpoint;

                async fn default_resolve(
                    &self,
                    _service: &str,
                    options: &ResolutionOptions,
                ) -> Result<Endpoint, BoxError> {
                    let region = Some(options.region())
                        .filter(|region| !region.is_empty())
                        .map(str::to_string);
                    let params = Params::builder()
                        .set_region(region)
                        .use_fips(options.use_fips())
                        .use_dual_stack(options.use_dual_stack())
                        .build()?;
                    self.0.resolve_endpoint(&params).await
                }

                fn literal(&self, url: &str) -> Result<Endpoint, BoxError> {
                    Ok(Endpoint::builder().url(url.to_string()).build())
                }

                fn url(endpoint: &Endpoint) -> &str {
                    endpoint.url()
                }
            }

            /// Endpoint resolver that drops FIPS when the FIPS hostname does not exist.
            #[derive(Debug)]
            pub struct FipsEndpointResolver {
                inner: EndpointResolver<DefaultResolver, Arc<dyn HostResolver>>,
            }

            impl FipsEndpointResolver {
                pub fn new(host_resolver: Arc<dyn HostResolver>) -> Self {
                    Self {
                        inner: EndpointResolver::with_host_resolver(
                            SERVICE,
                            DefaultResolver::new(),
                            host_resolver,
                        ),
                    }
                }
            }

            impl sdk_endpoint::ResolveEndpoint for FipsEndpointResolver {
                fn resolve_endpoint<'a>(&'a self, params: &'a Params) -> EndpointFuture<'a> {
                    let mut options = ResolutionOptions::new(params.region().unwrap_or_default())
                        .with_fips(params.use_fips().unwrap_or(false))
                        .with_dual_stack(params.use_dual_stack().unwrap_or(false));
                    if let Some(url) = params.endpoint() {
                        options = options.with_endpoint(url);
                    }

                    EndpointFuture::new(async move {
                        let ctx = CallContext::background();
                        self.inner
                            .resolve(&ctx, options)
                            .await
                            .map(|resolved| resolved.into_endpoint())
                            .map_err(BoxError::from)
                    })
                }
            }

            /// Builds v2 clients with the FIPS resolver installed and v1 [`Conn`]s.
            #[derive(Debug, Default, Clone, Copy)]
            pub struct Package;

            impl ServicePackage for Package {
                fn service_package_name(&self) -> &str {
                    SERVICE
                }

                fn v1_constructor(&self) -> Option<&dyn NewClient<Session>> {
                    Some(self)
                }

                fn v2_constructor(&self) -> Option<&dyn NewClient<SharedConfig>> {
                    Some(self)
                }

                fn v2_customizer(&self) -> Option<&dyn CustomizeClient<SharedConfig>> {
                    Some(self)
                }
            }

            #[async_trait]
            impl NewClient<Session> for Package {
                async fn new_client(
                    &self,
                    ctx: &CallContext,
                    session: &Session,
                ) -> Result<AnyClient, BoxError> {
                    Ok(Box::new(Conn::connect(ctx, session, SERVICE).await?))
                }
            }

            #[async_trait]
            impl NewClient<SharedConfig> for Package {
                async fn new_client(
                    &self,
                    _ctx: &CallContext,
                    config: &SharedConfig,
                ) -> Result<AnyClient, BoxError> {
                    let sdk_config = config.sdk_config();
                    let mut builder = $sdk::config::Builder::from(sdk_config);
                    if sdk_config.behavior_version().is_none() {
                        builder = builder.behavior_version($sdk::config::BehaviorVersion::latest());
                    }
                    if let Some(url) = config.endpoint_override(SERVICE) {
                        builder = builder.endpoint_url(url);
                    }
                    Ok(Box::new($sdk::Client::from_conf(builder.build())))
                }
            }

            #[async_trait]
            impl CustomizeClient<SharedConfig> for Package {
                async fn customize_client(
                    &self,
                    _ctx: &CallContext,
                    client: AnyClient,
                    config: &SharedConfig,
                ) -> Result<AnyClient, BoxError> {
                    let client = client.downcast::<$sdk::Client>().map_err(|_| {
                        format!(
                            "{SERVICE} client is not a {}",
                            std::any::type_name::<$sdk::Client>()
                        )
                    })?;

                    let conf = client
                        .config()
                        .to_builder()
                        .endpoint_resolver(FipsEndpointResolver::new(config.host_resolver()))
                        .build();
                    debug!(
                        service = SERVICE,
                        use_fips = config.use_fips(),
                        "FIPS endpoint resolver installed"
                    );

                    Ok(Box::new($sdk::Client::from_conf(conf)))
                }
            }

            fn package() -> Arc<dyn ServicePackage> {
                Arc::new(Package)
            }

            stratus_conns::register_service_package!(SERVICE, package);
        }
    };
}
