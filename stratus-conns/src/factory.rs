//! Client factory for both SDK generations.

use std::any::Any;

use tracing::debug;

use crate::context::CallContext;
use crate::error::{ConnsError, Result};
use crate::package::Ambient;
use crate::registry::ServiceRegistry;
use crate::session::{Session, SharedConfig};

/// Build the session-based (v1) client for `service`.
pub async fn conn<T: Any>(
    ctx: &CallContext,
    registry: &ServiceRegistry,
    session: &Session,
    service: &str,
) -> Result<T> {
    build_client(ctx, registry, session, service).await
}

/// Build the shared-config (v2) client for `service`.
pub async fn client<T: Any>(
    ctx: &CallContext,
    registry: &ServiceRegistry,
    config: &SharedConfig,
    service: &str,
) -> Result<T> {
    build_client(ctx, registry, config, service).await
}

/// Construct, customize and return the client of `service` for the generation
/// of `ambient`. A client is only returned once customization succeeded.
///
/// Constructors that fail with a [`ConnsError`] have it returned as is.
pub async fn build_client<A: Ambient, T: Any>(
    ctx: &CallContext,
    registry: &ServiceRegistry,
    ambient: &A,
    service: &str,
) -> Result<T> {
    let generation = A::GENERATION;
    let package = registry.lookup(service)?;

    let constructor =
        A::constructor(package.as_ref()).ok_or_else(|| ConnsError::UnsupportedGeneration {
            service: service.to_string(),
            generation,
        })?;

    let client = ctx
        .run(constructor.new_client(ctx, ambient))
        .await
        .map_err(|reason| ConnsError::interrupted(service, reason))?
        .map_err(|source| match source.downcast::<ConnsError>() {
            Ok(err) => *err,
            Err(source) => ConnsError::Construction {
                service: service.to_string(),
                generation,
                source,
            },
        })?;

    let client = match A::customizer(package.as_ref()) {
        Some(customizer) => ctx
            .run(customizer.customize_client(ctx, client, ambient))
            .await
            .map_err(|reason| ConnsError::interrupted(service, reason))?
            .map_err(|source| ConnsError::Customization {
                service: service.to_string(),
                generation,
                source,
            })?,
        None => client,
    };

    let client = client
        .downcast::<T>()
        .map_err(|_| ConnsError::ClientType {
            service: service.to_string(),
            generation,
            expected: std::any::type_name::<T>(),
        })?;

    debug!(service, %generation, "API client created");
    Ok(*client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BoxError;
    use crate::package::{AnyClient, CustomizeClient, NewClient, ServicePackage};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, PartialEq)]
    struct EmrConn {
        region: String,
        customized: bool,
    }

    #[derive(Default)]
    struct Emr {
        constructed: AtomicUsize,
        customized: AtomicUsize,
        fail_construct: bool,
        fail_customize: bool,
    }

    impl ServicePackage for Emr {
        fn service_package_name(&self) -> &str {
            "emr"
        }

        fn v1_constructor(&self) -> Option<&dyn NewClient<Session>> {
            Some(self)
        }

        fn v1_customizer(&self) -> Option<&dyn CustomizeClient<Session>> {
            Some(self)
        }
    }

    #[async_trait]
    impl NewClient<Session> for Emr {
        async fn new_client(
            &self,
            _ctx: &CallContext,
            session: &Session,
        ) -> std::result::Result<AnyClient, BoxError> {
            self.constructed.fetch_add(1, Ordering::SeqCst);
            if self.fail_construct {
                return Err("credentials expired".into());
            }
            Ok(Box::new(EmrConn {
                region: session.region().to_string(),
                customized: false,
            }))
        }
    }

    #[async_trait]
    impl CustomizeClient<Session> for Emr {
        async fn customize_client(
            &self,
            _ctx: &CallContext,
            client: AnyClient,
            _session: &Session,
        ) -> std::result::Result<AnyClient, BoxError> {
            self.customized.fetch_add(1, Ordering::SeqCst);
            if self.fail_customize {
                return Err("middleware rejected".into());
            }
            let mut conn = client.downcast::<EmrConn>().map_err(|_| "not an EmrConn")?;
            conn.customized = true;
            Ok(conn)
        }
    }

    fn registry(package: Arc<Emr>) -> ServiceRegistry {
        ServiceRegistry::builder().register(package).build().unwrap()
    }

    #[tokio::test]
    async fn test_conn_constructs_and_customizes_once() {
        let emr = Arc::new(Emr::default());
        let registry = registry(Arc::clone(&emr));
        let session = Session::builder("eu-west-1").build();

        let conn: EmrConn = conn(&CallContext::background(), &registry, &session, "emr")
            .await
            .unwrap();

        assert_eq!(
            conn,
            EmrConn {
                region: "eu-west-1".to_string(),
                customized: true
            }
        );
        assert_eq!(emr.constructed.load(Ordering::SeqCst), 1);
        assert_eq!(emr.customized.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_customization_failure_returns_no_client() {
        let emr = Arc::new(Emr {
            fail_customize: true,
            ..Emr::default()
        });
        let registry = registry(emr);
        let session = Session::builder("eu-west-1").build();

        let err = conn::<EmrConn>(&CallContext::background(), &registry, &session, "emr")
            .await
            .unwrap_err();

        assert!(matches!(err, ConnsError::Customization { .. }));
    }

    #[tokio::test]
    async fn test_construction_failure_skips_customizer() {
        let emr = Arc::new(Emr {
            fail_construct: true,
            ..Emr::default()
        });
        let registry = registry(Arc::clone(&emr));
        let session = Session::builder("eu-west-1").build();

        let err = conn::<EmrConn>(&CallContext::background(), &registry, &session, "emr")
            .await
            .unwrap_err();

        match &err {
            ConnsError::Construction {
                service,
                generation,
                source,
            } => {
                assert_eq!(service, "emr");
                assert_eq!(*generation, crate::SdkGeneration::V1);
                assert_eq!(source.to_string(), "credentials expired");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.is_permanent());
        assert_eq!(emr.constructed.load(Ordering::SeqCst), 1);
        assert_eq!(emr.customized.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_wrong_client_type() {
        let registry = registry(Arc::new(Emr::default()));
        let session = Session::builder("eu-west-1").build();

        let err = conn::<String>(&CallContext::background(), &registry, &session, "emr")
            .await
            .unwrap_err();

        assert!(matches!(err, ConnsError::ClientType { .. }));
    }

    #[tokio::test]
    async fn test_v2_path_unsupported() {
        let registry = registry(Arc::new(Emr::default()));
        let config = SharedConfig::new(aws_types::SdkConfig::builder().build());

        let err = client::<EmrConn>(&CallContext::background(), &registry, &config, "emr")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ConnsError::UnsupportedGeneration {
                generation: crate::SdkGeneration::V2,
                ..
            }
        ));
    }

    struct Queue;

    impl ServicePackage for Queue {
        fn service_package_name(&self) -> &str {
            "sqs"
        }

        fn v1_constructor(&self) -> Option<&dyn NewClient<Session>> {
            Some(self)
        }
    }

    #[async_trait]
    impl NewClient<Session> for Queue {
        async fn new_client(
            &self,
            ctx: &CallContext,
            session: &Session,
        ) -> std::result::Result<AnyClient, BoxError> {
            let endpoint = session.resolve_endpoint(ctx, "sqs").await?;
            Ok(Box::new(endpoint))
        }
    }

    #[tokio::test]
    async fn test_typed_construction_error_kept() {
        use crate::dns::{HostAnswer, StaticHostResolver};

        let registry = ServiceRegistry::builder()
            .register(Arc::new(Queue))
            .build()
            .unwrap();
        let dns = StaticHostResolver::new().answer(
            "sqs-fips.us-east-1.amazonaws.com",
            HostAnswer::Fail("SERVFAIL".to_string()),
        );
        let session = Session::builder("us-east-1")
            .use_fips(true)
            .host_resolver(Arc::new(dns))
            .build();

        let err = conn::<crate::ResolvedEndpoint>(&CallContext::background(), &registry, &session, "sqs")
            .await
            .unwrap_err();

        assert!(matches!(err, ConnsError::DnsProbe { .. }));
        assert!(!err.is_permanent());
    }

    #[tokio::test]
    async fn test_cancelled_before_construction() {
        let emr = Arc::new(Emr::default());
        let registry = registry(Arc::clone(&emr));
        let session = Session::builder("eu-west-1").build();
        let ctx = CallContext::background();
        ctx.cancel();

        let err = conn::<EmrConn>(&ctx, &registry, &session, "emr")
            .await
            .unwrap_err();

        assert!(err.is_cancellation());
        assert_eq!(emr.constructed.load(Ordering::SeqCst), 0);
    }

    #[derive(Debug)]
    struct SearchClient;

    #[derive(Default)]
    struct Search {
        customized: AtomicUsize,
    }

    impl ServicePackage for Search {
        fn service_package_name(&self) -> &str {
            "opensearch"
        }

        fn v2_constructor(&self) -> Option<&dyn NewClient<SharedConfig>> {
            Some(self)
        }

        fn v2_customizer(&self) -> Option<&dyn CustomizeClient<SharedConfig>> {
            Some(self)
        }
    }

    #[async_trait]
    impl NewClient<SharedConfig> for Search {
        async fn new_client(
            &self,
            _ctx: &CallContext,
            _config: &SharedConfig,
        ) -> std::result::Result<AnyClient, BoxError> {
            Ok(Box::new(SearchClient))
        }
    }

    #[async_trait]
    impl CustomizeClient<SharedConfig> for Search {
        async fn customize_client(
            &self,
            _ctx: &CallContext,
            _client: AnyClient,
            _config: &SharedConfig,
        ) -> std::result::Result<AnyClient, BoxError> {
            self.customized.fetch_add(1, Ordering::SeqCst);
            Err("retry policy rejected".into())
        }
    }

    #[tokio::test]
    async fn test_v2_customization_failure() {
        let search = Arc::new(Search::default());
        let registry = ServiceRegistry::builder()
            .register(Arc::clone(&search) as Arc<dyn ServicePackage>)
            .build()
            .unwrap();
        let config = SharedConfig::new(aws_types::SdkConfig::builder().build());

        let err = client::<SearchClient>(&CallContext::background(), &registry, &config, "opensearch")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ConnsError::Customization {
                ref service,
                generation: crate::SdkGeneration::V2,
                ..
            } if service == "opensearch"
        ));
        assert_eq!(search.customized.load(Ordering::SeqCst), 1);
    }
}
