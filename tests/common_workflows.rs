//! Integration tests for common Stratus workflows.
//!
//! These tests go through the facade the way a resource manager would.

use std::sync::Arc;

use stratus::prelude::*;
use stratus::{HostAnswer, SdkGeneration, StaticHostResolver};

// =============================================================================
// Provider Setup
// =============================================================================

fn aws_client(region: &str, registry: ServiceRegistry) -> AwsClient {
    let config = ConnsConfig::builder()
        .region(region)
        .account_id("123456789012")
        .use_fips_endpoint(true)
        .build();
    AwsClient::new(config, Arc::new(registry)).unwrap()
}

#[test]
fn test_provider_addressing() {
    let aws = aws_client("us-gov-west-1", ServiceRegistry::default());

    assert_eq!(aws.partition().id(), "aws-us-gov");
    assert_eq!(aws.partition_hostname("route53"), "route53.amazonaws.com");
    assert_eq!(
        aws.api_gateway_invoke_url("r3st", "prod"),
        "https://r3st.execute-api.us-gov-west-1.amazonaws.com/prod"
    );
    assert_eq!(
        aws.api_gateway_v2_invoke_url(ProtocolType::Websocket, "abc123", "prod"),
        "wss://abc123.execute-api.us-gov-west-1.amazonaws.com/prod"
    );

    let policy: serde_json::Value = serde_json::from_str(&aws.default_kms_key_policy()).unwrap();
    assert_eq!(
        policy["Statement"][0]["Principal"]["AWS"],
        "arn:aws-us-gov:iam::123456789012:root"
    );
}

// =============================================================================
// Session Clients
// =============================================================================

#[derive(Debug)]
struct QueueConn {
    url: String,
}

struct Queue;

impl ServicePackage for Queue {
    fn service_package_name(&self) -> &str {
        "queue"
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
    ) -> Result<AnyClient, BoxError> {
        let endpoint = session.resolve_endpoint(ctx, "sqs").await?;
        Ok(Box::new(QueueConn {
            url: endpoint.url().to_string(),
        }))
    }
}

#[tokio::test]
async fn test_session_client_with_fips_fallback() {
    let registry = ServiceRegistry::builder()
        .register(Arc::new(Queue))
        .build()
        .unwrap();
    let dns = Arc::new(
        StaticHostResolver::new().answer("sqs-fips.eu-west-1.amazonaws.com", HostAnswer::NotFound),
    );
    let mut aws = aws_client("eu-west-1", registry).with_host_resolver(dns.clone());
    aws.init_session();

    let queue: QueueConn = aws.conn(&CallContext::background(), "queue").await.unwrap();

    assert_eq!(queue.url, "https://sqs.eu-west-1.amazonaws.com");
    assert_eq!(dns.lookups(), 1);
}

#[tokio::test]
async fn test_shared_config_path_without_package_support() {
    let registry = ServiceRegistry::builder()
        .register(Arc::new(Queue))
        .build()
        .unwrap();
    let mut aws = aws_client("eu-west-1", registry);
    aws.set_shared_config(SharedConfig::new(
        stratus::aws_types::SdkConfig::builder().build(),
    ));

    let err = aws
        .client::<QueueConn>(&CallContext::background(), "queue")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ConnsError::UnsupportedGeneration {
            generation: SdkGeneration::V2,
            ..
        }
    ));
}

#[tokio::test]
async fn test_cancelled_call() {
    let registry = ServiceRegistry::builder()
        .register(Arc::new(Queue))
        .build()
        .unwrap();
    let mut aws = aws_client("eu-west-1", registry)
        .with_host_resolver(Arc::new(
            StaticHostResolver::new().answer("sqs-fips.eu-west-1.amazonaws.com", HostAnswer::Hang),
        ));
    aws.init_session();

    let ctx = CallContext::background();
    let child = ctx.child();
    ctx.cancel();

    let err = aws.conn::<QueueConn>(&child, "queue").await.unwrap_err();
    assert!(err.is_cancellation());
}

// =============================================================================
// Service Packages
// =============================================================================

#[cfg(feature = "kms")]
#[test]
fn test_kms_package_registered() {
    let registry = ServiceRegistry::from_inventory().unwrap();
    let capabilities = registry.capabilities("kms").unwrap();

    assert!(capabilities.constructs(SdkGeneration::V1));
    assert!(capabilities.constructs(SdkGeneration::V2));
}

#[cfg(feature = "log")]
#[test]
fn test_log_config_from_environment() {
    let config = stratus::stratus_log::LogConfig::from_lookup(|key| {
        (key == "STRATUS_LOG_LEVEL").then(|| "debug".to_string())
    });
    assert_eq!(config.level, stratus::stratus_log::Level::Debug);
}
