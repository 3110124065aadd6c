//! Session-bound API connections.

use aws_credential_types::Credentials;
use stratus_conns::{CallContext, ResolvedEndpoint, Result, Session};
use tracing::debug;

/// Everything a v1 request signer needs to talk to one service: the
/// resolved endpoint, the session's HTTP client and its credentials.
#[derive(Debug, Clone)]
pub struct Conn {
    service: String,
    region: String,
    endpoint: ResolvedEndpoint,
    http_client: reqwest::Client,
    credentials: Option<Credentials>,
}

impl Conn {
    /// Resolve the endpoint of `service` for `session` and bind to it.
    pub async fn connect(ctx: &CallContext, session: &Session, service: &str) -> Result<Self> {
        let endpoint = session.resolve_endpoint(ctx, service).await?;
        debug!(
            service,
            region = session.region(),
            endpoint = endpoint.url(),
            validated = endpoint.validated(),
            "API connection bound"
        );

        Ok(Self {
            service: service.to_string(),
            region: session.region().to_string(),
            endpoint,
            http_client: session.http_client().clone(),
            credentials: session.credentials().cloned(),
        })
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn endpoint(&self) -> &ResolvedEndpoint {
        &self.endpoint
    }

    /// Base URL requests are sent to.
    pub fn url(&self) -> &str {
        self.endpoint.url()
    }

    pub fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }
}
