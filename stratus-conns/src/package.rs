//! Service packages and their optional capabilities.

use std::any::Any;
use std::fmt;

use async_trait::async_trait;

use crate::context::CallContext;
use crate::error::BoxError;
use crate::session::{Session, SharedConfig};

/// A type-erased API client crossing the capability seam.
pub type AnyClient = Box<dyn Any + Send + Sync>;

/// The two client SDK generations bridged by the factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SdkGeneration {
    /// Session-based clients.
    V1,
    /// Shared-config clients built on the `aws-sdk-*` crates.
    V2,
}

impl fmt::Display for SdkGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SdkGeneration::V1 => write!(f, "v1"),
            SdkGeneration::V2 => write!(f, "v2"),
        }
    }
}

/// Builds a client from the generation's ambient context.
#[async_trait]
pub trait NewClient<A: Sync>: Send + Sync {
    async fn new_client(&self, ctx: &CallContext, ambient: &A) -> Result<AnyClient, BoxError>;
}

/// Adjusts a freshly built client. Receives ownership so it may wrap or rebuild it.
#[async_trait]
pub trait CustomizeClient<A: Sync>: Send + Sync {
    async fn customize_client(
        &self,
        ctx: &CallContext,
        client: AnyClient,
        ambient: &A,
    ) -> Result<AnyClient, BoxError>;
}

/// Capability bundle registered for one service.
///
/// Every capability is optional; a package exposes one by returning
/// `Some(self)` (or a helper) from the matching accessor.
pub trait ServicePackage: Send + Sync {
    /// Canonical service name used as the registry key.
    fn service_package_name(&self) -> &str;

    fn v1_constructor(&self) -> Option<&dyn NewClient<Session>> {
        None
    }

    fn v1_customizer(&self) -> Option<&dyn CustomizeClient<Session>> {
        None
    }

    fn v2_constructor(&self) -> Option<&dyn NewClient<SharedConfig>> {
        None
    }

    fn v2_customizer(&self) -> Option<&dyn CustomizeClient<SharedConfig>> {
        None
    }
}

/// Ambient context of one SDK generation, selecting that generation's capabilities.
pub trait Ambient: Sync + Sized + 'static {
    const GENERATION: SdkGeneration;

    fn constructor(package: &dyn ServicePackage) -> Option<&dyn NewClient<Self>>;

    fn customizer(package: &dyn ServicePackage) -> Option<&dyn CustomizeClient<Self>>;
}

impl Ambient for Session {
    const GENERATION: SdkGeneration = SdkGeneration::V1;

    fn constructor(package: &dyn ServicePackage) -> Option<&dyn NewClient<Self>> {
        package.v1_constructor()
    }

    fn customizer(package: &dyn ServicePackage) -> Option<&dyn CustomizeClient<Self>> {
        package.v1_customizer()
    }
}

impl Ambient for SharedConfig {
    const GENERATION: SdkGeneration = SdkGeneration::V2;

    fn constructor(package: &dyn ServicePackage) -> Option<&dyn NewClient<Self>> {
        package.v2_constructor()
    }

    fn customizer(package: &dyn ServicePackage) -> Option<&dyn CustomizeClient<Self>> {
        package.v2_customizer()
    }
}

/// Capabilities found on a package at probe time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub constructs_v1: bool,
    pub constructs_v2: bool,
    pub customizes_v1: bool,
    pub customizes_v2: bool,
}

impl Capabilities {
    pub fn probe(package: &dyn ServicePackage) -> Self {
        Self {
            constructs_v1: supports_v1_construction(package),
            constructs_v2: supports_v2_construction(package),
            customizes_v1: supports_v1_customization(package),
            customizes_v2: supports_v2_customization(package),
        }
    }

    pub fn constructs(&self, generation: SdkGeneration) -> bool {
        match generation {
            SdkGeneration::V1 => self.constructs_v1,
            SdkGeneration::V2 => self.constructs_v2,
        }
    }

    pub fn customizes(&self, generation: SdkGeneration) -> bool {
        match generation {
            SdkGeneration::V1 => self.customizes_v1,
            SdkGeneration::V2 => self.customizes_v2,
        }
    }
}

pub fn supports_v1_construction(package: &dyn ServicePackage) -> bool {
    package.v1_constructor().is_some()
}

pub fn supports_v2_construction(package: &dyn ServicePackage) -> bool {
    package.v2_constructor().is_some()
}

pub fn supports_v1_customization(package: &dyn ServicePackage) -> bool {
    package.v1_customizer().is_some()
}

pub fn supports_v2_customization(package: &dyn ServicePackage) -> bool {
    package.v2_customizer().is_some()
}
