//! Service package registry.
//!
//! The registry is built once and never changes afterwards, so lookups need
//! no locking. Packages are either registered explicitly through
//! [`ServiceRegistryBuilder`] or collected at link time with
//! [`register_service_package!`](crate::register_service_package).

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{ConnsError, Result};
use crate::package::{Capabilities, ServicePackage};

/// A service package submitted through `inventory`.
pub struct ServicePackageEntry {
    /// Name the package is registered under.
    pub name: &'static str,
    /// Creates the package.
    pub factory: fn() -> Arc<dyn ServicePackage>,
}

inventory::collect!(ServicePackageEntry);

impl ServicePackageEntry {
    pub const fn new(name: &'static str, factory: fn() -> Arc<dyn ServicePackage>) -> Self {
        Self { name, factory }
    }
}

/// Register a service package for [`ServiceRegistry::from_inventory`].
///
/// ```rust,ignore
/// fn kms() -> Arc<dyn ServicePackage> {
///     Arc::new(KmsPackage)
/// }
///
/// stratus_conns::register_service_package!("kms", kms);
/// ```
#[macro_export]
macro_rules! register_service_package {
    ($name:expr, $factory:path) => {
        $crate::inventory::submit! {
            $crate::registry::ServicePackageEntry::new($name, $factory)
        }
    };
}

/// Immutable mapping from service name to service package.
#[derive(Default)]
pub struct ServiceRegistry {
    packages: HashMap<String, Arc<dyn ServicePackage>>,
}

impl ServiceRegistry {
    pub fn builder() -> ServiceRegistryBuilder {
        ServiceRegistryBuilder::new()
    }

    /// Build a registry from every package submitted with `register_service_package!`.
    pub fn from_inventory() -> Result<Self> {
        inventory::iter::<ServicePackageEntry>
            .into_iter()
            .fold(Self::builder(), |builder, entry| {
                builder.register_as(entry.name, (entry.factory)())
            })
            .build()
    }

    /// Find the package registered under `name`.
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn ServicePackage>> {
        self.packages
            .get(name)
            .cloned()
            .ok_or_else(|| ConnsError::UnknownService(name.to_string()))
    }

    /// Probe the capabilities of the package registered under `name`.
    pub fn capabilities(&self, name: &str) -> Result<Capabilities> {
        let package = self.lookup(name)?;
        Ok(Capabilities::probe(package.as_ref()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.packages.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceRegistry")
            .field("packages", &self.names())
            .finish()
    }
}

/// Builder for [`ServiceRegistry`].
#[derive(Default)]
pub struct ServiceRegistryBuilder {
    packages: Vec<(String, Arc<dyn ServicePackage>)>,
}

impl ServiceRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a package under its own name.
    pub fn register(self, package: Arc<dyn ServicePackage>) -> Self {
        let name = package.service_package_name().to_string();
        self.register_as(name, package)
    }

    /// Register a package under an explicit name.
    pub fn register_as(mut self, name: impl Into<String>, package: Arc<dyn ServicePackage>) -> Self {
        self.packages.push((name.into(), package));
        self
    }

    /// Build the registry. Fails if a name was registered twice.
    pub fn build(self) -> Result<ServiceRegistry> {
        let mut packages = HashMap::with_capacity(self.packages.len());

        for (name, package) in self.packages {
            if packages.contains_key(&name) {
                return Err(ConnsError::DuplicateService(name));
            }
            debug!(service = %name, capabilities = ?Capabilities::probe(package.as_ref()), "service package registered");
            packages.insert(name, package);
        }

        Ok(ServiceRegistry { packages })
    }
}
