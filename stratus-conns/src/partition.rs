//! Static description of the AWS partitions.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::endpoint::{DefaultResolve, ResolutionOptions};
use crate::error::BoxError;

pub const AWS: &str = "aws";
pub const AWS_CN: &str = "aws-cn";
pub const AWS_US_GOV: &str = "aws-us-gov";
pub const AWS_ISO: &str = "aws-iso";
pub const AWS_ISO_B: &str = "aws-iso-b";

/// A top-level division of AWS infrastructure.
#[derive(Debug, PartialEq, Eq)]
pub struct Partition {
    id: &'static str,
    name: &'static str,
    dns_suffix: &'static str,
    dual_stack_dns_suffix: Option<&'static str>,
    region_pattern: &'static str,
}

impl Partition {
    pub fn id(&self) -> &'static str {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Domain suffix for hostnames, e.g. `amazonaws.com`.
    pub fn dns_suffix(&self) -> &'static str {
        self.dns_suffix
    }

    pub fn dual_stack_dns_suffix(&self) -> Option<&'static str> {
        self.dual_stack_dns_suffix
    }

    pub fn contains_region(&self, region: &str) -> bool {
        PATTERNS
            .iter()
            .find(|(id, _)| *id == self.id)
            .is_some_and(|(_, pattern)| pattern.is_match(region))
    }
}

static PARTITIONS: [Partition; 5] = [
    Partition {
        id: AWS,
        name: "AWS Standard",
        dns_suffix: "amazonaws.com",
        dual_stack_dns_suffix: Some("api.aws"),
        region_pattern: r"^(us|eu|ap|sa|ca|me|af|il|mx)\-\w+\-\d+$",
    },
    Partition {
        id: AWS_CN,
        name: "AWS China",
        dns_suffix: "amazonaws.com.cn",
        dual_stack_dns_suffix: Some("api.amazonwebservices.com.cn"),
        region_pattern: r"^cn\-\w+\-\d+$",
    },
    Partition {
        id: AWS_US_GOV,
        name: "AWS GovCloud (US)",
        dns_suffix: "amazonaws.com",
        dual_stack_dns_suffix: Some("api.aws"),
        region_pattern: r"^us\-gov\-\w+\-\d+$",
    },
    Partition {
        id: AWS_ISO,
        name: "AWS ISO (US)",
        dns_suffix: "c2s.ic.gov",
        dual_stack_dns_suffix: None,
        region_pattern: r"^us\-iso\-\w+\-\d+$",
    },
    Partition {
        id: AWS_ISO_B,
        name: "AWS ISOB (US)",
        dns_suffix: "sc2s.sgov.gov",
        dual_stack_dns_suffix: None,
        region_pattern: r"^us\-isob\-\w+\-\d+$",
    },
];

static PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    PARTITIONS
        .iter()
        .filter_map(|p| Regex::new(p.region_pattern).ok().map(|re| (p.id, re)))
        .collect()
});

/// All known partitions.
pub fn partitions() -> &'static [Partition] {
    &PARTITIONS
}

/// Look a partition up by its identifier.
pub fn partition(id: &str) -> Option<&'static Partition> {
    PARTITIONS.iter().find(|p| p.id == id)
}

/// The partition a region belongs to. Unrecognized regions map to `aws`.
pub fn partition_for_region(region: &str) -> &'static Partition {
    PARTITIONS
        .iter()
        .find(|p| p.contains_region(region))
        .unwrap_or(&PARTITIONS[0])
}

/// Default resolution primitive for session-based (v1) clients.
///
/// Endpoints follow the partition template
/// `https://{service}[-fips].{region}.{suffix}`; dual-stack endpoints use the
/// partition's dual-stack suffix.
#[derive(Debug, Clone, Copy, Default)]
pub struct PartitionResolver;

impl PartitionResolver {
    pub fn endpoint_for(service: &str, options: &ResolutionOptions) -> Result<String, BoxError> {
        let region = options.region();
        if region.is_empty() {
            return Err(format!("no region configured for {service}").into());
        }

        let partition = partition_for_region(region);
        let suffix = if options.use_dual_stack() {
            partition.dual_stack_dns_suffix().ok_or_else(|| {
                format!("dual-stack endpoints are not available in partition {}", partition.id())
            })?
        } else {
            partition.dns_suffix()
        };

        let host = if options.use_fips() {
            format!("{service}-fips")
        } else {
            service.to_string()
        };

        Ok(format!("https://{host}.{region}.{suffix}"))
    }
}

#[async_trait]
impl DefaultResolve for PartitionResolver {
    type Endpoint = String;

    async fn default_resolve(
        &self,
        service: &str,
        options: &ResolutionOptions,
    ) -> Result<String, BoxError> {
        Self::endpoint_for(service, options)
    }

    fn literal(&self, url: &str) -> Result<String, BoxError> {
        Ok(url.to_string())
    }

    fn url(endpoint: &String) -> &str {
        endpoint
    }
}
