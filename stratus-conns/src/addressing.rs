//! Hostnames, invoke URLs and partition constants derived from known state.

use std::fmt;
use std::str::FromStr;

use serde_json::json;

use crate::partition;

/// Stage name that maps to the root path of an HTTP API.
pub const DEFAULT_STAGE: &str = "$default";

/// Route 53 hosted zone of CloudFront distributions in the standard partitions.
/// See <https://docs.aws.amazon.com/Route53/latest/APIReference/API_AliasTarget.html>.
pub const CLOUDFRONT_HOSTED_ZONE_ID: &str = "Z2FDTNDATAQYW2";

/// Route 53 hosted zone of CloudFront distributions in the China partition.
/// See <https://docs.amazonaws.cn/en_us/aws/latest/userguide/route53.html>.
pub const CLOUDFRONT_CN_HOSTED_ZONE_ID: &str = "Z3RFFRIM2A3IF5";

/// Route 53 hosted zone of Global Accelerator accelerators.
pub const GLOBAL_ACCELERATOR_HOSTED_ZONE_ID: &str = "Z2BJ6XQ5FK7U4H";

/// Protocol of an API Gateway v2 API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolType {
    Http,
    Websocket,
}

impl fmt::Display for ProtocolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolType::Http => write!(f, "HTTP"),
            ProtocolType::Websocket => write!(f, "WEBSOCKET"),
        }
    }
}

impl FromStr for ProtocolType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "HTTP" => Ok(ProtocolType::Http),
            "WEBSOCKET" => Ok(ProtocolType::Websocket),
            other => Err(format!("unknown protocol type: {other}")),
        }
    }
}

/// `prefix.dns_suffix`, e.g. `route53.amazonaws.com`. The prefix has no trailing period.
pub fn partition_hostname(prefix: &str, dns_suffix: &str) -> String {
    format!("{prefix}.{dns_suffix}")
}

/// `prefix.region.dns_suffix`, e.g. `sqs.us-west-2.amazonaws.com`.
pub fn regional_hostname(prefix: &str, region: &str, dns_suffix: &str) -> String {
    format!("{prefix}.{region}.{dns_suffix}")
}

fn execute_api_hostname(api_id: &str, region: &str, dns_suffix: &str) -> String {
    regional_hostname(&format!("{api_id}.execute-api"), region, dns_suffix)
}

/// Invoke URL of an API Gateway REST API stage.
pub fn api_gateway_invoke_url(
    rest_api_id: &str,
    stage_name: &str,
    region: &str,
    dns_suffix: &str,
) -> String {
    format!(
        "https://{}/{stage_name}",
        execute_api_hostname(rest_api_id, region, dns_suffix)
    )
}

/// Invoke URL of an API Gateway v2 (WebSocket or HTTP) API stage.
pub fn api_gateway_v2_invoke_url(
    protocol: ProtocolType,
    api_id: &str,
    stage_name: &str,
    region: &str,
    dns_suffix: &str,
) -> String {
    let host = execute_api_hostname(api_id, region, dns_suffix);
    match protocol {
        ProtocolType::Websocket => format!("wss://{host}/{stage_name}"),
        ProtocolType::Http if stage_name == DEFAULT_STAGE => format!("https://{host}/"),
        ProtocolType::Http => format!("https://{host}/{stage_name}"),
    }
}

/// CloudFront distribution hosted zone for the partition.
pub fn cloudfront_distribution_hosted_zone_id(partition_id: &str) -> &'static str {
    if partition_id == partition::AWS_CN {
        CLOUDFRONT_CN_HOSTED_ZONE_ID
    } else {
        CLOUDFRONT_HOSTED_ZONE_ID
    }
}

/// Global Accelerator hosted zone. Identical in every partition.
pub fn global_accelerator_hosted_zone_id() -> &'static str {
    GLOBAL_ACCELERATOR_HOSTED_ZONE_ID
}

/// Default KMS key policy granting the account root full key management.
pub fn default_kms_key_policy(partition_id: &str, account_id: &str) -> String {
    let policy = json!({
        "Id": "default",
        "Version": "2012-10-17",
        "Statement": [
            {
                "Sid": "Enable IAM User Permissions",
                "Effect": "Allow",
                "Principal": {
                    "AWS": format!("arn:{partition_id}:iam::{account_id}:root")
                },
                "Action": "kms:*",
                "Resource": "*"
            }
        ]
    });

    serde_json::to_string_pretty(&policy).unwrap_or_else(|_| policy.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hostnames() {
        assert_eq!(
            partition_hostname("route53", "amazonaws.com"),
            "route53.amazonaws.com"
        );
        assert_eq!(
            regional_hostname("sqs", "cn-north-1", "amazonaws.com.cn"),
            "sqs.cn-north-1.amazonaws.com.cn"
        );
    }

    #[test]
    fn test_websocket_invoke_url() {
        assert_eq!(
            api_gateway_v2_invoke_url(
                ProtocolType::Websocket,
                "abc123",
                "prod",
                "us-gov-west-1",
                "amazonaws.com"
            ),
            "wss://abc123.execute-api.us-gov-west-1.amazonaws.com/prod"
        );
    }

    #[test]
    fn test_http_invoke_url() {
        assert_eq!(
            api_gateway_v2_invoke_url(ProtocolType::Http, "abc123", "prod", "us-east-1", "amazonaws.com"),
            "https://abc123.execute-api.us-east-1.amazonaws.com/prod"
        );
        assert_eq!(
            api_gateway_v2_invoke_url(
                ProtocolType::Http,
                "abc123",
                DEFAULT_STAGE,
                "us-east-1",
                "amazonaws.com"
            ),
            "https://abc123.execute-api.us-east-1.amazonaws.com/"
        );
    }

    #[test]
    fn test_websocket_keeps_default_stage() {
        assert_eq!(
            api_gateway_v2_invoke_url(
                ProtocolType::Websocket,
                "abc123",
                DEFAULT_STAGE,
                "us-east-1",
                "amazonaws.com"
            ),
            "wss://abc123.execute-api.us-east-1.amazonaws.com/$default"
        );
    }

    #[test]
    fn test_rest_invoke_url() {
        assert_eq!(
            api_gateway_invoke_url("r3st", "dev", "eu-west-1", "amazonaws.com"),
            "https://r3st.execute-api.eu-west-1.amazonaws.com/dev"
        );
    }

    #[test]
    fn test_hosted_zone_ids() {
        assert_eq!(
            cloudfront_distribution_hosted_zone_id(partition::AWS_CN),
            "Z3RFFRIM2A3IF5"
        );
        assert_eq!(
            cloudfront_distribution_hosted_zone_id(partition::AWS),
            "Z2FDTNDATAQYW2"
        );
        assert_eq!(global_accelerator_hosted_zone_id(), "Z2BJ6XQ5FK7U4H");
    }

    #[test]
    fn test_protocol_type_parse() {
        assert_eq!("websocket".parse::<ProtocolType>(), Ok(ProtocolType::Websocket));
        assert_eq!("HTTP".parse::<ProtocolType>(), Ok(ProtocolType::Http));
        assert!("grpc".parse::<ProtocolType>().is_err());
    }

    #[test]
    fn test_default_kms_key_policy() {
        let policy: serde_json::Value =
            serde_json::from_str(&default_kms_key_policy("aws-us-gov", "123456789012")).unwrap();

        assert_eq!(policy["Id"], "default");
        assert_eq!(policy["Version"], "2012-10-17");
        let statement = &policy["Statement"][0];
        assert_eq!(
            statement["Principal"]["AWS"],
            "arn:aws-us-gov:iam::123456789012:root"
        );
        assert_eq!(statement["Action"], "kms:*");
        assert_eq!(statement["Resource"], "*");
    }
}
