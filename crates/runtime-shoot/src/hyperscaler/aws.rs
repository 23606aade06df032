//! AWS provider strategy
//!
//! Lays out the node CIDR as one block per zone. With a node prefix of `/P`
//! each zone gets a `/(P+3)` workers subnet followed by a `/(P+4)` public and
//! a `/(P+4)` internal subnet, so a `/16` yields `/19` + `/20` + `/20` per zone.

use runtime_common::crd::{ProviderType, RawExtension};
use runtime_common::{ConfigKind, Error, Result};
use serde::{Deserialize, Serialize};

use super::cidr::{InvalidCidr, Ipv4Cidr};
use super::{encode, ProviderStrategy};

/// API version of the AWS provider extension types
pub const AWS_API_VERSION: &str = "aws.provider.extensions.gardener.cloud/v1alpha1";

/// Session tokens must be presented to the instance metadata service
const HTTP_TOKENS_REQUIRED: &str = "required";

/// Containers on the node need one extra hop to reach the metadata service
const HTTP_PUT_RESPONSE_HOP_LIMIT: i64 = 2;

/// AWS `InfrastructureConfig`
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InfrastructureConfig {
    /// API version
    pub api_version: String,
    /// Always "InfrastructureConfig"
    pub kind: String,
    /// VPC and zone networks
    pub networks: Networks,
}

/// VPC and per-zone subnets
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Networks {
    /// The VPC
    pub vpc: Vpc,
    /// One entry per zone
    pub zones: Vec<Zone>,
}

/// VPC created for the shoot
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Vpc {
    /// VPC CIDR, equal to the node CIDR
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cidr: Option<String>,
}

/// Subnets of a single availability zone
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Zone {
    /// Availability zone name (e.g. "eu-central-1a")
    pub name: String,
    /// Subnet for worker nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<String>,
    /// Subnet for public load balancers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<String>,
    /// Subnet for internal load balancers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal: Option<String>,
}

impl Zone {
    fn unplanned(name: &str) -> Self {
        Self {
            name: name.to_string(),
            workers: None,
            public: None,
            internal: None,
        }
    }
}

/// AWS `ControlPlaneConfig`
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ControlPlaneConfig {
    /// API version
    pub api_version: String,
    /// Always "ControlPlaneConfig"
    pub kind: String,
}

/// AWS `WorkerConfig`
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorkerConfig {
    /// API version
    pub api_version: String,
    /// Always "WorkerConfig"
    pub kind: String,
    /// Instance metadata service settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_metadata_options: Option<InstanceMetadataOptions>,
}

/// Instance metadata service settings
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InstanceMetadataOptions {
    /// "required" enforces IMDSv2
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_tokens: Option<String>,
    /// Maximum number of network hops for metadata responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_put_response_hop_limit: Option<i64>,
}

/// Strategy for `aws` runtimes
#[derive(Clone, Copy, Debug, Default)]
pub struct AwsStrategy;

impl AwsStrategy {
    fn error(config: ConfigKind, message: impl Into<String>) -> Error {
        Error::provider_config(ProviderType::Aws.to_string(), config, message)
    }

    /// Compute the subnet triple of every zone
    ///
    /// Without a node CIDR the zones are listed by name only and the subnets
    /// are left to the provider extension.
    fn zone_networks(node_cidr: &str, zones: &[String]) -> Result<Vec<Zone>> {
        if node_cidr.is_empty() {
            return Ok(zones.iter().map(|name| Zone::unplanned(name)).collect());
        }
        let nodes: Ipv4Cidr = node_cidr
            .parse()
            .map_err(|e: InvalidCidr| Self::error(ConfigKind::Infrastructure, e.to_string()))?;
        let workers_prefix = nodes.prefix() + 3;
        let lb_prefix = workers_prefix + 1;
        if lb_prefix > 32 {
            return Err(Self::error(
                ConfigKind::Infrastructure,
                format!("node CIDR {node_cidr} is too small to split into zone subnets"),
            ));
        }

        zones
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let out_of_range = || {
                    Self::error(
                        ConfigKind::Infrastructure,
                        format!("zone {name} does not fit into node CIDR {node_cidr}"),
                    )
                };
                // A zone block spans two workers-sized subnets.
                let block = nodes
                    .subnet(workers_prefix - 1, index as u32)
                    .ok_or_else(out_of_range)?;
                let workers = block.subnet(workers_prefix, 0).ok_or_else(out_of_range)?;
                let public = workers.next(lb_prefix).ok_or_else(out_of_range)?;
                let internal = public.next(lb_prefix).ok_or_else(out_of_range)?;
                Ok(Zone {
                    name: name.clone(),
                    workers: Some(workers.to_string()),
                    public: Some(public.to_string()),
                    internal: Some(internal.to_string()),
                })
            })
            .collect()
    }
}

impl ProviderStrategy for AwsStrategy {
    fn provider_type(&self) -> ProviderType {
        ProviderType::Aws
    }

    fn infrastructure_config(&self, node_cidr: &str, zones: &[String]) -> Result<RawExtension> {
        let node_cidr = node_cidr.trim();
        let config = InfrastructureConfig {
            api_version: AWS_API_VERSION.to_string(),
            kind: "InfrastructureConfig".to_string(),
            networks: Networks {
                vpc: Vpc {
                    cidr: (!node_cidr.is_empty()).then(|| node_cidr.to_string()),
                },
                zones: Self::zone_networks(node_cidr, zones)?,
            },
        };
        encode(ProviderType::Aws, ConfigKind::Infrastructure, &config)
    }

    fn control_plane_config(&self, _zones: &[String]) -> Result<RawExtension> {
        let config = ControlPlaneConfig {
            api_version: AWS_API_VERSION.to_string(),
            kind: "ControlPlaneConfig".to_string(),
        };
        encode(ProviderType::Aws, ConfigKind::ControlPlane, &config)
    }

    fn hardened_worker_config(&self) -> Result<Option<RawExtension>> {
        let config = WorkerConfig {
            api_version: AWS_API_VERSION.to_string(),
            kind: "WorkerConfig".to_string(),
            instance_metadata_options: Some(InstanceMetadataOptions {
                http_tokens: Some(HTTP_TOKENS_REQUIRED.to_string()),
                http_put_response_hop_limit: Some(HTTP_PUT_RESPONSE_HOP_LIMIT),
            }),
        };
        encode(ProviderType::Aws, ConfigKind::Worker, &config).map(Some)
    }
}
