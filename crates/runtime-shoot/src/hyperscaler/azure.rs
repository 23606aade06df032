//! Azure provider strategy
//!
//! Azure zones are numbered ("1", "2", "3"). The VNet spans the node CIDR
//! and each zone receives the next `/(P+3)` subnet in declaration order.

use runtime_common::crd::{ProviderType, RawExtension};
use runtime_common::{ConfigKind, Error, Result};
use serde::{Deserialize, Serialize};

use super::cidr::{InvalidCidr, Ipv4Cidr};
use super::{encode, ProviderStrategy};

/// API version of the Azure provider extension types
pub const AZURE_API_VERSION: &str = "azure.provider.extensions.gardener.cloud/v1alpha1";

/// Azure `InfrastructureConfig`
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InfrastructureConfig {
    /// API version
    pub api_version: String,
    /// Always "InfrastructureConfig"
    pub kind: String,
    /// VNet and zone networks
    pub networks: Networks,
    /// Whether the cluster spans availability zones
    pub zoned: bool,
}

/// VNet and per-zone subnets
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Networks {
    /// The VNet
    pub vnet: Vnet,
    /// One entry per zone
    pub zones: Vec<Zone>,
}

/// VNet created for the shoot
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Vnet {
    /// VNet CIDR, equal to the node CIDR
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cidr: Option<String>,
}

/// Subnet of a single zone
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Zone {
    /// Zone number
    pub name: i32,
    /// Zone subnet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cidr: Option<String>,
}

/// Azure `ControlPlaneConfig`
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ControlPlaneConfig {
    /// API version
    pub api_version: String,
    /// Always "ControlPlaneConfig"
    pub kind: String,
}

/// Strategy for `azure` runtimes
#[derive(Clone, Copy, Debug, Default)]
pub struct AzureStrategy;

impl AzureStrategy {
    fn error(message: impl Into<String>) -> Error {
        Error::provider_config(
            ProviderType::Azure.to_string(),
            ConfigKind::Infrastructure,
            message,
        )
    }

    fn zone_number(name: &str) -> Result<i32> {
        name.parse()
            .map_err(|_| Self::error(format!("zone {name:?} is not a zone number")))
    }

    /// Without a node CIDR the zones carry no subnet
    fn zone_networks(node_cidr: &str, zones: &[String]) -> Result<Vec<Zone>> {
        if node_cidr.is_empty() {
            return zones
                .iter()
                .map(|name| {
                    Ok(Zone {
                        name: Self::zone_number(name)?,
                        cidr: None,
                    })
                })
                .collect();
        }
        let nodes: Ipv4Cidr = node_cidr
            .parse()
            .map_err(|e: InvalidCidr| Self::error(e.to_string()))?;
        let zone_prefix = nodes.prefix() + 3;

        zones
            .iter()
            .enumerate()
            .map(|(index, name)| {
                let number = Self::zone_number(name)?;
                let cidr = nodes.subnet(zone_prefix, index as u32).ok_or_else(|| {
                    Self::error(format!("zone {name} does not fit into node CIDR {node_cidr}"))
                })?;
                Ok(Zone {
                    name: number,
                    cidr: Some(cidr.to_string()),
                })
            })
            .collect()
    }
}

impl ProviderStrategy for AzureStrategy {
    fn provider_type(&self) -> ProviderType {
        ProviderType::Azure
    }

    fn infrastructure_config(&self, node_cidr: &str, zones: &[String]) -> Result<RawExtension> {
        let node_cidr = node_cidr.trim();
        let config = InfrastructureConfig {
            api_version: AZURE_API_VERSION.to_string(),
            kind: "InfrastructureConfig".to_string(),
            networks: Networks {
                vnet: Vnet {
                    cidr: (!node_cidr.is_empty()).then(|| node_cidr.to_string()),
                },
                zones: Self::zone_networks(node_cidr, zones)?,
            },
            zoned: true,
        };
        encode(ProviderType::Azure, ConfigKind::Infrastructure, &config)
    }

    fn control_plane_config(&self, _zones: &[String]) -> Result<RawExtension> {
        let config = ControlPlaneConfig {
            api_version: AZURE_API_VERSION.to_string(),
            kind: "ControlPlaneConfig".to_string(),
        };
        encode(ProviderType::Azure, ConfigKind::ControlPlane, &config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zones(names: &[&str]) -> Vec<String> {
        names.iter().map(|z| z.to_string()).collect()
    }

    fn zone(name: i32, cidr: &str) -> Zone {
        Zone {
            name,
            cidr: Some(cidr.to_string()),
        }
    }

    #[test]
    fn one_subnet_per_numbered_zone() {
        let raw = AzureStrategy
            .infrastructure_config("10.250.0.0/16", &zones(&["1", "2", "3"]))
            .expect("config builds");
        let config: InfrastructureConfig = raw.decode().expect("valid azure config");

        assert!(config.zoned);
        assert_eq!(config.api_version, AZURE_API_VERSION);
        assert_eq!(config.networks.vnet.cidr.as_deref(), Some("10.250.0.0/16"));
        assert_eq!(
            config.networks.zones,
            vec![
                zone(1, "10.250.0.0/19"),
                zone(2, "10.250.32.0/19"),
                zone(3, "10.250.64.0/19"),
            ]
        );
    }

    #[test]
    fn zone_order_follows_input() {
        let raw = AzureStrategy
            .infrastructure_config("10.250.0.0/22", &zones(&["3", "1"]))
            .expect("config builds");
        let config: InfrastructureConfig = raw.decode().expect("valid azure config");
        assert_eq!(
            config.networks.zones,
            vec![zone(3, "10.250.0.0/25"), zone(1, "10.250.0.128/25")]
        );
    }

    #[test]
    fn empty_node_cidr_omits_subnets() {
        let raw = AzureStrategy
            .infrastructure_config("", &zones(&["1", "2"]))
            .expect("config builds without node cidr");
        let value: serde_json::Value = raw.decode().expect("valid json");
        assert_eq!(value["networks"]["vnet"], serde_json::json!({}));
        assert_eq!(
            value["networks"]["zones"],
            serde_json::json!([{"name": 1}, {"name": 2}])
        );
    }

    #[test]
    fn named_zones_fail() {
        let err = AzureStrategy
            .infrastructure_config("10.250.0.0/16", &zones(&["westeurope-1"]))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ProviderConfig {
                config: ConfigKind::Infrastructure,
                ..
            }
        ));
    }

    #[test]
    fn control_plane_config_is_kind_only() {
        let raw = AzureStrategy.control_plane_config(&[]).expect("config builds");
        let config: ControlPlaneConfig = raw.decode().expect("valid control plane config");
        assert_eq!(config.kind, "ControlPlaneConfig");
    }
}
