//! Runtime Custom Resource Definition
//!
//! A Runtime is the hyperscaler-agnostic description of a desired cluster.
//! It is the input of the shoot synthesis pipeline.

use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

/// Specification for a Runtime
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "infrastructuremanager.kyma-project.io",
    version = "v1",
    kind = "Runtime",
    plural = "runtimes",
    shortname = "rt",
    status = "RuntimeStatus",
    namespaced,
    derive = "PartialEq",
    printcolumn = r#"{"name":"Shoot","type":"string","jsonPath":".spec.shoot.name"}"#,
    printcolumn = r#"{"name":"Provider","type":"string","jsonPath":".spec.shoot.provider.type"}"#,
    printcolumn = r#"{"name":"State","type":"string","jsonPath":".status.state"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeSpec {
    /// Desired cluster
    pub shoot: RuntimeShoot,

    /// Access and network security settings
    #[serde(default)]
    pub security: Security,
}

/// Observed state of a Runtime, written by the surrounding controller
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeStatus {
    /// Coarse lifecycle state (e.g. "Pending", "Ready", "Failed")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Desired cluster shape
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeShoot {
    /// Shoot name in the Gardener project
    pub name: String,

    /// Gardener purpose (evaluation, development, production)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,

    /// Hyperscaler region (e.g. "eu-central-1")
    pub region: String,

    /// Platform region the runtime was ordered in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_region: Option<String>,

    /// Secret binding holding hyperscaler credentials
    pub secret_binding_name: String,

    /// Pin the seed to the shoot's region
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enforce_seed_location: Option<bool>,

    /// Kubernetes version and API server settings
    #[serde(default)]
    pub kubernetes: Kubernetes,

    /// Hyperscaler and worker pools
    pub provider: Provider,

    /// Node, pod and service networks
    pub networking: Networking,

    /// Control plane settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_plane: Option<ControlPlane>,
}

/// Supported hyperscalers
///
/// Matched case-insensitively. Any other provider string is kept verbatim in
/// [`ProviderType::Unknown`] so errors can name it.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ProviderType {
    /// Amazon Web Services
    Aws,
    /// Microsoft Azure
    Azure,
    /// Google Cloud Platform
    Gcp,
    /// OpenStack
    OpenStack,
    /// Any provider string not recognized above, as written
    Unknown(String),
}

impl Default for ProviderType {
    fn default() -> Self {
        Self::Unknown(String::new())
    }
}

impl ProviderType {
    /// Classify a provider string, keeping unrecognized values
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "aws" => Self::Aws,
            "azure" => Self::Azure,
            "gcp" => Self::Gcp,
            "openstack" => Self::OpenStack,
            _ => Self::Unknown(name.to_string()),
        }
    }

    /// Gardener cloud profile backing this provider
    pub fn cloud_profile_name(&self) -> Option<&'static str> {
        match self {
            Self::Aws => Some("aws"),
            Self::Azure => Some("az"),
            Self::Gcp => Some("gcp"),
            Self::OpenStack => Some("converged-cloud-kyma"),
            Self::Unknown(_) => None,
        }
    }
}

impl std::str::FromStr for ProviderType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match Self::from_name(s) {
            Self::Unknown(raw) => Err(Error::unsupported_provider(raw)),
            known => Ok(known),
        }
    }
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Aws => write!(f, "aws"),
            Self::Azure => write!(f, "azure"),
            Self::Gcp => write!(f, "gcp"),
            Self::OpenStack => write!(f, "openstack"),
            Self::Unknown(raw) => write!(f, "{raw}"),
        }
    }
}

impl Serialize for ProviderType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ProviderType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}

impl JsonSchema for ProviderType {
    fn schema_name() -> String {
        "ProviderType".to_string()
    }

    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        String::json_schema(gen)
    }
}

/// Hyperscaler selection and worker pool declarations
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    /// Hyperscaler
    #[serde(rename = "type")]
    pub type_: ProviderType,

    /// Primary worker pool (first entry)
    #[serde(default)]
    pub workers: Vec<WorkerPool>,

    /// Further worker pools, in declaration order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_workers: Option<Vec<WorkerPool>>,
}

impl Provider {
    /// Primary pools followed by additional pools, in declaration order
    pub fn all_workers(&self) -> Vec<&WorkerPool> {
        self.workers
            .iter()
            .chain(self.additional_workers.iter().flatten())
            .collect()
    }
}

/// A named group of nodes sharing machine type, image and zones
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkerPool {
    /// Pool name, unique within the runtime
    pub name: String,

    /// Machine type and image
    pub machine: PoolMachine,

    /// Minimum number of nodes
    pub minimum: i32,

    /// Maximum number of nodes
    pub maximum: i32,

    /// Nodes added above the desired count during a rolling update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_surge: Option<IntOrString>,

    /// Nodes allowed to be unavailable during a rolling update
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_unavailable: Option<IntOrString>,

    /// Availability zones
    pub zones: Vec<String>,

    /// Root volume
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<PoolVolume>,
}

/// Machine settings of a worker pool
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PoolMachine {
    /// Machine type (e.g. "m6i.large")
    #[serde(rename = "type")]
    pub type_: String,

    /// Machine image; absent means use the configured default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<PoolMachineImage>,

    /// CPU architecture (e.g. "amd64")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
}

/// Declared machine image; each part falls back to the default independently
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PoolMachineImage {
    /// Image name (e.g. "gardenlinux")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Image version (e.g. "1312.3.0")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Root volume of a worker pool
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PoolVolume {
    /// Volume type (e.g. "gp3")
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    /// Volume size (e.g. "50Gi")
    pub size: String,
}

/// Cluster networks
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Networking {
    /// Network plugin (defaults to calico)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    /// Node CIDR, also used as the VPC/VNet CIDR
    pub nodes: String,

    /// Pod CIDR
    pub pods: String,

    /// Service CIDR
    pub services: String,
}

/// Kubernetes settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Kubernetes {
    /// Kubernetes version; absent means the configured default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// API server settings
    #[serde(default, rename = "kubeAPIServer")]
    pub kube_api_server: ApiServer,
}

/// API server settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiServer {
    /// Primary OIDC issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oidc_config: Option<OidcConfig>,

    /// Further OIDC issuers, served through the OIDC authenticator extension
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_oidc_config: Option<Vec<OidcConfig>>,
}

/// OIDC issuer configuration for the API server
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OidcConfig {
    /// Client ID registered at the issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Issuer URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer_url: Option<String>,

    /// Claim holding group memberships
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups_claim: Option<String>,

    /// Accepted token signing algorithms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signing_algs: Option<Vec<String>>,

    /// Claim holding the user name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username_claim: Option<String>,

    /// Prefix added to user names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username_prefix: Option<String>,
}

/// Control plane settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ControlPlane {
    /// High availability for the control plane
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high_availability: Option<HighAvailability>,
}

/// Control plane high availability
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HighAvailability {
    /// Failure tolerance
    pub failure_tolerance: FailureTolerance,
}

/// Failure tolerance of a highly available control plane
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct FailureTolerance {
    /// "node" or "zone"
    #[serde(rename = "type")]
    pub type_: String,
}

/// Access and network security settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Security {
    /// Cluster administrators
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub administrators: Vec<String>,

    /// Network filtering
    #[serde(default)]
    pub networking: NetworkingSecurity,
}

/// Network filtering settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct NetworkingSecurity {
    /// Traffic filter
    #[serde(default)]
    pub filter: Filter,
}

/// Egress and ingress filtering
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct Filter {
    /// Egress filter
    #[serde(default)]
    pub egress: FilterToggle,

    /// Ingress filter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingress: Option<FilterToggle>,
}

/// On/off switch for a filter
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct FilterToggle {
    /// Whether the filter is active
    #[serde(default)]
    pub enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    mod provider_type {
        use super::*;

        #[test]
        fn parses_known_providers_case_insensitively() {
            assert_eq!("aws".parse::<ProviderType>().unwrap(), ProviderType::Aws);
            assert_eq!("Azure".parse::<ProviderType>().unwrap(), ProviderType::Azure);
            assert_eq!("GCP".parse::<ProviderType>().unwrap(), ProviderType::Gcp);
            assert_eq!(
                "openstack".parse::<ProviderType>().unwrap(),
                ProviderType::OpenStack
            );
        }

        #[test]
        fn rejects_unknown_provider() {
            let err = "alicloud".parse::<ProviderType>().unwrap_err();
            match err {
                Error::UnsupportedProvider { provider } => assert_eq!(provider, "alicloud"),
                other => panic!("expected unsupported provider, got {other:?}"),
            }
        }

        #[test]
        fn unrecognized_value_keeps_its_name() {
            let parsed: ProviderType = serde_json::from_str(r#""alicloud""#).expect("any string deserializes");
            assert_eq!(parsed, ProviderType::Unknown("alicloud".to_string()));
            assert_eq!(parsed.to_string(), "alicloud");
        }

        #[test]
        fn serde_and_from_str_agree_on_case() {
            for name in ["aws", "AWS", "Azure", "gcp", "OpenStack", "alicloud"] {
                let deserialized: ProviderType =
                    serde_json::from_value(serde_json::json!(name)).expect("any string deserializes");
                assert_eq!(deserialized, ProviderType::from_name(name));
                match name.parse::<ProviderType>() {
                    Ok(parsed) => assert_eq!(parsed, deserialized),
                    Err(_) => assert!(matches!(deserialized, ProviderType::Unknown(_))),
                }
            }
        }

        #[test]
        fn serializes_lowercase() {
            let value = serde_json::to_value(ProviderType::from_name("AWS")).expect("serializable");
            assert_eq!(value, "aws");
        }

        #[test]
        fn provider_block_keeps_unknown_type() {
            let provider: Provider =
                serde_json::from_value(serde_json::json!({"type": "alicloud", "workers": []}))
                    .expect("valid provider");
            assert_eq!(provider.type_, ProviderType::Unknown("alicloud".to_string()));
            let json = serde_json::to_value(&provider).expect("serializable");
            assert_eq!(json["type"], "alicloud");
        }

        #[test]
        fn cloud_profiles() {
            assert_eq!(ProviderType::Aws.cloud_profile_name(), Some("aws"));
            assert_eq!(ProviderType::Azure.cloud_profile_name(), Some("az"));
            assert_eq!(ProviderType::default().cloud_profile_name(), None);
        }
    }

    mod provider {
        use super::*;

        fn pool(name: &str) -> WorkerPool {
            WorkerPool {
                name: name.to_string(),
                zones: vec!["eu-central-1a".to_string()],
                ..Default::default()
            }
        }

        #[test]
        fn all_workers_puts_primary_first() {
            let provider = Provider {
                type_: ProviderType::Aws,
                workers: vec![pool("main")],
                additional_workers: Some(vec![pool("b"), pool("a")]),
            };
            let names: Vec<_> = provider
                .all_workers()
                .iter()
                .map(|w| w.name.as_str())
                .collect();
            assert_eq!(names, vec!["main", "b", "a"]);
        }

        #[test]
        fn all_workers_without_additional() {
            let provider = Provider {
                type_: ProviderType::Aws,
                workers: vec![pool("main")],
                additional_workers: None,
            };
            assert_eq!(provider.all_workers().len(), 1);
        }
    }

    #[test]
    fn runtime_yaml_roundtrip() {
        let yaml = r#"
apiVersion: infrastructuremanager.kyma-project.io/v1
kind: Runtime
metadata:
  name: rt-1
  namespace: kcp-system
spec:
  shoot:
    name: c-12345
    region: eu-central-1
    secretBindingName: aws-binding
    provider:
      type: aws
      workers:
        - name: worker
          machine:
            type: m6i.large
            image:
              name: gardenlinux
          minimum: 1
          maximum: 3
          zones: [eu-central-1a]
    networking:
      nodes: 10.250.0.0/22
      pods: 100.64.0.0/12
      services: 100.104.0.0/13
"#;
        let runtime: Runtime = serde_yaml::from_str(yaml).expect("valid runtime");
        let shoot = &runtime.spec.shoot;
        assert_eq!(shoot.provider.type_, ProviderType::Aws);
        assert_eq!(shoot.provider.workers[0].machine.type_, "m6i.large");
        assert_eq!(
            shoot.provider.workers[0]
                .machine
                .image
                .as_ref()
                .and_then(|i| i.version.as_deref()),
            None
        );
        assert!(shoot.kubernetes.version.is_none());
        assert!(!runtime.spec.security.networking.filter.egress.enabled);
    }
}
