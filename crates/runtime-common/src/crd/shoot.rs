//! Gardener Shoot resource (subset)
//!
//! Only the fields the synthesis pipeline writes and the migration tool
//! reads are modelled. Unknown fields of live shoots are dropped on read.

use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::raw::RawExtension;
use super::runtime::OidcConfig;

/// Gardener cluster specification
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "core.gardener.cloud",
    version = "v1beta1",
    kind = "Shoot",
    plural = "shoots",
    namespaced,
    derive = "PartialEq"
)]
#[serde(rename_all = "camelCase")]
pub struct ShootSpec {
    /// Cloud profile with machine types and images
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_profile_name: Option<String>,

    /// Control plane settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_plane: Option<ControlPlane>,

    /// External DNS settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dns: Option<Dns>,

    /// Enabled Gardener extensions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<Extension>,

    /// Exposure class of the API server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exposure_class_name: Option<String>,

    /// Kubernetes settings
    #[serde(default)]
    pub kubernetes: Kubernetes,

    /// Maintenance settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance: Option<Maintenance>,

    /// Cluster networks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub networking: Option<Networking>,

    /// Provider section: workers and provider-specific configuration
    #[serde(default)]
    pub provider: Provider,

    /// Gardener purpose
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,

    /// Hyperscaler region
    #[serde(default)]
    pub region: String,

    /// Named resource references
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<NamedResourceReference>>,

    /// Secret binding holding hyperscaler credentials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_binding_name: Option<String>,

    /// Seed selection constraints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_selector: Option<SeedSelector>,
}

/// The provider section of a shoot
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Provider {
    /// Provider type (aws, azure, ...)
    #[serde(rename = "type", default)]
    pub type_: String,

    /// Infrastructure config (networks, zones)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infrastructure_config: Option<RawExtension>,

    /// Control plane config
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_plane_config: Option<RawExtension>,

    /// Worker pools
    #[serde(default)]
    pub workers: Vec<Worker>,

    /// Settings shared by all workers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers_settings: Option<WorkersSettings>,
}

/// A shoot worker pool
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    /// Pool name
    pub name: String,

    /// Machine type and image
    pub machine: Machine,

    /// Minimum number of nodes
    pub minimum: i32,

    /// Maximum number of nodes
    pub maximum: i32,

    /// Rolling update surge
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_surge: Option<IntOrString>,

    /// Rolling update unavailability
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_unavailable: Option<IntOrString>,

    /// Per-worker provider config
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_config: Option<RawExtension>,

    /// Root volume
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<Volume>,

    /// Availability zones
    #[serde(default)]
    pub zones: Vec<String>,
}

/// Machine settings of a shoot worker
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    /// Machine type
    #[serde(rename = "type")]
    pub type_: String,

    /// Machine image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ShootMachineImage>,

    /// CPU architecture
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
}

/// Resolved machine image
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct ShootMachineImage {
    /// Image name
    #[serde(default)]
    pub name: String,

    /// Image version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Root volume of a shoot worker
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    /// Volume type
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    /// Volume size
    #[serde(rename = "size")]
    pub volume_size: String,
}

/// Settings shared by all workers
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorkersSettings {
    /// SSH access to nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_access: Option<SshAccess>,
}

/// SSH access toggle
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct SshAccess {
    /// Whether SSH access to nodes is enabled
    pub enabled: bool,
}

/// Kubernetes settings of a shoot
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Kubernetes {
    /// Kubernetes version
    #[serde(default)]
    pub version: String,

    /// Static token kubeconfig generation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_static_token_kubeconfig: Option<bool>,

    /// API server settings
    #[serde(
        default,
        rename = "kubeAPIServer",
        skip_serializing_if = "Option::is_none"
    )]
    pub kube_api_server: Option<KubeApiServerConfig>,
}

/// API server settings of a shoot
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KubeApiServerConfig {
    /// OIDC issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oidc_config: Option<OidcConfig>,
}

/// Cluster networks of a shoot
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct Networking {
    /// Network plugin
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    /// Node CIDR
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nodes: Option<String>,

    /// Pod CIDR
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pods: Option<String>,

    /// Service CIDR
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services: Option<String>,
}

/// External DNS settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct Dns {
    /// Cluster domain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,

    /// DNS providers
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub providers: Vec<DnsProvider>,
}

/// A DNS provider of a shoot
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DnsProvider {
    /// Domains managed by this provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domains: Option<DnsIncludeExclude>,

    /// Whether this is the primary provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<bool>,

    /// Secret with provider credentials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret_name: Option<String>,

    /// Provider type (e.g. "aws-route53")
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
}

/// Included and excluded DNS domains
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct DnsIncludeExclude {
    /// Included domains
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,

    /// Excluded domains
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
}

/// A Gardener extension enabled on a shoot
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Extension {
    /// Extension type (e.g. "shoot-dns-service")
    #[serde(rename = "type")]
    pub type_: String,

    /// Extension configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_config: Option<RawExtension>,

    /// Explicitly disable a globally enabled extension
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
}

/// Maintenance settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Maintenance {
    /// Automatic updates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_update: Option<MaintenanceAutoUpdate>,
}

/// Automatic update toggles
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceAutoUpdate {
    /// Patch-level Kubernetes updates
    pub kubernetes_version: bool,

    /// Machine image updates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_image_version: Option<bool>,
}

/// Control plane settings of a shoot
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ControlPlane {
    /// High availability
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

/// Failure tolerance type
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct FailureTolerance {
    /// "node" or "zone"
    #[serde(rename = "type")]
    pub type_: String,
}

/// Reference to a resource in the shoot's project namespace
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NamedResourceReference {
    /// Reference name
    pub name: String,

    /// Referenced object
    pub resource_ref: CrossVersionObjectReference,
}

/// Kind/name/apiVersion object reference
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CrossVersionObjectReference {
    /// Referenced kind
    pub kind: String,

    /// Referenced name
    pub name: String,

    /// Referenced API version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
}

/// Seed selection constraints
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SeedSelector {
    /// Required seed labels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_labels: Option<BTreeMap<String, String>>,

    /// Restrict candidate seeds to these providers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_types: Option<Vec<String>>,
}

impl Shoot {
    /// Worker pool with the given name, if present
    pub fn worker(&self, name: &str) -> Option<&Worker> {
        self.spec.provider.workers.iter().find(|w| w.name == name)
    }

    /// Value of a metadata annotation
    pub fn annotation(&self, key: &str) -> Option<&str> {
        self.metadata
            .annotations
            .as_ref()
            .and_then(|a| a.get(key))
            .map(String::as_str)
    }
}
