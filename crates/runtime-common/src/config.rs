//! Converter configuration
//!
//! Defaults and environment-specific settings the pipeline needs beyond the
//! Runtime itself. Stored as camelCase JSON, e.g.:
//!
//! ```json
//! {
//!   "kubernetes": { "defaultVersion": "1.30" },
//!   "dns": { "secretName": "dns-secret", "domainPrefix": "dev.example.com", "providerType": "aws-route53" },
//!   "provider": { "aws": { "enableIMDSv2": true } },
//!   "machineImage": { "defaultName": "gardenlinux", "defaultVersion": "1312.3.0" },
//!   "gardener": { "projectName": "kyma-dev" }
//! }
//! ```

use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::crd::OidcConfig;
use crate::{Error, Result};

/// Settings shared by every conversion
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConverterConfig {
    /// Kubernetes defaults
    pub kubernetes: KubernetesConfig,
    /// Shoot DNS
    pub dns: DnsConfig,
    /// Provider-specific switches
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Machine image defaults
    pub machine_image: MachineImageConfig,
    /// Gardener project
    pub gardener: GardenerConfig,
}

/// Kubernetes defaults
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct KubernetesConfig {
    /// Version used when a runtime does not pin one
    pub default_version: String,
    /// Let Gardener apply patch-level Kubernetes updates
    #[serde(default)]
    pub enable_kubernetes_version_auto_update: bool,
    /// Let Gardener roll out new machine image versions
    #[serde(default)]
    pub enable_machine_image_version_auto_update: bool,
    /// OIDC issuer used when a runtime does not declare one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_operator_oidc: Option<OidcConfig>,
}

/// Shoot DNS settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DnsConfig {
    /// Secret holding DNS provider credentials
    pub secret_name: String,
    /// Parent domain; shoots get `<name>.<prefix>`
    pub domain_prefix: String,
    /// DNS provider type (e.g. "aws-route53")
    pub provider_type: String,
}

/// Provider-specific switches
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ProviderConfig {
    /// AWS switches
    #[serde(default)]
    pub aws: AwsConfig,
}

/// AWS switches
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct AwsConfig {
    /// Require IMDSv2 session tokens on every worker
    #[serde(rename = "enableIMDSv2", default)]
    pub enable_imds_v2: bool,
}

/// Machine image defaults
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MachineImageConfig {
    /// Image name used when a pool does not declare one
    pub default_name: String,
    /// Image version used when a pool does not declare one
    pub default_version: String,
}

/// Gardener project settings
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GardenerConfig {
    /// Project name; shoots live in `garden-<project>`
    pub project_name: String,
}

impl GardenerConfig {
    /// Namespace of the project's shoots
    pub fn namespace(&self) -> String {
        format!("garden-{}", self.project_name)
    }
}

impl ConverterConfig {
    /// Load configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .map_err(|e| Error::config(path.display().to_string(), e.to_string()))?;
        Self::from_reader(file).map_err(|e| match e {
            Error::Config { message, .. } => Error::config(path.display().to_string(), message),
            other => other,
        })
    }

    /// Parse and validate configuration from any reader
    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let config: Self =
            serde_json::from_reader(reader).map_err(|e| Error::config("inline", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.kubernetes.default_version.is_empty() {
            return Err(Error::config(
                "inline",
                "kubernetes.defaultVersion must not be empty",
            ));
        }
        if self.dns.secret_name.is_empty() || self.dns.domain_prefix.is_empty() {
            return Err(Error::config(
                "inline",
                "dns.secretName and dns.domainPrefix must not be empty",
            ));
        }
        if self.gardener.project_name.is_empty() {
            return Err(Error::config(
                "inline",
                "gardener.projectName must not be empty",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const VALID: &str = r#"{
        "kubernetes": {
            "defaultVersion": "1.30",
            "enableKubernetesVersionAutoUpdate": true,
            "defaultOperatorOidc": {"clientId": "client", "issuerUrl": "https://issuer.example.com"}
        },
        "dns": {"secretName": "dns-secret", "domainPrefix": "dev.example.com", "providerType": "aws-route53"},
        "provider": {"aws": {"enableIMDSv2": true}},
        "machineImage": {"defaultName": "gardenlinux", "defaultVersion": "1312.3.0"},
        "gardener": {"projectName": "kyma-dev"}
    }"#;

    #[test]
    fn parses_valid_config() {
        let config = ConverterConfig::from_reader(VALID.as_bytes()).expect("valid config");
        assert!(config.provider.aws.enable_imds_v2);
        assert!(config.kubernetes.enable_kubernetes_version_auto_update);
        assert!(!config.kubernetes.enable_machine_image_version_auto_update);
        assert_eq!(config.machine_image.default_version, "1312.3.0");
        assert_eq!(config.gardener.namespace(), "garden-kyma-dev");
        assert_eq!(
            config
                .kubernetes
                .default_operator_oidc
                .and_then(|o| o.client_id)
                .as_deref(),
            Some("client")
        );
    }

    #[test]
    fn provider_section_is_optional() {
        let json = VALID.replace(r#""provider": {"aws": {"enableIMDSv2": true}},"#, "");
        let config = ConverterConfig::from_reader(json.as_bytes()).expect("valid config");
        assert!(!config.provider.aws.enable_imds_v2);
    }

    #[test]
    fn rejects_empty_project() {
        let json = VALID.replace("kyma-dev", "");
        let err = ConverterConfig::from_reader(json.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("projectName"));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = ConverterConfig::from_reader("{".as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn load_reports_path() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"{}").expect("write");
        let err = ConverterConfig::load(file.path()).unwrap_err();
        match err {
            Error::Config { path, .. } => assert_eq!(path, file.path().display().to_string()),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(VALID.as_bytes()).expect("write");
        let config = ConverterConfig::load(file.path()).expect("valid config");
        assert_eq!(config.dns.provider_type, "aws-route53");
    }

    #[test]
    fn load_missing_file() {
        assert!(ConverterConfig::load("/nonexistent/converter-config.json").is_err());
    }
}
