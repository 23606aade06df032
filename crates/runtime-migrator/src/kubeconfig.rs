//! Short-lived admin kubeconfigs for runtime clusters
//!
//! Gardener issues cluster-admin kubeconfigs through the `adminkubeconfig`
//! subresource of a shoot. The returned kubeconfig is base64 encoded and
//! expires after the requested number of seconds.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use kube::api::PostParams;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config};
use runtime_common::crd::Shoot;
use runtime_common::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

const ADMIN_KUBECONFIG_SUBRESOURCE: &str = "adminkubeconfig";
const AUTHENTICATION_API_VERSION: &str = "authentication.gardener.cloud/v1alpha1";

/// Connection timeout for runtime cluster clients
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Read timeout for runtime cluster clients
const READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Issues time-bounded admin kubeconfigs for shoots
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminKubeconfigProvider: Send + Sync {
    /// Kubeconfig (YAML) with cluster-admin access to the named shoot
    async fn admin_kubeconfig(&self, shoot_name: &str) -> Result<String>;
}

/// `AdminKubeconfigRequest` sent to the shoot subresource
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminKubeconfigRequest {
    /// API version
    pub api_version: String,
    /// Always "AdminKubeconfigRequest"
    pub kind: String,
    /// Requested lifetime
    pub spec: AdminKubeconfigRequestSpec,
    /// Issued kubeconfig
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AdminKubeconfigRequestStatus>,
}

/// Requested kubeconfig lifetime
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminKubeconfigRequestSpec {
    /// Lifetime in seconds
    pub expiration_seconds: i64,
}

/// Issued kubeconfig
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminKubeconfigRequestStatus {
    /// Base64-encoded kubeconfig
    pub kubeconfig: String,
    /// When the kubeconfig stops working
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration_timestamp: Option<String>,
}

impl AdminKubeconfigRequest {
    /// Request for a kubeconfig valid for `expiration_seconds`
    pub fn new(expiration_seconds: i64) -> Self {
        Self {
            api_version: AUTHENTICATION_API_VERSION.to_string(),
            kind: "AdminKubeconfigRequest".to_string(),
            spec: AdminKubeconfigRequestSpec { expiration_seconds },
            status: None,
        }
    }

    /// Decoded kubeconfig from the response status
    pub fn kubeconfig(&self) -> Result<String> {
        let status = self
            .status
            .as_ref()
            .ok_or_else(|| Error::kubeconfig("admin kubeconfig response has no status"))?;
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(status.kubeconfig.trim())
            .map_err(|e| Error::kubeconfig(format!("admin kubeconfig is not base64: {e}")))?;
        String::from_utf8(bytes)
            .map_err(|e| Error::kubeconfig(format!("admin kubeconfig is not UTF-8: {e}")))
    }
}

/// Requests admin kubeconfigs from the Gardener API
pub struct GardenerKubeconfigProvider {
    shoots: Api<Shoot>,
    expiration_seconds: i64,
}

impl GardenerKubeconfigProvider {
    /// Provider for shoots of the given project namespace
    pub fn new(client: Client, namespace: &str, expiration_seconds: i64) -> Self {
        Self {
            shoots: Api::namespaced(client, namespace),
            expiration_seconds,
        }
    }
}

#[async_trait]
impl AdminKubeconfigProvider for GardenerKubeconfigProvider {
    async fn admin_kubeconfig(&self, shoot_name: &str) -> Result<String> {
        debug!(shoot = %shoot_name, expiration_seconds = self.expiration_seconds, "requesting admin kubeconfig");
        let request = serde_json::to_vec(&AdminKubeconfigRequest::new(self.expiration_seconds))
            .map_err(|e| Error::serialization_for_kind("AdminKubeconfigRequest", e.to_string()))?;
        let response: AdminKubeconfigRequest = self
            .shoots
            .create_subresource(
                ADMIN_KUBECONFIG_SUBRESOURCE,
                shoot_name,
                &PostParams::default(),
                request,
            )
            .await?;
        response.kubeconfig()
    }
}

/// Build a client from kubeconfig YAML
pub async fn client_from_kubeconfig(yaml: &str) -> Result<Client> {
    let kubeconfig = Kubeconfig::from_yaml(yaml)
        .map_err(|e| Error::kubeconfig(format!("failed to parse kubeconfig: {e}")))?;
    client_from_parsed(kubeconfig).await
}

/// Build a client from a kubeconfig file
pub async fn client_from_path(path: &std::path::Path) -> Result<Client> {
    let kubeconfig = Kubeconfig::read_from(path).map_err(|e| {
        Error::kubeconfig(format!("failed to read kubeconfig {}: {e}", path.display()))
    })?;
    client_from_parsed(kubeconfig).await
}

async fn client_from_parsed(kubeconfig: Kubeconfig) -> Result<Client> {
    let mut config = Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .map_err(|e| Error::kubeconfig(format!("invalid kubeconfig: {e}")))?;
    config.connect_timeout = Some(CONNECT_TIMEOUT);
    config.read_timeout = Some(READ_TIMEOUT);
    Ok(Client::try_from(config)?)
}
