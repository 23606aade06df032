//! Kubernetes version and API server access

use runtime_common::config::KubernetesConfig;
use runtime_common::crd::{Runtime, Shoot};
use runtime_common::Result;
use tracing::debug;

use super::Extender;
use crate::context::LiveShoot;
use crate::version::max_version;

/// Resolves the Kubernetes version of the shoot
///
/// The declared version wins over the configured default. When patching,
/// the version never drops below what the live shoot already runs.
pub struct KubernetesExtender<'a> {
    config: &'a KubernetesConfig,
    live: Option<&'a LiveShoot>,
}

impl<'a> KubernetesExtender<'a> {
    /// Stage using the configured default version and optional live state
    pub fn new(config: &'a KubernetesConfig, live: Option<&'a LiveShoot>) -> Self {
        Self { config, live }
    }
}

impl Extender for KubernetesExtender<'_> {
    fn name(&self) -> &'static str {
        "kubernetes"
    }

    fn extend(&self, runtime: &Runtime, mut shoot: Shoot) -> Result<Shoot> {
        let desired = runtime
            .spec
            .shoot
            .kubernetes
            .version
            .as_deref()
            .filter(|v| !v.is_empty())
            .unwrap_or(self.config.default_version.as_str());
        let current = self.live.and_then(LiveShoot::kubernetes_version);
        let version = max_version(desired, current);
        if version != desired {
            debug!(desired, live = version, "keeping newer live kubernetes version");
        }

        shoot.spec.kubernetes.version = version.to_string();
        shoot.spec.kubernetes.enable_static_token_kubeconfig = Some(false);

        Ok(shoot)
    }
}
