//! Maintenance auto-update policy

use runtime_common::config::KubernetesConfig;
use runtime_common::crd::shoot::{Maintenance, MaintenanceAutoUpdate};
use runtime_common::crd::{Runtime, Shoot};
use runtime_common::Result;

use super::Extender;

/// Enables Gardener auto-updates as configured
pub struct MaintenanceExtender<'a> {
    config: &'a KubernetesConfig,
}

impl<'a> MaintenanceExtender<'a> {
    /// Stage using the configured auto-update switches
    pub fn new(config: &'a KubernetesConfig) -> Self {
        Self { config }
    }
}

impl Extender for MaintenanceExtender<'_> {
    fn name(&self) -> &'static str {
        "maintenance"
    }

    fn extend(&self, _runtime: &Runtime, mut shoot: Shoot) -> Result<Shoot> {
        shoot.spec.maintenance = Some(Maintenance {
            auto_update: Some(MaintenanceAutoUpdate {
                kubernetes_version: self.config.enable_kubernetes_version_auto_update,
                machine_image_version: Some(self.config.enable_machine_image_version_auto_update),
            }),
        });
        Ok(shoot)
    }
}
