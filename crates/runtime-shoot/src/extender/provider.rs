//! Provider Extender
//!
//! Populates `spec.provider`: worker pools with resolved machine images,
//! the infrastructure and control plane configs, and the fixed worker
//! settings.
//!
//! On Create the configs are built by the provider strategy from the node
//! CIDR and the zone union of the declared pools. On Patch they are copied
//! unchanged from the live shoot, even when the declared pools now cover
//! fewer zones.

use std::collections::HashSet;

use runtime_common::crd::shoot::{Provider, SshAccess, WorkersSettings};
use runtime_common::crd::{Runtime, Shoot, WorkerPool};
use runtime_common::{Error, Result};
use tracing::debug;

use super::{runtime_name, Extender};
use crate::context::{OperationContext, OperationKind};
use crate::hyperscaler::strategy_for;
use crate::workers::WorkerReconciler;
use crate::zones::networking_zones;

/// Builds the provider section of a shoot
pub struct ProviderExtender<'a> {
    context: &'a OperationContext,
}

impl<'a> ProviderExtender<'a> {
    /// Stage for the given operation
    pub fn new(context: &'a OperationContext) -> Self {
        Self { context }
    }

    fn validate_pools(name: &str, pools: &[&WorkerPool]) -> Result<()> {
        if pools.is_empty() {
            return Err(Error::validation_for_field(
                name,
                "spec.shoot.provider.workers",
                "no worker pools declared",
            ));
        }
        let mut seen = HashSet::new();
        for pool in pools {
            if !seen.insert(pool.name.as_str()) {
                return Err(Error::validation_for_field(
                    name,
                    "spec.shoot.provider.workers",
                    format!("worker pool {} declared more than once", pool.name),
                ));
            }
            if pool.zones.is_empty() {
                return Err(Error::validation_for_field(
                    name,
                    "spec.shoot.provider.workers",
                    format!("worker pool {} has no zones", pool.name),
                ));
            }
        }
        Ok(())
    }
}

impl Extender for ProviderExtender<'_> {
    fn name(&self) -> &'static str {
        "provider"
    }

    fn extend(&self, runtime: &Runtime, mut shoot: Shoot) -> Result<Shoot> {
        let name = runtime_name(runtime);
        let declared = &runtime.spec.shoot;
        let provider_type = &declared.provider.type_;

        let strategy = strategy_for(provider_type)?;

        let pools = declared.provider.all_workers();
        Self::validate_pools(name, &pools)?;

        let worker_config = if self.context.defaults.enable_imds_v2 {
            strategy.hardened_worker_config()?
        } else {
            None
        };
        let reconciler = WorkerReconciler::for_context(self.context);
        let workers = pools
            .iter()
            .map(|pool| reconciler.reconcile(pool, worker_config.clone()))
            .collect();

        let zones = networking_zones(pools.iter().copied()).map_err(|e| e.with_runtime(name))?;

        let (infrastructure_config, control_plane_config) = match &self.context.kind {
            OperationKind::Create => (
                strategy.infrastructure_config(&declared.networking.nodes, &zones)?,
                strategy.control_plane_config(&zones)?,
            ),
            OperationKind::Patch(live) => (
                live.infrastructure_config().clone(),
                live.control_plane_config().clone(),
            ),
        };
        debug!(
            runtime = %name,
            provider = %provider_type,
            mode = self.context.mode(),
            zones = zones.len(),
            "provider configs resolved"
        );

        shoot.spec.provider = Provider {
            type_: provider_type.to_string(),
            infrastructure_config: Some(infrastructure_config),
            control_plane_config: Some(control_plane_config),
            workers,
            workers_settings: Some(WorkersSettings {
                ssh_access: Some(SshAccess { enabled: false }),
            }),
        };

        Ok(shoot)
    }
}
