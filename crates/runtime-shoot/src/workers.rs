//! Worker Reconciler
//!
//! Turns worker pool declarations into shoot workers, resolving the machine
//! image of each pool. A declared image name always wins; versions are never
//! silently downgraded below what a live pool with the same image runs.

use runtime_common::crd::shoot::{Machine, ShootMachineImage, Volume, Worker};
use runtime_common::crd::{RawExtension, WorkerPool};
use tracing::debug;

use crate::context::{LiveShoot, OperationContext, WorkerDefaults};
use crate::version::max_version;

/// Resolves declared worker pools against defaults and live state
#[derive(Clone, Copy, Debug)]
pub struct WorkerReconciler<'a> {
    defaults: &'a WorkerDefaults,
    live: Option<&'a LiveShoot>,
}

impl<'a> WorkerReconciler<'a> {
    /// Reconciler for first-time provisioning
    pub fn create(defaults: &'a WorkerDefaults) -> Self {
        Self {
            defaults,
            live: None,
        }
    }

    /// Reconciler for a running shoot
    pub fn patch(defaults: &'a WorkerDefaults, live: &'a LiveShoot) -> Self {
        Self {
            defaults,
            live: Some(live),
        }
    }

    /// Reconciler matching the operation mode
    pub fn for_context(context: &'a OperationContext) -> Self {
        match context.live() {
            Some(live) => Self::patch(&context.defaults, live),
            None => Self::create(&context.defaults),
        }
    }

    /// Final machine image of a pool
    pub fn resolve_image(&self, pool: &WorkerPool) -> ShootMachineImage {
        let declared = pool.machine.image.as_ref();
        let name = declared
            .and_then(|image| non_empty(image.name.as_deref()))
            .unwrap_or(self.defaults.machine_image_name.as_str());
        let version = declared
            .and_then(|image| non_empty(image.version.as_deref()))
            .unwrap_or(self.defaults.machine_image_version.as_str());

        let live_image = self
            .live
            .and_then(|live| live.worker(&pool.name))
            .and_then(|worker| worker.machine.image.as_ref());

        let version = match live_image {
            Some(live) if live.name == name => {
                let current = non_empty(live.version.as_deref());
                let resolved = if version.is_empty() {
                    current.unwrap_or(version)
                } else {
                    max_version(version, current)
                };
                if resolved != version {
                    debug!(
                        pool = %pool.name,
                        declared = %version,
                        live = %resolved,
                        "keeping newer live machine image version"
                    );
                }
                resolved
            }
            _ => version,
        };

        ShootMachineImage {
            name: name.to_string(),
            version: non_empty(Some(version)).map(str::to_string),
        }
    }

    /// Shoot worker for a pool declaration
    pub fn reconcile(&self, pool: &WorkerPool, provider_config: Option<RawExtension>) -> Worker {
        Worker {
            name: pool.name.clone(),
            machine: Machine {
                type_: pool.machine.type_.clone(),
                image: Some(self.resolve_image(pool)),
                architecture: pool.machine.architecture.clone(),
            },
            minimum: pool.minimum,
            maximum: pool.maximum,
            max_surge: pool.max_surge.clone(),
            max_unavailable: pool.max_unavailable.clone(),
            provider_config,
            volume: pool.volume.as_ref().map(|volume| Volume {
                type_: volume.type_.clone(),
                volume_size: volume.size.clone(),
            }),
            zones: pool.zones.clone(),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}
