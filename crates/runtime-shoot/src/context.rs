//! Per-reconciliation inputs beyond the runtime itself
//!
//! An [`OperationContext`] is built once per synthesis call by the caller.
//! Create carries only defaults; Patch additionally carries a [`LiveShoot`]
//! snapshot of the cluster as it currently runs.

use std::collections::BTreeMap;

use runtime_common::crd::shoot::Worker;
use runtime_common::crd::{RawExtension, Shoot};
use runtime_common::{ConverterConfig, Error, Result};

/// Defaults applied to every worker pool
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WorkerDefaults {
    /// Image name for pools that do not declare one
    pub machine_image_name: String,
    /// Image version for pools that do not declare one
    pub machine_image_version: String,
    /// Attach IMDSv2 worker configs on AWS
    pub enable_imds_v2: bool,
}

impl WorkerDefaults {
    /// Defaults taken from the converter configuration
    pub fn from_config(config: &ConverterConfig) -> Self {
        Self {
            machine_image_name: config.machine_image.default_name.clone(),
            machine_image_version: config.machine_image.default_version.clone(),
            enable_imds_v2: config.provider.aws.enable_imds_v2,
        }
    }
}

/// Read-only snapshot of a running shoot
///
/// Built once per Patch call and never mutated during synthesis.
#[derive(Clone, Debug, PartialEq)]
pub struct LiveShoot {
    workers: BTreeMap<String, Worker>,
    infrastructure_config: RawExtension,
    control_plane_config: RawExtension,
    kubernetes_version: Option<String>,
}

impl LiveShoot {
    /// Snapshot the parts of a live shoot the pipeline merges with
    ///
    /// # Errors
    ///
    /// Fails when the shoot lacks an infrastructure or control plane config;
    /// Patch never recomputes those.
    pub fn from_shoot(shoot: &Shoot) -> Result<Self> {
        let name = shoot.metadata.name.as_deref().unwrap_or_default();
        let provider = &shoot.spec.provider;
        let infrastructure_config = provider.infrastructure_config.clone().ok_or_else(|| {
            Error::validation_for_field(
                name,
                "spec.provider.infrastructureConfig",
                "live shoot has no infrastructure config",
            )
        })?;
        let control_plane_config = provider.control_plane_config.clone().ok_or_else(|| {
            Error::validation_for_field(
                name,
                "spec.provider.controlPlaneConfig",
                "live shoot has no control plane config",
            )
        })?;
        let version = &shoot.spec.kubernetes.version;

        Ok(Self::new(
            provider.workers.iter().cloned(),
            infrastructure_config,
            control_plane_config,
            (!version.is_empty()).then(|| version.clone()),
        ))
    }

    /// Build a snapshot from its parts
    pub fn new(
        workers: impl IntoIterator<Item = Worker>,
        infrastructure_config: RawExtension,
        control_plane_config: RawExtension,
        kubernetes_version: Option<String>,
    ) -> Self {
        Self {
            workers: workers.into_iter().map(|w| (w.name.clone(), w)).collect(),
            infrastructure_config,
            control_plane_config,
            kubernetes_version,
        }
    }

    /// Live worker pool with the given name
    pub fn worker(&self, name: &str) -> Option<&Worker> {
        self.workers.get(name)
    }

    /// Infrastructure config currently applied
    pub fn infrastructure_config(&self) -> &RawExtension {
        &self.infrastructure_config
    }

    /// Control plane config currently applied
    pub fn control_plane_config(&self) -> &RawExtension {
        &self.control_plane_config
    }

    /// Kubernetes version currently running
    pub fn kubernetes_version(&self) -> Option<&str> {
        self.kubernetes_version.as_deref()
    }
}

/// Create or Patch
#[derive(Clone, Debug, PartialEq)]
pub enum OperationKind {
    /// First-time provisioning
    Create,
    /// Reconciliation of a running shoot
    Patch(LiveShoot),
}

/// Everything a synthesis call needs besides the runtime
#[derive(Clone, Debug, PartialEq)]
pub struct OperationContext {
    /// Worker defaults
    pub defaults: WorkerDefaults,
    /// Operation mode
    pub kind: OperationKind,
}

impl OperationContext {
    /// Context for provisioning a new shoot
    pub fn create(defaults: WorkerDefaults) -> Self {
        Self {
            defaults,
            kind: OperationKind::Create,
        }
    }

    /// Context for reconciling an existing shoot
    pub fn patch(defaults: WorkerDefaults, live: LiveShoot) -> Self {
        Self {
            defaults,
            kind: OperationKind::Patch(live),
        }
    }

    /// The live snapshot, when patching
    pub fn live(&self) -> Option<&LiveShoot> {
        match &self.kind {
            OperationKind::Create => None,
            OperationKind::Patch(live) => Some(live),
        }
    }

    /// Mode name for logging
    pub fn mode(&self) -> &'static str {
        match self.kind {
            OperationKind::Create => "create",
            OperationKind::Patch(_) => "patch",
        }
    }
}
