//! Pre-migration backup of a runtime
//!
//! Captures everything needed to roll a migrated shoot back: the live shoot
//! as read, the subset of it that can be re-applied, the cluster-admin role
//! bindings of the runtime cluster and its OIDC authenticator objects.

use k8s_openapi::api::rbac::v1::ClusterRoleBinding;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::DynamicObject;
use runtime_common::crd::{Shoot, ShootSpec};
use runtime_common::Result;
use tracing::debug;

use crate::cluster::RuntimeClusterReader;

const CLUSTER_ADMIN_ROLE: &str = "cluster-admin";

/// Backup of a single runtime
#[derive(Clone, Debug)]
pub struct RuntimeBackup {
    /// Shoot exactly as read from Gardener
    pub original_shoot: Shoot,
    /// Re-appliable subset of the shoot
    pub shoot_to_restore: Shoot,
    /// Bindings granting cluster-admin
    pub cluster_role_bindings: Vec<ClusterRoleBinding>,
    /// OIDC authenticator objects; empty when the CRD is not installed
    pub oidc_configs: Vec<DynamicObject>,
}

/// Collects backups through a runtime cluster reader
pub struct Backuper<'a> {
    cluster: &'a dyn RuntimeClusterReader,
}

impl<'a> Backuper<'a> {
    /// Backuper reading from `cluster`
    pub fn new(cluster: &'a dyn RuntimeClusterReader) -> Self {
        Self { cluster }
    }

    /// Back up `shoot` and the objects of its cluster
    pub async fn backup(&self, shoot: &Shoot) -> Result<RuntimeBackup> {
        let cluster_role_bindings: Vec<_> = self
            .cluster
            .cluster_role_bindings()
            .await?
            .into_iter()
            .filter(is_cluster_admin_binding)
            .collect();

        let oidc_configs = if self.cluster.oidc_crd_installed().await? {
            self.cluster.openid_connects().await?
        } else {
            Vec::new()
        };

        debug!(
            shoot = shoot.metadata.name.as_deref().unwrap_or_default(),
            cluster_role_bindings = cluster_role_bindings.len(),
            oidc_configs = oidc_configs.len(),
            "collected runtime backup"
        );

        Ok(RuntimeBackup {
            original_shoot: shoot.clone(),
            shoot_to_restore: shoot_to_restore(shoot),
            cluster_role_bindings,
            oidc_configs,
        })
    }
}

/// Whether a binding grants the cluster-admin cluster role
pub fn is_cluster_admin_binding(binding: &ClusterRoleBinding) -> bool {
    binding.role_ref.kind == "ClusterRole" && binding.role_ref.name == CLUSTER_ADMIN_ROLE
}

/// The parts of a live shoot that can be applied again
///
/// Server-managed metadata (uid, resource version, managed fields, owner
/// references) and status are dropped.
pub fn shoot_to_restore(shoot: &Shoot) -> Shoot {
    let spec = &shoot.spec;
    let mut restored = Shoot::new(
        shoot.metadata.name.as_deref().unwrap_or_default(),
        ShootSpec {
            cloud_profile_name: spec.cloud_profile_name.clone(),
            control_plane: spec.control_plane.clone(),
            dns: spec.dns.clone(),
            extensions: spec.extensions.clone(),
            exposure_class_name: spec.exposure_class_name.clone(),
            kubernetes: spec.kubernetes.clone(),
            maintenance: spec.maintenance.clone(),
            networking: spec.networking.clone(),
            provider: spec.provider.clone(),
            purpose: spec.purpose.clone(),
            region: spec.region.clone(),
            resources: spec.resources.clone(),
            secret_binding_name: spec.secret_binding_name.clone(),
            seed_selector: spec.seed_selector.clone(),
        },
    );
    restored.metadata = ObjectMeta {
        name: shoot.metadata.name.clone(),
        namespace: shoot.metadata.namespace.clone(),
        labels: shoot.metadata.labels.clone(),
        annotations: shoot.metadata.annotations.clone(),
        ..Default::default()
    };
    restored
}
