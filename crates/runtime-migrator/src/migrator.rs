//! Batch migration of runtimes
//!
//! For every runtime ID: find its shoot, back it up, derive the Runtime,
//! verify it against the live shoot, write everything to disk and, outside
//! dry-run, apply the Runtime to KCP. A failing runtime is logged and counted;
//! the batch always runs to the end.

use runtime_common::crd::Shoot;
use runtime_common::{ConverterConfig, Error, Result};
use tracing::{error, info, warn};

use crate::backup::Backuper;
use crate::cluster::RuntimeClusterConnector;
use crate::output::{OutputWriter, RuntimeWriter};
use crate::runtime::{administrators, runtime_from_shoot, verify};
use crate::shoots::{find_shoot_for_runtime, ShootSource};

/// Outcome counts of a batch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MigrationStats {
    /// Runtimes migrated
    pub succeeded: usize,
    /// Runtimes that failed
    pub failed: usize,
}

/// Migrates runtimes one by one
pub struct Migrator<'a> {
    config: &'a ConverterConfig,
    kcp_namespace: String,
    shoots: &'a dyn ShootSource,
    clusters: &'a dyn RuntimeClusterConnector,
    output: OutputWriter,
    writer: Option<&'a dyn RuntimeWriter>,
}

impl<'a> Migrator<'a> {
    /// Dry-run migrator: results are only written to disk
    pub fn new(
        config: &'a ConverterConfig,
        kcp_namespace: impl Into<String>,
        shoots: &'a dyn ShootSource,
        clusters: &'a dyn RuntimeClusterConnector,
        output: OutputWriter,
    ) -> Self {
        Self {
            config,
            kcp_namespace: kcp_namespace.into(),
            shoots,
            clusters,
            output,
            writer: None,
        }
    }

    /// Also apply each Runtime through `writer`
    pub fn with_writer(mut self, writer: &'a dyn RuntimeWriter) -> Self {
        self.writer = Some(writer);
        self
    }

    /// Migrate every runtime in `runtime_ids`
    ///
    /// Fails only when the shoot list cannot be read.
    pub async fn migrate_runtimes(&self, runtime_ids: &[String]) -> Result<MigrationStats> {
        let shoots = self.shoots.list_shoots().await?;
        let mut stats = MigrationStats::default();

        for runtime_id in runtime_ids {
            info!(runtime_id = %runtime_id, "migrating runtime");
            let result = match find_shoot_for_runtime(&shoots, runtime_id) {
                Some(shoot) => self.migrate(runtime_id, shoot).await,
                None => Err(Error::migration(runtime_id, "no shoot carries this runtime ID")),
            };
            match result {
                Ok(()) => {
                    stats.succeeded += 1;
                    info!(runtime_id = %runtime_id, "runtime migrated");
                }
                Err(e) => {
                    stats.failed += 1;
                    error!(runtime_id = %runtime_id, error = %e, "runtime migration failed");
                }
            }
        }
        Ok(stats)
    }

    async fn migrate(&self, runtime_id: &str, shoot: &Shoot) -> Result<()> {
        let shoot_name = shoot.metadata.name.as_deref().unwrap_or_default();
        let cluster = self.clusters.connect(shoot_name).await?;
        let backup = Backuper::new(cluster.as_ref()).backup(shoot).await?;
        self.output.save_backup(runtime_id, &backup).await?;

        let runtime = runtime_from_shoot(
            shoot,
            runtime_id,
            administrators(&backup.cluster_role_bindings),
            &self.kcp_namespace,
        )?;
        let differences = verify(&runtime, shoot, self.config)?;
        if !differences.is_empty() {
            for difference in &differences {
                warn!(runtime_id = %runtime_id, %difference, "runtime does not reproduce shoot");
            }
            return Err(Error::migration(
                runtime_id,
                format!("{} worker differences after conversion", differences.len()),
            ));
        }

        let path = self.output.save_runtime(runtime_id, &runtime).await?;
        info!(runtime_id = %runtime_id, path = %path.display(), "runtime written");

        if let Some(writer) = self.writer {
            writer.apply(&runtime).await?;
            info!(runtime_id = %runtime_id, "runtime applied to KCP");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::{MockRuntimeClusterConnector, MockRuntimeClusterReader, RuntimeClusterReader};
    use crate::output::MockRuntimeWriter;
    use crate::shoots::MockShootSource;
    use runtime_common::crd::shoot::{
        Kubernetes, Machine, Networking, Provider, ShootMachineImage, ShootSpec, Worker,
    };
    use runtime_common::crd::RawExtension;
    use runtime_common::RUNTIME_ID_ANNOTATION;
    use std::collections::BTreeMap;

    const CONFIG: &str = r#"{
        "kubernetes": {"defaultVersion": "1.30"},
        "dns": {"secretName": "dns-secret", "domainPrefix": "dev.example.com", "providerType": "aws-route53"},
        "machineImage": {"defaultName": "gardenlinux", "defaultVersion": "1312.3.0"},
        "gardener": {"projectName": "kyma-dev"}
    }"#;

    fn config() -> ConverterConfig {
        ConverterConfig::from_reader(CONFIG.as_bytes()).expect("valid config")
    }

    fn shoot(name: &str, runtime_id: &str, provider: &str) -> Shoot {
        let blob = |kind: &str| {
            RawExtension::from_value(&serde_json::json!({ "kind": kind })).expect("serializable")
        };
        let mut shoot = Shoot::new(
            name,
            ShootSpec {
                region: "eu-central-1".to_string(),
                kubernetes: Kubernetes {
                    version: "1.30.4".to_string(),
                    ..Default::default()
                },
                networking: Some(Networking {
                    type_: Some("calico".to_string()),
                    nodes: Some("10.250.0.0/16".to_string()),
                    pods: Some("100.64.0.0/12".to_string()),
                    services: Some("100.104.0.0/13".to_string()),
                }),
                provider: Provider {
                    type_: provider.to_string(),
                    infrastructure_config: Some(blob("InfrastructureConfig")),
                    control_plane_config: Some(blob("ControlPlaneConfig")),
                    workers: vec![Worker {
                        name: "cpu-worker-0".to_string(),
                        machine: Machine {
                            type_: "m6i.large".to_string(),
                            image: Some(ShootMachineImage {
                                name: "gardenlinux".to_string(),
                                version: Some("1312.4.0".to_string()),
                            }),
                            architecture: None,
                        },
                        minimum: 1,
                        maximum: 3,
                        zones: vec!["eu-central-1a".to_string()],
                        ..Default::default()
                    }],
                    workers_settings: None,
                },
                ..Default::default()
            },
        );
        shoot.metadata.namespace = Some("garden-kyma-dev".to_string());
        shoot.metadata.annotations = Some(BTreeMap::from([(
            RUNTIME_ID_ANNOTATION.to_string(),
            runtime_id.to_string(),
        )]));
        shoot
    }

    fn empty_cluster() -> Box<dyn RuntimeClusterReader> {
        let mut cluster = MockRuntimeClusterReader::new();
        cluster
            .expect_cluster_role_bindings()
            .returning(|| Ok(Vec::new()));
        cluster.expect_oidc_crd_installed().returning(|| Ok(false));
        Box::new(cluster)
    }

    fn connector() -> MockRuntimeClusterConnector {
        let mut clusters = MockRuntimeClusterConnector::new();
        clusters
            .expect_connect()
            .returning(|_| Ok(empty_cluster()));
        clusters
    }

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    #[tokio::test]
    async fn counts_successes_and_failures() {
        let config = config();
        let mut shoots = MockShootSource::new();
        shoots.expect_list_shoots().times(1).returning(|| {
            Ok(vec![
                shoot("c-1", "rt-1", "aws"),
                shoot("c-2", "rt-2", "alicloud"),
            ])
        });
        let clusters = connector();
        let dir = tempfile::tempdir().expect("temp dir");

        let migrator = Migrator::new(
            &config,
            "kcp-system",
            &shoots,
            &clusters,
            OutputWriter::new(dir.path()),
        );
        let stats = migrator
            .migrate_runtimes(&ids(&["rt-1", "rt-2", "rt-missing"]))
            .await
            .expect("batch completes");

        assert_eq!(stats, MigrationStats { succeeded: 1, failed: 2 });
        assert!(dir.path().join("runtime-rt-1.yaml").exists());
        assert!(!dir.path().join("runtime-rt-2.yaml").exists());
        assert!(dir
            .path()
            .join("backup/rt-1/original-shoot.yaml")
            .exists());
    }

    #[tokio::test]
    async fn applies_outside_dry_run() {
        let config = config();
        let mut shoots = MockShootSource::new();
        shoots
            .expect_list_shoots()
            .returning(|| Ok(vec![shoot("c-1", "rt-1", "aws")]));
        let clusters = connector();
        let mut writer = MockRuntimeWriter::new();
        writer
            .expect_apply()
            .withf(|runtime| runtime.metadata.name.as_deref() == Some("rt-1"))
            .times(1)
            .returning(|_| Ok(()));
        let dir = tempfile::tempdir().expect("temp dir");

        let stats = Migrator::new(
            &config,
            "kcp-system",
            &shoots,
            &clusters,
            OutputWriter::new(dir.path()),
        )
        .with_writer(&writer)
        .migrate_runtimes(&ids(&["rt-1"]))
        .await
        .expect("batch completes");
        assert_eq!(stats.succeeded, 1);
    }

    #[tokio::test]
    async fn connection_failure_is_counted() {
        let config = config();
        let mut shoots = MockShootSource::new();
        shoots
            .expect_list_shoots()
            .returning(|| Ok(vec![shoot("c-1", "rt-1", "aws")]));
        let mut clusters = MockRuntimeClusterConnector::new();
        clusters
            .expect_connect()
            .returning(|_| Err(Error::kubeconfig("forbidden")));
        let dir = tempfile::tempdir().expect("temp dir");

        let stats = Migrator::new(
            &config,
            "kcp-system",
            &shoots,
            &clusters,
            OutputWriter::new(dir.path()),
        )
        .migrate_runtimes(&ids(&["rt-1"]))
        .await
        .expect("batch completes");
        assert_eq!(stats, MigrationStats { succeeded: 0, failed: 1 });
    }

    #[tokio::test]
    async fn shoot_list_failure_aborts() {
        let config = config();
        let mut shoots = MockShootSource::new();
        shoots
            .expect_list_shoots()
            .returning(|| Err(Error::kubeconfig("unreachable")));
        let clusters = MockRuntimeClusterConnector::new();
        let dir = tempfile::tempdir().expect("temp dir");

        let result = Migrator::new(
            &config,
            "kcp-system",
            &shoots,
            &clusters,
            OutputWriter::new(dir.path()),
        )
        .migrate_runtimes(&ids(&["rt-1"]))
        .await;
        assert!(result.is_err());
    }
}
