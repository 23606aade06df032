//! Migration results on disk and in KCP

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use kube::api::{Patch, PatchParams};
use kube::{Api, Client, ResourceExt};
use runtime_common::crd::Runtime;
use runtime_common::{Error, Result};
use serde::Serialize;
use tracing::debug;

use crate::backup::RuntimeBackup;

const FIELD_MANAGER: &str = "runtime-migrator";

/// Writes runtimes and backups as YAML below a root directory
///
/// Layout:
/// - `runtime-<id>.yaml`
/// - `backup/<id>/original-shoot.yaml`
/// - `backup/<id>/shoot-to-restore.yaml`
/// - `backup/<id>/crb-<name>.yaml`
/// - `backup/<id>/oidc-<name>.yaml`
#[derive(Clone, Debug)]
pub struct OutputWriter {
    root: PathBuf,
}

impl OutputWriter {
    /// Writer below `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the runtime file for `runtime_id`
    pub fn runtime_path(&self, runtime_id: &str) -> Result<PathBuf> {
        let id = file_component(runtime_id, runtime_id)?;
        Ok(self.root.join(format!("runtime-{id}.yaml")))
    }

    /// Directory holding the backup of `runtime_id`
    pub fn backup_dir(&self, runtime_id: &str) -> Result<PathBuf> {
        let id = file_component(runtime_id, runtime_id)?;
        Ok(self.root.join("backup").join(id))
    }

    /// Save the Runtime CR
    pub async fn save_runtime(&self, runtime_id: &str, runtime: &Runtime) -> Result<PathBuf> {
        let path = self.runtime_path(runtime_id)?;
        tokio::fs::create_dir_all(&self.root).await?;
        write_yaml(&path, runtime).await?;
        Ok(path)
    }

    /// Save every object of a backup
    pub async fn save_backup(&self, runtime_id: &str, backup: &RuntimeBackup) -> Result<PathBuf> {
        let dir = self.backup_dir(runtime_id)?;
        tokio::fs::create_dir_all(&dir).await?;

        write_yaml(&dir.join("original-shoot.yaml"), &backup.original_shoot).await?;
        write_yaml(&dir.join("shoot-to-restore.yaml"), &backup.shoot_to_restore).await?;
        for binding in &backup.cluster_role_bindings {
            let name = binding.name_any();
            let file = format!("crb-{}.yaml", file_component(runtime_id, &name)?);
            write_yaml(&dir.join(file), binding).await?;
        }
        for oidc in &backup.oidc_configs {
            let name = oidc.name_any();
            let file = format!("oidc-{}.yaml", file_component(runtime_id, &name)?);
            write_yaml(&dir.join(file), oidc).await?;
        }
        Ok(dir)
    }
}

/// Reject values that would escape the output directory
fn file_component<'a>(runtime_id: &str, value: &'a str) -> Result<&'a str> {
    if value.is_empty() || value == "." || value.contains("..") || value.contains(['/', '\\']) {
        return Err(Error::migration(
            runtime_id,
            format!("{value:?} cannot be used as a file name"),
        ));
    }
    Ok(value)
}

async fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let yaml = serde_yaml::to_string(value)
        .map_err(|e| Error::serialization(format!("{}: {e}", path.display())))?;
    tokio::fs::write(path, yaml).await?;
    debug!(path = %path.display(), "wrote file");
    Ok(())
}

/// Applies Runtimes to KCP
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RuntimeWriter: Send + Sync {
    /// Create or update the Runtime
    async fn apply(&self, runtime: &Runtime) -> Result<()>;
}

/// Server-side applies Runtimes through the KCP API
pub struct KcpRuntimeWriter {
    api: Api<Runtime>,
}

impl KcpRuntimeWriter {
    /// Writer for runtimes in `namespace`
    pub fn new(client: Client, namespace: &str) -> Self {
        Self {
            api: Api::namespaced(client, namespace),
        }
    }
}

#[async_trait]
impl RuntimeWriter for KcpRuntimeWriter {
    async fn apply(&self, runtime: &Runtime) -> Result<()> {
        let name = runtime.name_any();
        let params = PatchParams::apply(FIELD_MANAGER).force();
        self.api.patch(&name, &params, &Patch::Apply(runtime)).await?;
        debug!(runtime = %name, "applied runtime");
        Ok(())
    }
}
