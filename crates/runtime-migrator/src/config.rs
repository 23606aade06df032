//! Command line configuration

use std::path::PathBuf;

use clap::{ArgAction, Parser};

use crate::input::InputType;

/// Migrate Gardener shoots into Runtime resources
///
/// Runtime IDs are read from `--input-file-path`, or from stdin when no
/// file is given.
#[derive(Parser, Debug, Clone)]
#[command(name = "runtime-migrator", version, about)]
pub struct MigratorArgs {
    /// Kubeconfig of the KCP cluster Runtime resources are applied to
    #[arg(long, env = "KCP_KUBECONFIG_PATH")]
    pub kcp_kubeconfig_path: PathBuf,

    /// Kubeconfig of the Gardener cluster
    #[arg(long, env = "GARDENER_KUBECONFIG_PATH")]
    pub gardener_kubeconfig_path: PathBuf,

    /// Gardener project; shoots are read from `garden-<project>`
    #[arg(long)]
    pub gardener_project_name: String,

    /// Converter configuration (JSON) used to verify migrated runtimes
    #[arg(long)]
    pub converter_config_path: PathBuf,

    /// Directory generated YAML files are written to; must exist
    #[arg(long, default_value = "/tmp/")]
    pub output_path: PathBuf,

    /// Only write files; pass `--dry-run false` to apply Runtimes to KCP
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    pub dry_run: bool,

    /// Format of the runtime ID list
    #[arg(long, value_enum, default_value_t = InputType::Json)]
    pub input_type: InputType,

    /// File with runtime IDs (default: stdin)
    #[arg(long)]
    pub input_file_path: Option<PathBuf>,

    /// Lifetime of the admin kubeconfigs requested per runtime cluster
    #[arg(long, default_value_t = 60)]
    pub admin_kubeconfig_expiration_minutes: u32,

    /// KCP namespace Runtime resources are created in
    #[arg(long, default_value = "kcp-system")]
    pub kcp_namespace: String,
}

impl MigratorArgs {
    /// Namespace of the Gardener project's shoots
    pub fn gardener_namespace(&self) -> String {
        format!("garden-{}", self.gardener_project_name)
    }

    /// Admin kubeconfig lifetime in seconds
    pub fn admin_kubeconfig_expiration_seconds(&self) -> i64 {
        i64::from(self.admin_kubeconfig_expiration_minutes) * 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: &[&str] = &[
        "runtime-migrator",
        "--kcp-kubeconfig-path",
        "/kcp",
        "--gardener-kubeconfig-path",
        "/gardener",
        "--gardener-project-name",
        "kyma-dev",
        "--converter-config-path",
        "/converter.json",
    ];

    fn parse(extra: &[&str]) -> MigratorArgs {
        let args: Vec<&str> = REQUIRED.iter().chain(extra).copied().collect();
        MigratorArgs::try_parse_from(args).expect("valid arguments")
    }

    #[test]
    fn defaults() {
        let args = parse(&[]);
        assert!(args.dry_run);
        assert_eq!(args.input_type, InputType::Json);
        assert_eq!(args.output_path, PathBuf::from("/tmp/"));
        assert_eq!(args.admin_kubeconfig_expiration_seconds(), 3600);
        assert_eq!(args.gardener_namespace(), "garden-kyma-dev");
        assert_eq!(args.kcp_namespace, "kcp-system");
        assert!(args.input_file_path.is_none());
    }

    #[test]
    fn dry_run_can_be_disabled() {
        let args = parse(&["--dry-run", "false", "--input-type", "txt"]);
        assert!(!args.dry_run);
        assert_eq!(args.input_type, InputType::Txt);
    }

    #[test]
    fn rejects_unknown_input_type() {
        let args: Vec<&str> = REQUIRED
            .iter()
            .chain(&["--input-type", "csv"])
            .copied()
            .collect();
        assert!(MigratorArgs::try_parse_from(args).is_err());
    }
}
