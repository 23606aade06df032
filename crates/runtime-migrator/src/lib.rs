//! Runtime migrator
//!
//! Moves clusters created directly as Gardener shoots under Runtime
//! management. For each runtime ID the matching shoot is backed up, turned
//! into a Runtime, checked against shoot synthesis and written out.

#![deny(missing_docs)]

pub mod backup;
pub mod cluster;
pub mod config;
pub mod input;
pub mod kubeconfig;
pub mod migrator;
pub mod output;
pub mod runtime;
pub mod shoots;

pub use config::MigratorArgs;
pub use migrator::{MigrationStats, Migrator};
pub use runtime_common::{Error, Result};

use runtime_common::ConverterConfig;
use tracing::info;

use crate::cluster::AdminKubeconfigConnector;
use crate::kubeconfig::{client_from_path, GardenerKubeconfigProvider};
use crate::output::{KcpRuntimeWriter, OutputWriter};
use crate::shoots::GardenerShootSource;

/// Run a migration batch as configured on the command line
pub async fn run(args: &MigratorArgs) -> Result<MigrationStats> {
    let config = ConverterConfig::load(&args.converter_config_path)?;

    let runtime_ids = match &args.input_file_path {
        Some(path) => {
            let file = tokio::fs::File::open(path).await?;
            input::read_runtime_ids(file, args.input_type).await?
        }
        None => {
            info!("reading runtime IDs from stdin");
            input::read_runtime_ids(tokio::io::stdin(), args.input_type).await?
        }
    };
    info!(count = runtime_ids.len(), dry_run = args.dry_run, "starting migration");

    let namespace = args.gardener_namespace();
    let gardener = client_from_path(&args.gardener_kubeconfig_path).await?;
    let shoots = GardenerShootSource::new(gardener.clone(), &namespace);
    let clusters = AdminKubeconfigConnector::new(GardenerKubeconfigProvider::new(
        gardener,
        &namespace,
        args.admin_kubeconfig_expiration_seconds(),
    ));
    let output = OutputWriter::new(&args.output_path);

    let migrator = Migrator::new(&config, &args.kcp_namespace, &shoots, &clusters, output);
    if args.dry_run {
        return migrator.migrate_runtimes(&runtime_ids).await;
    }

    let kcp = client_from_path(&args.kcp_kubeconfig_path).await?;
    let writer = KcpRuntimeWriter::new(kcp, &args.kcp_namespace);
    migrator
        .with_writer(&writer)
        .migrate_runtimes(&runtime_ids)
        .await
}
