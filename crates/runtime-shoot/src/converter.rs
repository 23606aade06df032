//! Extension Pipeline
//!
//! A [`Converter`] holds the ordered stage list for one operation and folds
//! it over a fresh shoot. The first failing stage aborts the pipeline and no
//! partial shoot is returned.

use runtime_common::crd::{Runtime, Shoot, ShootSpec};
use runtime_common::error::UNKNOWN_CONTEXT;
use runtime_common::{ConverterConfig, Result};
use tracing::{debug, warn};

use crate::context::OperationContext;
use crate::extender::{
    BaseExtender, DnsExtender, Extender, ExtensionsExtender, KubernetesExtender,
    MaintenanceExtender, MetadataExtender, NetworkingExtender, OidcExtender, ProviderExtender,
};

/// Synthesizes shoots from runtimes
pub struct Converter<'a> {
    stages: Vec<Box<dyn Extender + 'a>>,
}

impl<'a> Converter<'a> {
    /// Pipeline for the given configuration and operation
    pub fn new(config: &'a ConverterConfig, context: &'a OperationContext) -> Self {
        let stages: Vec<Box<dyn Extender + 'a>> = vec![
            Box::new(MetadataExtender::new(&config.gardener)),
            Box::new(BaseExtender),
            Box::new(ProviderExtender::new(context)),
            Box::new(NetworkingExtender),
            Box::new(KubernetesExtender::new(&config.kubernetes, context.live())),
            Box::new(OidcExtender::new(
                config.kubernetes.default_operator_oidc.as_ref(),
            )),
            Box::new(DnsExtender::new(&config.dns)),
            Box::new(MaintenanceExtender::new(&config.kubernetes)),
            Box::new(ExtensionsExtender),
        ];
        Self { stages }
    }

    #[cfg(test)]
    pub(crate) fn with_stages(stages: Vec<Box<dyn Extender + 'a>>) -> Self {
        Self { stages }
    }

    #[cfg(test)]
    pub(crate) fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Run every stage over a fresh shoot
    pub fn to_shoot(&self, runtime: &Runtime) -> Result<Shoot> {
        let shoot_name = runtime.spec.shoot.name.as_str();
        self.stages.iter().try_fold(
            Shoot::new(shoot_name, ShootSpec::default()),
            |shoot, stage| {
                debug!(stage = stage.name(), shoot = %shoot_name, "running stage");
                stage.extend(runtime, shoot).inspect_err(|e| {
                    warn!(
                        stage = stage.name(),
                        shoot = %shoot_name,
                        runtime = e.runtime().unwrap_or(UNKNOWN_CONTEXT),
                        error = %e,
                        "stage failed"
                    );
                })
            },
        )
    }
}
