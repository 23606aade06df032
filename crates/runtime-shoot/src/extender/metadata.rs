//! Shoot identity: name, project namespace, ownership markers

use std::collections::BTreeMap;

use runtime_common::config::GardenerConfig;
use runtime_common::crd::{Runtime, Shoot};
use runtime_common::{
    Error, Result, MANAGED_BY_LABEL, MANAGED_BY_VALUE, RUNTIME_ID_ANNOTATION,
};

use super::{runtime_name, Extender};

/// Names the shoot and places it in the Gardener project namespace
pub struct MetadataExtender<'a> {
    gardener: &'a GardenerConfig,
}

impl<'a> MetadataExtender<'a> {
    /// Stage writing shoots into the given project
    pub fn new(gardener: &'a GardenerConfig) -> Self {
        Self { gardener }
    }
}

impl Extender for MetadataExtender<'_> {
    fn name(&self) -> &'static str {
        "metadata"
    }

    fn extend(&self, runtime: &Runtime, mut shoot: Shoot) -> Result<Shoot> {
        let shoot_name = &runtime.spec.shoot.name;
        if shoot_name.is_empty() {
            return Err(Error::validation_for_field(
                runtime_name(runtime),
                "spec.shoot.name",
                "shoot name must not be empty",
            ));
        }

        shoot.metadata.name = Some(shoot_name.clone());
        shoot.metadata.namespace = Some(self.gardener.namespace());

        if let Some(runtime_id) = runtime.metadata.name.as_ref() {
            shoot
                .metadata
                .annotations
                .get_or_insert_with(BTreeMap::new)
                .insert(RUNTIME_ID_ANNOTATION.to_string(), runtime_id.clone());
        }
        shoot
            .metadata
            .labels
            .get_or_insert_with(BTreeMap::new)
            .insert(MANAGED_BY_LABEL.to_string(), MANAGED_BY_VALUE.to_string());

        Ok(shoot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extender::fixtures;
    use runtime_common::crd::ShootSpec;

    #[test]
    fn names_shoot_in_project_namespace() {
        let config = fixtures::config();
        let shoot = MetadataExtender::new(&config.gardener)
            .extend(&fixtures::aws_runtime(), Shoot::new("", ShootSpec::default()))
            .expect("stage succeeds");

        assert_eq!(shoot.metadata.name.as_deref(), Some("shoot-1"));
        assert_eq!(shoot.metadata.namespace.as_deref(), Some("garden-kyma-dev"));
        assert_eq!(shoot.annotation(RUNTIME_ID_ANNOTATION), Some("rt-1"));
        assert_eq!(
            shoot
                .metadata
                .labels
                .as_ref()
                .and_then(|l| l.get(MANAGED_BY_LABEL))
                .map(String::as_str),
            Some(MANAGED_BY_VALUE)
        );
    }

    #[test]
    fn rejects_empty_shoot_name() {
        let config = fixtures::config();
        let mut runtime = fixtures::aws_runtime();
        runtime.spec.shoot.name.clear();
        let err = MetadataExtender::new(&config.gardener)
            .extend(&runtime, Shoot::new("", ShootSpec::default()))
            .unwrap_err();
        assert_eq!(err.runtime(), Some("rt-1"));
    }
}
