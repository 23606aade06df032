//! Region, purpose, credentials and control plane placement

use std::collections::BTreeMap;

use runtime_common::crd::shoot::{
    ControlPlane, FailureTolerance, HighAvailability, SeedSelector,
};
use runtime_common::crd::{Runtime, Shoot};
use runtime_common::Result;

use super::Extender;

/// Purpose of shoots whose runtime does not declare one
const DEFAULT_PURPOSE: &str = "evaluation";

/// Seed label carrying the seed's region
const SEED_REGION_LABEL: &str = "seed.gardener.cloud/region";

/// Copies the provider-independent cluster settings
#[derive(Clone, Copy, Debug, Default)]
pub struct BaseExtender;

impl Extender for BaseExtender {
    fn name(&self) -> &'static str {
        "base"
    }

    fn extend(&self, runtime: &Runtime, mut shoot: Shoot) -> Result<Shoot> {
        let declared = &runtime.spec.shoot;
        let spec = &mut shoot.spec;

        spec.region = declared.region.clone();
        spec.purpose = Some(
            declared
                .purpose
                .clone()
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| DEFAULT_PURPOSE.to_string()),
        );
        spec.secret_binding_name = Some(declared.secret_binding_name.clone());
        spec.cloud_profile_name = declared
            .provider
            .type_
            .cloud_profile_name()
            .map(str::to_string);
        spec.control_plane = declared
            .control_plane
            .as_ref()
            .and_then(|cp| cp.high_availability.as_ref())
            .map(|ha| ControlPlane {
                high_availability: Some(HighAvailability {
                    failure_tolerance: FailureTolerance {
                        type_: ha.failure_tolerance.type_.clone(),
                    },
                }),
            });
        spec.seed_selector = declared
            .enforce_seed_location
            .unwrap_or(false)
            .then(|| SeedSelector {
                match_labels: Some(BTreeMap::from([(
                    SEED_REGION_LABEL.to_string(),
                    declared.region.clone(),
                )])),
                provider_types: None,
            });

        Ok(shoot)
    }
}
