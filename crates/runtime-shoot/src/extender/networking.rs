//! Cluster networking

use runtime_common::crd::shoot::Networking;
use runtime_common::crd::{Runtime, Shoot};
use runtime_common::Result;

use super::Extender;

/// Network plugin of shoots whose runtime does not choose one
const DEFAULT_NETWORKING_TYPE: &str = "calico";

/// Copies node, pod and service ranges into the shoot
///
/// Empty ranges are left unset for Gardener to default.
#[derive(Clone, Copy, Debug, Default)]
pub struct NetworkingExtender;

impl Extender for NetworkingExtender {
    fn name(&self) -> &'static str {
        "networking"
    }

    fn extend(&self, runtime: &Runtime, mut shoot: Shoot) -> Result<Shoot> {
        let networking = &runtime.spec.shoot.networking;
        let non_empty = |s: &String| (!s.is_empty()).then(|| s.clone());
        shoot.spec.networking = Some(Networking {
            type_: Some(
                networking
                    .type_
                    .as_ref()
                    .and_then(non_empty)
                    .unwrap_or_else(|| DEFAULT_NETWORKING_TYPE.to_string()),
            ),
            nodes: non_empty(&networking.nodes),
            pods: non_empty(&networking.pods),
            services: non_empty(&networking.services),
        });

        Ok(shoot)
    }
}
