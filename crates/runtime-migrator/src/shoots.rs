//! Shoot lookup in the Gardener project

use async_trait::async_trait;
use kube::api::ListParams;
use kube::{Api, Client};
use runtime_common::crd::Shoot;
use runtime_common::{Result, RUNTIME_ID_ANNOTATION};

/// Source of the project's live shoots
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShootSource: Send + Sync {
    /// All shoots of the project
    async fn list_shoots(&self) -> Result<Vec<Shoot>>;
}

/// Lists shoots from the Gardener API
pub struct GardenerShootSource {
    api: Api<Shoot>,
}

impl GardenerShootSource {
    /// Source reading from the given project namespace
    pub fn new(client: Client, namespace: &str) -> Self {
        Self {
            api: Api::namespaced(client, namespace),
        }
    }
}

#[async_trait]
impl ShootSource for GardenerShootSource {
    async fn list_shoots(&self) -> Result<Vec<Shoot>> {
        Ok(self.api.list(&ListParams::default()).await?.items)
    }
}

/// The shoot created for a runtime, matched by its runtime ID annotation
pub fn find_shoot_for_runtime<'a>(shoots: &'a [Shoot], runtime_id: &str) -> Option<&'a Shoot> {
    shoots
        .iter()
        .find(|shoot| shoot.annotation(RUNTIME_ID_ANNOTATION) == Some(runtime_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use runtime_common::crd::ShootSpec;
    use std::collections::BTreeMap;

    fn shoot(name: &str, runtime_id: Option<&str>) -> Shoot {
        let mut shoot = Shoot::new(name, ShootSpec::default());
        shoot.metadata.annotations = runtime_id.map(|id| {
            BTreeMap::from([(RUNTIME_ID_ANNOTATION.to_string(), id.to_string())])
        });
        shoot
    }

    #[test]
    fn matches_annotation() {
        let shoots = vec![
            shoot("c-1", Some("rt-1")),
            shoot("c-2", None),
            shoot("c-3", Some("rt-3")),
        ];
        let found = find_shoot_for_runtime(&shoots, "rt-3").expect("shoot found");
        assert_eq!(found.metadata.name.as_deref(), Some("c-3"));
        assert!(find_shoot_for_runtime(&shoots, "rt-2").is_none());
    }

    #[test]
    fn does_not_match_by_name() {
        let shoots = vec![shoot("rt-1", None)];
        assert!(find_shoot_for_runtime(&shoots, "rt-1").is_none());
    }
}
