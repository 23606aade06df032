//! OIDC passthrough for the kube-apiserver

use runtime_common::crd::shoot::KubeApiServerConfig;
use runtime_common::crd::{OidcConfig, Runtime, Shoot};
use runtime_common::Result;

use super::Extender;

/// Sets the API server OIDC issuer, falling back to the operator default
pub struct OidcExtender<'a> {
    default: Option<&'a OidcConfig>,
}

impl<'a> OidcExtender<'a> {
    /// Stage with an optional operator default issuer
    pub fn new(default: Option<&'a OidcConfig>) -> Self {
        Self { default }
    }
}

impl Extender for OidcExtender<'_> {
    fn name(&self) -> &'static str {
        "oidc"
    }

    fn extend(&self, runtime: &Runtime, mut shoot: Shoot) -> Result<Shoot> {
        let oidc = runtime
            .spec
            .shoot
            .kubernetes
            .kube_api_server
            .oidc_config
            .as_ref()
            .or(self.default)
            .cloned();

        if let Some(oidc) = oidc {
            shoot
                .spec
                .kubernetes
                .kube_api_server
                .get_or_insert_with(KubeApiServerConfig::default)
                .oidc_config = Some(oidc);
        }

        Ok(shoot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extender::fixtures;
    use runtime_common::crd::ShootSpec;

    fn oidc(client_id: &str) -> OidcConfig {
        OidcConfig {
            client_id: Some(client_id.to_string()),
            issuer_url: Some("https://issuer.example.com".to_string()),
            groups_claim: Some("groups".to_string()),
            signing_algs: Some(vec!["RS256".to_string()]),
            username_claim: Some("sub".to_string()),
            username_prefix: Some("-".to_string()),
        }
    }

    fn client_id(shoot: &Shoot) -> Option<&str> {
        shoot
            .spec
            .kubernetes
            .kube_api_server
            .as_ref()
            .and_then(|api| api.oidc_config.as_ref())
            .and_then(|o| o.client_id.as_deref())
    }

    #[test]
    fn declared_config_wins() {
        let default = oidc("operator");
        let mut runtime = fixtures::aws_runtime();
        runtime.spec.shoot.kubernetes.kube_api_server.oidc_config = Some(oidc("customer"));

        let shoot = OidcExtender::new(Some(&default))
            .extend(&runtime, Shoot::new("shoot-1", ShootSpec::default()))
            .expect("stage succeeds");
        assert_eq!(client_id(&shoot), Some("customer"));
    }

    #[test]
    fn falls_back_to_default() {
        let default = oidc("operator");
        let shoot = OidcExtender::new(Some(&default))
            .extend(&fixtures::aws_runtime(), Shoot::new("shoot-1", ShootSpec::default()))
            .expect("stage succeeds");
        assert_eq!(client_id(&shoot), Some("operator"));
    }

    #[test]
    fn leaves_api_server_untouched_without_any_config() {
        let shoot = OidcExtender::new(None)
            .extend(&fixtures::aws_runtime(), Shoot::new("shoot-1", ShootSpec::default()))
            .expect("stage succeeds");
        assert!(shoot.spec.kubernetes.kube_api_server.is_none());
    }
}
