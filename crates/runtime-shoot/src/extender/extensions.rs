//! Gardener extensions enabled on every shoot

use runtime_common::crd::shoot::Extension;
use runtime_common::crd::{RawExtension, Runtime, Shoot};
use runtime_common::{Error, Result};
use serde_json::json;

use super::Extender;

const DNS_EXTENSION: &str = "shoot-dns-service";
const CERT_EXTENSION: &str = "shoot-cert-service";
const NETWORKING_FILTER_EXTENSION: &str = "shoot-networking-filter";
const OIDC_EXTENSION: &str = "shoot-oidc-service";

/// Writes the shoot's extension list
///
/// DNS and certificate services are always on. The networking filter is
/// disabled unless the runtime enables egress filtering. The OIDC service is
/// only added when the runtime declares additional OIDC issuers.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExtensionsExtender;

impl ExtensionsExtender {
    fn blob(value: serde_json::Value) -> Result<RawExtension> {
        RawExtension::from_value(&value)
            .map_err(|e| Error::serialization_for_kind("Extension", e.to_string()))
    }
}

impl Extender for ExtensionsExtender {
    fn name(&self) -> &'static str {
        "extensions"
    }

    fn extend(&self, runtime: &Runtime, mut shoot: Shoot) -> Result<Shoot> {
        let mut extensions = vec![
            Extension {
                type_: DNS_EXTENSION.to_string(),
                provider_config: Some(Self::blob(json!({
                    "apiVersion": "service.dns.extensions.gardener.cloud/v1alpha1",
                    "kind": "DNSConfig",
                    "dnsProviderReplication": { "enabled": true }
                }))?),
                disabled: Some(false),
            },
            Extension {
                type_: CERT_EXTENSION.to_string(),
                provider_config: Some(Self::blob(json!({
                    "apiVersion": "service.cert.extensions.gardener.cloud/v1alpha1",
                    "kind": "CertConfig",
                    "shootIssuers": { "enabled": true }
                }))?),
                disabled: Some(false),
            },
        ];

        let filter = &runtime.spec.security.networking.filter;
        extensions.push(Extension {
            type_: NETWORKING_FILTER_EXTENSION.to_string(),
            provider_config: None,
            disabled: Some(!filter.egress.enabled),
        });

        let additional_oidc = runtime
            .spec
            .shoot
            .kubernetes
            .kube_api_server
            .additional_oidc_config
            .as_ref()
            .is_some_and(|configs| !configs.is_empty());
        if additional_oidc {
            extensions.push(Extension {
                type_: OIDC_EXTENSION.to_string(),
                provider_config: None,
                disabled: Some(false),
            });
        }

        shoot.spec.extensions = extensions;
        Ok(shoot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extender::fixtures;
    use runtime_common::crd::{OidcConfig, ShootSpec};

    fn extend(runtime: &Runtime) -> Vec<Extension> {
        ExtensionsExtender
            .extend(runtime, Shoot::new("shoot-1", ShootSpec::default()))
            .expect("stage succeeds")
            .spec
            .extensions
    }

    fn find<'a>(extensions: &'a [Extension], type_: &str) -> Option<&'a Extension> {
        extensions.iter().find(|e| e.type_ == type_)
    }

    #[test]
    fn default_extensions() {
        let extensions = extend(&fixtures::aws_runtime());
        let types: Vec<_> = extensions.iter().map(|e| e.type_.as_str()).collect();
        assert_eq!(types, vec![DNS_EXTENSION, CERT_EXTENSION, NETWORKING_FILTER_EXTENSION]);
        assert_eq!(
            find(&extensions, NETWORKING_FILTER_EXTENSION).and_then(|e| e.disabled),
            Some(true)
        );
        let dns: serde_json::Value = find(&extensions, DNS_EXTENSION)
            .and_then(|e| e.provider_config.as_ref())
            .expect("dns config")
            .decode()
            .expect("valid json");
        assert_eq!(dns["dnsProviderReplication"]["enabled"], true);
    }

    #[test]
    fn egress_filter_enables_networking_filter() {
        let mut runtime = fixtures::aws_runtime();
        runtime.spec.security.networking.filter.egress.enabled = true;
        let extensions = extend(&runtime);
        assert_eq!(
            find(&extensions, NETWORKING_FILTER_EXTENSION).and_then(|e| e.disabled),
            Some(false)
        );
    }

    #[test]
    fn additional_oidc_enables_oidc_service() {
        let mut runtime = fixtures::aws_runtime();
        runtime.spec.shoot.kubernetes.kube_api_server.additional_oidc_config =
            Some(vec![OidcConfig::default()]);
        assert!(find(&extend(&runtime), OIDC_EXTENSION).is_some());

        runtime.spec.shoot.kubernetes.kube_api_server.additional_oidc_config = Some(vec![]);
        assert!(find(&extend(&runtime), OIDC_EXTENSION).is_none());
    }
}
