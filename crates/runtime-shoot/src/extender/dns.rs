//! Shoot DNS domain and provider

use runtime_common::config::DnsConfig;
use runtime_common::crd::shoot::{Dns, DnsIncludeExclude, DnsProvider};
use runtime_common::crd::{Runtime, Shoot};
use runtime_common::Result;

use super::Extender;

/// Gives the shoot a domain below the configured prefix
pub struct DnsExtender<'a> {
    config: &'a DnsConfig,
}

impl<'a> DnsExtender<'a> {
    /// Stage using the configured DNS provider
    pub fn new(config: &'a DnsConfig) -> Self {
        Self { config }
    }
}

impl Extender for DnsExtender<'_> {
    fn name(&self) -> &'static str {
        "dns"
    }

    fn extend(&self, runtime: &Runtime, mut shoot: Shoot) -> Result<Shoot> {
        let domain = format!("{}.{}", runtime.spec.shoot.name, self.config.domain_prefix);

        shoot.spec.dns = Some(Dns {
            domain: Some(domain.clone()),
            providers: vec![DnsProvider {
                domains: Some(DnsIncludeExclude {
                    include: vec![domain],
                    exclude: Vec::new(),
                }),
                primary: Some(true),
                secret_name: Some(self.config.secret_name.clone()),
                type_: Some(self.config.provider_type.clone()),
            }],
        });

        Ok(shoot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extender::fixtures;
    use runtime_common::crd::ShootSpec;

    #[test]
    fn single_primary_provider() {
        let config = fixtures::config();
        let shoot = DnsExtender::new(&config.dns)
            .extend(&fixtures::aws_runtime(), Shoot::new("shoot-1", ShootSpec::default()))
            .expect("stage succeeds");

        let dns = shoot.spec.dns.expect("dns set");
        assert_eq!(dns.domain.as_deref(), Some("shoot-1.dev.kyma.ondemand.com"));
        assert_eq!(dns.providers.len(), 1);
        let provider = &dns.providers[0];
        assert_eq!(provider.primary, Some(true));
        assert_eq!(provider.secret_name.as_deref(), Some("dns-secret"));
        assert_eq!(provider.type_.as_deref(), Some("aws-route53"));
        assert_eq!(
            provider.domains.as_ref().map(|d| d.include.clone()),
            Some(vec!["shoot-1.dev.kyma.ondemand.com".to_string()])
        );
    }
}
