//! Provider strategy abstraction
//!
//! Each hyperscaler Gardener supports expects its own schema for the
//! infrastructure and control plane configuration embedded in a shoot. A
//! [`ProviderStrategy`] builds those blobs from the node CIDR and the zone
//! union of a runtime; the rest of the pipeline treats them as opaque.
//!
//! # Supported Providers
//!
//! - [`AwsStrategy`] - AWS VPC with one workers/public/internal subnet triple per zone
//! - [`AzureStrategy`] - Azure VNet with one subnet per numbered zone
//!
//! GCP and OpenStack have no registered strategy and fail with
//! [`Error::UnsupportedProvider`](runtime_common::Error::UnsupportedProvider).

pub mod aws;
pub mod azure;
mod cidr;

pub use aws::AwsStrategy;
pub use azure::AzureStrategy;

use runtime_common::crd::{ProviderType, RawExtension};
use runtime_common::{ConfigKind, Error, Result};
use serde::Serialize;

/// Builds the provider-specific configuration blobs of a shoot
pub trait ProviderStrategy: Send + Sync {
    /// Provider this strategy builds configuration for
    fn provider_type(&self) -> ProviderType;

    /// Infrastructure config for the given node CIDR and zone union
    fn infrastructure_config(&self, node_cidr: &str, zones: &[String]) -> Result<RawExtension>;

    /// Control plane config for the given zone union
    fn control_plane_config(&self, zones: &[String]) -> Result<RawExtension>;

    /// Per-worker config enabling instance metadata hardening
    ///
    /// Providers without such a mode return `None` and workers are left
    /// without a provider config.
    fn hardened_worker_config(&self) -> Result<Option<RawExtension>> {
        Ok(None)
    }
}

static AWS: AwsStrategy = AwsStrategy;
static AZURE: AzureStrategy = AzureStrategy;

/// Registered strategies, keyed by provider type
static STRATEGIES: &[(ProviderType, &dyn ProviderStrategy)] =
    &[(ProviderType::Aws, &AWS), (ProviderType::Azure, &AZURE)];

/// Look up the strategy for a provider type
///
/// # Errors
///
/// Returns [`Error::UnsupportedProvider`] when no strategy is registered.
pub fn strategy_for(provider_type: &ProviderType) -> Result<&'static dyn ProviderStrategy> {
    STRATEGIES
        .iter()
        .find(|(registered, _)| registered == provider_type)
        .map(|(_, strategy)| *strategy)
        .ok_or_else(|| Error::unsupported_provider(provider_type.to_string()))
}

/// Serialize a typed config into a blob, naming the blob on failure
fn encode<T: Serialize>(
    provider: ProviderType,
    config: ConfigKind,
    value: &T,
) -> Result<RawExtension> {
    RawExtension::from_value(value)
        .map_err(|e| Error::provider_config(provider.to_string(), config, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::aws(ProviderType::Aws)]
    #[case::azure(ProviderType::Azure)]
    fn registered_providers_resolve(#[case] provider: ProviderType) {
        let strategy = strategy_for(&provider).expect("registered strategy");
        assert_eq!(strategy.provider_type(), provider);
    }

    #[rstest]
    #[case::gcp(ProviderType::Gcp, "gcp")]
    #[case::openstack(ProviderType::OpenStack, "openstack")]
    #[case::unknown(ProviderType::Unknown("alicloud".to_string()), "alicloud")]
    fn unregistered_providers_are_unsupported(
        #[case] provider: ProviderType,
        #[case] name: &str,
    ) {
        match strategy_for(&provider) {
            Err(Error::UnsupportedProvider { provider }) => assert_eq!(provider, name),
            Err(other) => panic!("expected unsupported provider, got {other:?}"),
            Ok(_) => panic!("expected unsupported provider for {name}"),
        }
    }

    #[test]
    fn only_aws_hardens_workers() {
        let aws = strategy_for(&ProviderType::Aws).expect("aws");
        let azure = strategy_for(&ProviderType::Azure).expect("azure");
        assert!(aws.hardened_worker_config().expect("builds").is_some());
        assert!(azure.hardened_worker_config().expect("builds").is_none());
    }
}
