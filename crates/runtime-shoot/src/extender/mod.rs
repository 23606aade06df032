//! Pipeline stages
//!
//! Each stage owns a disjoint set of shoot fields. A stage takes the shoot
//! built so far by value and either returns it with its fields written or
//! fails, which aborts the whole pipeline.

mod base;
mod dns;
mod extensions;
mod kubernetes;
mod maintenance;
mod metadata;
mod networking;
mod oidc;
mod provider;

pub use base::BaseExtender;
pub use dns::DnsExtender;
pub use extensions::ExtensionsExtender;
pub use kubernetes::KubernetesExtender;
pub use maintenance::MaintenanceExtender;
pub use metadata::MetadataExtender;
pub use networking::NetworkingExtender;
pub use oidc::OidcExtender;
pub use provider::ProviderExtender;

use runtime_common::crd::{Runtime, Shoot};
use runtime_common::Result;

/// A single stage of the shoot synthesis pipeline
pub trait Extender {
    /// Stage name for logging
    fn name(&self) -> &'static str;

    /// Write this stage's fields into the shoot
    fn extend(&self, runtime: &Runtime, shoot: Shoot) -> Result<Shoot>;
}

/// Name used in error context: the Runtime object name, else the shoot name
pub(crate) fn runtime_name(runtime: &Runtime) -> &str {
    runtime
        .metadata
        .name
        .as_deref()
        .unwrap_or(&runtime.spec.shoot.name)
}
