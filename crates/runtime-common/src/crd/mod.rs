//! Custom resources read and written during synthesis
//!
//! - [`Runtime`]: the hyperscaler-agnostic input
//! - [`Shoot`]: the Gardener cluster the pipeline produces
//! - [`RawExtension`]: opaque provider-specific configuration embedded in a shoot

mod raw;
mod runtime;
pub mod shoot;

pub use raw::RawExtension;
pub use runtime::{
    ApiServer, ControlPlane, FailureTolerance, Filter, FilterToggle, HighAvailability, Kubernetes,
    Networking, NetworkingSecurity, OidcConfig, PoolMachine, PoolMachineImage, PoolVolume,
    Provider, ProviderType, Runtime, RuntimeShoot, RuntimeSpec, RuntimeStatus, Security,
    WorkerPool,
};
pub use shoot::{Shoot, ShootSpec};
