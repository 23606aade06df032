//! Shoot synthesis
//!
//! Turns a hyperscaler-agnostic [`Runtime`](runtime_common::crd::Runtime)
//! into a Gardener [`Shoot`](runtime_common::crd::Shoot). Synthesis is a pure,
//! synchronous transformation: no I/O, no cloud API calls.
//!
//! # Example
//!
//! ```text
//! let context = OperationContext::create(WorkerDefaults::from_config(&config));
//! let shoot = Converter::new(&config, &context).to_shoot(&runtime)?;
//! ```

#![deny(missing_docs)]

pub mod context;
pub mod converter;
pub mod extender;
pub mod hyperscaler;
pub mod version;
pub mod workers;
pub mod zones;

pub use context::{LiveShoot, OperationContext, OperationKind, WorkerDefaults};
pub use converter::Converter;
pub use hyperscaler::{strategy_for, ProviderStrategy};
pub use workers::WorkerReconciler;
pub use zones::networking_zones;
