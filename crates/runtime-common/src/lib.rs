//! Common types for runtime synthesis: CRDs, errors, and configuration

#![deny(missing_docs)]

pub mod config;
pub mod crd;
pub mod error;

pub use config::ConverterConfig;
pub use error::{ConfigKind, Error};

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Annotation linking a shoot to the runtime it was created for
pub const RUNTIME_ID_ANNOTATION: &str = "kcp.provisioner.kyma-project.io/runtime-id";

/// Label marking resources written by this tooling
pub const MANAGED_BY_LABEL: &str = "infrastructuremanager.kyma-project.io/managed-by";

/// Value of [`MANAGED_BY_LABEL`]
pub const MANAGED_BY_VALUE: &str = "infrastructure-manager";
