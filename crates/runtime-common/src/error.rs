//! Error types for runtime synthesis and migration
//!
//! Errors are structured with fields to aid debugging in production.
//! Synthesis errors are fatal for the current reconciliation: they are
//! surfaced to the caller and never retried by the pipeline itself.

use thiserror::Error;

/// Default context value when no specific context is available
pub const UNKNOWN_CONTEXT: &str = "unknown";

/// Provider-specific configuration blob that failed to build
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigKind {
    /// Infrastructure config (networks, zones)
    Infrastructure,
    /// Control plane config
    ControlPlane,
    /// Per-worker provider config
    Worker,
}

impl std::fmt::Display for ConfigKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::ControlPlane => write!(f, "control plane"),
            Self::Worker => write!(f, "worker"),
        }
    }
}

/// Main error type for runtime operations
#[derive(Debug, Error)]
pub enum Error {
    /// Kubernetes API error
    #[error("kubernetes error: {source}")]
    Kube {
        /// The underlying kube-rs error
        #[from]
        source: kube::Error,
    },

    /// Provider type is not in the supported set
    #[error("unsupported provider: {provider}")]
    UnsupportedProvider {
        /// Provider type as declared in the runtime
        provider: String,
    },

    /// Validation error for a runtime spec or operation context
    #[error("validation error for {runtime}: {message}")]
    Validation {
        /// Name of the runtime with invalid configuration
        runtime: String,
        /// Description of what's invalid
        message: String,
        /// The invalid field path (e.g., "spec.shoot.provider.workers")
        field: Option<String>,
    },

    /// A provider strategy could not build one of its config blobs
    #[error("failed to build {config} config for provider {provider}: {message}")]
    ProviderConfig {
        /// Provider type
        provider: String,
        /// Which config failed
        config: ConfigKind,
        /// Description of what failed
        message: String,
    },

    /// Serialization/deserialization error
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of what failed
        message: String,
        /// The resource kind being serialized (if known)
        kind: Option<String>,
    },

    /// Converter configuration could not be loaded
    #[error("configuration error [{path}]: {message}")]
    Config {
        /// Path of the configuration file (or "inline")
        path: String,
        /// Description of what failed
        message: String,
    },

    /// Kubeconfig could not be loaded or turned into a client
    #[error("kubeconfig error: {message}")]
    Kubeconfig {
        /// Description of what failed
        message: String,
    },

    /// Filesystem error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Migration of a single runtime failed
    #[error("migration of runtime {runtime_id} failed: {message}")]
    Migration {
        /// Runtime identifier being migrated
        runtime_id: String,
        /// Description of what failed
        message: String,
    },
}

impl Error {
    /// Create an unsupported provider error
    pub fn unsupported_provider(provider: impl Into<String>) -> Self {
        Self::UnsupportedProvider {
            provider: provider.into(),
        }
    }

    /// Create a validation error with the given message
    ///
    /// For simple validation errors without runtime context.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            runtime: UNKNOWN_CONTEXT.to_string(),
            message: msg.into(),
            field: None,
        }
    }

    /// Create a validation error with runtime context and field path
    pub fn validation_for_field(
        runtime: impl Into<String>,
        field: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self::Validation {
            runtime: runtime.into(),
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Create a provider config error for the given blob
    pub fn provider_config(
        provider: impl Into<String>,
        config: ConfigKind,
        msg: impl Into<String>,
    ) -> Self {
        Self::ProviderConfig {
            provider: provider.into(),
            config,
            message: msg.into(),
        }
    }

    /// Create a serialization error with the given message
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: None,
        }
    }

    /// Create a serialization error with resource kind context
    pub fn serialization_for_kind(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: Some(kind.into()),
        }
    }

    /// Create a configuration error for the given file
    pub fn config(path: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Create a kubeconfig error
    pub fn kubeconfig(msg: impl Into<String>) -> Self {
        Self::Kubeconfig {
            message: msg.into(),
        }
    }

    /// Create a migration error for a runtime
    pub fn migration(runtime_id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Migration {
            runtime_id: runtime_id.into(),
            message: msg.into(),
        }
    }

    /// Attach a runtime name to a validation error raised without one
    pub fn with_runtime(self, runtime: &str) -> Self {
        match self {
            Self::Validation {
                runtime: existing,
                message,
                field,
            } if existing == UNKNOWN_CONTEXT => Self::Validation {
                runtime: runtime.to_string(),
                message,
                field,
            },
            other => other,
        }
    }

    /// Whether a caller may retry the failed operation unchanged
    ///
    /// Synthesis errors depend only on their inputs, so repeating the call
    /// yields the same failure. Only API and filesystem errors are transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Kube { .. } | Self::Io(_))
    }

    /// Get the runtime name from the error context, if available
    pub fn runtime(&self) -> Option<&str> {
        match self {
            Self::Validation { runtime, .. } if runtime != UNKNOWN_CONTEXT => Some(runtime),
            Self::Migration { runtime_id, .. } => Some(runtime_id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_display() {
        let err = Error::validation_for_field(
            "rt-1",
            "spec.shoot.provider.workers",
            "no worker pools declared",
        );
        assert_eq!(
            err.to_string(),
            "validation error for rt-1: no worker pools declared"
        );
        assert_eq!(err.runtime(), Some("rt-1"));
    }

    #[test]
    fn provider_config_error_names_the_blob() {
        let err = Error::provider_config("aws", ConfigKind::ControlPlane, "boom");
        assert_eq!(
            err.to_string(),
            "failed to build control plane config for provider aws: boom"
        );
    }

    #[test]
    fn synthesis_errors_are_not_retryable() {
        assert!(!Error::unsupported_provider("unknown").is_retryable());
        assert!(!Error::validation("no zones derivable").is_retryable());
        assert!(!Error::provider_config("aws", ConfigKind::Infrastructure, "x").is_retryable());
        assert!(Error::Io(std::io::Error::other("disk")).is_retryable());
    }

    #[test]
    fn with_runtime_fills_missing_context() {
        let err = Error::validation("no zones derivable").with_runtime("rt-2");
        assert_eq!(err.runtime(), Some("rt-2"));

        let err = Error::validation_for_field("rt-1", "spec", "bad").with_runtime("rt-2");
        assert_eq!(err.runtime(), Some("rt-1"));
    }

    #[test]
    fn unknown_runtime_context_is_hidden() {
        assert_eq!(Error::validation("bad").runtime(), None);
        assert_eq!(Error::migration("abc", "x").runtime(), Some("abc"));
    }
}
