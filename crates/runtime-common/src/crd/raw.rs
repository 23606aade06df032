//! Opaque provider configuration blobs
//!
//! Gardener embeds provider-specific configuration (infrastructure, control
//! plane, per-worker) as arbitrary JSON documents. [`RawExtension`] keeps the
//! exact bytes it was built from so a blob read from a live cluster can be
//! carried into a new spec unchanged.

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::{Error, Result};

/// A JSON document embedded verbatim in a resource spec
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RawExtension {
    raw: Vec<u8>,
}

impl RawExtension {
    /// Wrap existing JSON bytes, rejecting anything that is not a JSON document
    pub fn from_bytes(raw: impl Into<Vec<u8>>) -> Result<Self> {
        let raw = raw.into();
        serde_json::from_slice::<serde::de::IgnoredAny>(&raw)
            .map_err(|e| Error::serialization_for_kind("RawExtension", e.to_string()))?;
        Ok(Self { raw })
    }

    /// Serialize a typed value into a blob
    pub fn from_value<T: Serialize>(value: &T) -> serde_json::Result<Self> {
        Ok(Self {
            raw: serde_json::to_vec(value)?,
        })
    }

    /// The exact bytes of the document
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// Decode the blob into a typed value
    pub fn decode<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.raw)
    }
}

impl std::fmt::Debug for RawExtension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("RawExtension")
            .field(&String::from_utf8_lossy(&self.raw))
            .finish()
    }
}

// Emitted inline as a nested document so YAML output stays readable.
impl Serialize for RawExtension {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let value: serde_json::Value =
            serde_json::from_slice(&self.raw).map_err(serde::ser::Error::custom)?;
        value.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RawExtension {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let raw = serde_json::to_vec(&value).map_err(serde::de::Error::custom)?;
        Ok(Self { raw })
    }
}

impl JsonSchema for RawExtension {
    fn schema_name() -> String {
        "RawExtension".to_string()
    }

    fn json_schema(_gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        let mut schema = schemars::schema::SchemaObject {
            instance_type: Some(schemars::schema::InstanceType::Object.into()),
            ..Default::default()
        };
        schema.extensions.insert(
            "x-kubernetes-preserve-unknown-fields".to_string(),
            serde_json::Value::Bool(true),
        );
        schemars::schema::Schema::Object(schema)
    }
}
