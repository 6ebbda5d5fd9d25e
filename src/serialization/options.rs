use serde::{Deserialize, Serialize};

use crate::serialization::compression::Compression;

/// Default upper bound on artifact size accepted by loads (1 GiB).
pub const DEFAULT_MAX_ARTIFACT_BYTES: u64 = 1 << 30;

/// Options controlling how an artifact is written.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveOptions {
    /// Payload compression.
    pub compression: Compression,
    /// Optional description stored in the artifact metadata.
    pub description: Option<String>,
}

impl SaveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set payload compression.
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Attach a description to the artifact metadata.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Options controlling how an artifact is read back.
///
/// Decoding only builds plain data, but a crafted artifact can still ask for
/// very large allocations. `max_artifact_bytes` caps the bytes read from the
/// source, the decompressed payload size and the decoder's allocations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Maximum accepted artifact and payload size in bytes.
    pub max_artifact_bytes: u64,
    /// Reject artifacts whose recorded type name differs from the requested type.
    pub verify_type: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            max_artifact_bytes: DEFAULT_MAX_ARTIFACT_BYTES,
            verify_type: true,
        }
    }
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum accepted artifact size.
    pub fn with_max_artifact_bytes(mut self, limit: u64) -> Self {
        self.max_artifact_bytes = limit;
        self
    }

    /// Enable or disable the stored type-name check.
    ///
    /// Disable it to read an artifact into a different but wire-compatible
    /// type, e.g. a `[i32]` slice saved and loaded as `Vec<i32>`.
    pub fn with_verify_type(mut self, verify_type: bool) -> Self {
        self.verify_type = verify_type;
        self
    }
}
