//! Artifact envelope.
//!
//! Every artifact is framed the same way, whether it comes from
//! [`crate::serialization::save`] or [`crate::persist::dump`]:
//!
//! ```text
//! [4-byte magic "PRST"][u16 version][u8 kind][u8 compression]
//! [u32 metadata_len][u64 payload_len]
//! [JSON metadata][payload]
//! [u32 CRC32 of everything above]
//! ```
//!
//! All integers are little-endian.

use serde::{Deserialize, Serialize};

use crate::error::{PersistError, Result};
use crate::serialization::compression::Compression;

/// File magic.
pub const MAGIC: [u8; 4] = *b"PRST";
/// Format version written by this build.
pub const FORMAT_VERSION: u16 = 1;
/// Size of the fixed header in bytes.
pub const HEADER_SIZE: usize = 20;
/// Size of the CRC32 trailer in bytes.
pub const CHECKSUM_SIZE: usize = 4;

/// What kind of value an artifact holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactKind {
    /// Arbitrary value written by the general-purpose serializer.
    Value,
    /// Fitted model parameters written by the persistence utility.
    Model,
}

impl ArtifactKind {
    fn to_byte(self) -> u8 {
        match self {
            ArtifactKind::Value => 0,
            ArtifactKind::Model => 1,
        }
    }

    fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            0 => Ok(ArtifactKind::Value),
            1 => Ok(ArtifactKind::Model),
            other => Err(PersistError::CorruptArtifact(format!(
                "unknown artifact kind {}",
                other
            ))),
        }
    }
}

/// Descriptive metadata stored as JSON between header and payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Rust type name of the serialized value.
    pub type_name: String,
    /// Library name and version that wrote the artifact.
    pub producer: String,
    /// Free-form description supplied by the caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Payload size before compression.
    pub payload_len: u64,
}

impl Metadata {
    pub(crate) fn for_type<T: ?Sized>(payload_len: u64, description: Option<String>) -> Self {
        Self {
            type_name: std::any::type_name::<T>().to_string(),
            producer: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            description,
            payload_len,
        }
    }
}

/// Fixed-size artifact header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    pub version: u16,
    pub kind: ArtifactKind,
    pub compression: Compression,
    pub metadata_len: u32,
    /// Payload size as stored, i.e. after compression.
    pub payload_len: u64,
}

impl Header {
    fn to_bytes(self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        out[0..4].copy_from_slice(&MAGIC);
        out[4..6].copy_from_slice(&self.version.to_le_bytes());
        out[6] = self.kind.to_byte();
        out[7] = self.compression.to_byte();
        out[8..12].copy_from_slice(&self.metadata_len.to_le_bytes());
        out[12..20].copy_from_slice(&self.payload_len.to_le_bytes());
        out
    }

    /// Parse the header. `bytes` must hold at least [`HEADER_SIZE`] bytes.
    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let version = u16::from_le_bytes([bytes[4], bytes[5]]);
        if version != FORMAT_VERSION {
            return Err(PersistError::UnsupportedVersion {
                found: version,
                supported: FORMAT_VERSION,
            });
        }
        let mut metadata_len = [0u8; 4];
        metadata_len.copy_from_slice(&bytes[8..12]);
        let mut payload_len = [0u8; 8];
        payload_len.copy_from_slice(&bytes[12..20]);

        Ok(Self {
            version,
            kind: ArtifactKind::from_byte(bytes[6])?,
            compression: Compression::from_byte(bytes[7])?,
            metadata_len: u32::from_le_bytes(metadata_len),
            payload_len: u64::from_le_bytes(payload_len),
        })
    }
}

/// Everything known about an artifact without decoding its payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactInfo {
    pub header: Header,
    pub metadata: Metadata,
    pub checksum: u32,
    /// Total artifact size in bytes.
    pub total_len: u64,
}

/// A validated artifact borrowed from its byte buffer.
pub(crate) struct Envelope<'a> {
    pub info: ArtifactInfo,
    /// Stored (possibly compressed) payload.
    pub payload: &'a [u8],
}

/// Frame an already-compressed payload.
pub(crate) fn encode(
    kind: ArtifactKind,
    compression: Compression,
    metadata: &Metadata,
    payload: &[u8],
) -> Result<Vec<u8>> {
    let metadata_bytes = serde_json::to_vec(metadata).map_err(|e| {
        PersistError::EncodingUnsupported {
            type_name: "Metadata".to_string(),
            reason: e.to_string(),
        }
    })?;
    let metadata_len = u32::try_from(metadata_bytes.len()).map_err(|_| {
        PersistError::EncodingUnsupported {
            type_name: metadata.type_name.clone(),
            reason: "metadata larger than 4 GiB".to_string(),
        }
    })?;
    let header = Header {
        version: FORMAT_VERSION,
        kind,
        compression,
        metadata_len,
        payload_len: payload.len() as u64,
    };

    let mut out =
        Vec::with_capacity(HEADER_SIZE + metadata_bytes.len() + payload.len() + CHECKSUM_SIZE);
    out.extend_from_slice(&header.to_bytes());
    out.extend_from_slice(&metadata_bytes);
    out.extend_from_slice(payload);
    let checksum = crc32fast::hash(&out);
    out.extend_from_slice(&checksum.to_le_bytes());
    Ok(out)
}

/// Validate framing and checksum and split out the payload.
pub(crate) fn decode(bytes: &[u8]) -> Result<Envelope<'_>> {
    if bytes.len() < HEADER_SIZE + CHECKSUM_SIZE {
        return Err(PersistError::CorruptArtifact(format!(
            "too small: {} bytes",
            bytes.len()
        )));
    }
    if bytes[0..4] != MAGIC {
        return Err(PersistError::CorruptArtifact(format!(
            "bad magic {:?}",
            &bytes[0..4]
        )));
    }

    let body_end = bytes.len() - CHECKSUM_SIZE;
    let mut stored = [0u8; CHECKSUM_SIZE];
    stored.copy_from_slice(&bytes[body_end..]);
    let stored = u32::from_le_bytes(stored);
    let computed = crc32fast::hash(&bytes[..body_end]);
    if stored != computed {
        tracing::warn!(stored, computed, "artifact checksum mismatch");
        return Err(PersistError::ChecksumMismatch {
            expected: stored,
            actual: computed,
        });
    }

    let header = Header::from_bytes(&bytes[..HEADER_SIZE])?;
    let metadata_end = HEADER_SIZE as u64 + u64::from(header.metadata_len);
    let payload_end = metadata_end
        .checked_add(header.payload_len)
        .ok_or_else(|| PersistError::CorruptArtifact("payload length overflows".to_string()))?;
    if payload_end != body_end as u64 {
        return Err(PersistError::CorruptArtifact(format!(
            "declared sections end at byte {}, body ends at byte {}",
            payload_end, body_end
        )));
    }
    // Both bounds are now known to fit in the buffer.
    let metadata_end = metadata_end as usize;
    let metadata: Metadata = serde_json::from_slice(&bytes[HEADER_SIZE..metadata_end])?;

    Ok(Envelope {
        info: ArtifactInfo {
            header,
            metadata,
            checksum: stored,
            total_len: bytes.len() as u64,
        },
        payload: &bytes[metadata_end..body_end],
    })
}
