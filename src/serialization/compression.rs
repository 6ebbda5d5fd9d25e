//! Optional payload compression.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::error::{PersistError, Result};

/// Compression applied to the artifact payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Compression {
    /// Payload stored as encoded.
    #[default]
    None,
    /// LZ4 block compression with the uncompressed size prepended.
    Lz4,
}

impl Compression {
    pub(crate) fn to_byte(self) -> u8 {
        match self {
            Compression::None => 0,
            Compression::Lz4 => 1,
        }
    }

    pub(crate) fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            0 => Ok(Compression::None),
            1 => Ok(Compression::Lz4),
            other => Err(PersistError::CorruptArtifact(format!(
                "unknown compression tag {}",
                other
            ))),
        }
    }
}

pub(crate) fn compress(data: &[u8], compression: Compression) -> Cow<'_, [u8]> {
    match compression {
        Compression::None => Cow::Borrowed(data),
        Compression::Lz4 => Cow::Owned(lz4_flex::compress_prepend_size(data)),
    }
}

/// Undo [`compress`]. The declared uncompressed size is checked against `limit`
/// before anything is allocated.
pub(crate) fn decompress(data: &[u8], compression: Compression, limit: u64) -> Result<Cow<'_, [u8]>> {
    match compression {
        Compression::None => Ok(Cow::Borrowed(data)),
        Compression::Lz4 => {
            let prefix: [u8; 4] = data
                .get(..4)
                .and_then(|b| b.try_into().ok())
                .ok_or_else(|| {
                    PersistError::CorruptArtifact("lz4 payload missing size prefix".to_string())
                })?;
            let declared = u64::from(u32::from_le_bytes(prefix));
            if declared > limit {
                return Err(PersistError::ArtifactTooLarge {
                    size: declared,
                    limit,
                });
            }
            lz4_flex::decompress_size_prepended(data)
                .map(Cow::Owned)
                .map_err(|e| PersistError::CorruptArtifact(format!("lz4: {}", e)))
        }
    }
}
