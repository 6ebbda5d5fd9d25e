//! General-purpose value serialization.
//!
//! [`save`] writes any `serde::Serialize` value to a byte sink as one
//! self-describing artifact; [`load`] reads it back into an equal value.
//!
//! The payload is encoded with `bincode` (fixed-width little-endian integers)
//! and wrapped in the envelope described in [`artifact`]: a header, JSON
//! metadata naming the stored Rust type, and a CRC32 trailer. A truncated,
//! bit-flipped or wrongly typed artifact fails to load instead of decoding
//! into a silently wrong value.
//!
//! ```rust
//! use persist_rs::serialization::{load, save};
//! use std::collections::BTreeMap;
//!
//! let mut scores = BTreeMap::new();
//! scores.insert("alice".to_string(), vec![90, 85]);
//!
//! let mut buf = Vec::new();
//! save(&scores, &mut buf).unwrap();
//! let restored: BTreeMap<String, Vec<i32>> = load(buf.as_slice()).unwrap();
//! assert_eq!(restored, scores);
//! ```
//!
//! Do not load artifacts from sources you do not trust: the checksum detects
//! accidents, not tampering.

pub mod artifact;
pub mod compression;
mod options;

pub use artifact::{ArtifactInfo, ArtifactKind, Header, Metadata};
pub use compression::Compression;
pub use options::{LoadOptions, SaveOptions, DEFAULT_MAX_ARTIFACT_BYTES};

use std::any::type_name;
use std::io::{Read, Write};

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::error::{PersistError, Result};

/// Payload codec. Encoding and decoding must agree on these settings.
fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
}

fn encode_error<T: ?Sized>(err: bincode::Error) -> PersistError {
    match *err {
        bincode::ErrorKind::Io(e) => PersistError::Io(e),
        other => PersistError::EncodingUnsupported {
            type_name: type_name::<T>().to_string(),
            reason: other.to_string(),
        },
    }
}

/// Encode `value` into a complete artifact.
pub(crate) fn encode_artifact<T: Serialize + ?Sized>(
    value: &T,
    kind: ArtifactKind,
    options: &SaveOptions,
) -> Result<Vec<u8>> {
    let payload = codec().serialize(value).map_err(encode_error::<T>)?;
    let metadata = Metadata::for_type::<T>(payload.len() as u64, options.description.clone());
    let stored = compression::compress(&payload, options.compression);
    debug!(
        type_name = %metadata.type_name,
        ?kind,
        compression = ?options.compression,
        payload_len = payload.len(),
        stored_len = stored.len(),
        "encoding artifact"
    );
    artifact::encode(kind, options.compression, &metadata, &stored)
}

/// Decode an artifact held in memory into a `T`.
pub(crate) fn decode_artifact<T: DeserializeOwned>(
    bytes: &[u8],
    options: &LoadOptions,
) -> Result<(T, ArtifactInfo)> {
    let limit = options.max_artifact_bytes;
    if bytes.len() as u64 > limit {
        return Err(PersistError::ArtifactTooLarge {
            size: bytes.len() as u64,
            limit,
        });
    }

    let envelope = artifact::decode(bytes)?;
    let info = envelope.info;
    debug!(
        type_name = %info.metadata.type_name,
        kind = ?info.header.kind,
        compression = ?info.header.compression,
        total_len = info.total_len,
        "decoding artifact"
    );

    let expected = type_name::<T>();
    if options.verify_type && info.metadata.type_name != expected {
        warn!(found = %info.metadata.type_name, expected, "artifact type mismatch");
        return Err(PersistError::TypeMismatch {
            expected: expected.to_string(),
            found: info.metadata.type_name,
        });
    }

    let payload = compression::decompress(envelope.payload, info.header.compression, limit)?;
    if payload.len() as u64 != info.metadata.payload_len {
        return Err(PersistError::CorruptArtifact(format!(
            "payload is {} bytes, metadata declares {}",
            payload.len(),
            info.metadata.payload_len
        )));
    }

    let value = codec()
        .with_limit(limit)
        .reject_trailing_bytes()
        .deserialize(&payload)
        .map_err(|e| PersistError::CorruptArtifact(format!("payload: {}", e)))?;
    Ok((value, info))
}

fn read_bounded<R: Read>(source: R, limit: u64) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    source.take(limit.saturating_add(1)).read_to_end(&mut bytes)?;
    if bytes.len() as u64 > limit {
        return Err(PersistError::ArtifactTooLarge {
            size: bytes.len() as u64,
            limit,
        });
    }
    Ok(bytes)
}

/// Parameter representations that can be converted to and from raw bytes.
///
/// Unlike [`to_bytes`], no envelope is written: the bytes are the bare
/// payload, with no checksum or type name. Use it to embed parameters in
/// another container; use [`save`] for anything that goes to disk.
pub trait SerializableParams: Sized {
    /// Serialize the parameters into a byte buffer.
    fn to_bytes(&self) -> Result<Vec<u8>>;

    /// Deserialize the parameters from a byte buffer.
    fn from_bytes(bytes: &[u8]) -> Result<Self>;
}

impl<T> SerializableParams for T
where
    T: Serialize + DeserializeOwned,
{
    fn to_bytes(&self) -> Result<Vec<u8>> {
        codec().serialize(self).map_err(encode_error::<T>)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        codec()
            .reject_trailing_bytes()
            .deserialize(bytes)
            .map_err(|e| PersistError::CorruptArtifact(format!("payload: {}", e)))
    }
}

/// Serialize `value` into an in-memory artifact.
pub fn to_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    encode_artifact(value, ArtifactKind::Value, &SaveOptions::default())
}

/// Deserialize a value from an in-memory artifact.
pub fn from_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    decode_artifact(bytes, &LoadOptions::default()).map(|(value, _)| value)
}

/// Write `value` to `sink` as a single artifact.
///
/// # Errors
/// - [`PersistError::EncodingUnsupported`] if `value` or anything nested in it
///   cannot be encoded.
/// - [`PersistError::Io`] if writing to `sink` fails.
pub fn save<T: Serialize + ?Sized, W: Write>(value: &T, sink: W) -> Result<()> {
    save_with(value, sink, &SaveOptions::default())
}

/// [`save`] with explicit options.
#[instrument(level = "debug", skip_all, fields(type_name = type_name::<T>()))]
pub fn save_with<T: Serialize + ?Sized, W: Write>(
    value: &T,
    mut sink: W,
    options: &SaveOptions,
) -> Result<()> {
    let bytes = encode_artifact(value, ArtifactKind::Value, options)?;
    sink.write_all(&bytes)?;
    sink.flush()?;
    Ok(())
}

/// Read a whole artifact from `source` and reconstruct the value.
///
/// # Errors
/// Fails, rather than returning a wrong value, when the bytes are truncated,
/// corrupted, written by another format version, hold a different type, or
/// exceed the default size limit.
pub fn load<T: DeserializeOwned, R: Read>(source: R) -> Result<T> {
    load_with(source, &LoadOptions::default())
}

/// [`load`] with explicit options.
#[instrument(level = "debug", skip_all, fields(type_name = type_name::<T>()))]
pub fn load_with<T: DeserializeOwned, R: Read>(source: R, options: &LoadOptions) -> Result<T> {
    let bytes = read_bounded(source, options.max_artifact_bytes)?;
    decode_artifact(&bytes, options).map(|(value, _)| value)
}

/// Read only the envelope of an in-memory artifact.
pub fn inspect_bytes(bytes: &[u8]) -> Result<ArtifactInfo> {
    artifact::decode(bytes).map(|envelope| envelope.info)
}
