//! File-based persistence for fitted models and other large values.
//!
//! Where [`crate::serialization`] works on arbitrary streams, this module
//! works on file paths: it writes the whole artifact in one go, supports
//! payload compression, and can [`inspect`] an artifact without decoding it.
//!
//! ```rust
//! use persist_rs::persist::{self, Compression, SaveOptions};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let path = dir.path().join("weights.joblib");
//!
//! let weights = vec![0.25_f64; 1000];
//! let options = SaveOptions::new().with_compression(Compression::Lz4);
//! persist::dump(&weights, &path, &options).unwrap();
//!
//! let info = persist::inspect(&path).unwrap();
//! assert_eq!(info.header.compression, Compression::Lz4);
//!
//! let restored: Vec<f64> = persist::load(&path).unwrap();
//! assert_eq!(restored, weights);
//! ```

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::error::{PersistError, Result};
use crate::serialization::{self, artifact, ArtifactKind};

pub use crate::serialization::{ArtifactInfo, Compression, LoadOptions, SaveOptions};

/// Write `value` to `path`, replacing any existing file.
///
/// The file is flushed and synced before returning.
#[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
pub fn dump<T: Serialize + ?Sized, P: AsRef<Path>>(
    value: &T,
    path: P,
    options: &SaveOptions,
) -> Result<()> {
    let path = path.as_ref();
    let bytes = serialization::encode_artifact(value, ArtifactKind::Model, options)?;

    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(&bytes)?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;

    info!(
        path = %path.display(),
        bytes = bytes.len(),
        compression = ?options.compression,
        "artifact written"
    );
    Ok(())
}

/// Read a value previously written with [`dump`] (or [`serialization::save`]).
pub fn load<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    load_with(path, &LoadOptions::default())
}

/// [`load`] with explicit options.
#[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
pub fn load_with<T: DeserializeOwned, P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<T> {
    let bytes = read_file(path.as_ref(), options.max_artifact_bytes)?;
    let (value, info) = serialization::decode_artifact(&bytes, options)?;
    debug!(kind = ?info.header.kind, checksum = info.checksum, "artifact loaded");
    Ok(value)
}

/// Validate an artifact on disk and return its header and metadata.
///
/// The checksum is verified; the payload is not decoded. Files above the
/// default `max_artifact_bytes` are refused, as in [`load`].
pub fn inspect<P: AsRef<Path>>(path: P) -> Result<ArtifactInfo> {
    inspect_with(path, &LoadOptions::default())
}

/// [`inspect`] with an explicit size limit.
pub fn inspect_with<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<ArtifactInfo> {
    let bytes = read_file(path.as_ref(), options.max_artifact_bytes)?;
    Ok(artifact::decode(&bytes)?.info)
}

fn read_file(path: &Path, limit: u64) -> Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let size = file.metadata()?.len();
    if size > limit {
        return Err(PersistError::ArtifactTooLarge { size, limit });
    }
    let mut bytes = Vec::with_capacity(size as usize);
    file.read_to_end(&mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_dump_load_roundtrip() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("table.bin");

        let mut table = BTreeMap::new();
        table.insert("x".to_string(), vec![1.5_f64, 2.5]);
        dump(&table, &path, &SaveOptions::default())?;

        let restored: BTreeMap<String, Vec<f64>> = load(&path)?;
        assert_eq!(restored, table);
        Ok(())
    }

    #[test]
    fn test_dump_marks_model_kind() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("m.joblib");
        dump(&[1.0_f64, 2.0], &path, &SaveOptions::new().with_description("two"))?;

        let info = inspect(&path)?;
        assert_eq!(info.header.kind, ArtifactKind::Model);
        assert_eq!(info.metadata.description.as_deref(), Some("two"));
        assert_eq!(info.total_len, std::fs::metadata(&path)?.len());
        Ok(())
    }

    #[test]
    fn test_dump_overwrites_whole_file() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("v.bin");

        dump(&vec![0u8; 4096], &path, &SaveOptions::default())?;
        dump(&vec![1u8; 4], &path, &SaveOptions::default())?;

        let restored: Vec<u8> = load(&path)?;
        assert_eq!(restored, vec![1u8; 4]);
        Ok(())
    }

    #[test]
    fn test_load_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let err = load::<Vec<u8>, _>(tmp.path().join("missing.bin")).unwrap_err();
        match err {
            PersistError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_corrupted_file() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("c.bin");
        dump(&vec![3.0_f64; 8], &path, &SaveOptions::default())?;

        let mut bytes = std::fs::read(&path)?;
        let mid = bytes.len() / 2;
        bytes[mid] ^= 0xff;
        std::fs::write(&path, &bytes)?;

        assert!(load::<Vec<f64>, _>(&path).unwrap_err().is_corrupt());
        assert!(inspect(&path).unwrap_err().is_corrupt());
        Ok(())
    }

    #[test]
    fn test_load_non_artifact_file() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("notes.txt");
        std::fs::write(&path, "just some text, not an artifact")?;

        assert!(matches!(
            load::<String, _>(&path),
            Err(PersistError::CorruptArtifact(_))
        ));
        Ok(())
    }

    #[test]
    fn test_load_respects_size_limit() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("big.bin");
        dump(&vec![0u8; 2048], &path, &SaveOptions::default())?;

        let options = LoadOptions::new().with_max_artifact_bytes(1024);
        assert!(matches!(
            load_with::<Vec<u8>, _>(&path, &options),
            Err(PersistError::ArtifactTooLarge { limit: 1024, .. })
        ));
        Ok(())
    }

    #[test]
    fn test_inspect_respects_size_limit() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("big.bin");
        dump(&vec![0u8; 2048], &path, &SaveOptions::default())?;

        let options = LoadOptions::new().with_max_artifact_bytes(1024);
        assert!(matches!(
            inspect_with(&path, &options),
            Err(PersistError::ArtifactTooLarge { limit: 1024, .. })
        ));
        assert!(inspect(&path)?.total_len > 2048);
        Ok(())
    }

    #[test]
    fn test_compressed_limit_applies_to_inflated_size(
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("packed.bin");
        let options = SaveOptions::new().with_compression(Compression::Lz4);
        dump(&vec![0u8; 100_000], &path, &options)?;

        let stored = std::fs::metadata(&path)?.len();
        assert!(stored < 10_000);

        let limit = LoadOptions::new().with_max_artifact_bytes(10_000);
        assert!(matches!(
            load_with::<Vec<u8>, _>(&path, &limit),
            Err(PersistError::ArtifactTooLarge { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_serialization_save_readable_by_persist_load(
    ) -> std::result::Result<(), Box<dyn std::error::Error>> {
        let tmp = tempfile::tempdir()?;
        let path = tmp.path().join("s.pkl");
        serialization::save(&("a".to_string(), 1u8), File::create(&path)?)?;

        let restored: (String, u8) = load(&path)?;
        assert_eq!(restored, ("a".to_string(), 1));
        assert_eq!(inspect(&path)?.header.kind, ArtifactKind::Value);
        Ok(())
    }
}
