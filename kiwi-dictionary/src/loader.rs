//! Model file loading: one logical file per dictionary component, each
//! read with the matching strategy (`memmap2` behind the `mmap` feature,
//! plain `Vec<u8>` otherwise) and deserialized with `bincode`.

use std::path::Path;

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::KiwiDictionaryErrorKind;
use crate::error::KiwiDictionaryResult;
use crate::util::{read_file, Data};

#[cfg(feature = "mmap")]
use crate::util::memmap_file;

/// Fixed 8-byte header prepended to every model file: a magic number
/// ("KIWI" read as one little-endian `u32`) plus a format version, so a
/// file from an incompatible build is rejected before `bincode` even
/// sees it rather than failing deep inside deserialization with a
/// confusing error.
const MAGIC: u32 = 0x4957_494B;
const FORMAT_VERSION: u32 = 1;
const HEADER_LEN: usize = 8;

pub trait ModelLoader: Sized {
    fn load_from_path(dict_path: &Path, file_name: &str) -> KiwiDictionaryResult<Self>;
    fn load_from_bytes(bytes: &[u8]) -> KiwiDictionaryResult<Self>;
}

impl<T: DeserializeOwned> ModelLoader for T {
    fn load_from_path(dict_path: &Path, file_name: &str) -> KiwiDictionaryResult<Self> {
        debug!("reading {:?}", dict_path.join(file_name));
        let bytes = read_file(&dict_path.join(file_name))?;
        Self::load_from_bytes(&bytes)
    }

    fn load_from_bytes(bytes: &[u8]) -> KiwiDictionaryResult<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(KiwiDictionaryErrorKind::Deserialize
                .with_error(anyhow::anyhow!("model file too short for header: {} bytes", bytes.len())));
        }
        let magic = LittleEndian::read_u32(&bytes[0..4]);
        let version = LittleEndian::read_u32(&bytes[4..8]);
        if magic != MAGIC {
            return Err(KiwiDictionaryErrorKind::Deserialize
                .with_error(anyhow::anyhow!("bad model file magic: {magic:#x}")));
        }
        if version != FORMAT_VERSION {
            warn!("model file format version {version} differs from this build's {FORMAT_VERSION}");
        }
        bincode::deserialize(&bytes[HEADER_LEN..]).map_err(|err| {
            warn!("failed to deserialize {} bytes: {err}", bytes.len());
            KiwiDictionaryErrorKind::Deserialize.with_error(anyhow::anyhow!(err))
        })
    }
}

pub fn save_to_path<T: Serialize>(value: &T, dict_path: &Path, file_name: &str) -> KiwiDictionaryResult<()> {
    std::fs::create_dir_all(dict_path)
        .map_err(|err| KiwiDictionaryErrorKind::Io.with_error(anyhow::anyhow!(err)))?;
    let payload = bincode::serialize(value)
        .map_err(|err| KiwiDictionaryErrorKind::Serialize.with_error(anyhow::anyhow!(err)))?;
    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes
        .write_u32::<LittleEndian>(MAGIC)
        .map_err(|err| KiwiDictionaryErrorKind::Serialize.with_error(anyhow::anyhow!(err)))?;
    bytes
        .write_u32::<LittleEndian>(FORMAT_VERSION)
        .map_err(|err| KiwiDictionaryErrorKind::Serialize.with_error(anyhow::anyhow!(err)))?;
    bytes.extend_from_slice(&payload);
    let path = dict_path.join(file_name);
    debug!("writing {path:?} ({} bytes)", bytes.len());
    std::fs::write(&path, bytes).map_err(|err| KiwiDictionaryErrorKind::Io.with_error(anyhow::anyhow!(err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_the_header() {
        let value: Vec<u32> = vec![1, 2, 3];
        let payload = bincode::serialize(&value).unwrap();
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MAGIC.to_le_bytes());
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&payload);
        let restored: Vec<u32> = ModelLoader::load_from_bytes(&bytes).unwrap();
        assert_eq!(restored, value);
    }

    #[test]
    fn rejects_a_bad_magic_number() {
        let bytes = [0u8; 8];
        let result: KiwiDictionaryResult<Vec<u32>> = ModelLoader::load_from_bytes(&bytes);
        assert!(result.is_err());
    }
}

#[cfg(feature = "mmap")]
pub fn load_data_mmap(dict_path: &Path, file_name: &str) -> KiwiDictionaryResult<Data> {
    Ok(Data::Mmap(memmap_file(&dict_path.join(file_name))?))
}

pub fn load_data(dict_path: &Path, file_name: &str) -> KiwiDictionaryResult<Data> {
    Ok(Data::Vec(read_file(&dict_path.join(file_name))?))
}
