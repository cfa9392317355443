use std::fs::File;
use std::io::Read;
use std::ops::Deref;
use std::path::Path;

#[cfg(feature = "mmap")]
use memmap2::Mmap;

use crate::error::{KiwiDictionaryErrorKind, KiwiDictionaryResult};

/// A byte buffer backed either by an owned `Vec`, a `'static` slice
/// (model data embedded with `include_bytes!`), or a memory map.
pub enum Data {
    Static(&'static [u8]),
    Vec(Vec<u8>),
    #[cfg(feature = "mmap")]
    Mmap(Mmap),
}

impl Deref for Data {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Data::Static(s) => s,
            Data::Vec(v) => v,
            #[cfg(feature = "mmap")]
            Data::Mmap(m) => m,
        }
    }
}

impl From<&'static [u8]> for Data {
    fn from(s: &'static [u8]) -> Self {
        Data::Static(s)
    }
}

impl From<Vec<u8>> for Data {
    fn from(v: Vec<u8>) -> Self {
        Data::Vec(v)
    }
}

pub fn read_file(path: &Path) -> KiwiDictionaryResult<Vec<u8>> {
    let mut file = File::open(path)
        .map_err(|err| KiwiDictionaryErrorKind::Io.with_error(anyhow::anyhow!(err)))?;
    let mut buffer = Vec::new();
    file.read_to_end(&mut buffer)
        .map_err(|err| KiwiDictionaryErrorKind::Io.with_error(anyhow::anyhow!(err)))?;
    Ok(buffer)
}

#[cfg(feature = "mmap")]
pub fn memmap_file(path: &Path) -> KiwiDictionaryResult<Mmap> {
    let file = File::open(path)
        .map_err(|err| KiwiDictionaryErrorKind::Io.with_error(anyhow::anyhow!(err)))?;
    let mmap = unsafe { Mmap::map(&file) }
        .map_err(|err| KiwiDictionaryErrorKind::Io.with_error(anyhow::anyhow!(err)))?;
    Ok(mmap)
}
