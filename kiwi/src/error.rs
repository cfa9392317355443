use kiwi_dictionary::KiwiDictionaryError;
use thiserror::Error;

pub type KiwiResult<T> = Result<T, KiwiError>;

#[derive(Error, Debug)]
#[error("KiwiError(kind={kind:?}, source={source})")]
pub struct KiwiError {
    pub kind: KiwiErrorKind,
    #[source]
    source: anyhow::Error,
}

impl KiwiError {
    pub fn kind(&self) -> KiwiErrorKind {
        self.kind
    }

    pub fn add_context<C>(self, context: C) -> Self
    where
        C: std::fmt::Display + Send + Sync + 'static,
    {
        KiwiError {
            kind: self.kind,
            source: self.source.context(context),
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KiwiErrorKind {
    #[error("invalid Unicode input")]
    InvalidUnicode,
    #[error("model file missing or unreadable")]
    Io,
    #[error("model or user-dictionary has the wrong format")]
    Format,
    #[error("addAliasWord/addPreAnalyzedWord referenced a base not in the dictionary")]
    UnknownMorpheme,
    #[error("out-of-range index, empty form, or modification of a finalized analyzer")]
    InvalidArgument,
}

impl KiwiErrorKind {
    pub fn with_error<E>(self, source: E) -> KiwiError
    where
        E: Into<anyhow::Error>,
    {
        KiwiError {
            kind: self,
            source: source.into(),
        }
    }
}

/// A dictionary-layer error kind maps to the matching analyzer-layer
/// kind, one-to-one.
impl From<KiwiDictionaryError> for KiwiError {
    fn from(err: KiwiDictionaryError) -> Self {
        let kind = match err.kind() {
            kiwi_dictionary::KiwiDictionaryErrorKind::InvalidUnicode => KiwiErrorKind::InvalidUnicode,
            kiwi_dictionary::KiwiDictionaryErrorKind::Io => KiwiErrorKind::Io,
            kiwi_dictionary::KiwiDictionaryErrorKind::Format
            | kiwi_dictionary::KiwiDictionaryErrorKind::Deserialize
            | kiwi_dictionary::KiwiDictionaryErrorKind::Serialize => KiwiErrorKind::Format,
            kiwi_dictionary::KiwiDictionaryErrorKind::UnknownMorpheme => KiwiErrorKind::UnknownMorpheme,
            kiwi_dictionary::KiwiDictionaryErrorKind::NotFound
            | kiwi_dictionary::KiwiDictionaryErrorKind::Args => KiwiErrorKind::InvalidArgument,
        };
        KiwiError {
            kind,
            source: anyhow::Error::new(err),
        }
    }
}
