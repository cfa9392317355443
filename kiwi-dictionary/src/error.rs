use thiserror::Error;

pub type KiwiDictionaryResult<T> = Result<T, KiwiDictionaryError>;

#[derive(Error, Debug)]
#[error("KiwiDictionaryError(kind={kind:?}, source={source})")]
pub struct KiwiDictionaryError {
    pub kind: KiwiDictionaryErrorKind,
    #[source]
    source: anyhow::Error,
}

impl KiwiDictionaryError {
    pub fn kind(&self) -> KiwiDictionaryErrorKind {
        self.kind
    }

    pub fn add_context<C>(self, context: C) -> Self
    where
        C: std::fmt::Display + Send + Sync + 'static,
    {
        KiwiDictionaryError {
            kind: self.kind,
            source: self.source.context(context),
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum KiwiDictionaryErrorKind {
    #[error("invalid Unicode input")]
    InvalidUnicode,
    #[error("I/O error")]
    Io,
    #[error("malformed dictionary or model file")]
    Format,
    #[error("deserialization error")]
    Deserialize,
    #[error("serialization error")]
    Serialize,
    #[error("requested resource not found")]
    NotFound,
    #[error("invalid argument")]
    Args,
    #[error("addAliasWord/addPreAnalyzedWord referenced a base morpheme not in the dictionary")]
    UnknownMorpheme,
}

impl KiwiDictionaryErrorKind {
    pub fn with_error<E>(self, source: E) -> KiwiDictionaryError
    where
        E: Into<anyhow::Error>,
    {
        KiwiDictionaryError {
            kind: self,
            source: source.into(),
        }
    }
}
