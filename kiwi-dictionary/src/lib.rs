//! Dictionary, language-model, and normalization tables shared by the
//! analyzer: the data side of the system, independent of lattice
//! construction and search.

pub mod automaton;
pub mod character_definition;
pub mod dictionary;
pub mod error;
pub mod form;
pub mod hangul;
pub mod lm;
pub mod loader;
pub mod metadata;
pub mod morpheme;
pub mod pos;
pub mod schema;
pub mod unknown_dictionary;
pub mod util;

pub use dictionary::{Dictionary, DictionaryBuilder};
pub use error::{KiwiDictionaryError, KiwiDictionaryErrorKind, KiwiDictionaryResult};
pub use form::{Form, FormId};
pub use morpheme::{Morpheme, MorphemeId};
pub use pos::PosTag;
