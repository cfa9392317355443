//! Korean morphological analyzer: lattice construction and beam search
//! over `kiwi-dictionary`'s data tables, plus the public facade
//! (`Analyzer`/`AnalyzerBuilder`), match options, token/result types,
//! and the worker pool.

pub mod analyzer;
pub mod error;
pub mod lattice;
pub mod options;
pub mod pool;
pub mod search;
pub mod sentence;
pub mod token;

pub use analyzer::{Analyzer, AnalyzerBuilder, AnalyzerConfig};
pub use error::{KiwiError, KiwiErrorKind, KiwiResult};
pub use options::{AnalyzeRequest, Dialects, MatchOptions, ModelType, PinnedSpan};
pub use pool::AnalyzerPool;
pub use token::{AnalysisResult, OwnedToken, Token};

pub use kiwi_dictionary::{Dictionary, DictionaryBuilder, MorphemeId, PosTag};
