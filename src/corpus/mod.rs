//! Multilingual Response Corpus
//!
//! A corpus maps language names to datasets, datasets map category names to
//! response tables, and a table is an ordered list of response groups
//! (one stimulus pattern plus its candidate replies).
//!
//! ```text
//! corpus/
//! ├── english/
//! │   ├── greetings.yml
//! │   └── humor.yml
//! └── french/
//!     └── greetings.yml
//! ```
//!
//! The corpus is built once and shared read-only behind an `Arc`.

mod loader;
mod types;

pub use loader::{CorpusFormat, CorpusLoader, LoadError};
pub use types::{Corpus, InvalidGroup, LanguageDataset, ResponseGroup, ResponseTable};
