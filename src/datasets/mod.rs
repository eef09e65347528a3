/// Sentences and their annotated tokens
pub mod sentence;

/// Row-per-token sentence files
pub mod rows;

pub use rows::Sentences;
pub use sentence::{Sentence, Token};

/// Dataset Error
#[derive(thiserror::Error, Debug)]
pub enum DatasetError {
    /// The sentence file could not be read
    #[error("unable to read sentences: {0}")]
    Io(#[from] std::io::Error),

    /// A token row did not hold `word<TAB>pos<TAB>ne<TAB>head`
    #[error("malformed row {line} ({content:?}): {reason}")]
    MalformedRow {
        /// The 1-based line number
        line: usize,

        /// The offending line
        content: String,

        /// What was wrong with it
        reason: String,
    },
}
