use std::{borrow::Borrow, hash::Hash};

/// Symbol-to-index tables
pub mod table;

/// Reading and writing tab-separated table records
pub mod record;

pub use record::save;
pub use table::{Symbol, Vocabulary};

/// The index reserved for out-of-vocabulary symbols
pub const UNK_INDEX: usize = 0;

/// Map each symbol to its index in the table, falling back to `unk` for anything unseen
pub fn map_to_indices<'a, K, Q, I>(symbols: I, table: &Vocabulary<K>, unk: usize) -> Vec<usize>
where
    K: Symbol + Borrow<Q>,
    Q: Hash + Eq + ?Sized + 'a,
    I: IntoIterator<Item = &'a Q>,
{
    symbols
        .into_iter()
        .map(|symbol| table.index_or(symbol, unk))
        .collect()
}

/// Map each character of a word to its index in a character table
pub fn map_chars(word: &str, table: &Vocabulary<char>, unk: usize) -> Vec<usize> {
    word.chars().map(|c| table.index_or(&c, unk)).collect()
}

/// Vocabulary Error
#[derive(thiserror::Error, Debug)]
pub enum VocabularyError {
    /// The table could not be read
    #[error("unable to read vocabulary table: {0}")]
    Io(#[from] std::io::Error),

    /// A data line did not hold a `key<TAB>index` pair
    #[error("malformed table line {line} ({content:?}): {reason}")]
    MalformedTable {
        /// The 1-based line number
        line: usize,

        /// The offending line
        content: String,

        /// What was wrong with it
        reason: String,
    },
}
