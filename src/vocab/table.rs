use std::{
    borrow::Borrow,
    collections::{BTreeMap, HashMap},
    fmt::Debug,
    fs::File,
    hash::Hash,
    io::{BufRead, BufReader, Write},
    path::Path,
};

use super::{record, VocabularyError};

/// A key type that can be stored in a vocabulary table file
pub trait Symbol: Ord + Hash + Clone + Debug + Send + Sync {
    /// Parse the key field of a table line
    fn parse_key(field: &str) -> Result<Self, String>;

    /// Render the key field of a table line
    fn format_key(&self) -> String;
}

/// Word and tag tables store their keys verbatim
impl Symbol for String {
    fn parse_key(field: &str) -> Result<Self, String> {
        Ok(field.to_string())
    }

    fn format_key(&self) -> String {
        self.clone()
    }
}

/// Character tables store each key as a decimal code point
impl Symbol for char {
    fn parse_key(field: &str) -> Result<Self, String> {
        let code = field
            .parse::<u32>()
            .map_err(|e| format!("invalid code point {field:?}: {e}"))?;

        char::from_u32(code).ok_or_else(|| format!("{code} is not a valid character"))
    }

    fn format_key(&self) -> String {
        (*self as u32).to_string()
    }
}

/// An immutable mapping from symbols to non-negative indices
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Vocabulary<K: Symbol> {
    entries: HashMap<K, usize>,
}

impl<K: Symbol> Vocabulary<K> {
    /// Load a table from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, VocabularyError> {
        let path = path.as_ref();
        let file = File::open(path)?;

        let vocabulary = Self::from_reader(BufReader::new(file))?;

        log::debug!(
            "Loaded {} entries from {}",
            vocabulary.len(),
            path.display()
        );

        Ok(vocabulary)
    }

    /// Read a table from any buffered source
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, VocabularyError> {
        let entries = record::read_entries(reader)?;

        Ok(Self {
            entries: entries.into_iter().collect(),
        })
    }

    /// Write the table sorted by index, so that `load` reads it back unchanged
    pub fn save<W: Write>(&self, sink: W, comment: &str) -> std::io::Result<()> {
        let sorted = self
            .sorted_by_index()
            .into_iter()
            .map(|(key, index)| (key.format_key(), index));

        record::save(sink, sorted, comment)
    }

    /// The index of a symbol, if present
    pub fn get<Q>(&self, symbol: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(symbol).copied()
    }

    /// The index of a symbol, or `unk` when it is absent
    pub fn index_or<Q>(&self, symbol: &Q, unk: usize) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(symbol).unwrap_or(unk)
    }

    /// The index of a symbol, or the reserved UNK index
    pub fn index<Q>(&self, symbol: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index_or(symbol, super::UNK_INDEX)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the entries in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (&K, usize)> {
        self.entries.iter().map(|(key, index)| (key, *index))
    }

    /// Entries ordered by index, then by key for duplicate indices
    pub fn sorted_by_index(&self) -> Vec<(&K, usize)> {
        let mut sorted: Vec<_> = self.iter().collect();
        sorted.sort_by(|(a_key, a), (b_key, b)| a.cmp(b).then_with(|| a_key.cmp(b_key)));

        sorted
    }

    /// A reverse lookup from index to symbol
    pub fn inverted(&self) -> BTreeMap<usize, K> {
        self.entries
            .iter()
            .map(|(key, index)| (*index, key.clone()))
            .collect()
    }
}

impl<K: Symbol> FromIterator<(K, usize)> for Vocabulary<K> {
    fn from_iter<T: IntoIterator<Item = (K, usize)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<K: Symbol> From<HashMap<K, usize>> for Vocabulary<K> {
    fn from(entries: HashMap<K, usize>) -> Self {
        Self { entries }
    }
}
