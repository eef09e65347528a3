use std::{
    fmt::Display,
    io::{BufRead, Write},
};

use super::{Symbol, VocabularyError};

/// Write a `# <comment>` header, one `key<TAB>value` line per entry, and a closing blank line
pub fn save<W, K, V, I>(mut sink: W, values: I, comment: &str) -> std::io::Result<()>
where
    W: Write,
    K: Display,
    V: Display,
    I: IntoIterator<Item = (K, V)>,
{
    writeln!(sink, "# {}", comment)?;

    for (key, value) in values {
        writeln!(sink, "{}\t{}", key, value)?;
    }

    writeln!(sink)?;
    sink.flush()
}

/// Read every `key<TAB>index` entry, skipping `# ` comments and blank lines.
///
/// Keys are taken verbatim, so leading or trailing spaces and empty keys survive; only the
/// index field is trimmed. A key that itself starts with `# ` reads as a comment.
pub(crate) fn read_entries<K: Symbol, R: BufRead>(
    reader: R,
) -> Result<Vec<(K, usize)>, VocabularyError> {
    let mut entries = Vec::new();

    for (number, line) in reader.lines().enumerate() {
        let line = line?;

        if line.starts_with("# ") || line.trim().is_empty() {
            continue;
        }

        let malformed = |reason: String| VocabularyError::MalformedTable {
            line: number + 1,
            content: line.clone(),
            reason,
        };

        let fields: Vec<&str> = line.trim_end_matches('\r').split('\t').collect();
        let [key, value] = fields.as_slice() else {
            return Err(malformed(format!(
                "expected 2 tab-separated fields, found {}",
                fields.len()
            )));
        };

        let index = value
            .trim()
            .parse::<usize>()
            .map_err(|e| malformed(format!("invalid index {value:?}: {e}")))?;
        let key = K::parse_key(key).map_err(malformed)?;

        entries.push((key, index));
    }

    Ok(entries)
}
