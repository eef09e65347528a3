use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use burn::data::dataset::{self, InMemDataset};

use super::{DatasetError, Sentence, Token};

/// Sentences read from a row-per-token file.
///
/// Each data line is `word<TAB>pos<TAB>ne<TAB>head`, a blank line ends a sentence, and lines
/// starting with `# ` are ignored.
pub struct Sentences {
    /// Underlying In-Memory dataset
    dataset: InMemDataset<Sentence>,
}

impl dataset::Dataset<Sentence> for Sentences {
    /// Returns a specific sentence
    fn get(&self, index: usize) -> Option<Sentence> {
        self.dataset.get(index)
    }

    /// Returns the number of sentences
    fn len(&self) -> usize {
        self.dataset.len()
    }
}

impl Sentences {
    /// Wrap sentences that are already in memory
    pub fn new(sentences: Vec<Sentence>) -> Self {
        Self {
            dataset: InMemDataset::new(sentences),
        }
    }

    /// Load sentences from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let file = File::open(path)?;

        let sentences = Self::from_reader(BufReader::new(file))?;

        log::debug!(
            "Loaded {} sentences from {}",
            dataset::Dataset::len(&sentences),
            path.display()
        );

        Ok(sentences)
    }

    /// Read sentences from any buffered source
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, DatasetError> {
        let mut sentences = Vec::new();
        let mut tokens = Vec::new();

        for (number, line) in reader.lines().enumerate() {
            let line = line?;

            if line.starts_with("# ") {
                continue;
            }

            if line.trim().is_empty() {
                if !tokens.is_empty() {
                    sentences.push(Sentence::new(std::mem::take(&mut tokens)));
                }
                continue;
            }

            tokens.push(parse_row(number + 1, &line)?);
        }

        if !tokens.is_empty() {
            sentences.push(Sentence::new(tokens));
        }

        for sentence in &sentences {
            warn_on_stray_heads(sentence);
        }

        Ok(Self::new(sentences))
    }
}

fn parse_row(line: usize, content: &str) -> Result<Token, DatasetError> {
    let malformed = |reason: String| DatasetError::MalformedRow {
        line,
        content: content.to_string(),
        reason,
    };

    let fields: Vec<&str> = content.split('\t').collect();
    let [word, pos_tag, ne_tag, head] = fields.as_slice() else {
        return Err(malformed(format!(
            "expected 4 tab-separated fields, found {}",
            fields.len()
        )));
    };

    let head = head
        .trim()
        .parse::<i64>()
        .map_err(|e| malformed(format!("invalid head {head:?}: {e}")))?;

    Ok(Token::new(
        word.to_string(),
        pos_tag.to_string(),
        ne_tag.to_string(),
        head,
    ))
}

fn warn_on_stray_heads(sentence: &Sentence) {
    let len = sentence.len() as i64;

    for (i, token) in sentence.tokens.iter().enumerate() {
        if token.has_predicate() && !(0..len).contains(&token.head) {
            log::warn!(
                "Token {} ({:?}) has head {} outside a sentence of length {}",
                i,
                token.word,
                token.head,
                len
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use burn::data::dataset::Dataset;
    use pretty_assertions::assert_eq;

    use super::*;

    const ROWS: &str = "\
# sentence 1
John\tNNP\tB-PER\t1
sleeps\tVBZ\tO\t1

# sentence 2
Hello\tUH\tO\t-1
";

    #[test]
    fn reads_sentences_separated_by_blank_lines() {
        let sentences = Sentences::from_reader(Cursor::new(ROWS)).unwrap();

        assert_eq!(sentences.len(), 2);

        let first = sentences.get(0).unwrap();
        assert_eq!(first.words(), vec!["John", "sleeps"]);
        assert_eq!(first.pos_tags(), vec!["NNP", "VBZ"]);
        assert_eq!(first.ne_tags(), vec!["B-PER", "O"]);
        assert_eq!(first.heads(), vec![1, 1]);

        let second = sentences.get(1).unwrap();
        assert_eq!(second.len(), 1);
        assert!(!second.tokens[0].has_predicate());

        assert!(sentences.get(2).is_none());
    }

    #[test]
    fn collapses_repeated_blank_lines() {
        let sentences = Sentences::from_reader(Cursor::new("\n\na\tDT\tO\t0\n\n\n\n")).unwrap();

        assert_eq!(sentences.len(), 1);
    }

    #[test]
    fn rejects_short_rows() {
        let err = Sentences::from_reader(Cursor::new("John\tNNP\tB-PER\n")).err().unwrap();

        assert!(matches!(err, DatasetError::MalformedRow { line: 1, .. }));
    }

    #[test]
    fn rejects_non_integer_heads() {
        let err = Sentences::from_reader(Cursor::new("a\tDT\tO\t0\nb\tNN\tO\tx\n"))
            .err()
            .unwrap();

        match err {
            DatasetError::MalformedRow { line, content, .. } => {
                assert_eq!(line, 2);
                assert_eq!(content, "b\tNN\tO\tx");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn loads_from_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.tsv");
        std::fs::write(&path, ROWS).unwrap();

        let sentences = Sentences::load(&path).unwrap();

        assert_eq!(sentences.len(), 2);
    }
}
