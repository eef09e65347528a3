use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::features::distance::NO_PREDICATE;

/// A single annotated token
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct Token {
    /// The surface form
    pub word: String,

    /// The part-of-speech tag
    pub pos_tag: String,

    /// The named-entity tag
    pub ne_tag: String,

    /// Position of this token's head/predicate, or `NO_PREDICATE`
    pub head: i64,
}

impl Token {
    /// Whether the token points at a predicate at all
    pub fn has_predicate(&self) -> bool {
        self.head != NO_PREDICATE
    }
}

/// An ordered sequence of tokens
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct Sentence {
    /// The tokens, in sentence order
    pub tokens: Vec<Token>,
}

impl Sentence {
    /// Number of tokens
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the sentence has no tokens
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The words
    pub fn words(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.word.as_str()).collect()
    }

    /// The part-of-speech tags
    pub fn pos_tags(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.pos_tag.as_str()).collect()
    }

    /// The named-entity tags
    pub fn ne_tags(&self) -> Vec<&str> {
        self.tokens.iter().map(|t| t.ne_tag.as_str()).collect()
    }

    /// The head positions
    pub fn heads(&self) -> Vec<i64> {
        self.tokens.iter().map(|t| t.head).collect()
    }
}

impl FromIterator<Token> for Sentence {
    fn from_iter<T: IntoIterator<Item = Token>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
