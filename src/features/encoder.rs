use derive_new::new;
use serde::{Deserialize, Serialize};

use crate::{
    datasets::Sentence,
    models::InitialStage,
    vocab::{map_chars, map_to_indices, Vocabulary, UNK_INDEX},
};

use super::distance::{head_distances, head_indicator};

/// Define configuration struct for feature encoding
#[derive(burn::config::Config, Debug)]
pub struct EncoderConfig {
    /// Window used for distance buckets
    pub distance_window_size: i64,

    /// Index used for out-of-vocabulary symbols
    #[config(default = 0)]
    pub unk_index: usize,
}

/// Every per-token sequence the model consumes for one sentence
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceFeatures {
    /// Ids in the constant pretrained embedding table
    pub embed_ids: Vec<usize>,

    /// Ids in the learned word table
    pub word_ids: Vec<usize>,

    /// Character ids, one list per word
    pub char_ids: Vec<Vec<usize>>,

    /// Part-of-speech tag ids
    pub tag_ids: Vec<usize>,

    /// Named-entity tag ids
    pub ne_ids: Vec<usize>,

    /// 1 where the token is its own predicate
    pub predicate_indicator: Vec<u8>,

    /// Distance buckets from each token to its predicate
    pub distances: Vec<i64>,

    /// Head positions, passed through unchanged
    pub head_positions: Vec<i64>,
}

impl SentenceFeatures {
    /// Number of tokens
    pub fn len(&self) -> usize {
        self.word_ids.len()
    }

    /// Whether the sentence had no tokens
    pub fn is_empty(&self) -> bool {
        self.word_ids.is_empty()
    }
}

/// Turns sentences into index features using fixed vocabularies
#[derive(Clone, Debug, new)]
pub struct FeatureEncoder {
    /// Encoding settings
    pub config: EncoderConfig,

    /// Character table
    pub chars: Vocabulary<char>,

    /// Learned word table
    pub words: Vocabulary<String>,

    /// Part-of-speech table
    pub tags: Vocabulary<String>,

    /// Named-entity table
    pub ne_tags: Vocabulary<String>,

    /// Word table of the constant pretrained embeddings, if any
    #[new(default)]
    pub embeddings: Option<Vocabulary<String>>,
}

impl FeatureEncoder {
    /// Build an encoder from a model's embedding stage
    pub fn from_stage(stage: &InitialStage) -> Self {
        Self::new(
            EncoderConfig::new(stage.distance_window_size).with_unk_index(UNK_INDEX),
            stage.chars.clone(),
            stage.words.clone(),
            stage.tags.clone(),
            stage.ne_tags.clone(),
        )
    }

    /// Use the word table of constant pretrained embeddings for `embed_ids`
    pub fn with_embeddings(mut self, embeddings: Vocabulary<String>) -> Self {
        self.embeddings = Some(embeddings);
        self
    }

    /// Encode one sentence. Unknown symbols resolve to the UNK index; without a pretrained
    /// embedding table every `embed_id` is UNK.
    pub fn encode(&self, sentence: &Sentence) -> SentenceFeatures {
        let unk = self.config.unk_index;
        let words = sentence.words();
        let heads = sentence.heads();

        let embed_ids = match &self.embeddings {
            Some(embeddings) => map_to_indices(words.iter().copied(), embeddings, unk),
            None => vec![unk; words.len()],
        };

        let features = SentenceFeatures {
            embed_ids,
            word_ids: map_to_indices(words.iter().copied(), &self.words, unk),
            char_ids: words
                .iter()
                .map(|word| map_chars(word, &self.chars, unk))
                .collect(),
            tag_ids: map_to_indices(sentence.pos_tags(), &self.tags, unk),
            ne_ids: map_to_indices(sentence.ne_tags(), &self.ne_tags, unk),
            predicate_indicator: head_indicator(&heads),
            distances: head_distances(&heads, self.config.distance_window_size),
            head_positions: heads,
        };

        log::trace!("Encoded sentence of {} tokens", features.len());

        features
    }
}
