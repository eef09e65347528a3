use std::{fmt::Display, path::PathBuf, str::FromStr};

use burn::{
    module::Module,
    nn::{
        gru::{Gru, GruConfig},
        lstm::{Lstm, LstmConfig},
        Embedding, EmbeddingConfig,
    },
    record::{CompactRecorder, Recorder},
    tensor::{backend::Backend, Tensor},
};
use serde::{Deserialize, Serialize};

use crate::{
    utils::tensors,
    vocab::{map_chars, Vocabulary, UNK_INDEX},
};

/// The recurrent cell used by the character encoder
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RnnMode {
    /// Long short-term memory
    Lstm,

    /// Gated recurrent unit
    Gru,
}

impl FromStr for RnnMode {
    type Err = RnnModeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_uppercase().as_str() {
            "LSTM" => Ok(RnnMode::Lstm),
            "GRU" => Ok(RnnMode::Gru),
            _ => Err(RnnModeError::Unknown(value.to_string())),
        }
    }
}

impl Display for RnnMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RnnMode::Lstm => "LSTM",
            RnnMode::Gru => "GRU",
        };

        write!(f, "{}", name)
    }
}

/// RNN Mode Error
#[derive(thiserror::Error, Debug)]
pub enum RnnModeError {
    /// No recurrent cell found for the given string
    #[error("no recurrent cell found for {0}")]
    Unknown(String),
}

/// The Character Encoder Configuration
#[derive(burn::config::Config, Debug)]
pub struct CharEncoderConfig {
    /// Number of rows in the character lookup table
    pub n_chars: usize,

    /// Width of each character embedding
    pub char_embedding_size: usize,

    /// Hidden size of each recurrent direction
    pub hidden_size: usize,

    /// Whether a second pass runs over the reversed characters
    #[config(default = true)]
    pub bidirectional: bool,

    /// The recurrent cell
    #[config(default = "RnnMode::Lstm")]
    pub mode: RnnMode,

    /// Whether the recurrent gates carry a bias
    #[config(default = true)]
    pub bias: bool,
}

impl CharEncoderConfig {
    /// Width of the composed word vector
    pub fn output_size(&self) -> usize {
        if self.bidirectional {
            self.hidden_size * 2
        } else {
            self.hidden_size
        }
    }

    /// Initialize the encoder with fresh weights
    pub fn init<B: Backend>(&self, device: &B::Device) -> CharEncoder<B> {
        let lookup = EmbeddingConfig::new(self.n_chars, self.char_embedding_size).init(device);

        let forward_rnn = self.init_transducer(device);
        let backward_rnn = self.bidirectional.then(|| self.init_transducer(device));

        CharEncoder {
            lookup,
            forward_rnn,
            backward_rnn,
            n_chars: self.n_chars,
            hidden_size: self.hidden_size,
        }
    }

    /// Initialize the encoder and load trained weights saved with the compact recorder
    pub fn init_with_weights<B: Backend>(
        &self,
        weights: PathBuf,
        device: &B::Device,
    ) -> anyhow::Result<CharEncoder<B>> {
        let record = CompactRecorder::new()
            .load(weights, device)
            .map_err(|e| anyhow!("Unable to load character encoder weights: {}", e))?;

        Ok(self.init::<B>(device).load_record(record))
    }

    fn init_transducer<B: Backend>(&self, device: &B::Device) -> Transducer<B> {
        match self.mode {
            RnnMode::Lstm => Transducer {
                lstm: Some(
                    LstmConfig::new(self.char_embedding_size, self.hidden_size, self.bias)
                        .init(device),
                ),
                gru: None,
            },
            RnnMode::Gru => Transducer {
                lstm: None,
                gru: Some(
                    GruConfig::new(self.char_embedding_size, self.hidden_size, self.bias)
                        .init(device),
                ),
            },
        }
    }
}

/// One direction of the recurrent pass. Exactly one of the cells is set.
#[derive(Module, Debug)]
pub struct Transducer<B: Backend> {
    lstm: Option<Lstm<B>>,
    gru: Option<Gru<B>>,
}

impl<B: Backend> Transducer<B> {
    /// Run the cell over `[batch, seq, input]`, returning the per-step outputs `[batch, seq, hidden]`
    pub fn transduce(&self, input: Tensor<B, 3>) -> Tensor<B, 3> {
        match (&self.lstm, &self.gru) {
            (Some(lstm), _) => {
                let (_cell_states, hidden_states) = lstm.forward(input, None);
                hidden_states
            }
            (None, Some(gru)) => gru.forward(input, None),
            (None, None) => unreachable!("transducer initialized without a recurrent cell"),
        }
    }
}

/// Composes a fixed-width vector for a word from its characters
#[derive(Module, Debug)]
pub struct CharEncoder<B: Backend> {
    /// Character embedding lookup
    pub lookup: Embedding<B>,

    /// Pass over the characters in reading order
    pub forward_rnn: Transducer<B>,

    /// Pass over the reversed characters, when bidirectional
    pub backward_rnn: Option<Transducer<B>>,

    /// Number of rows in the lookup table
    pub n_chars: usize,

    /// Hidden size of each direction
    pub hidden_size: usize,
}

impl<B: Backend> CharEncoder<B> {
    /// Width of the composed word vector
    pub fn output_size(&self) -> usize {
        match self.backward_rnn {
            Some(_) => self.hidden_size * 2,
            None => self.hidden_size,
        }
    }

    /// Compose the vector for a word, mapping unseen characters to UNK
    pub fn compose(&self, word: &str, chars: &Vocabulary<char>) -> Tensor<B, 1> {
        self.compose_ids(&map_chars(word, chars, UNK_INDEX))
    }

    /// Compose the vector for a word that is already mapped to character ids.
    ///
    /// The result is the output at the last time step. When bidirectional, the backward pass
    /// output aligned with that same step (the one that has only seen the final character) is
    /// appended after the forward output. An empty word yields a zero vector.
    pub fn compose_ids(&self, ids: &[usize]) -> Tensor<B, 1> {
        let device = &self.devices()[0];
        let seq_length = ids.len();

        if seq_length == 0 {
            return Tensor::zeros([self.output_size()], device);
        }

        let ids = tensors::lookup_ids(ids, self.n_chars, UNK_INDEX, "Character");

        let input = tensors::int_1d::<B>(&ids, device).reshape([1, seq_length]);
        let embedded = self.lookup.forward(input);

        let forward = self
            .forward_rnn
            .transduce(embedded.clone())
            .slice([0..1, seq_length - 1..seq_length, 0..self.hidden_size])
            .reshape([self.hidden_size]);

        let Some(backward_rnn) = &self.backward_rnn else {
            return forward;
        };

        let reversed: Vec<i64> = (0..seq_length as i64).rev().collect();
        let reversed = embedded.select(1, tensors::int_1d::<B>(&reversed, device));

        let backward = backward_rnn
            .transduce(reversed)
            .slice([0..1, 0..1, 0..self.hidden_size])
            .reshape([self.hidden_size]);

        Tensor::cat(vec![forward, backward], 0)
    }

    /// Compose one row per word, giving `[words, output_size]`
    pub fn compose_sentence(&self, words: &[&str], chars: &Vocabulary<char>) -> Tensor<B, 2> {
        let ids: Vec<Vec<usize>> = words
            .iter()
            .map(|word| map_chars(word, chars, UNK_INDEX))
            .collect();

        self.compose_all(&ids)
    }

    /// Compose one row per list of character ids, giving `[words, output_size]`
    pub fn compose_all(&self, ids: &[Vec<usize>]) -> Tensor<B, 2> {
        let output_size = self.output_size();

        if ids.is_empty() {
            return Tensor::zeros([0, output_size], &self.devices()[0]);
        }

        let rows = ids
            .iter()
            .map(|word| self.compose_ids(word).reshape([1, output_size]))
            .collect();

        Tensor::cat(rows, 0)
    }
}
