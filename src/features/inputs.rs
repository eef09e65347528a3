use burn::{
    nn::Embedding,
    tensor::{backend::Backend, Int, Tensor},
};

use crate::{models::CharEncoder, utils::tensors, vocab::UNK_INDEX};

use super::SentenceFeatures;

/// Input names of the exported inference graph, in argument order
pub const MODEL_INPUT_NAMES: [&str; 8] = [
    "embed",
    "words",
    "chars",
    "tags",
    "nes",
    "pred_embs",
    "dists",
    "headPositions",
];

/// One sentence's features as tensors, in the argument order the model expects.
/// The first dimension of every tensor is the sentence length.
#[derive(Clone, Debug)]
pub struct ModelInputs<B: Backend> {
    /// Constant pretrained embeddings `[n, d_embed]`
    pub embeddings: Tensor<B, 2>,

    /// Learned word ids `[n]`
    pub word_ids: Tensor<B, 1, Int>,

    /// Character sub-embeddings `[n, d_chars]`
    pub char_embeddings: Tensor<B, 2>,

    /// Part-of-speech tag ids `[n]`
    pub tag_ids: Tensor<B, 1, Int>,

    /// Named-entity tag ids `[n]`
    pub ne_ids: Tensor<B, 1, Int>,

    /// Predicate indicator `[n, 1]`
    pub predicate_indicator: Tensor<B, 2>,

    /// Distance buckets `[n]`
    pub distances: Tensor<B, 1, Int>,

    /// Head positions `[n]`
    pub head_positions: Tensor<B, 1, Int>,
}

impl<B: Backend> ModelInputs<B> {
    /// Build the inputs, looking up constant embeddings and composing character embeddings.
    /// Embedding ids past the end of the lookup table read as UNK.
    pub fn build(
        features: &SentenceFeatures,
        embeddings: &Embedding<B>,
        chars: &CharEncoder<B>,
        device: &B::Device,
    ) -> Self {
        let ids = |values: &[usize]| {
            let values: Vec<i64> = values.iter().map(|&v| v as i64).collect();
            tensors::int_1d::<B>(&values, device)
        };

        let seq_length = features.len();
        let rows = embeddings.weight.val().dims()[0];
        let embed_ids = tensors::lookup_ids(&features.embed_ids, rows, UNK_INDEX, "Embedding");
        let embed_ids = tensors::int_1d::<B>(&embed_ids, device).reshape([1, seq_length]);
        let embedded = embeddings.forward(embed_ids);
        let [_, _, d_embed] = embedded.dims();

        let indicator: Vec<f32> = features
            .predicate_indicator
            .iter()
            .map(|&flag| f32::from(flag))
            .collect();

        Self {
            embeddings: embedded.reshape([seq_length, d_embed]),
            word_ids: ids(&features.word_ids),
            char_embeddings: chars.compose_all(&features.char_ids),
            tag_ids: ids(&features.tag_ids),
            ne_ids: ids(&features.ne_ids),
            predicate_indicator: tensors::float_column::<B>(&indicator, device),
            distances: tensors::int_1d::<B>(&features.distances, device),
            head_positions: tensors::int_1d::<B>(&features.head_positions, device),
        }
    }

    /// The sentence length shared by every input
    pub fn sentence_length(&self) -> usize {
        self.word_ids.dims()[0]
    }
}
