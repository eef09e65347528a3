use std::sync::Arc;

use burn::{
    data::dataloader::batcher::Batcher,
    tensor::{backend::Backend, Bool, Int, Tensor},
};
use derive_new::new;

use crate::{datasets::Sentence, utils::tensors};

use super::{distance::NO_PREDICATE, FeatureEncoder, SentenceFeatures};

/// Index features for several sentences, padded to the longest one
#[derive(Clone, Debug, new)]
pub struct Batch<B: Backend> {
    /// Constant embedding ids `[batch, seq]`
    pub embed_ids: Tensor<B, 2, Int>,

    /// Learned word ids `[batch, seq]`
    pub word_ids: Tensor<B, 2, Int>,

    /// Part-of-speech tag ids `[batch, seq]`
    pub tag_ids: Tensor<B, 2, Int>,

    /// Named-entity tag ids `[batch, seq]`
    pub ne_ids: Tensor<B, 2, Int>,

    /// Predicate indicator `[batch, seq]`
    pub predicate_indicator: Tensor<B, 2>,

    /// Distance buckets `[batch, seq]`
    pub distances: Tensor<B, 2, Int>,

    /// Head positions `[batch, seq]`, padded with `NO_PREDICATE`
    pub head_positions: Tensor<B, 2, Int>,

    /// True at padded positions
    pub mask_pad: Tensor<B, 2, Bool>,
}

/// Struct for batching sentences into padded feature tensors
#[derive(Clone)]
pub struct FeatureBatcher<B: Backend> {
    encoder: Arc<FeatureEncoder>,
    device: B::Device,
}

impl<B: Backend> FeatureBatcher<B> {
    /// Creates a new batcher
    pub fn new(encoder: Arc<FeatureEncoder>, device: B::Device) -> Self {
        Self { encoder, device }
    }
}

/// Implement Batcher trait for FeatureBatcher struct
impl<B: Backend> Batcher<Sentence, Batch<B>> for FeatureBatcher<B> {
    /// Encodes each sentence and pads every feature to the longest sentence
    fn batch(&self, items: Vec<Sentence>) -> Batch<B> {
        let features: Vec<SentenceFeatures> =
            items.iter().map(|s| self.encoder.encode(s)).collect();

        let seq_length = features.iter().map(SentenceFeatures::len).max().unwrap_or(0);
        let unk = self.encoder.config.unk_index as i64;

        let pad = |pad_value: i64, rows: Vec<Vec<i64>>| {
            tensors::pad_to::<B>(pad_value, rows, seq_length, &self.device)
        };
        let rows = |select: fn(&SentenceFeatures) -> Vec<i64>| {
            features.iter().map(select).collect::<Vec<_>>()
        };

        let mask_pad = pad(0, rows(|f| vec![1; f.len()])).equal_elem(0);

        Batch {
            embed_ids: pad(unk, rows(|f| as_i64(&f.embed_ids))),
            word_ids: pad(unk, rows(|f| as_i64(&f.word_ids))),
            tag_ids: pad(unk, rows(|f| as_i64(&f.tag_ids))),
            ne_ids: pad(unk, rows(|f| as_i64(&f.ne_ids))),
            predicate_indicator: pad(
                0,
                rows(|f| f.predicate_indicator.iter().map(|&v| i64::from(v)).collect()),
            )
            .float(),
            distances: pad(0, rows(|f| f.distances.clone())),
            head_positions: pad(NO_PREDICATE, rows(|f| f.head_positions.clone())),
            mask_pad,
        }
    }
}

fn as_i64(values: &[usize]) -> Vec<i64> {
    values.iter().map(|&v| v as i64).collect()
}
