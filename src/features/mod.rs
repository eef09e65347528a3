/// Distance buckets and predicate indicators
pub mod distance;

/// Sentence-level feature encoding
pub mod encoder;

/// Features as model input tensors
pub mod inputs;

/// Padded batches of sentence features
pub mod batcher;

pub use batcher::{Batch, FeatureBatcher};
pub use distance::{
    compute_distances, compute_predicate_indicator, distance_bucket, head_distances,
    head_indicator, NO_PREDICATE,
};
pub use encoder::{EncoderConfig, FeatureEncoder, SentenceFeatures};
pub use inputs::{ModelInputs, MODEL_INPUT_NAMES};
