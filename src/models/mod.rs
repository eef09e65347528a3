/// Character-level sub-embeddings
pub mod char_encoder;

/// The layer list described by a model's sidecar file
pub mod layers;

pub use char_encoder::{CharEncoder, CharEncoderConfig, RnnMode};
pub use layers::{FinalStage, InferenceType, InitialStage, IntermediateStage, Layers, Model};
