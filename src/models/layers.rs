//! The layer list of a trained model, as recorded in its `x2i` sidecar file.
//!
//! Each group of layers may carry an initial embedding stage, any number of intermediate
//! recurrent stages, and a final scoring stage. Only the parts the feature encoder needs are
//! interpreted; intermediate stage parameters are kept as raw JSON.

use std::{
    collections::{BTreeMap, HashMap},
    fmt::Display,
    fs::File,
    io::BufReader,
    path::Path,
};

use serde::Deserialize;

use crate::vocab::Vocabulary;

/// Label used when a predicted id has no entry in the label table
pub static UNK_LABEL: &str = "<UNK>";

/// How the final stage decodes its scores
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InferenceType {
    /// Viterbi decoding over label transitions
    Viterbi,

    /// Independent argmax per token
    Greedy,
}

impl TryFrom<i64> for InferenceType {
    type Error = LayersError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(InferenceType::Viterbi),
            2 => Ok(InferenceType::Greedy),
            _ => Err(LayersError::UnknownInferenceType(value)),
        }
    }
}

/// The embedding stage: vocabularies and positional settings
#[derive(Clone, Debug)]
pub struct InitialStage {
    /// Character table
    pub chars: Vocabulary<char>,

    /// Learned word table
    pub words: Vocabulary<String>,

    /// Part-of-speech table
    pub tags: Vocabulary<String>,

    /// Named-entity table
    pub ne_tags: Vocabulary<String>,

    /// Whether the model consumes the predicate indicator
    pub use_is_predicate: bool,

    /// Window used for distance buckets
    pub distance_window_size: i64,

    /// Width of the position embedding
    pub position_embedding_size: usize,
}

/// A recurrent stage between the embeddings and the scorer
#[derive(Clone, Debug)]
pub struct IntermediateStage {
    /// Raw parameters from the sidecar file
    pub params: serde_json::Value,
}

/// The scoring stage
#[derive(Clone, Debug)]
pub struct FinalStage {
    /// Label table
    pub labels: Vocabulary<String>,

    /// How scores are decoded
    pub inference: InferenceType,

    /// Whether the stage scores token pairs
    pub is_dual: bool,

    id2label: BTreeMap<usize, String>,
}

impl FinalStage {
    /// Build a final stage, indexing its labels for decoding
    pub fn new(labels: Vocabulary<String>, inference: InferenceType, is_dual: bool) -> Self {
        let id2label = labels.inverted();

        Self {
            labels,
            inference,
            is_dual,
            id2label,
        }
    }

    /// Map predicted label ids back to label names
    pub fn decode(&self, ids: &[usize]) -> Vec<String> {
        ids.iter()
            .map(|id| {
                self.id2label
                    .get(id)
                    .cloned()
                    .unwrap_or_else(|| UNK_LABEL.to_string())
            })
            .collect()
    }
}

/// One group of layers
#[derive(Clone, Debug)]
pub struct Layers {
    /// Embedding stage, if this group starts from raw tokens
    pub initial: Option<InitialStage>,

    /// Recurrent stages, in order
    pub intermediate: Vec<IntermediateStage>,

    /// Scoring stage, if this group produces labels
    pub final_stage: Option<FinalStage>,
}

impl Display for Layers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts = Vec::new();

        if let Some(initial) = &self.initial {
            parts.push(format!(
                "initial = (words: {}, chars: {}, window: {})",
                initial.words.len(),
                initial.chars.len(),
                initial.distance_window_size
            ));
        }

        for (i, stage) in self.intermediate.iter().enumerate() {
            parts.push(format!("intermediate ({}) = {}", i + 1, stage.params));
        }

        if let Some(final_stage) = &self.final_stage {
            parts.push(format!(
                "final = (labels: {}, {:?})",
                final_stage.labels.len(),
                final_stage.inference
            ));
        }

        write!(f, "{}", parts.join(" "))
    }
}

/// A trained model: the shared group first, then one group per task
#[derive(Clone, Debug)]
pub struct Model {
    /// The layer groups
    pub layers: Vec<Layers>,
}

impl Model {
    /// Load the model description from its sidecar file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LayersError> {
        let path = path.as_ref();
        let file = File::open(path)?;

        let records: Vec<GroupRecord> = serde_json::from_reader(BufReader::new(file))?;
        let model = Self::from_records(records)?;

        log::debug!(
            "Loaded {} layer groups from {}",
            model.layers.len(),
            path.display()
        );

        Ok(model)
    }

    /// Parse the model description from a JSON string
    pub fn from_json(json: &str) -> Result<Self, LayersError> {
        Self::from_records(serde_json::from_str(json)?)
    }

    fn from_records(records: Vec<GroupRecord>) -> Result<Self, LayersError> {
        let layers = records
            .into_iter()
            .map(|group| Layers::try_from(group.x2i))
            .collect::<Result<_, _>>()?;

        Ok(Self { layers })
    }

    /// The embedding stage feeding the model; the last group that declares one wins
    pub fn initial(&self) -> Option<&InitialStage> {
        self.layers.iter().rev().find_map(|l| l.initial.as_ref())
    }

    /// The scoring stage of the last group
    pub fn final_stage(&self) -> Option<&FinalStage> {
        self.layers.last().and_then(|l| l.final_stage.as_ref())
    }
}

/// Layers Error
#[derive(thiserror::Error, Debug)]
pub enum LayersError {
    /// The sidecar file could not be read
    #[error("unable to read model description: {0}")]
    Io(#[from] std::io::Error),

    /// The sidecar file is not valid JSON of the expected shape
    #[error("unable to parse model description: {0}")]
    Json(#[from] serde_json::Error),

    /// A flag or count disagrees with the stages present
    #[error("inconsistent layer description: {0}")]
    Inconsistent(String),

    /// A character table key is not a single character
    #[error("character table key {0:?} is not a single character")]
    InvalidCharacter(String),

    /// The final stage names an unknown decoder
    #[error("unknown inference type {0}")]
    UnknownInferenceType(i64),
}

#[derive(Deserialize)]
struct GroupRecord {
    x2i: LayersRecord,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayersRecord {
    has_initial: u8,
    initial_layer: Option<InitialRecord>,
    #[serde(default)]
    intermediate_count: usize,
    #[serde(default)]
    intermediate_layers: Vec<serde_json::Value>,
    has_final: u8,
    final_layer: Option<FinalRecord>,
}

/// Booleans in sidecar files are written either as JSON booleans or as 0/1
#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
}

impl From<Flag> for bool {
    fn from(flag: Flag) -> Self {
        match flag {
            Flag::Bool(value) => value,
            Flag::Int(value) => value != 0,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InitialRecord {
    c2i: HashMap<String, usize>,
    w2i: HashMap<String, usize>,
    tag2i: HashMap<String, usize>,
    ne2i: HashMap<String, usize>,
    use_is_predicate: Option<Flag>,
    #[serde(default)]
    distance_window_size: i64,
    #[serde(default)]
    position_embedding_size: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinalRecord {
    t2i: HashMap<String, usize>,
    inference_type: Option<i64>,
    is_dual: Option<Flag>,
}

impl TryFrom<InitialRecord> for InitialStage {
    type Error = LayersError;

    fn try_from(record: InitialRecord) -> Result<Self, Self::Error> {
        let chars = record
            .c2i
            .into_iter()
            .map(|(key, index)| {
                let mut chars = key.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok((c, index)),
                    _ => Err(LayersError::InvalidCharacter(key)),
                }
            })
            .collect::<Result<Vocabulary<char>, _>>()?;

        Ok(InitialStage {
            chars,
            words: record.w2i.into(),
            tags: record.tag2i.into(),
            ne_tags: record.ne2i.into(),
            use_is_predicate: record.use_is_predicate.map(bool::from).unwrap_or(false),
            distance_window_size: record.distance_window_size,
            position_embedding_size: record.position_embedding_size,
        })
    }
}

impl TryFrom<FinalRecord> for FinalStage {
    type Error = LayersError;

    fn try_from(record: FinalRecord) -> Result<Self, Self::Error> {
        let inference = match record.inference_type {
            Some(value) => InferenceType::try_from(value)?,
            None => InferenceType::Greedy,
        };

        Ok(FinalStage::new(
            record.t2i.into(),
            inference,
            record.is_dual.map(bool::from).unwrap_or(false),
        ))
    }
}

impl TryFrom<LayersRecord> for Layers {
    type Error = LayersError;

    fn try_from(record: LayersRecord) -> Result<Self, Self::Error> {
        let initial = match (record.has_initial, record.initial_layer) {
            (1, Some(initial)) => Some(InitialStage::try_from(initial)?),
            (1, None) => {
                return Err(LayersError::Inconsistent(
                    "hasInitial is set but initialLayer is missing".to_string(),
                ))
            }
            (_, _) => None,
        };

        if record.intermediate_count != record.intermediate_layers.len() {
            return Err(LayersError::Inconsistent(format!(
                "intermediateCount is {} but {} intermediate layers are present",
                record.intermediate_count,
                record.intermediate_layers.len()
            )));
        }

        let intermediate = record
            .intermediate_layers
            .into_iter()
            .map(|params| IntermediateStage { params })
            .collect();

        let final_stage = match (record.has_final, record.final_layer) {
            (1, Some(final_layer)) => Some(FinalStage::try_from(final_layer)?),
            (1, None) => {
                return Err(LayersError::Inconsistent(
                    "hasFinal is set but finalLayer is missing".to_string(),
                ))
            }
            (_, _) => None,
        };

        Ok(Layers {
            initial,
            intermediate,
            final_stage,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const SIDECAR: &str = r#"[
        {
            "x2i": {
                "hasInitial": 1,
                "initialLayer": {
                    "c2i": {"a": 1, "b": 2, "é": 3},
                    "w2i": {"<UNK>": 0, "the": 1, "dog": 2},
                    "tag2i": {"DT": 1, "NN": 2},
                    "ne2i": {"O": 1, "B-PER": 2},
                    "useIsPredicate": true,
                    "distanceWindowSize": 3,
                    "positionEmbeddingSize": 8
                },
                "intermediateCount": 1,
                "intermediateLayers": [{"rnnStateSize": 128}],
                "hasFinal": 0
            }
        },
        {
            "x2i": {
                "hasInitial": 0,
                "intermediateCount": 0,
                "intermediateLayers": [],
                "hasFinal": 1,
                "finalLayer": {
                    "t2i": {"O": 0, "A0": 1, "A1": 2},
                    "inferenceType": 1,
                    "isDual": 0
                }
            }
        }
    ]"#;

    #[test]
    fn reads_stages_from_the_sidecar() {
        let model = Model::from_json(SIDECAR).unwrap();

        assert_eq!(model.layers.len(), 2);

        let shared = &model.layers[0];
        assert!(shared.initial.is_some());
        assert_eq!(shared.intermediate.len(), 1);
        assert!(shared.final_stage.is_none());

        let initial = model.initial().unwrap();
        assert_eq!(initial.chars.index(&'é'), 3);
        assert_eq!(initial.words.index("dog"), 2);
        assert_eq!(initial.tags.index("NN"), 2);
        assert_eq!(initial.ne_tags.index("B-PER"), 2);
        assert!(initial.use_is_predicate);
        assert_eq!(initial.distance_window_size, 3);
        assert_eq!(initial.position_embedding_size, 8);

        let final_stage = model.final_stage().unwrap();
        assert_eq!(final_stage.inference, InferenceType::Viterbi);
        assert!(!final_stage.is_dual);
    }

    #[test]
    fn decodes_label_ids() {
        let model = Model::from_json(SIDECAR).unwrap();
        let final_stage = model.final_stage().unwrap();

        assert_eq!(final_stage.decode(&[1, 0, 2, 9]), vec!["A0", "O", "A1", UNK_LABEL]);
    }

    #[test]
    fn describes_each_group() {
        let model = Model::from_json(SIDECAR).unwrap();

        assert_eq!(
            model.layers[0].to_string(),
            "initial = (words: 3, chars: 3, window: 3) intermediate (1) = {\"rnnStateSize\":128}"
        );
        assert_eq!(model.layers[1].to_string(), "final = (labels: 3, Viterbi)");
    }

    #[test]
    fn rejects_missing_stages() {
        let json = r#"[{"x2i": {"hasInitial": 1, "hasFinal": 0}}]"#;

        assert!(matches!(
            Model::from_json(json),
            Err(LayersError::Inconsistent(_))
        ));
    }

    #[test]
    fn rejects_mismatched_intermediate_counts() {
        let json = r#"[{"x2i": {"hasInitial": 0, "intermediateCount": 2, "intermediateLayers": [{}], "hasFinal": 0}}]"#;

        assert!(matches!(
            Model::from_json(json),
            Err(LayersError::Inconsistent(_))
        ));
    }

    #[test]
    fn rejects_multi_character_keys() {
        let json = r#"[{"x2i": {"hasInitial": 1, "initialLayer": {
            "c2i": {"ab": 1}, "w2i": {}, "tag2i": {}, "ne2i": {}
        }, "hasFinal": 0}}]"#;

        assert!(matches!(
            Model::from_json(json),
            Err(LayersError::InvalidCharacter(key)) if key == "ab"
        ));
    }

    #[test]
    fn rejects_unknown_inference_types() {
        let json = r#"[{"x2i": {"hasInitial": 0, "hasFinal": 1, "finalLayer": {"t2i": {}, "inferenceType": 7}}}]"#;

        assert!(matches!(
            Model::from_json(json),
            Err(LayersError::UnknownInferenceType(7))
        ));
    }

    #[test]
    fn models_without_an_initial_stage() {
        let json = r#"[{"x2i": {"hasInitial": 0, "hasFinal": 0}}]"#;
        let model = Model::from_json(json).unwrap();

        assert!(model.initial().is_none());
        assert!(model.final_stage().is_none());
        assert_eq!(model.layers[0].to_string(), "");
    }
}
