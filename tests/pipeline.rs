use std::{fs, sync::Arc};

use burn::{
    backend::NdArray,
    data::{dataloader::batcher::Batcher, dataset::Dataset},
    nn::EmbeddingConfig,
};
use pretty_assertions::assert_eq;
use seqlabel_features::{
    datasets::Sentences,
    features::{FeatureBatcher, FeatureEncoder, ModelInputs, MODEL_INPUT_NAMES},
    models::{CharEncoderConfig, Model},
    vocab::{self, Vocabulary},
};

type TestBackend = NdArray;

const SIDECAR: &str = r#"[{"x2i": {
    "hasInitial": 1,
    "initialLayer": {
        "c2i": {"M": 1, "a": 2, "r": 3, "y": 4},
        "w2i": {"<UNK>": 0, "Mary": 1, "reads": 2},
        "tag2i": {"NNP": 1, "VBZ": 2, "NNS": 3},
        "ne2i": {"O": 1, "B-PER": 2},
        "useIsPredicate": true,
        "distanceWindowSize": 2,
        "positionEmbeddingSize": 0
    },
    "intermediateCount": 1,
    "intermediateLayers": [{}],
    "hasFinal": 1,
    "finalLayer": {"t2i": {"O": 0, "A0": 1, "A1": 2}, "inferenceType": 2}
}}]"#;

const ROWS: &str = "\
Mary\tNNP\tB-PER\t1
reads\tVBZ\tO\t1
books\tNNS\tO\t1

Mary\tNNP\tB-PER\t-1
";

#[test]
fn encodes_sentences_from_files() {
    let dir = tempfile::tempdir().unwrap();

    let model_path = dir.path().join("model.json");
    fs::write(&model_path, SIDECAR).unwrap();

    let rows_path = dir.path().join("test.tsv");
    fs::write(&rows_path, ROWS).unwrap();

    let embeddings_path = dir.path().join("glove.txt");
    let glove: Vec<(&str, usize)> = vec![("<UNK>", 0), ("books", 1), ("reads", 2)];
    vocab::save(
        fs::File::create(&embeddings_path).unwrap(),
        glove,
        "constant embeddings",
    )
    .unwrap();

    let model = Model::load(&model_path).unwrap();
    let encoder = FeatureEncoder::from_stage(model.initial().unwrap())
        .with_embeddings(Vocabulary::load(&embeddings_path).unwrap());
    let sentences = Sentences::load(&rows_path).unwrap();

    assert_eq!(sentences.len(), 2);

    let first = encoder.encode(&sentences.get(0).unwrap());
    assert_eq!(first.embed_ids, vec![0, 2, 1]);
    assert_eq!(first.word_ids, vec![1, 2, 0]);
    assert_eq!(first.tag_ids, vec![1, 2, 3]);
    assert_eq!(first.ne_ids, vec![2, 1, 1]);
    assert_eq!(first.char_ids[0], vec![1, 2, 3, 4]);
    assert_eq!(first.predicate_indicator, vec![0, 1, 0]);
    assert_eq!(first.distances, vec![2, 3, 4]);

    let second = encoder.encode(&sentences.get(1).unwrap());
    assert_eq!(second.predicate_indicator, vec![0]);
    assert_eq!(second.distances, vec![4]);

    let final_stage = model.final_stage().unwrap();
    assert_eq!(final_stage.decode(&[1, 2, 0]), vec!["A0", "A1", "O"]);
}

#[test]
fn builds_model_inputs_and_batches() {
    let device = Default::default();

    let model = Model::from_json(SIDECAR).unwrap();
    let encoder = FeatureEncoder::from_stage(model.initial().unwrap());
    let sentences = Sentences::from_reader(ROWS.as_bytes()).unwrap();

    let features = encoder.encode(&sentences.get(0).unwrap());
    let embeddings = EmbeddingConfig::new(3, 4).init::<TestBackend>(&device);
    let chars = CharEncoderConfig::new(5, 3, 2).init::<TestBackend>(&device);

    let inputs = ModelInputs::build(&features, &embeddings, &chars, &device);

    assert_eq!(MODEL_INPUT_NAMES.len(), 8);
    assert_eq!(inputs.sentence_length(), 3);
    assert_eq!(inputs.embeddings.dims(), [3, 4]);
    assert_eq!(inputs.char_embeddings.dims(), [3, 4]);

    let batcher = FeatureBatcher::<TestBackend>::new(Arc::new(encoder), device);
    let batch = batcher.batch(sentences.iter().collect());

    assert_eq!(batch.word_ids.dims(), [2, 3]);
    assert_eq!(
        batch.mask_pad.into_data().value,
        vec![false, false, false, false, true, true]
    );
}
