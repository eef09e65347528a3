//! Command line tool to encode sentences into model features

use anyhow::{anyhow, Context, Result};
use burn::data::dataset::Dataset;
use pico_args::Arguments;
use seqlabel_features::{
    datasets::Sentences, features::FeatureEncoder, models::Model, vocab::Vocabulary,
};

const HELP: &str = "\
Usage: encode --model FILE --sentences FILE [OPTIONS]

Options:
  -h, --help           Print help
  -m, --model          The model description sidecar (e.g., 'model.json')
  -s, --sentences      Token rows: word, POS tag, NE tag, head (tab-separated)
  -e, --embeddings     Word table of the constant pretrained embeddings
  -w, --window         Override the distance window size
";

#[derive(Debug)]
struct Args {
    model: String,
    sentences: String,
    embeddings: Option<String>,
    window: Option<i64>,
}

impl Args {
    fn parse() -> Result<Option<Self>> {
        let mut pargs = Arguments::from_env();

        // Help has a higher priority and should be handled separately.
        if pargs.contains(["-h", "--help"]) {
            return Ok(None);
        }

        let args = Args {
            model: pargs.value_from_str(["-m", "--model"]).map_err(|e| match e {
                pico_args::Error::MissingOption(_) => anyhow!("Missing required option: --model"),
                _ => anyhow!("{}", e),
            })?,
            sentences: pargs
                .value_from_str(["-s", "--sentences"])
                .map_err(|e| match e {
                    pico_args::Error::MissingOption(_) => {
                        anyhow!("Missing required option: --sentences")
                    }
                    _ => anyhow!("{}", e),
                })?,
            embeddings: pargs.opt_value_from_str(["-e", "--embeddings"])?,
            window: pargs.opt_value_from_str(["-w", "--window"])?,
        };

        Ok(Some(args))
    }
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    let Some(args) = Args::parse()? else {
        print!("{}", HELP);

        return Ok(());
    };

    let model = Model::load(&args.model)
        .with_context(|| format!("Unable to load model description {}", args.model))?;

    for (i, layers) in model.layers.iter().enumerate() {
        log::info!("Layers {}: {}", i, layers);
    }

    let stage = model
        .initial()
        .ok_or_else(|| anyhow!("The model in {} has no initial layer", args.model))?;

    let mut encoder = FeatureEncoder::from_stage(stage);

    if let Some(path) = &args.embeddings {
        let embeddings = Vocabulary::<String>::load(path)
            .with_context(|| format!("Unable to load embedding table {}", path))?;
        encoder = encoder.with_embeddings(embeddings);
    }

    if let Some(window) = args.window {
        encoder.config.distance_window_size = window;
    }

    let sentences = Sentences::load(&args.sentences)
        .with_context(|| format!("Unable to load sentences {}", args.sentences))?;

    log::info!(
        "Encoding {} sentences with window {}",
        sentences.len(),
        encoder.config.distance_window_size
    );

    for sentence in sentences.iter() {
        let features = encoder.encode(&sentence);

        println!("{}", serde_json::to_string(&features)?);
    }

    Ok(())
}
