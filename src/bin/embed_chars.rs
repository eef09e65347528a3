//! Command line tool to compose character embeddings for words

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use burn::{backend::NdArray, config::Config as _};
use pico_args::Arguments;
use seqlabel_features::{
    models::{CharEncoderConfig, RnnMode},
    vocab::Vocabulary,
};

const HELP: &str = "\
Usage: embed-chars --config FILE --chars FILE [OPTIONS] WORD...

Arguments:
  WORD                 Words to compose embeddings for

Options:
  -h, --help           Print help
  -c, --config         The character encoder configuration (JSON)
  -t, --chars          The character table (code point, index)
  -w, --weights        Trained weights saved with the compact recorder
  --mode               Override the recurrent cell ('lstm' or 'gru')
";

#[derive(Debug)]
struct Args {
    config: String,
    chars: String,
    weights: Option<PathBuf>,
    mode: Option<RnnMode>,
    words: Vec<String>,
}

impl Args {
    fn parse() -> Result<Option<Self>> {
        let mut pargs = Arguments::from_env();

        // Help has a higher priority and should be handled separately.
        if pargs.contains(["-h", "--help"]) {
            return Ok(None);
        }

        let args = Args {
            config: pargs.value_from_str(["-c", "--config"]).map_err(|e| match e {
                pico_args::Error::MissingOption(_) => anyhow!("Missing required option: --config"),
                _ => anyhow!("{}", e),
            })?,
            chars: pargs.value_from_str(["-t", "--chars"]).map_err(|e| match e {
                pico_args::Error::MissingOption(_) => anyhow!("Missing required option: --chars"),
                _ => anyhow!("{}", e),
            })?,
            weights: pargs.opt_value_from_str(["-w", "--weights"])?,
            mode: pargs.opt_value_from_str("--mode")?,
            words: pargs
                .finish()
                .into_iter()
                .map(|word| {
                    word.into_string()
                        .map_err(|word| anyhow!("Word is not valid UTF-8: {:?}", word))
                })
                .collect::<Result<_>>()?,
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

    let mut config = CharEncoderConfig::load(&args.config)
        .map_err(|e| anyhow!("Unable to load config file: {}", e))?;

    if let Some(mode) = args.mode {
        config.mode = mode;
    }

    let chars = Vocabulary::<char>::load(&args.chars)
        .with_context(|| format!("Unable to load character table {}", args.chars))?;

    let device = Default::default();

    let encoder = match args.weights {
        Some(weights) => config.init_with_weights::<NdArray>(weights, &device)?,
        None => {
            log::warn!("No weights given, composing with freshly initialized parameters");
            config.init::<NdArray>(&device)
        }
    };

    for word in &args.words {
        let embedding = encoder
            .compose(word, &chars)
            .into_data()
            .convert::<f32>()
            .value;

        println!(
            "{}",
            serde_json::json!({ "word": word, "embedding": embedding })
        );
    }

    Ok(())
}
