use clap::Parser;

use std::path::PathBuf;

use log::*;

use finner::config::{BaseModel, Config, DEFAULT_CONFIG};
use finner::train::{builtin_data, load_data, train};
use finner::{init_logging, Error};

#[derive(Parser, Debug)]
#[command(name = "finner-train", version, about = "Fine tune the financial entity lexicon")]
struct Cli {
    #[arg(long, default_value = DEFAULT_CONFIG)]
    config: PathBuf,
    #[arg(long, help = "JSON training data, defaults to the built-in examples")]
    data: Option<PathBuf>,
    #[arg(long)]
    iterations: Option<usize>,
    #[arg(long, help = "Directory to save the trained model to")]
    output: Option<String>,
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Error> {
    let cli = Cli::parse();
    let mut config = Config::load(&cli.config)?;

    init_logging(config.debug);

    if let Some(iterations) = cli.iterations {
        config.train.iterations = iterations.max(1);
    }
    if let Some(output) = cli.output {
        config.train.output = output;
    }
    if cli.seed.is_some() {
        config.train.seed = cli.seed;
    }

    let data = match cli.data.or_else(|| config.train.data.clone()) {
        Some(path) => {
            info!("Loading training data from {}", path.display());
            load_data(&path)?
        }
        None => builtin_data(),
    };

    let base = match config.base_model {
        BaseModel::Bert => "bert",
        BaseModel::None => "none",
    };
    info!("Training on {} examples over base model {}", data.len(), base);
    let model = train(base, &data, &config.train)?;
    info!("Model knows {} phrases, labels {:?}", model.phrases(), model.labels());
    Ok(())
}
