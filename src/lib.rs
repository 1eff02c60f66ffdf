use err_derive::Error;

pub mod analysis;
pub mod config;
pub mod correct;
pub mod enti;
pub mod legend;
pub mod pipeline;
pub mod render;
pub mod ruler;
pub mod senti;
pub mod server;
pub mod text;
pub mod tokens;
pub mod train;
pub mod tuned;

pub const APP_NAME: &str = "finner";

#[derive(Debug, Error)]
pub enum Error {
    #[error(display = "Config file invalid")]
    ValidationError(#[error(source)] validator::ValidationErrors),
    #[error(display = "Config syntax invalid")]
    ConfigError(#[error(source)] toml::de::Error),
    #[error(display = "Cannot read file")]
    IoError(#[error(source)] std::io::Error),
    #[error(display = "Model file invalid")]
    ModelFileError(#[error(source)] serde_json::Error),
    #[error(display = "Pretrained model failed")]
    PretrainedError(#[error(source)] rust_bert::RustBertError),
    #[error(display = "Analysis task died")]
    TaskError(#[error(source)] tokio::task::JoinError),
    #[error(display = "Model is busy or poisoned")]
    ModelUnavailable,
    #[error(display = "Model gave no answer")]
    NoPrediction,
    #[error(display = "Invalid pattern for {}", _0)]
    InvalidPattern(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// `debug` forces debug logs, otherwise `RUST_LOG` or info is used.
pub fn init_logging(debug: bool) {
    if debug {
        std::env::set_var("RUST_LOG", format!("{}=debug", APP_NAME));
    } else if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", format!("{}=info", APP_NAME));
    }
    pretty_env_logger::init();
}
