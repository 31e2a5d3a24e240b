//! Config handling

use std::path::PathBuf;
use std::time::Duration;

use tracing::log::LevelFilter;
use url::Url;

use crate::cli::CliOptions;
use crate::constants::{
    DEFAULT_CATALOG_URL, DEFAULT_DOWNLOAD_TIMEOUT, DEFAULT_MODEL, DEFAULT_OPENAI_BASE_URL,
};
use crate::error::MemeError;

/// Sets up logging based on the debug flag
pub fn setup_logging(debug: bool) -> Result<(), Box<std::io::Error>> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut logger = simple_logger::SimpleLogger::new().with_level(level);
    if !debug {
        logger = logger
            .with_module_level("reqwest", LevelFilter::Warn)
            .with_module_level("rustls", LevelFilter::Info)
            .with_module_level("hyper_util", LevelFilter::Info)
            .with_module_level("h2", LevelFilter::Info);
    }
    logger.init().map_err(|err| {
        eprintln!("Failed to initialize logger: {}", err);
        Box::new(std::io::Error::other(err))
    })
}

/// Everything a run needs, built once and handed to each step.
#[derive(Clone, Debug)]
pub struct Config {
    /// API key for the chat model
    pub openai_api_key: String,
    /// Base of the chat completions API
    pub openai_base_url: Url,
    /// Chat model name
    pub model: String,
    /// Meme catalog endpoint
    pub catalog_url: Url,
    /// Template cache directory
    pub template_dir: PathBuf,
    /// Generated meme directory
    pub output_dir: PathBuf,
    /// Timeout for each template download
    pub download_timeout: Duration,
}

impl Config {
    /// Validates the CLI options into a config.
    pub fn from_cli(cli: &CliOptions) -> Result<Self, MemeError> {
        Ok(Self {
            openai_api_key: cli.openai_api_key.clone(),
            openai_base_url: Url::parse(&cli.openai_base_url)?,
            model: cli.model.clone(),
            catalog_url: Url::parse(&cli.catalog_url)?,
            template_dir: cli.template_dir.clone(),
            output_dir: cli.output_dir.clone(),
            download_timeout: Duration::from_secs(cli.download_timeout),
        })
    }

    /// Defaults with the given key, rooted wherever you like. Handy for tests.
    pub fn with_dirs(
        openai_api_key: &str,
        template_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self, MemeError> {
        Ok(Self {
            openai_api_key: openai_api_key.to_string(),
            openai_base_url: Url::parse(DEFAULT_OPENAI_BASE_URL)?,
            model: DEFAULT_MODEL.to_string(),
            catalog_url: Url::parse(DEFAULT_CATALOG_URL)?,
            template_dir: template_dir.into(),
            output_dir: output_dir.into(),
            download_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
        })
    }

    /// The chat completions endpoint under the configured base.
    pub fn chat_completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.openai_base_url.as_str().trim_end_matches('/')
        )
    }
}
