//! CLI parser
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use crate::constants::{
    DEFAULT_CATALOG_URL, DEFAULT_MODEL, DEFAULT_OPENAI_BASE_URL, DEFAULT_OUTPUT_DIR,
    DEFAULT_TEMPLATE_DIR,
};

#[derive(Parser, Debug)]
#[command(name = "meme-crypt")]
/// CLI Options
pub struct CliOptions {
    #[clap(long, help = "Enable debug logging", env = "MEME_CRYPT_DEBUG")]
    /// Enable debug logging. Env: MEME_CRYPT_DEBUG
    pub debug: bool,

    /// OpenAI API key
    #[arg(required = true, long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: String,

    #[clap(long, default_value = DEFAULT_OPENAI_BASE_URL, env = "OPENAI_BASE_URL")]
    /// Base URL of the chat completions API, defaults to OpenAI.
    /// Env: OPENAI_BASE_URL
    pub openai_base_url: String,

    #[clap(long, short, default_value = DEFAULT_MODEL, env = "MEME_CRYPT_MODEL")]
    /// Chat model used for the key, template choice and caption.
    /// Env: MEME_CRYPT_MODEL
    pub model: String,

    #[clap(long, default_value = DEFAULT_CATALOG_URL, env = "MEME_CRYPT_CATALOG_URL")]
    /// Meme catalog endpoint. Env: MEME_CRYPT_CATALOG_URL
    pub catalog_url: String,

    #[clap(long, default_value = DEFAULT_TEMPLATE_DIR, env = "MEME_CRYPT_TEMPLATE_DIR")]
    /// Where downloaded templates are cached. Env: MEME_CRYPT_TEMPLATE_DIR
    pub template_dir: PathBuf,

    #[clap(long, short, default_value = DEFAULT_OUTPUT_DIR, env = "MEME_CRYPT_OUTPUT_DIR")]
    /// Where generated memes are written. Env: MEME_CRYPT_OUTPUT_DIR
    pub output_dir: PathBuf,

    #[clap(long, default_value = "10", env = "MEME_CRYPT_DOWNLOAD_TIMEOUT")]
    /// Template download timeout in seconds. Env: MEME_CRYPT_DOWNLOAD_TIMEOUT
    pub download_timeout: u64,
}

/// Asks for the secret message on stdout and reads one line back.
///
/// The line ending is stripped, nothing else is.
pub fn prompt_secret_message<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
) -> io::Result<String> {
    write!(output, "🔒 Secret message: ")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
