//! Shared constants/defaults for things
//!

use std::time::Duration;

/// Where the meme catalog lives
pub const DEFAULT_CATALOG_URL: &str = "https://api.imgflip.com/get_memes";

/// OpenAI-compatible API base
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Chat model used for every prompt
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// The default place we cache template images
pub const DEFAULT_TEMPLATE_DIR: &str = "templates";

/// The default place generated memes go
pub const DEFAULT_OUTPUT_DIR: &str = "generated_memes";

/// Timeout for template image downloads.
pub const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(10);

/// Key used when the model can't produce one
pub const FALLBACK_KEY: &str = "General";

/// Caption used when the model can't produce one
pub const FALLBACK_CAPTION: &str = "DEFAULT TEXT";

/// How many characters of the message name the output folder
pub const OUTPUT_FOLDER_CHARS: usize = 20;

/// Name of the image written into each output folder
pub const OUTPUT_IMAGE_NAME: &str = "image.jpg";

/// Name of the caption file written into each output folder
pub const OUTPUT_CAPTION_NAME: &str = "caption.txt";

/// Placeholder canvas size (square)
pub const PLACEHOLDER_SIZE: u32 = 500;

/// Placeholder canvas colour
pub const PLACEHOLDER_RGB: [u8; 3] = [73, 109, 137];
