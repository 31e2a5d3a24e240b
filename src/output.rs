//! Writes a finished meme (image + caption) to its own folder.

use std::path::{Path, PathBuf};

use image::{ImageReader, Rgb, RgbImage};
use tracing::{error, info};

use crate::constants::{
    OUTPUT_CAPTION_NAME, OUTPUT_FOLDER_CHARS, OUTPUT_IMAGE_NAME, PLACEHOLDER_RGB, PLACEHOLDER_SIZE,
};
use crate::error::MemeError;

/// Folder name for a run: the first characters of `source`, with path
/// separators swapped out so it stays a single directory.
pub fn folder_key(source: &str) -> String {
    let key: String = source
        .chars()
        .take(OUTPUT_FOLDER_CHARS)
        .map(|c| match c {
            '/' | '\\' => '_',
            other => other,
        })
        .collect();
    // `.` and `..` would resolve to the output dir itself or its parent
    match key.as_str() {
        "." | ".." => key.replace('.', "_"),
        _ => key,
    }
}

/// The solid canvas used when there's no template image.
pub fn placeholder_image() -> RgbImage {
    RgbImage::from_pixel(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, Rgb(PLACEHOLDER_RGB))
}

/// Saves `image.jpg` and `caption.txt` under `output_dir/key`.
///
/// Failures are logged and swallowed; returns the folder either way.
pub fn write_meme(
    output_dir: &Path,
    template_path: Option<&Path>,
    caption: &str,
    key: &str,
) -> PathBuf {
    let folder = output_dir.join(key);
    if let Err(err) = try_write_meme(&folder, template_path, caption) {
        error!("Error saving meme components: {err}");
    }
    folder
}

fn try_write_meme(
    folder: &Path,
    template_path: Option<&Path>,
    caption: &str,
) -> Result<(), MemeError> {
    std::fs::create_dir_all(folder)?;

    let image = match template_path {
        // cached templates are named .jpg whatever they really are
        Some(path) => ImageReader::open(path)?
            .with_guessed_format()?
            .decode()?
            .into_rgb8(),
        None => placeholder_image(),
    };
    let image_path = folder.join(OUTPUT_IMAGE_NAME);
    image.save_with_format(&image_path, image::ImageFormat::Jpeg)?;
    info!("Image saved to {}", image_path.display());

    let caption_path = folder.join(OUTPUT_CAPTION_NAME);
    std::fs::write(&caption_path, caption)?;
    info!("Caption saved to {}", caption_path.display());
    Ok(())
}
