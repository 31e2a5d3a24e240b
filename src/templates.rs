//! Meme template catalog and the local template cache.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, error, info};

use crate::config::Config;
use crate::error::MemeError;
use crate::transport::Transport;

/// A meme template as listed by the catalog.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
pub struct Template {
    /// Display name, also what the model is asked to choose from
    pub name: String,
    /// Where the template image lives
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct CatalogResponse {
    success: bool,
    #[serde(default)]
    data: Option<CatalogData>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CatalogData {
    #[serde(default)]
    memes: Vec<Template>,
}

/// Parses a catalog body into its templates, in catalog order.
pub fn parse_catalog(bytes: &[u8]) -> Result<Vec<Template>, MemeError> {
    let parsed: CatalogResponse = serde_json::from_slice(bytes)?;
    if !parsed.success {
        return Err(MemeError::Catalog(
            parsed
                .error_message
                .unwrap_or_else(|| "success flag was false".to_string()),
        ));
    }
    Ok(parsed.data.map(|data| data.memes).unwrap_or_default())
}

/// Fetches the catalog. Any failure is logged and comes back as an empty list;
/// deciding whether that ends the run is up to the caller.
pub async fn fetch_templates<T: Transport>(config: &Config, transport: &T) -> Vec<Template> {
    let bytes = match transport.get_bytes(config.catalog_url.as_str(), None).await {
        Ok(bytes) => bytes,
        Err(err) => {
            error!("Error fetching meme templates: {err}");
            return Vec::new();
        }
    };
    match parse_catalog(&bytes) {
        Ok(templates) => {
            info!("Fetched {} meme templates", templates.len());
            templates
        }
        Err(err) => {
            error!("Error fetching meme templates: {err}");
            Vec::new()
        }
    }
}

/// Turns a template name into the filename it is cached under.
pub fn sanitize_filename(name: &str) -> String {
    let mut filename: String = name
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, ',' | '\'' | '?' | ':'))
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect();
    filename.push_str(".jpg");
    filename
}

/// Path a template is cached at inside `template_dir`.
pub fn cached_path(template_dir: &Path, template: &Template) -> PathBuf {
    template_dir.join(sanitize_filename(&template.name))
}

/// Makes sure the template image is on disk and returns where.
///
/// An existing file is reused without touching the network. Returns `None`
/// when the download or the write fails; the reason is logged.
pub async fn download_template<T: Transport>(
    config: &Config,
    transport: &T,
    template: &Template,
) -> Option<PathBuf> {
    let path = cached_path(&config.template_dir, template);
    if tokio::fs::metadata(&path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
    {
        info!("Template already exists: {}", path.display());
        return Some(path);
    }

    info!("Downloading meme template: {}", template.name);
    match fetch_into(config, transport, template, &path).await {
        Ok(()) => {
            info!("Downloaded and saved: {}", path.display());
            Some(path)
        }
        Err(err) => {
            error!("Failed to download {}: {err}", template.name);
            None
        }
    }
}

async fn fetch_into<T: Transport>(
    config: &Config,
    transport: &T,
    template: &Template,
    path: &Path,
) -> Result<(), MemeError> {
    let bytes = transport
        .get_bytes(&template.url, Some(config.download_timeout))
        .await?;
    tokio::fs::create_dir_all(&config.template_dir).await?;

    // write beside the target then rename, so a half-written file never looks cached
    let mut partial = path.as_os_str().to_owned();
    partial.push(".part");
    let partial = PathBuf::from(partial);
    let written = match tokio::fs::write(&partial, &bytes).await {
        Ok(()) => tokio::fs::rename(&partial, path).await,
        Err(err) => Err(err),
    };
    if let Err(err) = written {
        debug!("Cleaning up {}", partial.display());
        let _ = tokio::fs::remove_file(&partial).await;
        return Err(err.into());
    }
    Ok(())
}
