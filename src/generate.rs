//! The model-driven steps: contextual key, template choice and caption.
//!
//! Each step streams its answer to stdout as it arrives and never fails; model
//! errors turn into a fixed fallback.

use std::io::{self, Write};
use std::path::PathBuf;

use rand::seq::IndexedRandom;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::constants::{FALLBACK_CAPTION, FALLBACK_KEY};
use crate::error::MemeError;
use crate::llm::ChatModel;
use crate::prompts;
use crate::templates::{Template, download_template};
use crate::transport::Transport;

/// The template a run ended up with.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Selection {
    /// Template name, empty when there was nothing to pick from
    pub name: String,
    /// Local image, `None` when the download failed
    pub path: Option<PathBuf>,
}

/// Runs one streaming call, echoing fragments as they arrive, and returns
/// the trimmed answer.
async fn stream_to_console<M: ChatModel>(
    model: &M,
    label: &str,
    prompt: &str,
) -> Result<String, MemeError> {
    let mut stdout = io::stdout();
    print!("{label}: ");
    let _ = stdout.flush();

    let mut answer = String::new();
    let result = model
        .stream_chat(prompt, &mut |fragment: &str| {
            answer.push_str(fragment);
            print!("{fragment}");
            let _ = io::stdout().flush();
        })
        .await;
    println!();

    result.map(|()| answer.trim().to_string())
}

/// Derives the contextual key for a message, or `"General"` when the model fails.
pub async fn generate_key<M: ChatModel>(model: &M, message: &str) -> String {
    match stream_to_console(model, "Generating key", &prompts::contextual_key(message)).await {
        Ok(key) => key,
        Err(err) => {
            error!("Error generating key: {err}");
            FALLBACK_KEY.to_string()
        }
    }
}

/// Finds a template whose name matches `chosen`, ignoring case.
pub fn find_template<'a>(templates: &'a [Template], chosen: &str) -> Option<&'a Template> {
    let chosen = chosen.to_lowercase();
    templates
        .iter()
        .find(|template| template.name.to_lowercase() == chosen)
}

/// Lets the model pick a template for the message.
///
/// Falls back to [`select_random_template`] when the call fails, the answer
/// matches no template, or the chosen template can't be downloaded.
pub async fn select_template<T: Transport, M: ChatModel>(
    config: &Config,
    transport: &T,
    model: &M,
    message: &str,
    key: &str,
    templates: &[Template],
) -> Selection {
    let prompt = prompts::template_choice(message, key, templates);
    let chosen = match stream_to_console(model, "Selecting meme template", &prompt).await {
        Ok(chosen) => chosen,
        Err(err) => {
            error!("Error selecting template: {err}. Falling back to random selection.");
            return select_random_template(config, transport, templates).await;
        }
    };

    match find_template(templates, &chosen) {
        Some(template) => {
            if let Some(path) = download_template(config, transport, template).await {
                return Selection {
                    name: template.name.clone(),
                    path: Some(path),
                };
            }
            warn!("Failed to download the selected template. Falling back to random selection.");
        }
        None => {
            warn!(
                "Model selected an invalid template: '{chosen}'. Falling back to random selection."
            );
        }
    }
    select_random_template(config, transport, templates).await
}

/// Picks any template uniformly and downloads it.
pub async fn select_random_template<T: Transport>(
    config: &Config,
    transport: &T,
    templates: &[Template],
) -> Selection {
    let Some(template) = templates.choose(&mut rand::rng()) else {
        warn!("No templates to pick from");
        return Selection {
            name: String::new(),
            path: None,
        };
    };
    info!("Randomly selected template: {}", template.name);

    let path = download_template(config, transport, template).await;
    if path.is_none() {
        warn!("Failed to download the randomly selected template, using a blank canvas.");
    }
    Selection {
        name: template.name.clone(),
        path,
    }
}

/// Writes a caption for the chosen template, or `"DEFAULT TEXT"` when the
/// model fails or says nothing.
pub async fn generate_caption<M: ChatModel>(
    model: &M,
    message: &str,
    key: &str,
    template_name: &str,
) -> String {
    let prompt = prompts::caption(message, key, template_name);
    match stream_to_console(model, "Generating caption", &prompt).await {
        Ok(caption) if !caption.is_empty() => caption,
        Ok(_) => FALLBACK_CAPTION.to_string(),
        Err(err) => {
            error!("Error generating caption: {err}");
            FALLBACK_CAPTION.to_string()
        }
    }
}
