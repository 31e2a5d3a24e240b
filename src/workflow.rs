//! One run, start to finish: key, catalog, template, caption, files.

use std::path::PathBuf;

use tracing::{debug, error};

use crate::config::Config;
use crate::generate::{generate_caption, generate_key, select_template};
use crate::llm::ChatModel;
use crate::output::{folder_key, write_meme};
use crate::templates::fetch_templates;
use crate::transport::Transport;

/// How a run ended.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RunOutcome {
    /// The message was empty, nothing was done
    NoMessage,
    /// The catalog came back empty
    NoTemplates,
    /// Everything ran, files are in `folder`
    Completed {
        /// The contextual key from the model
        key: String,
        /// Template the meme is built on, empty if none could be picked
        template_name: String,
        /// Caption written to `caption.txt`
        caption: String,
        /// Output folder for this run
        folder: PathBuf,
    },
}

/// Runs the whole workflow for `message`.
///
/// Only an empty message or an empty catalog stop the run early; every other
/// failure has already been turned into a fallback by the step it hit.
pub async fn run<T: Transport, M: ChatModel>(
    config: &Config,
    transport: &T,
    model: &M,
    message: &str,
) -> RunOutcome {
    if message.is_empty() {
        return RunOutcome::NoMessage;
    }

    for dir in [&config.template_dir, &config.output_dir] {
        if let Err(err) = tokio::fs::create_dir_all(dir).await {
            error!("Failed to create {}: {err}", dir.display());
        }
    }

    println!("\n🔑 Generating key...");
    let key = generate_key(model, message).await;
    println!("🔑 Key: {key}");

    println!("\n🖼️ Fetching meme templates...");
    let templates = fetch_templates(config, transport).await;
    if templates.is_empty() {
        return RunOutcome::NoTemplates;
    }

    println!("\n🤖 AI selecting template...");
    let selection = select_template(config, transport, model, message, &key, &templates).await;
    if selection.name.is_empty() {
        println!("🖼️ Template: N/A");
    } else {
        println!("🖼️ Template: {}", selection.name);
    }

    println!("\n✍️ Generating caption...");
    let caption = generate_caption(model, message, &key, &selection.name).await;
    println!("📝 Caption: {caption}");

    println!("\n💾 Saving meme components...");
    // the folder is named from the message itself, not from `key`
    let folder_name = folder_key(message);
    debug!("Output folder key: {folder_name:?}");
    let folder = write_meme(
        &config.output_dir,
        selection.path.as_deref(),
        &caption,
        &folder_name,
    );

    RunOutcome::Completed {
        key,
        template_name: selection.name,
        caption,
        folder,
    }
}
