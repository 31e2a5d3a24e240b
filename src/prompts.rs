//! Prompt text for the three model calls of a run.

use crate::templates::Template;

/// Asks for the short phrase of shared context needed to read the message.
pub fn contextual_key(message: &str) -> String {
    format!(
        r#"Given the following message, generate a contextual key: a short phrase capturing the shared knowledge or context someone would need to understand it.

Message: "{message}"

Contextual Key:"#
    )
}

/// Asks the model to pick exactly one template, by its verbatim name.
pub fn template_choice(message: &str, key: &str, templates: &[Template]) -> String {
    let template_list = templates
        .iter()
        .map(|template| format!("- {}", template.name))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        r#"You are a meme generator assistant. Given a message and a contextual key, select the most appropriate meme template from the following list.

Message: "{message}"
Contextual Key: "{key}"

Available Meme Templates:
{template_list}

Respond with only the exact name of the most suitable meme template from the list above."#
    )
}

/// Asks for a caption fitting the chosen template.
pub fn caption(message: &str, key: &str, template_name: &str) -> String {
    format!(
        r#"Create a meme caption for the '{template_name}' meme template.
The underlying message to convey is: "{message}"
The contextual key is: "{key}"

Provide an appropriate caption based on the template format."#
    )
}
