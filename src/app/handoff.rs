use tracing::{info, warn};

use super::export::{ClipboardSink, ExportError};

/// `<base>?input=<prompt>` with the prompt percent-encoded.
pub(crate) fn chat_uri(base_uri: &str, prompt: &str) -> String {
    format!("{base_uri}?input={}", urlencoding::encode(prompt))
}

pub(crate) fn copy_prompt(
    clipboard: &mut dyn ClipboardSink,
    prompt: &str,
) -> Result<(), ExportError> {
    clipboard.write_text(prompt)?;
    info!(chars = prompt.chars().count(), "copied prompt to clipboard");
    Ok(())
}

/// Hands a [`chat_uri`] to the platform opener. Fire and forget: a missing
/// handler is only logged.
pub(crate) fn open_in_chat_app(uri: &str) {
    let scheme = uri.split_once(':').map_or(uri, |(scheme, _)| scheme);
    match open::that_detached(uri) {
        Ok(()) => info!(scheme, "launched chat handoff"),
        Err(err) => warn!(scheme, error = %err, "chat handoff launch failed"),
    }
}
