mod region;
mod render;
mod sinks;

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use super::i18n::Language;

pub(crate) use region::{CaptureNode, build_capture_region};
pub(crate) use sinks::{DirectorySaver, SystemClipboard};

pub(crate) const EXPORT_FILENAME: &str = "anime-sedai.png";
pub(crate) const EXPORT_SCALE: u32 = 2;
pub(crate) const PNG_MIME: &str = "image/png";

#[derive(Debug, Error)]
pub(crate) enum ExportError {
    #[error("{0}")]
    Capture(String),
    #[error("PNG encoding failed: {0}")]
    Encode(String),
    #[error("{0}")]
    Clipboard(String),
    #[error("cannot write {}: {source}", .path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Encoded image ready for the clipboard or disk.
#[derive(Debug, Clone)]
pub(crate) struct ImageBlob {
    pub(crate) mime: &'static str,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) bytes: Vec<u8>,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct CaptureOptions {
    pub(crate) scale: u32,
    pub(crate) filter: fn(&CaptureNode) -> bool,
}

impl Default for CaptureOptions {
    fn default() -> Self {
        Self {
            scale: EXPORT_SCALE,
            filter: exportable_only,
        }
    }
}

pub(crate) fn exportable_only(node: &CaptureNode) -> bool {
    node.exportable
}

pub(crate) trait ClipboardSink {
    /// Replaces the clipboard with a single item of type `mime`.
    fn write_item(&mut self, mime: &str, bytes: &[u8]) -> Result<(), ExportError>;
    fn write_text(&mut self, text: &str) -> Result<(), ExportError>;
}

pub(crate) trait FileSaver {
    fn save(&mut self, filename: &str, bytes: &[u8]) -> Result<PathBuf, ExportError>;
}

pub(crate) fn capture_region(
    root: &CaptureNode,
    options: &CaptureOptions,
) -> Result<ImageBlob, ExportError> {
    let pruned = root
        .prune(options.filter)
        .ok_or_else(|| ExportError::Capture("nothing left to capture".to_string()))?;
    let page = render::layout_svg(&pruned)?;
    render::rasterize(&page, options.scale)
}

pub(crate) fn copy_image(
    root: &CaptureNode,
    clipboard: &mut dyn ClipboardSink,
) -> Result<(), ExportError> {
    let blob = capture_region(root, &CaptureOptions::default())?;
    clipboard.write_item(blob.mime, &blob.bytes)?;
    info!(width = blob.width, height = blob.height, "copied image to clipboard");
    Ok(())
}

pub(crate) fn download_image(
    root: &CaptureNode,
    saver: &mut dyn FileSaver,
) -> Result<PathBuf, ExportError> {
    let blob = capture_region(root, &CaptureOptions::default())?;
    let path = saver.save(EXPORT_FILENAME, &blob.bytes)?;
    info!(path = %path.display(), bytes = blob.bytes.len(), "saved image");
    Ok(path)
}

/// Localized "<action> failed: <reason>" line for the notification area.
pub(crate) fn failure_notice(
    prefix: &str,
    err: &dyn std::fmt::Display,
    language: Language,
) -> String {
    let detail = err.to_string();
    let detail = detail.trim();
    if detail.is_empty() {
        format!("{prefix}: {}", language.texts().unknown_error)
    } else {
        format!("{prefix}: {detail}")
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    #[derive(Debug, Default)]
    pub(crate) struct RecordingClipboard {
        pub(crate) items: Vec<(String, Vec<u8>)>,
        pub(crate) texts: Vec<String>,
        pub(crate) refuse: bool,
    }

    impl ClipboardSink for RecordingClipboard {
        fn write_item(&mut self, mime: &str, bytes: &[u8]) -> Result<(), ExportError> {
            if self.refuse {
                return Err(ExportError::Clipboard("clipboard access denied".to_string()));
            }
            self.items.push((mime.to_string(), bytes.to_vec()));
            Ok(())
        }

        fn write_text(&mut self, text: &str) -> Result<(), ExportError> {
            if self.refuse {
                return Err(ExportError::Clipboard(String::new()));
            }
            self.texts.push(text.to_string());
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    pub(crate) struct RecordingSaver {
        pub(crate) saves: Vec<(String, Vec<u8>)>,
    }

    impl FileSaver for RecordingSaver {
        fn save(&mut self, filename: &str, bytes: &[u8]) -> Result<PathBuf, ExportError> {
            self.saves.push((filename.to_string(), bytes.to_vec()));
            Ok(PathBuf::from(filename))
        }
    }
}
