use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use arboard::{Clipboard, ImageData};
use tracing::warn;

use super::render::decode_rgba;
use super::{ClipboardSink, ExportError, FileSaver, PNG_MIME};

/// System clipboard, opened on first use and kept for the life of the value.
///
/// X11 and Wayland drop the contents when their owner exits. A one-shot
/// process asks for [`SystemClipboard::holding`], which on Linux blocks the
/// write until another owner (a clipboard manager or the next copy) takes
/// the selection over.
#[derive(Default)]
pub(crate) struct SystemClipboard {
    inner: Option<Clipboard>,
    hold_until_replaced: bool,
}

impl SystemClipboard {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn holding() -> Self {
        Self {
            inner: None,
            hold_until_replaced: true,
        }
    }

    /// Whether writes block until the selection is taken over. Only Linux
    /// honors it.
    pub(crate) fn holds_until_replaced(&self) -> bool {
        self.hold_until_replaced && cfg!(target_os = "linux")
    }

    fn handle(&mut self) -> Result<&mut Clipboard, ExportError> {
        if self.inner.is_none() {
            let clipboard =
                Clipboard::new().map_err(|err| ExportError::Clipboard(err.to_string()))?;
            self.inner = Some(clipboard);
        }
        self.inner
            .as_mut()
            .ok_or_else(|| ExportError::Clipboard("clipboard unavailable".to_string()))
    }
}

impl ClipboardSink for SystemClipboard {
    fn write_item(&mut self, mime: &str, bytes: &[u8]) -> Result<(), ExportError> {
        if mime != PNG_MIME {
            return Err(ExportError::Clipboard(format!(
                "unsupported clipboard type {mime}"
            )));
        }
        let (width, height, rgba) = decode_rgba(bytes)?;
        let image = ImageData {
            width: width as usize,
            height: height as usize,
            bytes: Cow::Owned(rgba),
        };
        let hold = self.holds_until_replaced();
        set_image(self.handle()?, image, hold)
            .map_err(|err| ExportError::Clipboard(err.to_string()))
    }

    fn write_text(&mut self, text: &str) -> Result<(), ExportError> {
        let hold = self.holds_until_replaced();
        set_text(self.handle()?, text, hold)
            .map_err(|err| ExportError::Clipboard(err.to_string()))
    }
}

#[cfg(target_os = "linux")]
fn set_image(
    clipboard: &mut Clipboard,
    image: ImageData<'static>,
    hold: bool,
) -> Result<(), arboard::Error> {
    use arboard::SetExtLinux;

    if hold {
        clipboard.set().wait().image(image)
    } else {
        clipboard.set_image(image)
    }
}

#[cfg(not(target_os = "linux"))]
fn set_image(
    clipboard: &mut Clipboard,
    image: ImageData<'static>,
    _hold: bool,
) -> Result<(), arboard::Error> {
    clipboard.set_image(image)
}

#[cfg(target_os = "linux")]
fn set_text(clipboard: &mut Clipboard, text: &str, hold: bool) -> Result<(), arboard::Error> {
    use arboard::SetExtLinux;

    if hold {
        clipboard.set().wait().text(text.to_string())
    } else {
        clipboard.set_text(text.to_string())
    }
}

#[cfg(not(target_os = "linux"))]
fn set_text(clipboard: &mut Clipboard, text: &str, _hold: bool) -> Result<(), arboard::Error> {
    clipboard.set_text(text.to_string())
}

/// Writes exports into one directory. Bytes go to a hidden staging file
/// first and are renamed into place, so a failed write never leaves a
/// truncated image under the final name.
#[derive(Debug, Clone)]
pub(crate) struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    pub(crate) fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub(crate) fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FileSaver for DirectorySaver {
    fn save(&mut self, filename: &str, bytes: &[u8]) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(&self.dir).map_err(|source| ExportError::Save {
            path: self.dir.clone(),
            source,
        })?;

        let target = self.dir.join(filename);
        let staging = self.dir.join(format!(".{filename}.part"));
        if let Err(source) = fs::write(&staging, bytes) {
            discard(&staging);
            return Err(ExportError::Save {
                path: staging,
                source,
            });
        }
        if let Err(source) = fs::rename(&staging, &target) {
            discard(&staging);
            return Err(ExportError::Save {
                path: target,
                source,
            });
        }
        Ok(target)
    }
}

fn discard(path: &Path) {
    if let Err(err) = fs::remove_file(path)
        && err.kind() != std::io::ErrorKind::NotFound
    {
        warn!(path = %path.display(), error = %err, "failed to remove staging file");
    }
}
