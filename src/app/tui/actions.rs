use anyhow::Result;
use tracing::warn;

use super::super::dataset::Dataset;
use super::super::export::{
    CaptureNode, ClipboardSink, FileSaver, copy_image, download_image, failure_notice,
};
use super::super::handoff::copy_prompt;
use super::super::i18n::Language;
use super::super::selection::SelectionIndex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Notice {
    Info(String),
    Loading(String),
    Success(String),
    Error(String),
}

impl Notice {
    pub(crate) fn text(&self) -> &str {
        match self {
            Self::Info(text) | Self::Loading(text) | Self::Success(text) | Self::Error(text) => {
                text
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Focused tile as (row among non-empty years, column).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct GridCursor {
    pub(crate) row: usize,
    pub(crate) col: usize,
}

/// Years that have at least one visible tile, with their tile counts.
pub(crate) fn grid_rows(dataset: &Dataset) -> Vec<(u16, usize)> {
    dataset
        .years()
        .map(|year| (year, dataset.eligible_items(year).len()))
        .filter(|(_, len)| *len > 0)
        .collect()
}

impl GridCursor {
    pub(crate) fn moved(self, direction: Direction, rows: &[(u16, usize)]) -> Self {
        if rows.is_empty() {
            return Self::default();
        }
        let cursor = self.clamped(rows);
        let moved = match direction {
            Direction::Up => Self {
                row: cursor.row.saturating_sub(1),
                ..cursor
            },
            Direction::Down => Self {
                row: (cursor.row + 1).min(rows.len() - 1),
                ..cursor
            },
            Direction::Left => Self {
                col: cursor.col.saturating_sub(1),
                ..cursor
            },
            Direction::Right => Self {
                col: cursor.col + 1,
                ..cursor
            },
        };
        moved.clamped(rows)
    }

    /// Pulls the cursor back inside the grid, e.g. after a language switch
    /// changed the row shapes.
    pub(crate) fn clamped(self, rows: &[(u16, usize)]) -> Self {
        let Some(last_row) = rows.len().checked_sub(1) else {
            return Self::default();
        };
        let row = self.row.min(last_row);
        let col = self.col.min(rows[row].1.saturating_sub(1));
        Self { row, col }
    }

    pub(crate) fn index(self, rows: &[(u16, usize)]) -> Option<SelectionIndex> {
        let (year, len) = *rows.get(self.row)?;
        (self.col < len).then(|| SelectionIndex::new(year, self.col))
    }
}

pub(crate) fn store_notice(result: Result<()>, language: Language) -> Option<Notice> {
    match result {
        Ok(()) => None,
        Err(err) => {
            warn!(error = %err, "failed to persist state");
            Some(Notice::Error(failure_notice(
                language.texts().save_failed,
                &err,
                language,
            )))
        }
    }
}

pub(crate) fn run_copy_image(
    region: &CaptureNode,
    clipboard: &mut dyn ClipboardSink,
    language: Language,
) -> Notice {
    let texts = language.texts();
    match copy_image(region, clipboard) {
        Ok(()) => Notice::Success(texts.copied.to_string()),
        Err(err) => {
            warn!(error = %err, "copy image failed");
            Notice::Error(failure_notice(texts.copy_failed, &err, language))
        }
    }
}

pub(crate) fn run_download_image(
    region: &CaptureNode,
    saver: &mut dyn FileSaver,
    language: Language,
) -> Notice {
    let texts = language.texts();
    match download_image(region, saver) {
        Ok(path) => Notice::Success(format!("{} ({})", texts.downloaded, path.display())),
        Err(err) => {
            warn!(error = %err, "download image failed");
            Notice::Error(failure_notice(texts.download_failed, &err, language))
        }
    }
}

pub(crate) fn run_copy_prompt(
    clipboard: &mut dyn ClipboardSink,
    prompt: &str,
    language: Language,
) -> Notice {
    let texts = language.texts();
    match copy_prompt(clipboard, prompt) {
        Ok(()) => Notice::Success(texts.prompt_copied.to_string()),
        Err(err) => Notice::Error(failure_notice(texts.copy_failed, &err, language)),
    }
}
