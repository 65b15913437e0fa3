pub(super) mod actions;
mod render;
mod session;

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::info;

use crate::config::AppConfig;
use crate::paths::default_download_dir;

use super::View;
use super::dataset::Catalog;
use super::export::{DirectorySaver, SystemClipboard};
use super::handoff::open_in_chat_app;
use super::i18n::Language;
use super::selection::AppState;
use super::summary::PromptStyle;

use self::actions::{
    Direction, GridCursor, Notice, grid_rows, run_copy_image, run_copy_prompt,
    run_download_image, store_notice,
};
use self::render::draw_tui;
use self::session::TerminalSession;

/// Open prompt popup.
#[derive(Debug, Clone, Copy, Default)]
pub(super) struct ReportPanel {
    pub(super) style: PromptStyle,
    pub(super) scroll: u16,
}

impl ReportPanel {
    /// `max_scroll` comes from the last draw, which knows the wrapped height.
    pub(super) fn scroll_down(&mut self, max_scroll: u16) {
        self.scroll = self.scroll.saturating_add(1).min(max_scroll);
    }

    pub(super) fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }
}

pub(super) struct UiState {
    pub(super) cursor: GridCursor,
    pub(super) notice: Notice,
    pub(super) report: Option<ReportPanel>,
}

impl UiState {
    fn report_store_error(&mut self, result: Result<()>, language: Language) {
        if let Some(notice) = store_notice(result, language) {
            self.notice = notice;
        }
    }
}

pub(crate) fn run_tui(
    catalog: &Catalog,
    state: &mut AppState<'_>,
    config: &AppConfig,
) -> Result<()> {
    let mut session = TerminalSession::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))
        .context("failed to initialize terminal backend")?;
    terminal.clear()?;

    let mut clipboard = SystemClipboard::new();
    let mut saver = DirectorySaver::new(
        config
            .export
            .directory
            .clone()
            .unwrap_or_else(default_download_dir),
    );
    info!(dir = %saver.dir().display(), "image downloads go here");

    let mut ui = UiState {
        cursor: GridCursor::default(),
        notice: Notice::Info(state.language().texts().subtitle.to_string()),
        report: None,
    };

    let mut max_scroll = 0;

    loop {
        let view = View::of(catalog, state);
        let rows = grid_rows(view.dataset);
        ui.cursor = ui.cursor.clamped(&rows);
        terminal.draw(|frame| max_scroll = draw_tui(frame, &view, state, &ui))?;

        if !event::poll(Duration::from_millis(200))? {
            continue;
        }

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        let texts = view.language.texts();

        if let Some(report) = ui.report.as_mut() {
            match key.code {
                KeyCode::Esc | KeyCode::Char('p') => ui.report = None,
                KeyCode::Char('s') => {
                    report.style = report.style.toggled();
                    report.scroll = 0;
                }
                KeyCode::Up | KeyCode::Char('k') => report.scroll_up(),
                KeyCode::Down | KeyCode::Char('j') => report.scroll_down(max_scroll),
                KeyCode::Char('y') => {
                    let prompt = view.prompt(report.style);
                    ui.notice = run_copy_prompt(&mut clipboard, &prompt, view.language);
                }
                KeyCode::Char('o') => {
                    open_in_chat_app(&view.chat_uri(report.style, &config.handoff.base_uri));
                    ui.notice = Notice::Info(texts.prompt_opened.to_string());
                }
                _ => {}
            }
            continue;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => break,
            KeyCode::Up | KeyCode::Char('k') => {
                ui.cursor = ui.cursor.moved(Direction::Up, &rows)
            }
            KeyCode::Down | KeyCode::Char('j') => {
                ui.cursor = ui.cursor.moved(Direction::Down, &rows)
            }
            KeyCode::Left | KeyCode::Char('h') => {
                ui.cursor = ui.cursor.moved(Direction::Left, &rows)
            }
            KeyCode::Right => ui.cursor = ui.cursor.moved(Direction::Right, &rows),
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(index) = ui.cursor.index(&rows) {
                    let result = state.toggle(index);
                    ui.report_store_error(result, view.language);
                }
            }
            KeyCode::Char('a') => {
                let result = state.select_all(view.dataset);
                ui.report_store_error(result, view.language);
            }
            KeyCode::Char('c') => {
                if !view.summary.watched_titles.is_empty() {
                    let result = state.clear();
                    ui.report_store_error(result, view.language);
                }
            }
            KeyCode::Char('l') => {
                let result = state.toggle_language();
                ui.report_store_error(result, view.language);
            }
            KeyCode::Char('y') => {
                ui.notice = Notice::Loading(texts.copying.to_string());
                terminal.draw(|frame| {
                    draw_tui(frame, &view, state, &ui);
                })?;
                let region = view.capture_region(state);
                ui.notice = run_copy_image(&region, &mut clipboard, view.language);
            }
            KeyCode::Char('w') => {
                ui.notice = Notice::Loading(texts.downloading.to_string());
                terminal.draw(|frame| {
                    draw_tui(frame, &view, state, &ui);
                })?;
                let region = view.capture_region(state);
                ui.notice = run_download_image(&region, &mut saver, view.language);
            }
            KeyCode::Char('p') => ui.report = Some(ReportPanel::default()),
            _ => {}
        }
    }

    terminal.show_cursor()?;
    session.leave()?;
    Ok(())
}
