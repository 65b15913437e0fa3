use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Padding, Paragraph, Wrap};

use super::super::View;
use super::super::selection::{AppState, SelectionIndex};
use super::actions::{GridCursor, Notice, grid_rows};
use super::{ReportPanel, UiState};

const YEAR_WIDTH: u16 = 6;
const ROW_HEIGHT: u16 = 2;
const MIN_TILE_WIDTH: u16 = 4;

const ACCENT: Color = Color::Rgb(110, 170, 255);
const MUTED: Color = Color::Rgb(185, 195, 210);
const YEAR_BG: Color = Color::Rgb(239, 68, 68);
const SELECTED_BG: Color = Color::Rgb(34, 197, 94);

/// Draws one frame and returns how far the report popup can scroll.
pub(super) fn draw_tui(
    frame: &mut Frame,
    view: &View<'_>,
    state: &AppState<'_>,
    ui: &UiState,
) -> u16 {
    let bg = Block::default().style(Style::default().bg(Color::Black));
    frame.render_widget(bg, frame.area());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let texts = view.language.texts();
    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            texts.app_title,
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" - {}", texts.subtitle),
            Style::default().fg(MUTED),
        ),
        Span::styled("   ", Style::default()),
        Span::styled(
            format!("[l] {}", texts.language_toggle),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled("   ", Style::default()),
        Span::styled(
            view.counter(),
            Style::default()
                .fg(Color::Rgb(230, 235, 242))
                .add_modifier(Modifier::BOLD),
        ),
    ]))
    .alignment(Alignment::Center)
    .block(panel_block(texts.site_label.to_string()));
    frame.render_widget(header, chunks[0]);

    draw_grid(frame, chunks[1], view, state, ui.cursor);

    let controls = Paragraph::new(controls_line(view))
        .alignment(Alignment::Center)
        .block(panel_block(texts.controls.to_string()));
    frame.render_widget(controls, chunks[2]);

    let status = Paragraph::new(ui.notice.text().to_string())
        .style(notice_style(&ui.notice))
        .block(panel_block(texts.status.to_string()));
    frame.render_widget(status, chunks[3]);

    match &ui.report {
        Some(report) => draw_report(frame, view, report),
        None => 0,
    }
}

fn draw_grid(
    frame: &mut Frame,
    area: Rect,
    view: &View<'_>,
    state: &AppState<'_>,
    cursor: GridCursor,
) {
    let rows = grid_rows(view.dataset);
    let focused = cursor.index(&rows);
    let title = match focused.and_then(|index| {
        view.dataset
            .eligible_record(index)
            .map(|record| (index, record))
    }) {
        Some((index, record)) => format!("{index}  {}", record.title),
        None => "-".to_string(),
    };
    let block = panel_block(title);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let max_tiles = rows.iter().map(|(_, len)| *len).max().unwrap_or(0) as u16;
    if max_tiles == 0 || inner.height < ROW_HEIGHT || inner.width <= YEAR_WIDTH {
        return;
    }
    let tile_width = ((inner.width - YEAR_WIDTH) / max_tiles).max(MIN_TILE_WIDTH);
    let visible_rows = (inner.height / ROW_HEIGHT) as usize;
    let offset = cursor.row.saturating_sub(visible_rows.saturating_sub(1));

    for (slot, (year, len)) in rows.iter().skip(offset).take(visible_rows).enumerate() {
        let top = inner.y + slot as u16 * ROW_HEIGHT;
        let year_cell = Rect::new(inner.x, top, YEAR_WIDTH - 1, ROW_HEIGHT);
        let year_widget = Paragraph::new(year.to_string())
            .alignment(Alignment::Center)
            .style(
                Style::default()
                    .bg(YEAR_BG)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(year_widget, year_cell);

        for col in 0..*len {
            let left = inner.x + YEAR_WIDTH + col as u16 * tile_width;
            if left + tile_width > inner.x + inner.width {
                break;
            }
            let index = SelectionIndex::new(*year, col);
            let Some(record) = view.dataset.eligible_record(index) else {
                continue;
            };
            let tile = Rect::new(left, top, tile_width.saturating_sub(1), ROW_HEIGHT);
            let style = tile_style(
                state.is_selected(index),
                focused == Some(index),
                (slot + col) % 2 == 0,
            );
            let widget = Paragraph::new(record.title.as_str())
                .wrap(Wrap { trim: true })
                .style(style);
            frame.render_widget(widget, tile);
        }
    }
}

fn tile_style(selected: bool, focused: bool, even: bool) -> Style {
    match (selected, focused) {
        (true, true) => Style::default()
            .bg(SELECTED_BG)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        (true, false) => Style::default().bg(SELECTED_BG).fg(Color::Black),
        (false, true) => Style::default()
            .bg(ACCENT)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD),
        (false, false) => {
            let bg = if even {
                Color::Rgb(40, 44, 52)
            } else {
                Color::Rgb(30, 33, 40)
            };
            Style::default().bg(bg).fg(Color::Rgb(230, 235, 242))
        }
    }
}

fn controls_line(view: &View<'_>) -> Line<'static> {
    let texts = view.language.texts();
    let mut spans = vec![
        key_span("space"),
        hint_span(format!(" {}  ", texts.key_toggle)),
        key_span("a"),
        hint_span(format!(" {}  ", texts.select_all)),
    ];
    if !view.summary.watched_titles.is_empty() {
        spans.push(key_span("c"));
        spans.push(hint_span(format!(" {}  ", texts.clear)));
    }
    spans.extend([
        key_span("y"),
        hint_span(format!(" {}  ", texts.copy_image)),
        key_span("w"),
        hint_span(format!(" {}  ", texts.download_image)),
        key_span("p"),
        hint_span(format!(" {}  ", texts.report)),
        key_span("q"),
        hint_span(format!(" {}", texts.key_quit)),
    ]);
    Line::from(spans)
}

fn draw_report(frame: &mut Frame, view: &View<'_>, report: &ReportPanel) -> u16 {
    let texts = view.language.texts();
    let area = frame.area();
    let popup_area = centered_fixed_rect(
        area.width.saturating_sub(8).min(100),
        area.height.saturating_sub(4),
        area,
    );
    render_popup_shadow(frame, popup_area);
    frame.render_widget(Clear, popup_area);

    let block = modal_block(format!(
        "{} · {}",
        texts.report,
        report.style.label(view.language)
    ));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let prompt = view.prompt(report.style);
    let max_scroll =
        wrapped_height(&prompt, sections[0].width).saturating_sub(sections[0].height);
    let body = Paragraph::new(prompt)
        .style(Style::default().fg(Color::Rgb(230, 230, 230)))
        .wrap(Wrap { trim: false })
        .scroll((report.scroll.min(max_scroll), 0));
    frame.render_widget(body, sections[0]);

    let hints = Line::from(vec![
        key_span("s"),
        hint_span(format!(" {}  ", texts.key_style)),
        key_span("y"),
        hint_span(format!(" {}  ", texts.key_copy)),
        key_span("o"),
        hint_span(" ChatWise  "),
        key_span("↑/↓"),
        hint_span(format!(" {}  ", texts.key_scroll)),
        key_span("esc"),
        hint_span(format!(" {}", texts.key_close)),
    ]);
    frame.render_widget(
        Paragraph::new(hints).alignment(Alignment::Center),
        sections[1],
    );
    max_scroll
}

/// Rows `text` occupies when wrapped to `width` columns. Counts display
/// width per source line, so word wrapping can add a row now and then.
pub(super) fn wrapped_height(text: &str, width: u16) -> u16 {
    let width = usize::from(width.max(1));
    let rows: usize = text
        .lines()
        .map(|line| Line::from(line).width().max(1).div_ceil(width))
        .sum();
    u16::try_from(rows).unwrap_or(u16::MAX)
}

fn key_span(key: &'static str) -> Span<'static> {
    Span::styled(
        format!(" {key} "),
        Style::default()
            .bg(Color::Rgb(72, 82, 96))
            .fg(Color::Rgb(230, 235, 242)),
    )
}

fn hint_span(text: impl Into<String>) -> Span<'static> {
    Span::styled(text.into(), Style::default().fg(MUTED))
}

fn panel_block(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Rgb(125, 135, 150)))
        .title(title)
}

fn modal_block(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(
            Style::default()
                .fg(Color::Rgb(160, 190, 235))
                .add_modifier(Modifier::BOLD),
        )
        .title(title)
        .padding(Padding::new(2, 2, 1, 0))
}

fn notice_style(notice: &Notice) -> Style {
    match notice {
        Notice::Error(_) => Style::default()
            .fg(Color::Rgb(255, 145, 120))
            .add_modifier(Modifier::BOLD),
        Notice::Loading(_) => Style::default().fg(Color::Yellow),
        Notice::Success(_) => Style::default().fg(SELECTED_BG),
        Notice::Info(_) => Style::default().fg(Color::Rgb(205, 165, 255)),
    }
}

fn centered_fixed_rect(width: u16, height: u16, area: Rect) -> Rect {
    let clamped_width = width.min(area.width.max(1)).max(1);
    let clamped_height = height.min(area.height.max(1)).max(1);
    let x = area.x + area.width.saturating_sub(clamped_width) / 2;
    let y = area.y + area.height.saturating_sub(clamped_height) / 2;
    Rect::new(x, y, clamped_width, clamped_height)
}

fn render_popup_shadow(frame: &mut Frame, popup_area: Rect) {
    let area = frame.area();
    let shadow = Rect::new(
        (popup_area.x + 1).min(area.x + area.width.saturating_sub(1)),
        (popup_area.y + 1).min(area.y + area.height.saturating_sub(1)),
        popup_area.width.saturating_sub(1),
        popup_area.height.saturating_sub(1),
    );
    if shadow.width == 0 || shadow.height == 0 {
        return;
    }
    let shadow_block = Block::default().style(Style::default().bg(Color::Rgb(14, 16, 24)));
    frame.render_widget(shadow_block, shadow);
}

#[cfg(test)]
mod tests {
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::app::dataset::{Catalog, Dataset};
    use crate::app::i18n::Language;
    use crate::app::summary::PromptStyle;
    use crate::db::MemoryStore;

    fn catalog() -> Catalog {
        Catalog::new(
            Dataset::from_titles(vec![(2019, vec!["Dororo"]), (2020, vec!["Akudama", "BNA"])]),
            Dataset::from_titles(vec![(2019, vec!["多罗罗"]), (2020, vec!["恶魔", "BNA"])]),
        )
    }

    fn screen(
        catalog: &Catalog,
        state: &AppState<'_>,
        report: Option<ReportPanel>,
    ) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 30)).expect("test terminal");
        let view = View::of(catalog, state);
        let ui = UiState {
            cursor: GridCursor::default(),
            notice: Notice::Info("ready".to_string()),
            report,
        };
        terminal
            .draw(|frame| {
                draw_tui(frame, &view, state, &ui);
            })
            .expect("render should not panic");
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn grid_shows_years_counter_and_focused_title() {
        let catalog = catalog();
        let store = MemoryStore::new();
        let mut state = AppState::load(&store).expect("state");
        state
            .toggle(SelectionIndex::new(2020, 1))
            .expect("toggle");

        let text = screen(&catalog, &state, None);
        assert!(text.contains("2019"));
        assert!(text.contains("2020"));
        assert!(text.contains("I've watched 1/3 anime"));
        assert!(text.contains("2019-0  Dororo"));
        assert!(text.contains("ready"));
    }

    #[test]
    fn clear_hint_only_appears_with_a_selection() {
        let catalog = catalog();
        let store = MemoryStore::new();
        let mut state = AppState::load(&store).expect("state");
        let clear = state.language().texts().clear;
        assert!(!screen(&catalog, &state, None).contains(clear));

        state
            .toggle(SelectionIndex::new(2019, 0))
            .expect("toggle");
        assert!(screen(&catalog, &state, None).contains(clear));
    }

    #[test]
    fn report_popup_renders_prompt_body() {
        let catalog = catalog();
        let store = MemoryStore::new();
        let state = AppState::load(&store).expect("state");
        let report = ReportPanel {
            style: PromptStyle::Persona,
            scroll: 0,
        };

        let text = screen(&catalog, &state, Some(report));
        assert!(text.contains(state.language().texts().report));
        assert!(text.contains("ChatWise"));
    }

    #[test]
    fn tiny_terminal_does_not_panic() {
        let catalog = catalog();
        let store = MemoryStore::new();
        let state = AppState::load(&store).expect("state");
        let mut terminal = Terminal::new(TestBackend::new(10, 4)).expect("test terminal");
        let view = View::of(&catalog, &state);
        let ui = UiState {
            cursor: GridCursor::default(),
            notice: Notice::Loading("...".to_string()),
            report: Some(ReportPanel::default()),
        };
        terminal
            .draw(|frame| {
                draw_tui(frame, &view, &state, &ui);
            })
            .expect("render should not panic");
    }

    #[test]
    fn chinese_screen_has_no_english_chrome() {
        let catalog = catalog();
        let store = MemoryStore::new();
        let mut state = AppState::load(&store).expect("state");
        state.set_language(Language::Zh).expect("language");
        state
            .toggle(SelectionIndex::new(2019, 0))
            .expect("toggle");

        let text = screen(&catalog, &state, None);
        for english in ["Controls", "Status", "toggle", "quit", "Clear"] {
            assert!(!text.contains(english), "{english} leaked into the zh screen");
        }

        let popup = screen(&catalog, &state, Some(ReportPanel::default()));
        for english in ["style", "copy", "scroll", "close"] {
            assert!(!popup.contains(english), "{english} leaked into the zh popup");
        }
    }

    #[test]
    fn report_scroll_stops_at_the_last_wrapped_row() {
        let catalog = catalog();
        let store = MemoryStore::new();
        let state = AppState::load(&store).expect("state");
        let view = View::of(&catalog, &state);
        let mut ui = UiState {
            cursor: GridCursor::default(),
            notice: Notice::Info(String::new()),
            report: Some(ReportPanel {
                style: PromptStyle::Persona,
                scroll: 0,
            }),
        };
        let mut terminal = Terminal::new(TestBackend::new(40, 14)).expect("test terminal");

        let mut max_scroll = 0;
        terminal
            .draw(|frame| {
                max_scroll = draw_tui(frame, &view, &state, &ui);
            })
            .expect("render should not panic");
        assert!(max_scroll > 0);

        let report = ui.report.as_mut().expect("report open");
        for _ in 0..500 {
            report.scroll_down(max_scroll);
        }
        assert_eq!(report.scroll, max_scroll);
        report.scroll_up();
        assert_eq!(report.scroll, max_scroll - 1);

        ui.report = None;
        let mut closed = u16::MAX;
        terminal
            .draw(|frame| {
                closed = draw_tui(frame, &view, &state, &ui);
            })
            .expect("render should not panic");
        assert_eq!(closed, 0);
    }

    #[test]
    fn wrapped_height_counts_blank_lines_and_overflow() {
        assert_eq!(wrapped_height("abcd\n\nxy", 2), 4);
        assert_eq!(wrapped_height("", 10), 0);
        assert_eq!(wrapped_height("多罗罗", 4), 2);
    }
}
