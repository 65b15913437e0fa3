mod dataset;
mod export;
mod handoff;
mod i18n;
mod selection;
mod summary;
mod tui;


use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

use crate::cli::{Cli, Command};
use crate::config::{AppConfig, ExportConfig, HandoffConfig};
use crate::db::{Database, KeyValueStore, MemoryStore};
use crate::paths::{database_file_path, default_download_dir};

use self::dataset::{Catalog, Dataset};
use self::export::{
    CaptureNode, DirectorySaver, SystemClipboard, build_capture_region, copy_image,
    download_image, failure_notice,
};
use self::handoff::{chat_uri, open_in_chat_app};
use self::selection::{AppState, SelectionIndex};
use self::summary::{DerivedSummary, build_prompt, derive_summary};

pub(crate) use self::i18n::Language;
pub(crate) use self::summary::PromptStyle;

pub fn run(cli: Cli, config: AppConfig) -> Result<()> {
    let catalog = Catalog::load(&config.dataset)?;
    let store = open_store(&cli, &config)?;
    let mut state = AppState::load(store.as_ref())?;

    match cli.command {
        Some(Command::List) => run_list(&catalog, &state),
        Some(Command::Toggle { indices }) => run_toggle(&catalog, &mut state, &indices)?,
        Some(Command::SelectAll) => {
            state.select_all(catalog.for_language(state.language()))?;
            print_counter(&catalog, &state);
        }
        Some(Command::Clear) => {
            state.clear()?;
            print_counter(&catalog, &state);
        }
        Some(Command::Language { language }) => {
            if let Some(language) = language {
                state.set_language(language)?;
            }
            println!("{}", state.language());
        }
        Some(Command::Prompt { style, open }) => {
            run_prompt(&catalog, &state, style, open, &config.handoff)
        }
        Some(Command::Export { copy, output }) => {
            run_export(&catalog, &state, copy, output, &config.export)
        }
        Some(Command::Tui) | None => tui::run_tui(&catalog, &mut state, &config)?,
    }

    Ok(())
}

fn open_store(cli: &Cli, config: &AppConfig) -> Result<Box<dyn KeyValueStore>> {
    if cli.ephemeral {
        info!("using in-memory state");
        return Ok(Box::new(MemoryStore::new()));
    }
    let path = match cli.db.as_ref().or(config.storage.path.as_ref()) {
        Some(path) => path.clone(),
        None => database_file_path()?,
    };
    let db = Database::open(&path)?;
    db.migrate()?;
    info!(path = %path.display(), "opened state database");
    Ok(Box::new(db))
}

/// Everything derived from the current state for one render or action.
pub(crate) struct View<'a> {
    pub(crate) language: Language,
    pub(crate) dataset: &'a Dataset,
    pub(crate) summary: DerivedSummary,
}

impl<'a> View<'a> {
    pub(crate) fn of(catalog: &'a Catalog, state: &AppState<'_>) -> Self {
        let language = state.language();
        let dataset = catalog.for_language(language);
        Self {
            language,
            dataset,
            summary: derive_summary(dataset, state.selection()),
        }
    }

    pub(crate) fn capture_region(&self, state: &AppState<'_>) -> CaptureNode {
        build_capture_region(self.dataset, state.selection(), self.language, &self.summary)
    }

    pub(crate) fn prompt(&self, style: PromptStyle) -> String {
        build_prompt(&self.summary, self.language, style)
    }

    pub(crate) fn chat_uri(&self, style: PromptStyle, base_uri: &str) -> String {
        chat_uri(base_uri, &self.prompt(style))
    }

    pub(crate) fn counter(&self) -> String {
        self.language
            .texts()
            .counter(self.summary.watched_titles.len(), self.summary.eligible_count)
    }
}

fn print_counter(catalog: &Catalog, state: &AppState<'_>) {
    println!("{}", View::of(catalog, state).counter());
}

fn run_list(catalog: &Catalog, state: &AppState<'_>) {
    let view = View::of(catalog, state);
    let texts = view.language.texts();
    println!("{}  {}", texts.app_title, view.counter());
    if view.summary.watched_titles.is_empty() {
        println!("{}", texts.nothing_watched);
    }
    for year in view.dataset.years() {
        let items = view.dataset.eligible_items(year);
        if items.is_empty() {
            continue;
        }
        println!();
        println!("{year}");
        for (position, record) in items.iter().enumerate() {
            let index = SelectionIndex::new(year, position);
            let mark = if state.is_selected(index) { "x" } else { " " };
            println!(
                "  [{mark}] {:<8} {}",
                index.to_string(),
                truncate(&record.title, 60)
            );
        }
    }
}

fn run_toggle(catalog: &Catalog, state: &mut AppState<'_>, raw: &[String]) -> Result<()> {
    for entry in raw {
        let index = match entry.parse::<SelectionIndex>() {
            Ok(index) => index,
            Err(err) => {
                eprintln!("{err}");
                continue;
            }
        };
        let dataset = catalog.for_language(state.language());
        let Some(record) = dataset.eligible_record(index) else {
            eprintln!("No selectable anime at {index}.");
            continue;
        };
        let title = record.title.clone();
        state.toggle(index)?;
        let mark = if state.is_selected(index) { "x" } else { " " };
        println!("[{mark}] {index} {title}");
    }
    print_counter(catalog, state);
    Ok(())
}

fn run_prompt(
    catalog: &Catalog,
    state: &AppState<'_>,
    style: PromptStyle,
    open: bool,
    handoff: &HandoffConfig,
) {
    let view = View::of(catalog, state);
    println!("{}", view.prompt(style));
    if open {
        let uri = view.chat_uri(style, &handoff.base_uri);
        open_in_chat_app(&uri);
        eprintln!("{uri}");
    }
}

fn run_export(
    catalog: &Catalog,
    state: &AppState<'_>,
    copy: bool,
    output: Option<PathBuf>,
    export: &ExportConfig,
) {
    let view = View::of(catalog, state);
    let texts = view.language.texts();
    let region = view.capture_region(state);

    if copy {
        println!("{}", texts.copying);
        let mut clipboard = export_clipboard();
        if clipboard.holds_until_replaced() {
            println!("{}", texts.clipboard_hold);
        }
        match copy_image(&region, &mut clipboard) {
            Ok(()) => println!("{}", texts.copied),
            Err(err) => eprintln!("{}", failure_notice(texts.copy_failed, &err, view.language)),
        }
        return;
    }

    let dir = output
        .or_else(|| export.directory.clone())
        .unwrap_or_else(default_download_dir);
    println!("{}", texts.downloading);
    let mut saver = DirectorySaver::new(dir);
    match download_image(&region, &mut saver) {
        Ok(path) => println!("{} ({})", texts.downloaded, path.display()),
        Err(err) => eprintln!(
            "{}",
            failure_notice(texts.download_failed, &err, view.language)
        ),
    }
}

/// The CLI exits right after copying, so the clipboard has to outlive it.
fn export_clipboard() -> SystemClipboard {
    SystemClipboard::holding()
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    let mut out = s.to_string();
    if out.chars().count() > max {
        out = out.chars().take(max.saturating_sub(3)).collect::<String>() + "...";
    }
    out
}
