use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::app::{Language, PromptStyle};

#[derive(Debug, Parser)]
#[command(
    name = "anime-sedai",
    version,
    about = "Mark the anime you've watched, year by year, and share the result"
)]
pub struct Cli {
    /// State database to use instead of the default location.
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,
    /// Keep selections in memory only for this run.
    #[arg(long, global = true, conflicts_with = "db")]
    pub ephemeral: bool,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive grid (default).
    Tui,
    /// Print the grid with watched marks.
    List,
    /// Flip one or more `<year>-<position>` entries.
    Toggle {
        #[arg(required = true)]
        indices: Vec<String>,
    },
    SelectAll,
    Clear,
    /// Show or set the display language.
    Language { language: Option<Language> },
    /// Print the watch-history prompt.
    Prompt {
        #[arg(long, value_enum, default_value_t = PromptStyle::Normal)]
        style: PromptStyle,
        /// Also hand the prompt to the chat app.
        #[arg(long)]
        open: bool,
    },
    /// Render the card as PNG.
    Export {
        /// Copy to the clipboard instead of saving a file.
        #[arg(long)]
        copy: bool,
        /// Directory to save into.
        #[arg(long, conflicts_with = "copy")]
        output: Option<PathBuf>,
    },
}
