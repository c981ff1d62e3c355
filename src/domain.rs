use derive_setters::Setters;
use polars::error::PolarsError;
use ratatui::crossterm::event::KeyEvent;
use thiserror::Error;

use crate::table::TableError;

/// Intents flowing from the controller into the model. Raw key events are
/// only forwarded while a text input owns the keyboard.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MovePageUp,
    MovePageDown,
    MoveBeginning,
    MoveEnd,
    MoveLeft,
    MoveRight,
    SortColumn,
    RemoveSortColumn,
    ToggleInStock,
    ToggleGrouping,
    Filter,
    CopyCell,
    CopyRow,
    Help,
    Exit,
    Resize(usize, usize),
    RawKey(KeyEvent),
}

/// Runtime configuration, assembled in main from the command line.
#[derive(Debug, Clone, Setters)]
pub struct AppConfig {
    /// Poll timeout for terminal events in milliseconds.
    pub event_poll_time: u64,
    /// Hard cap on the rendered width of a single column.
    pub max_column_width: usize,
    /// Seconds a status message stays on the command line.
    pub status_message_timeout: u64,
    /// Start with category group rows instead of the flat grid.
    pub grouped: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            event_poll_time: 100,
            max_column_width: 40,
            status_message_timeout: 5,
            grouped: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("table error: {0}")]
    Table(#[from] TableError),
    #[error("loading failed: {0}")]
    LoadingFailed(String),
    #[error("file not found")]
    FileNotFound,
    #[error("permission denied")]
    PermissionDenied,
    #[error("unknown file type (expected .csv or .parquet)")]
    UnknownFileType,
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

pub const HELP_TEXT: &str = "\
shelf - a product table browser

  Up/Down  k/j      move the row selection
  PgUp/PgDn         move one page
  Home/End  g/G     jump to the first / last row
  Left/Right  h/l   select a header column
  s                 sort by the selected column, again to flip
  S                 retire the selected column from the sort order
  t                 toggle in-stock only
  c                 toggle category grouping
  /                 filter by product name (Enter keeps, Esc restores)
  y / Y             copy the selected row / cell
  ?                 this help
  Esc               clear the filter / close this popup
  q                 quit
";
