use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;

use clap::Parser;
use tracing::info;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod controller;
mod domain;
mod inputter;
mod loader;
mod model;
mod table;
mod ui;

use controller::Controller;
use domain::{AppConfig, AppError};
use model::{Model, Status};
use table::{ClickPolicy, ProductTable, default_columns, sample_products};
use ui::TableUI;

/// A tui based product table browser.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// CSV or parquet file with product data; without one the builtin
    /// sample set is shown
    data: Option<String>,

    /// Event poll time in milliseconds
    #[arg(long, default_value_t = 100)]
    tick: u64,

    /// Write a trace log to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Widest a column gets before cell content is clipped
    #[arg(long, default_value_t = 40)]
    max_column_width: usize,

    /// Start with the rows grouped by category
    #[arg(long)]
    grouped: bool,

    /// Sorting a column moves it to the front of the sort order instead
    /// of appending it
    #[arg(long)]
    promote_clicks: bool,
}

fn main() -> ExitCode {
    match run() {
        Err(e) => {
            ratatui::restore();
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => {
            ratatui::restore();
            ExitCode::SUCCESS
        }
    }
}

fn run() -> Result<(), AppError> {
    let args = Args::parse();

    if let Some(log_file) = &args.log_file {
        init_tracing(log_file)?;
    }

    let (products, name) = match &args.data {
        Some(data) => {
            let path = shellexpand::full(data)
                .map_err(|e| AppError::InvalidPath(e.to_string()))?
                .into_owned();
            let path = PathBuf::from(path);
            let products = loader::load_products(&path)?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "???".to_string());
            (products, name)
        }
        None => (sample_products(), "products".to_string()),
    };

    let config = AppConfig::default()
        .event_poll_time(args.tick)
        .max_column_width(args.max_column_width)
        .grouped(args.grouped);

    let mut table = ProductTable::new(products, default_columns())?;
    if args.promote_clicks {
        table.set_click_policy(ClickPolicy::PromoteFront);
    }

    let ui = TableUI::new(&config);
    let controller = Controller::new(&config);

    let mut terminal = ratatui::init();
    let size = terminal.size()?;
    let mut model = Model::init(
        &config,
        table,
        name,
        size.width as usize,
        size.height as usize,
    )?;
    info!("Entering event loop");

    while model.status != Status::QUITTING {
        // Render the current view
        terminal.draw(|f| ui.draw(&model, f))?;

        // Handle events and map to a Message
        if let Some(message) = controller.handle_event(&model)? {
            model.update(message)?;
        }
    }

    Ok(())
}

fn init_tracing(log_file: &Path) -> Result<(), AppError> {
    let file = File::create(log_file)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(ErrorLayer::default())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .init();
    Ok(())
}
