mod app;
mod event;
mod ui;

use crate::{
    app::{App, AppEvent},
    event::{EventHandler, try_app_send},
};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
struct Args {
    /// Whether to keep the count in memory only, without persisting to disk.
    #[arg(long, short = 'm', default_value_t = false)]
    in_memory: bool,

    /// Directory to store the count in. Defaults to the platform data directory.
    #[arg(long, short = 'd')]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let data_dir = match args.data_dir {
        Some(data_dir) => data_dir,
        None => rmp_counter::default_data_dir()?,
    };

    // the logger forwards into the event channel, so that comes first, and
    // the logger must be up before the model opens to capture its startup
    let events = EventHandler::new();
    let logger = AppLogger::new_with_default(DEFAULT_FILTER);
    log::set_boxed_logger(Box::new(logger))?;
    log::set_max_level(log::LevelFilter::Debug);

    let app = App::new(events, data_dir, args.in_memory)?;

    // run tui
    let terminal = ratatui::init();
    let app_result = app.run(terminal).await;
    ratatui::restore();
    app_result
}

const DEFAULT_FILTER: &str = "warn,rmp_counter_tui=debug,rmp_counter=debug";

/// Logger that shows records on the log screen.
///
/// Records logged before the event channel exists are dropped.
struct AppLogger {
    filter: env_filter::Filter,
}

impl AppLogger {
    fn new_with_default(default: &str) -> Self {
        let mut filter_builder = env_filter::Builder::new();
        if let Ok(filter) = &std::env::var("RUST_LOG") {
            filter_builder.parse(filter);
        } else {
            filter_builder.parse(default);
        }
        Self {
            filter: filter_builder.build(),
        }
    }
}

impl log::Log for AppLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.filter.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        if self.filter.matches(record) {
            let s = format!("{:<5} {}", record.level(), record.args());
            try_app_send(AppEvent::Log(s));
        }
    }

    fn flush(&self) {}
}
