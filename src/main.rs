mod config;
mod constants;
mod convert;
mod data;
mod error;
mod perf;

use std::path::Path;

use tracing::{error, info, Level};

use crate::config::ConverterConfig;
use crate::error::{ConvertError, Result};

fn main() {
    if let Err(err) = app_main() {
        // Fatal errors are logged only; the exit status does not change
        match err {
            ConvertError::Logging(_) => eprintln!("{}: {}", err.title(), err),
            _ => error!("{}: {}", err.title(), err),
        }
    }
}

fn app_main() -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_level(true)
        .with_max_level(Level::INFO)
        .with_file(true)
        .with_line_number(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let _profiler = perf::start_profiler();

    let config = ConverterConfig::load_or_default(Path::new(constants::config::CONFIG_FILE))?;
    let summary = convert::convert(config)?;
    profiling::finish_frame!();

    info!(
        lines = summary.lines_read,
        written = summary.records_written,
        dropped = summary.records_dropped,
        zero_filled = summary.coercion_fallbacks,
        row_groups = summary.row_groups,
        bytes = summary.bytes_written,
        elapsed = ?summary.elapsed,
        "conversion summary"
    );
    info!("{}", constants::COMPLETION_MESSAGE);
    Ok(())
}
