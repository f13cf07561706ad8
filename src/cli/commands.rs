//! Command implementation for the importer CLI
//!
//! Sets up logging, loads the station configuration and runs the import
//! over the selected directories.

use crate::cli::args::Args;
use crate::config::ImportConfig;
use crate::error::Result;
use crate::models::ImportStats;
use crate::processor::WlkImporter;
use chrono::Local;
use colored::*;
use std::fs;
use tracing::{debug, info};
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::Layer;
use tracing_subscriber::registry::LookupSpan;

/// Run a complete import
pub fn run(args: Args) -> Result<ImportStats> {
    args.validate()?;

    // Held until the import finishes so the diagnostics file is flushed
    let _guard = setup_logging(&args)?;

    info!("Starting WLK import");
    debug!("Command line arguments: {:?}", args);

    let config_path = args.config_path();
    let config = ImportConfig::load(&config_path)?;
    debug!("Loaded configuration: {:?}", config);

    let wlk_dir = args.wlk_dir();
    let data_dir = args.data_dir();
    if !args.quiet {
        println!("{}", "Importing WeatherLink archives".bright_green().bold());
        println!("  {} {}", "Source:".bright_cyan(), wlk_dir.display());
        println!("  {} {}", "Output:".bright_cyan(), data_dir.display());
    }

    let mut importer =
        WlkImporter::new(config, wlk_dir, data_dir).with_progress(args.show_progress());
    let stats = importer.run()?;

    if !args.quiet {
        stats.print_summary();
    }
    info!(
        "Import finished: {} of {} files, {} day rows",
        stats.files_processed, stats.files_found, stats.day_rows_written
    );

    Ok(stats)
}

/// Set up structured logging based on CLI arguments
///
/// Console output goes to stderr; a plain-text copy of every event goes to
/// `MXdiags/ImportWLK-<timestamp>.txt` under the station root.
fn setup_logging(args: &Args) -> Result<WorkerGuard> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("wlk_import={}", log_level)));

    let diags_dir = args.diags_dir();
    fs::create_dir_all(&diags_dir)?;
    let file_name = format!("ImportWLK-{}.txt", Local::now().format("%Y%m%d-%H%M%S"));
    let (diags_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(&diags_dir, &file_name));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .with(diags_layer(diags_writer))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .with(diags_layer(diags_writer))
            .init();
    }

    debug!(
        "Logging initialized at level {}, diagnostics in {}",
        log_level,
        diags_dir.join(&file_name).display()
    );
    Ok(guard)
}

/// Plain-text layer for the diagnostics file
fn diags_layer<S>(writer: NonBlocking) -> impl Layer<S>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tracing_subscriber::{fmt, layer::SubscriberExt};

    #[test]
    fn test_diags_layer_stacks_with_either_console_layer() {
        let temp_dir = TempDir::new().unwrap();

        let (writer, guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::never(temp_dir.path(), "quiet.txt"));
        let quiet = tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::sink).compact())
            .with(diags_layer(writer));
        tracing::subscriber::with_default(quiet, || info!("compact console"));
        drop(guard);

        let (writer, guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::never(temp_dir.path(), "normal.txt"));
        let normal = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::sink),
            )
            .with(diags_layer(writer));
        tracing::subscriber::with_default(normal, || info!("uptime console"));
        drop(guard);

        let quiet_text = fs::read_to_string(temp_dir.path().join("quiet.txt")).unwrap();
        assert!(quiet_text.contains("compact console"));
        assert!(!quiet_text.contains('\u{1b}'));
        let normal_text = fs::read_to_string(temp_dir.path().join("normal.txt")).unwrap();
        assert!(normal_text.contains("uptime console"));
    }
}
