use crate::error::{CliError, Result};
use std::fs::File;
use std::path::PathBuf;
use tracing::Subscriber;
use tracing_subscriber::{
    Layer,
    filter::LevelFilter,
    fmt::{self, format::FmtSpan},
    prelude::*,
    registry::LookupSpan,
};

/// Where diagnostics go and how much of them.
#[derive(Debug, Clone, PartialEq)]
pub struct LogSettings {
    pub level: LevelFilter,
    /// Close the `simulation_workflow`/`ensemble_workflow` spans on stderr with their busy time.
    pub workflow_timing: bool,
    pub log_file: Option<PathBuf>,
}

impl LogSettings {
    pub fn new(verbosity: u8, quiet: bool, log_file: Option<PathBuf>) -> Self {
        let level = if quiet {
            LevelFilter::OFF
        } else {
            match verbosity {
                0 => LevelFilter::WARN,
                1 => LevelFilter::INFO,
                2 => LevelFilter::DEBUG,
                _ => LevelFilter::TRACE,
            }
        };
        Self {
            level,
            workflow_timing: !quiet && verbosity >= 2,
            log_file,
        }
    }
}

pub fn setup_logging(settings: &LogSettings) -> Result<()> {
    let span_events = if settings.workflow_timing {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .with_span_events(span_events)
        .compact();

    let subscriber = tracing_subscriber::registry()
        .with(settings.level)
        .with(stderr_layer);

    let installed = match &settings.log_file {
        Some(path) => {
            let file = File::create(path).map_err(CliError::Io)?;
            subscriber.with(file_layer(file)).try_init()
        }
        None => subscriber.try_init(),
    };
    installed.map_err(|e| CliError::Other(anyhow::anyhow!("Failed to install logger: {}", e)))
}

/// `--log-file` output: plain text with thread ids, every workflow span closed with its timings.
fn file_layer<S>(file: File) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_thread_ids(true)
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
}
