use std::{
    fs::File,
    io::{self, BufWriter, Read, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::Parser;
use output_events::{
    pump_reader, ConfigError, EventFilter, EventSink, FilterConfig, StreamEvent, VerboseFilter,
};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Replays captured job stdout through the event filter and prints one JSON
/// object per event.
#[derive(Debug, Parser)]
#[command(name = "extract-events")]
struct Cli {
    /// Captured stdout to read; stdin when omitted or `-`.
    input: Option<PathBuf>,

    /// Treat the input as plain text: one verbose event per line, no markers.
    #[arg(long)]
    plain: bool,

    /// TOML filter config (`correlation_key`, `[limits] max_buffer_bytes`).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Decoded field that opens a correlation window (overrides the config).
    #[arg(long)]
    correlation_key: Option<String>,

    /// Force-flush the buffer past this many bytes (overrides the config).
    #[arg(long)]
    max_buffer_bytes: Option<usize>,
}

#[derive(Debug, Error)]
enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to open `{path}`: {source}")]
    Input {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

struct JsonlSink<W> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> JsonlSink<W> {
    fn new(out: W) -> Self {
        Self { out, error: None }
    }

    fn finish(mut self) -> io::Result<()> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }
        self.out.flush()
    }
}

impl<W: Write> EventSink for JsonlSink<W> {
    fn on_event(&mut self, event: StreamEvent) {
        if self.error.is_some() {
            return;
        }
        let result = serde_json::to_writer(&mut self.out, &event)
            .map_err(io::Error::from)
            .and_then(|()| self.out.write_all(b"\n"));
        if let Err(error) = result {
            self.error = Some(error);
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .compact()
        .try_init();
}

fn open_input(path: Option<PathBuf>) -> Result<Box<dyn Read>, Error> {
    match path {
        Some(path) if path.as_os_str() != "-" => {
            let file = File::open(&path).map_err(|source| Error::Input { path, source })?;
            Ok(Box::new(file))
        }
        _ => Ok(Box::new(io::stdin().lock())),
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    let mut config = match &cli.config {
        Some(path) => FilterConfig::from_toml_file(path)?,
        None => FilterConfig::default(),
    };
    if let Some(key) = cli.correlation_key {
        config.correlation_key = key;
    }
    if let Some(max) = cli.max_buffer_bytes {
        config.limits.max_buffer_bytes = Some(max);
    }

    let input = open_input(cli.input)?;
    let sink = JsonlSink::new(BufWriter::new(io::stdout().lock()));
    let sink = if cli.plain {
        let mut filter = VerboseFilter::with_limits(sink, config.limits);
        pump_reader(input, &mut filter)?;
        filter.into_sink()
    } else {
        let mut filter = EventFilter::with_config(sink, config);
        pump_reader(input, &mut filter)?;
        filter.into_sink()
    };
    sink.finish()?;
    Ok(())
}

fn main() -> ExitCode {
    init_tracing();
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("extract-events: {error}");
            ExitCode::FAILURE
        }
    }
}
