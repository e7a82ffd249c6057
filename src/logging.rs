//! Diagnostic output for the `modscout` binary.
//!
//! Discovery results are written to stdout, so every log line goes to stderr
//! (or nowhere under `--quiet`).
use std::error::Error as StdError;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

const CRATE_TARGET: &str = "modscout";

pub type InitError = Box<dyn StdError + Send + Sync + 'static>;

/// Console verbosity, ordered from silent to most detailed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    Debug,
    Trace,
}

impl Verbosity {
    pub fn from_flags(verbose: u8, quiet: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Quiet,
            (false, 0) => Self::Normal,
            (false, 1) => Self::Verbose,
            (false, 2) => Self::Debug,
            (false, _) => Self::Trace,
        }
    }

    pub fn level(self) -> LevelFilter {
        match self {
            Self::Quiet => LevelFilter::ERROR,
            Self::Normal => LevelFilter::WARN,
            Self::Verbose => LevelFilter::INFO,
            Self::Debug => LevelFilter::DEBUG,
            Self::Trace => LevelFilter::TRACE,
        }
    }

    /// Directive applied when `RUST_LOG` is unset or unparsable. Other
    /// targets stay at `error` unless tracing is requested.
    pub fn directive(self) -> String {
        let others = if self == Self::Trace { "trace" } else { "error" };
        format!("{others},{CRATE_TARGET}={}", self.level())
    }

    fn writer(self) -> BoxMakeWriter {
        if self == Self::Quiet {
            BoxMakeWriter::new(std::io::sink)
        } else {
            BoxMakeWriter::new(std::io::stderr)
        }
    }
}

fn env_filter(verbosity: Verbosity) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.directive()))
}

/// Installs the global subscriber. Fails if one is already installed.
pub fn init(verbosity: Verbosity) -> Result<(), InitError> {
    let detailed = verbosity >= Verbosity::Debug;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbosity))
        .with_writer(verbosity.writer())
        .with_target(verbosity == Verbosity::Trace)
        .with_thread_ids(verbosity == Verbosity::Trace)
        .with_file(detailed)
        .with_line_number(detailed)
        .compact();

    // Timestamps only matter once there is more than warnings to read.
    if verbosity > Verbosity::Normal {
        builder.try_init()
    } else {
        builder.without_time().try_init()
    }
}
