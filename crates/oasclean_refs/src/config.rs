use clap::{Parser, ValueEnum};
use log::LevelFilter;
use oasclean_core::Format;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    Yaml,
    Json,
}

impl From<InputFormat> for Format {
    fn from(value: InputFormat) -> Self {
        match value {
            InputFormat::Yaml => Format::Yaml,
            InputFormat::Json => Format::Json,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Colored tree
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "check")]
#[command(about = "Find undefined and unused components in OpenAPI/Swagger documents")]
pub struct Config {
    /// Documents to analyze: files, directories, URLs or inline YAML/JSON text
    #[arg(required = true)]
    pub inputs: Vec<String>,

    /// Format of inputs whose name does not reveal it (inline text, extensionless URLs)
    #[arg(long, value_enum)]
    pub input_format: Option<InputFormat>,

    /// Report unused components without failing
    #[arg(short, long)]
    pub lax: bool,

    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Log debug output
    #[arg(short = 'g', long, conflicts_with = "quiet")]
    pub debug: bool,

    /// Log warnings and errors only
    #[arg(short, long)]
    pub quiet: bool,
}

impl Config {
    pub fn input_hint(&self) -> Option<Format> {
        self.input_format.map(Format::from)
    }

    pub fn log_level(&self) -> LevelFilter {
        log_level(self.debug, self.quiet)
    }
}

/// Default log level for the `--debug`/`--quiet` pair. `RUST_LOG` still wins.
pub fn log_level(debug: bool, quiet: bool) -> LevelFilter {
    if debug {
        LevelFilter::Debug
    } else if quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    }
}
