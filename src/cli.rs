//! CLI argument parsing for crashgroup

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for a single grouped trace
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

/// Encoding of an OTLP `ExportLogsServiceRequest` body
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// OTLP/JSON (default)
    Json,
    /// Binary protobuf
    Protobuf,
}

#[derive(Parser, Debug)]
#[command(name = "crashgroup")]
#[command(version)]
#[command(about = "Crash stack-trace parsing and deterministic error grouping", long_about = None)]
pub struct Cli {
    /// Enable debug tracing output to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    /// Grouper configuration file (TOML)
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Frames of the primary lane that enter the signature (overrides config)
    #[arg(long = "top-n", value_name = "N", global = true)]
    pub top_n: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Group one raw stack trace read from FILE or stdin
    Group {
        /// Stack trace file (reads stdin when omitted)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Output format (text or json)
        #[arg(long = "format", value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Group every crash record of an OTLP log-export request (JSON lines out)
    Batch {
        /// Export request file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Encoding of the request body
        #[arg(long = "input-format", value_enum, default_value = "json")]
        input_format: InputFormat,
    },
}
