use anyhow::{Context, Result};
use clap::Parser;
use crashgroup::cli::{Cli, Command, InputFormat, OutputFormat};
use crashgroup::{otlp, ErrorGrouper, EventMeta, GrouperConfig, PassthroughSymbolicator};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Config file (or defaults) with command-line overrides applied
fn load_config(path: Option<&Path>, top_n: Option<usize>) -> Result<GrouperConfig> {
    let mut config = match path {
        Some(path) => GrouperConfig::from_toml(path)
            .with_context(|| format!("Failed to load grouper config: {}", path.display()))?,
        None => GrouperConfig::default(),
    };
    if let Some(top_n) = top_n {
        config.top_n_frames = top_n;
    }
    Ok(config)
}

fn read_trace(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read stack trace file: {}", path.display())),
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("Failed to read stack trace from stdin")?;
            Ok(raw)
        }
    }
}

async fn run_group(grouper: &ErrorGrouper, file: Option<PathBuf>, format: OutputFormat) -> Result<()> {
    let raw = read_trace(file.as_deref())?;
    let result = grouper
        .process_with_complete_symbolication(&raw, &EventMeta::default())
        .await;
    let group = &result.group;

    match format {
        OutputFormat::Text => {
            println!("Group ID:     {}", group.group_id);
            println!("Title:        {}", group.display_name);
            println!("Platform:     {}", group.platform);
            println!("Lane:         {}", result.lane);
            println!("Signature:    {}", group.signature);
            println!("Fingerprint:  {}", group.fingerprint);
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(group).context("Failed to serialize group")?;
            println!("{}", json);
        }
    }
    Ok(())
}

async fn run_batch(grouper: &ErrorGrouper, file: &Path, input_format: InputFormat) -> Result<()> {
    let body = std::fs::read(file)
        .with_context(|| format!("Failed to read export request: {}", file.display()))?;
    let request = match input_format {
        InputFormat::Json => otlp::decode_json(&body),
        InputFormat::Protobuf => otlp::decode_protobuf(&body),
    }
    .with_context(|| format!("Failed to decode export request: {}", file.display()))?;

    let events = grouper.process(&request).await;
    tracing::debug!(events = events.len(), "batch grouped");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for event in &events {
        let line = serde_json::to_string(event).context("Failed to serialize event")?;
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    let config = load_config(args.config.as_deref(), args.top_n)?;
    let grouper = ErrorGrouper::with_config(Arc::new(PassthroughSymbolicator), config);

    match args.command {
        Command::Group { file, format } => run_group(&grouper, file, format).await,
        Command::Batch { file, input_format } => run_batch(&grouper, &file, input_format).await,
    }
}
