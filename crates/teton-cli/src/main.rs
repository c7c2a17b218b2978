//! teton CLI - export sliced layer geometry
//!
//! Replays a stored slice snapshot through the exporter and inspects or
//! converts exported documents.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::LevelFilter;
use std::fs;
use std::path::{Path, PathBuf};

use teton::{Format, JsonSerializer, LogSink, ProcessEnvironment, Serializer, SliceData};
use teton_ir::Document;

#[derive(Parser)]
#[command(name = "teton")]
#[command(about = "Export sliced layer geometry as a structured document", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a slice snapshot (JSON) to a document
    Export {
        /// Slice snapshot file
        input: PathBuf,
        /// Output form: json or compact
        #[arg(short, long, default_value = "json")]
        format: Format,
        /// Output file (default: derived from the mesh name and environment)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Write JSON on a single line
        #[arg(long)]
        compact_json: bool,
    },
    /// Display a summary of an exported document
    Info {
        /// Document file (.json or .teton)
        file: PathBuf,
    },
    /// Re-render a document in the form implied by the output extension
    Convert {
        /// Input document (.json or .teton)
        input: PathBuf,
        /// Output document (.json or .teton)
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Export {
            input,
            format,
            output,
            compact_json,
        } => {
            let path = if compact_json && format == Format::Json {
                export_snapshot(&input, &JsonSerializer { pretty: false }, output.as_deref())?
            } else {
                export_snapshot(&input, &format, output.as_deref())?
            };
            println!("Exported {}", path.display());
        }
        Commands::Info { file } => {
            let doc = read_document(&file)?;
            print!("{}", summarize(&doc));
        }
        Commands::Convert { input, output } => {
            convert(&input, &output)?;
            println!("Converted {} to {}", input.display(), output.display());
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    // RUST_LOG, when set, refines the level chosen by -v.
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn export_snapshot<S>(input: &Path, serializer: &S, output: Option<&Path>) -> Result<PathBuf>
where
    S: Serializer + ?Sized,
{
    let json = fs::read_to_string(input)
        .with_context(|| format!("reading snapshot {}", input.display()))?;
    let data = SliceData::from_json(&json)
        .with_context(|| format!("parsing snapshot {}", input.display()))?;

    let mut sink = LogSink;
    match output {
        Some(path) => {
            teton::export_to(&data, serializer, &mut sink, path)?;
            Ok(path.to_path_buf())
        }
        None => Ok(teton::export(&data, serializer, &mut sink, &ProcessEnvironment)?),
    }
}

fn format_for(path: &Path) -> Result<Format> {
    Format::from_path(path).with_context(|| {
        format!(
            "cannot tell document form of {} (expected .json or .teton)",
            path.display()
        )
    })
}

fn read_document(path: &Path) -> Result<Document> {
    let format = format_for(path)?;
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(format.parse(&text)?)
}

fn convert(input: &Path, output: &Path) -> Result<()> {
    let doc = read_document(input)?;
    let format = format_for(output)?;
    teton::write_document(doc, &format, output)?;
    Ok(())
}

fn summarize(doc: &Document) -> String {
    let mut out = format!("document version {}, {} meshes\n", doc.version, doc.mesh_count());
    for mesh in &doc.meshes {
        out.push_str(&format!(
            "mesh {} '{}': role={} pattern={} spacing={} layers={} parts={} areas={}\n",
            mesh.id,
            mesh.name,
            mesh.role,
            mesh.infill_pattern,
            mesh.infill_line_spacing,
            mesh.layers.len(),
            mesh.part_count(),
            mesh.area_count()
        ));
    }
    out
}
