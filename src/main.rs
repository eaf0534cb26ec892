//! Markdown Studio - Markdown rendering and export from the command line
//!
//! Entry point for the binary. Handles CLI argument parsing, logging
//! initialization and the render/export pipeline.

use anyhow::{bail, Context, Result};
use std::io::Read;
use std::path::{Path, PathBuf};

use markdown_studio::config::Config;
use markdown_studio::file_handler::read_markup_sync;
use markdown_studio::markdown::{
    ArtifactKind, DocumentExporter, ExportArtifact, HtmlExportOptions, MarkdownRenderer,
};
use markdown_studio::print::{OffscreenSurface, PrintExporter};

/// Application name for logging
const APP_NAME: &str = "markdown-studio";

/// Parsed command line
#[derive(Debug, Default)]
struct Flags {
    /// Input file, or `None` for stdin
    input: Option<PathBuf>,
    html: Option<PathBuf>,
    pdf: Option<PathBuf>,
    config: Option<PathBuf>,
    title: Option<String>,
}

fn main() -> Result<()> {
    init_logging();

    let flags = parse_args();
    log::debug!("Starting {} with {:?}", APP_NAME, flags);

    let config = match &flags.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::load().context("failed to load config")?,
    };

    let markup = read_input(flags.input.as_deref())?;

    let mut renderer = MarkdownRenderer::from_config(&config);
    if let Some(title) = &flags.title {
        let options = HtmlExportOptions {
            title: title.clone(),
            ..HtmlExportOptions::from(&config.export)
        };
        renderer = renderer.with_exporter(DocumentExporter::new(options));
    }

    let fragment = renderer.render(&markup);

    if flags.html.is_none() && flags.pdf.is_none() {
        print!("{}", fragment);
        return Ok(());
    }

    if let Some(target) = &flags.html {
        let artifact = renderer.exporter().export_document(&fragment);
        let written = deliver(&artifact, target, flags.input.as_deref())?;
        log::info!("Wrote {} ({} bytes)", written.display(), artifact.len());
    }

    if let Some(target) = &flags.pdf {
        let title = flags
            .title
            .clone()
            .unwrap_or_else(|| config.export.title.clone());
        let exporter = PrintExporter::new(&config.print).with_title(title);
        let surface = OffscreenSurface::new(fragment);

        let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
        let artifact = runtime
            .block_on(exporter.export_printable(&surface))
            .map_err(|e| anyhow::anyhow!(e.user_message()))
            .context("print export failed")?;

        let written = deliver(&artifact, target, flags.input.as_deref())?;
        log::info!("Wrote {} ({} bytes)", written.display(), artifact.len());
    }

    Ok(())
}

/// Initialize the logging system
fn init_logging() {
    // Set default log level if not specified
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info,markdown_studio=debug");
    }

    env_logger::Builder::from_default_env()
        .format_timestamp_millis()
        .init();
}

/// Read markup from a file, or stdin when no file was given
fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => {
            let source = read_markup_sync(path)
                .map_err(|e| anyhow::anyhow!(e.user_message()))
                .with_context(|| format!("failed to read {}", path.display()))?;
            log::debug!(
                "Read {} ({} bytes, {:?})",
                path.display(),
                source.size_bytes,
                source.encoding
            );
            Ok(source.text)
        }
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
            Ok(text)
        }
    }
}

/// Write an artifact to `target`. A directory target receives a file named
/// after the input, or the artifact's default name for stdin input.
fn deliver(artifact: &ExportArtifact, target: &Path, input: Option<&Path>) -> Result<PathBuf> {
    if target.is_dir() {
        return match input.and_then(|p| p.file_name()) {
            Some(name) => {
                let path = DocumentExporter::suggest_output_path(&target.join(name), artifact.kind);
                artifact
                    .write_to(&path)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                Ok(path)
            }
            None => artifact
                .write_into(target)
                .with_context(|| format!("failed to write into {}", target.display())),
        };
    }

    let expected = ArtifactKind::from_path(target)
        .with_context(|| format!("cannot export to {}", target.display()))?;
    if expected != artifact.kind {
        bail!(
            "{} does not look like a {} file",
            target.display(),
            artifact.kind.display_name()
        );
    }

    artifact
        .write_to(target)
        .with_context(|| format!("failed to write {}", target.display()))?;
    Ok(target.to_path_buf())
}

/// Parse command line arguments
fn parse_args() -> Flags {
    let args: Vec<String> = std::env::args().collect();
    let mut flags = Flags::default();
    let mut input_seen = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            opt @ ("--html" | "--pdf" | "--config" | "--title") => {
                let Some(value) = args.get(i + 1) else {
                    eprintln!("Error: {} requires an argument", opt);
                    std::process::exit(1);
                };
                match opt {
                    "--html" => flags.html = Some(PathBuf::from(value)),
                    "--pdf" => flags.pdf = Some(PathBuf::from(value)),
                    "--config" => flags.config = Some(PathBuf::from(value)),
                    _ => flags.title = Some(value.clone()),
                }
                i += 1;
            }
            "-" if !input_seen => {
                input_seen = true;
            }
            arg if arg.starts_with('-') => {
                eprintln!("Unknown option: {}", arg);
                eprintln!("Use --help for usage information");
                std::process::exit(1);
            }
            _ if input_seen => {
                eprintln!("Error: only one input may be given");
                std::process::exit(1);
            }
            _ => {
                input_seen = true;
                flags.input = Some(PathBuf::from(&args[i]));
            }
        }
        i += 1;
    }

    if !input_seen {
        eprintln!("Error: no input given");
        eprintln!("Use --help for usage information");
        std::process::exit(1);
    }

    flags
}

/// Print help message
fn print_help() {
    println!(
        r#"Markdown Studio - Render Markdown to HTML and PDF

USAGE:
    markdown-studio [OPTIONS] <FILE|->

OPTIONS:
    -h, --help              Show this help message
    -v, --version           Show version information
        --html <PATH>       Write a standalone HTML document
        --pdf <PATH>        Write a printable PDF
        --config <PATH>     Use a specific configuration file
        --title <TEXT>      Document title for the exports

With no export option the rendered HTML fragment is printed to stdout.
An export PATH that is a directory receives a file named after the input.

EXAMPLES:
    markdown-studio README.md                   Print the rendered fragment
    markdown-studio notes.md --html notes.html  Export a standalone document
    markdown-studio notes.md --pdf out/         Export out/notes.pdf
    cat notes.md | markdown-studio - --pdf notes.pdf
"#
    );
}

/// Print version information
fn print_version() {
    println!("{} {}", APP_NAME, env!("CARGO_PKG_VERSION"));
}
