use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use hyoshi::prelude::*;
use log::error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[cfg(windows)]
const DEFAULT_SEVEN_ZIP: &str = r"C:\Program Files\7-Zip\7z.exe";
#[cfg(not(windows))]
const DEFAULT_SEVEN_ZIP: &str = "/usr/bin/7z";

/// Converts every comic archive (CBR/CBZ) in a folder into an EPUB whose
/// cover is the first page.
#[derive(Parser, Debug)]
#[command(name = "hyoshi")]
#[command(version)]
struct Cli {
    /// Folder containing the archives. Asked interactively when omitted.
    root: Option<PathBuf>,

    /// Also keep `<name>._base.epub` holding every page without a cover.
    #[arg(short, long)]
    keep_intermediate: bool,

    /// Path of the 7-Zip executable used for CBR archives.
    #[arg(long, env = "HYOSHI_SEVEN_ZIP")]
    seven_zip: Option<PathBuf>,

    /// Language tag written into the books.
    #[arg(short, long, default_value = "en")]
    language: String,

    /// Write the books here instead of next to each archive.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Log every pipeline step.
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .try_init();
}

/// Reads the root folder from stdin, tolerating pasted quotes and whitespace.
async fn prompt_for_root() -> std::io::Result<PathBuf> {
    print!("Path of the folder with your archives: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
    Ok(PathBuf::from(line.trim().trim_matches('"').trim()))
}

/// An explicitly configured tool must exist; the platform default is only
/// used when it is actually installed.
fn resolve_seven_zip(explicit: Option<PathBuf>) -> Option<PathBuf> {
    explicit.or_else(|| {
        let default = Path::new(DEFAULT_SEVEN_ZIP);
        default.is_file().then(|| default.to_path_buf())
    })
}

fn build_converter(cli: &Cli) -> hyoshi::error::Result<Converter> {
    let mut builder = HyoshiConfig::builder();
    builder
        .keep_intermediate(cli.keep_intermediate)
        .language(cli.language.clone());
    if let Some(seven_zip) = resolve_seven_zip(cli.seven_zip.clone()) {
        builder.seven_zip_path(seven_zip);
    }
    if let Some(output_dir) = &cli.output_dir {
        builder.output_dir(output_dir.clone());
    }
    Converter::from_config(builder.build()?)
}

/// Runs one batch and maps the outcome to the process exit code: failure for
/// configuration errors and unusable roots, success otherwise, even when
/// individual archives failed or the folder held none.
async fn run(cli: Cli) -> ExitCode {
    let converter = match build_converter(&cli) {
        Ok(converter) => converter,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let root = match cli.root {
        Some(root) => root,
        None => match prompt_for_root().await {
            Ok(root) => root,
            Err(e) => {
                error!("Could not read the folder path: {}", e);
                return ExitCode::FAILURE;
            }
        },
    };
    let root = std::path::absolute(&root).unwrap_or(root);

    if !root.is_dir() {
        error!("The path does not exist or is not a folder: {}", root.display());
        return ExitCode::FAILURE;
    }

    match BatchRunner::new(converter).run(&root).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    run(cli).await
}
