use anyhow::Result;
use clap::Parser;
use env_logger::Target;
use log::{Level, LevelFilter};
use pdfunite_dir::{Config, merge_pdfs_in_dir};
use std::io::Write;

/// Merge all the PDFs in the given directory into a single document. The files are taken
/// in natural filename order, so that `file2.pdf` comes before `file11.pdf`. Only the
/// files whose name ends with `.pdf` are merged; the directory is not modified.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the directory containing the PDFs
    path: String,
    /// Name or path of the output PDF. A directory gets a `merged_output.pdf` inside it,
    /// a missing `.pdf` extension is appended
    output: String,
    /// Report each file as it is merged
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // the level comes from the command line only, progress lines are printed bare
    let level = if cli.verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .target(Target::Stdout)
        .format(|buf, record| match record.level() {
            Level::Info => writeln!(buf, "{}", record.args()),
            level => writeln!(buf, "[{level}] {}", record.args()),
        })
        .init();

    let config = Config::normalize(&cli.path, &cli.output, cli.verbose)?;
    let summary = merge_pdfs_in_dir(&config)?;

    println!("\n{summary}");

    Ok(())
}
