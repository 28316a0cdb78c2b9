use anyhow::{Result, anyhow};
use clap::Parser;
use pdfunite_dir::utils::write_basic_pdf;
use std::path::Path;

/// Generate a PDF document with random content, to try the merge on. Each page has for
/// title the name of the document and the page number.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Output path
    #[arg(short = 'o')]
    output_path: String,
    /// Number of pages of the document
    #[arg(short = 'n', default_value_t = 1)]
    num_pages: u8,
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = generate_basic_pdf_doc(&cli.output_path, cli.num_pages) {
        eprintln!("Error encountered: {err}");
        std::process::exit(1);
    }
}

fn generate_basic_pdf_doc(output_path: impl AsRef<Path>, num_pages: u8) -> Result<()> {
    let output_path = output_path.as_ref();

    if std::fs::exists(output_path)? {
        return Err(anyhow!(
            "A file at location '{}' exists already",
            output_path.display()
        ));
    }

    write_basic_pdf(output_path, num_pages)?;
    println!("Generated '{}' with {num_pages} pages", output_path.display());

    Ok(())
}
