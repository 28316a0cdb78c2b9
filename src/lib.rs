//! Merge all the PDF files of a directory into a single document.
//!
//! The files are taken in natural filename order (`2.pdf` before `11.pdf`) and their pages
//! are appended one file after the other, without reordering.
//!
//! ```no_run
//! use pdfunite_dir::{Config, merge_pdfs_in_dir};
//!
//! let config = Config::normalize("~/scans", "scans-merged", false)?;
//! let summary = merge_pdfs_in_dir(&config)?;
//! println!("{summary}");
//! # Ok::<(), pdfunite_dir::Error>(())
//! ```

pub mod config;
pub mod error;
pub mod merge;
pub mod natural;
pub mod utils;

pub use config::Config;
pub use error::{Error, Result};
pub use merge::{
    DocumentAccumulator, LopdfAccumulator, MergeSummary, merge_directory, merge_pdfs_in_dir,
};

/// Suffix, matched case-sensitively, of the files to merge and of the output file
pub const PDF_SUFFIX: &str = ".pdf";
