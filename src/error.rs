use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The source path does not exist or is not a directory
    #[error("The provided path '{}' is not a valid directory", .0.display())]
    InvalidInputPath(PathBuf),

    #[error("Could not determine the current working directory: {0}")]
    CurrentDir(#[source] std::io::Error),

    #[error("Could not list the directory '{}': {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// No entry of the source directory ends with `.pdf`
    #[error("The directory '{}' contains no PDF files", .0.display())]
    EmptyDirectory(PathBuf),

    #[error("The file '{}' could not be read as a PDF: {source}", .path.display())]
    UnreadableFile {
        path: PathBuf,
        source: lopdf::Error,
    },

    /// The file parses, but its catalog or page tree cannot be located
    #[error("The file '{}' has no usable page tree: {source}", .path.display())]
    MalformedFile {
        path: PathBuf,
        source: lopdf::Error,
    },

    #[error("Could not create the output directory '{}': {source}", .path.display())]
    CreateOutputDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not write the output file '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}
