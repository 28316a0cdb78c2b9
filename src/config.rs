use crate::PDF_SUFFIX;
use crate::error::{Error, Result};
use log::{debug, warn};
use std::borrow::Cow;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

/// File name used when the output given on the command line is a directory
pub const DEFAULT_OUTPUT_FILENAME: &str = "merged_output.pdf";

/// Validated inputs of one merge: both paths are absolute, the source directory exists
/// and the output path ends with `.pdf`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    source_dir: PathBuf,
    output_path: PathBuf,
    verbose: bool,
}

impl Config {
    /// Build the configuration from the raw command line values, resolving relative
    /// paths against the current working directory.
    ///
    /// Missing ancestors of the output file are created.
    pub fn normalize(path: &str, output: &str, verbose: bool) -> Result<Self> {
        let cwd = std::env::current_dir().map_err(Error::CurrentDir)?;
        Self::normalize_in(&cwd, path, output, verbose)
    }

    /// Same as [`Config::normalize`], with relative paths resolved against `base_dir`.
    pub fn normalize_in(
        base_dir: impl AsRef<Path>,
        path: &str,
        output: &str,
        verbose: bool,
    ) -> Result<Self> {
        let base_dir = base_dir.as_ref();

        let source_dir = absolutize(base_dir, &*shellexpand::tilde(path));
        if !source_dir.is_dir() {
            return Err(Error::InvalidInputPath(source_dir));
        }

        let output_path = normalize_output_path(base_dir, output);

        if let Some(parent) = output_path.parent() {
            if !parent.exists() {
                warn!(
                    "Output directory '{}' does not exist. Creating it now.",
                    parent.display()
                );
                std::fs::create_dir_all(parent).map_err(|source| Error::CreateOutputDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!(
            "Merge '{}' into '{}'",
            source_dir.display(),
            output_path.display()
        );

        Ok(Self {
            source_dir,
            output_path,
            verbose,
        })
    }

    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }
}

fn normalize_output_path(base_dir: &Path, output: &str) -> PathBuf {
    // a bare file name is taken as is in the base directory, even a lone `~`
    let output = if output.contains(std::path::is_separator) {
        shellexpand::tilde(output)
    } else {
        Cow::Borrowed(output)
    };
    let mut output_path = absolutize(base_dir, &*output);

    // a trailing separator or an existing directory both mean "put it in there"
    if output.ends_with(std::path::is_separator) || output_path.is_dir() {
        output_path.push(DEFAULT_OUTPUT_FILENAME);
    }

    if !output_path
        .as_os_str()
        .as_encoded_bytes()
        .ends_with(PDF_SUFFIX.as_bytes())
    {
        let mut with_suffix = OsString::from(output_path);
        with_suffix.push(PDF_SUFFIX);
        output_path = PathBuf::from(with_suffix);
    }

    output_path
}

/// Join `path` onto `base_dir` (unless already absolute) and drop the `.` and `..`
/// components lexically, without touching the filesystem.
fn absolutize(base_dir: &Path, path: impl AsRef<Path>) -> PathBuf {
    let mut absolute = PathBuf::new();

    for component in base_dir.join(path).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                absolute.pop();
            }
            other => absolute.push(other),
        }
    }

    absolute
}

#[cfg(test)]
mod test {
    use super::*;
    use anyhow::Result;
    use tempfile::TempDir;

    fn base_with_source() -> Result<(TempDir, String)> {
        let base = tempfile::tempdir()?;
        let source = base.path().join("pdfs");
        std::fs::create_dir(&source)?;
        Ok((base, source.display().to_string()))
    }

    #[test]
    fn absolutize_resolves_dots_lexically() {
        let base = Path::new("/home/user/docs");

        assert_eq!(
            absolutize(base, "../scans/./2024"),
            PathBuf::from("/home/user/scans/2024")
        );
        assert_eq!(absolutize(base, "/tmp/out"), PathBuf::from("/tmp/out"));
        assert_eq!(absolutize(base, ""), PathBuf::from("/home/user/docs"));
    }

    #[test]
    fn missing_source_is_invalid_input_path() -> Result<()> {
        let base = tempfile::tempdir()?;
        let missing = base.path().join("does-not-exist");

        let err = Config::normalize_in(base.path(), &missing.display().to_string(), "out", false)
            .unwrap_err();

        assert!(matches!(err, Error::InvalidInputPath(path) if path == missing));
        Ok(())
    }

    #[test]
    fn source_file_is_invalid_input_path() -> Result<()> {
        let base = tempfile::tempdir()?;
        let file = base.path().join("a1.pdf");
        std::fs::write(&file, b"not a directory")?;

        let err = Config::normalize_in(base.path(), "a1.pdf", "out", false).unwrap_err();

        assert!(matches!(err, Error::InvalidInputPath(path) if path == file));
        Ok(())
    }

    #[test]
    fn relative_source_is_resolved_against_base() -> Result<()> {
        let (base, _) = base_with_source()?;

        let config = Config::normalize_in(base.path(), "./pdfs/", "out.pdf", true)?;

        assert_eq!(config.source_dir(), base.path().join("pdfs"));
        assert!(config.verbose());
        Ok(())
    }

    #[test]
    fn bare_name_gets_pdf_extension_in_base_dir() -> Result<()> {
        let (base, source) = base_with_source()?;

        let config = Config::normalize_in(base.path(), &source, "result", false)?;

        assert_eq!(config.output_path(), base.path().join("result.pdf"));
        Ok(())
    }

    #[test]
    fn lone_tilde_output_is_a_file_name_in_base_dir() -> Result<()> {
        let (base, source) = base_with_source()?;

        let config = Config::normalize_in(base.path(), &source, "~", false)?;

        assert_eq!(config.output_path(), base.path().join("~.pdf"));
        Ok(())
    }

    #[test]
    fn extension_check_is_case_sensitive() -> Result<()> {
        let (base, source) = base_with_source()?;

        let config = Config::normalize_in(base.path(), &source, "report.PDF", false)?;

        assert_eq!(config.output_path(), base.path().join("report.PDF.pdf"));
        Ok(())
    }

    #[test]
    fn directory_output_gets_default_filename() -> Result<()> {
        let (base, source) = base_with_source()?;
        let new_dir = format!("{}/merged/", base.path().display());

        let config = Config::normalize_in(base.path(), &source, &new_dir, false)?;

        assert_eq!(
            config.output_path(),
            base.path().join("merged").join(DEFAULT_OUTPUT_FILENAME)
        );
        assert!(base.path().join("merged").is_dir());

        let existing_dir = base.path().display().to_string();
        let config = Config::normalize_in(base.path(), &source, &existing_dir, false)?;

        assert_eq!(
            config.output_path(),
            base.path().join(DEFAULT_OUTPUT_FILENAME)
        );
        Ok(())
    }

    #[test]
    fn missing_output_ancestors_are_created() -> Result<()> {
        let (base, source) = base_with_source()?;

        let config = Config::normalize_in(base.path(), &source, "a/b/c/out", false)?;

        assert_eq!(config.output_path(), base.path().join("a/b/c/out.pdf"));
        assert!(base.path().join("a/b/c").is_dir());
        assert!(!config.output_path().exists());
        Ok(())
    }

    #[test]
    fn absolute_pdf_output_is_left_unchanged() -> Result<()> {
        let (base, source) = base_with_source()?;
        let output = base.path().join("final.pdf");
        let output = output.display().to_string();

        let first = Config::normalize_in(base.path(), &source, &output, false)?;
        let second = Config::normalize_in(
            base.path(),
            &first.source_dir().display().to_string(),
            &first.output_path().display().to_string(),
            false,
        )?;

        assert_eq!(first.output_path(), Path::new(&output));
        assert_eq!(first, second);
        Ok(())
    }
}
