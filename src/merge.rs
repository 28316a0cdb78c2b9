use crate::PDF_SUFFIX;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::natural;
use log::{debug, info, trace, warn};
use lopdf::{Bookmark, Document, Object, ObjectId, dictionary};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// An output document built incrementally, one input file at a time.
pub trait DocumentAccumulator {
    /// Append all the pages of the PDF at `path`, in their order, and return how many
    /// pages were appended.
    fn append(&mut self, path: &Path) -> Result<usize>;

    /// Serialize everything appended so far to `output_path`.
    fn finalize(self, output_path: &Path) -> Result<()>;
}

const BLACK_COLOR_RGB: [f32; 3] = [0f32; 3];
const DEFAULT_TEXT_FORMAT: u32 = 0;

/// Accumulator backed by an in-memory `lopdf` document.
///
/// The page tree of every appended document is kept whole and hung under the root
/// `Pages` node, so attributes inherited from it (`MediaBox`, `Resources`, ...) survive.
/// The catalog of the appended documents is dropped; instead each document gets one
/// top-level bookmark, titled with its file name, pointing at its first page.
#[derive(Debug)]
pub struct LopdfAccumulator {
    doc: Document,
    catalog_id: ObjectId,
    pages_root_id: ObjectId,
    kids: Vec<Object>,
    page_count: usize,
}

impl LopdfAccumulator {
    pub fn new() -> Self {
        let mut doc = Document::with_version("1.7");
        let pages_root_id = doc.new_object_id();
        let catalog_id = doc.new_object_id();
        doc.trailer.set("Root", catalog_id);

        Self {
            doc,
            catalog_id,
            pages_root_id,
            kids: Vec::new(),
            page_count: 0,
        }
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }
}

impl Default for LopdfAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentAccumulator for LopdfAccumulator {
    fn append(&mut self, path: &Path) -> Result<usize> {
        let mut doc_to_merge = Document::load(path).map_err(|source| Error::UnreadableFile {
            path: path.to_path_buf(),
            source,
        })?;
        let malformed = |source: lopdf::Error| Error::MalformedFile {
            path: path.to_path_buf(),
            source,
        };

        doc_to_merge.renumber_objects_with(self.doc.max_id + 1);

        let catalog_id = doc_to_merge
            .trailer
            .get(b"Root")
            .and_then(Object::as_reference)
            .map_err(malformed)?;
        let pages_id = doc_to_merge
            .get_dictionary(catalog_id)
            .and_then(|catalog| catalog.get(b"Pages"))
            .and_then(Object::as_reference)
            .map_err(malformed)?;
        // the page tree root must be a dictionary to be re-parented below
        doc_to_merge.get_dictionary(pages_id).map_err(malformed)?;

        let pages = doc_to_merge.get_pages();
        let num_pages = pages.len();
        let first_page_id = pages.get(&1).copied();
        trace!(
            "Append the {num_pages} pages of '{}' (objects renumbered up to {})",
            path.display(),
            doc_to_merge.max_id
        );

        self.doc.max_id = self.doc.max_id.max(doc_to_merge.max_id);

        for (object_id, mut object) in doc_to_merge.objects {
            if object_id == catalog_id {
                continue;
            }
            if object_id == pages_id {
                if let Object::Dictionary(ref mut pages_dict) = object {
                    pages_dict.set("Parent", self.pages_root_id);
                }
            }
            self.doc.objects.insert(object_id, object);
        }

        self.kids.push(Object::Reference(pages_id));
        self.page_count += num_pages;

        match first_page_id {
            Some(first_page_id) => {
                let title = path
                    .file_name()
                    .map(|name| name.to_string_lossy().to_string())
                    .unwrap_or_else(|| path.display().to_string());
                let bookmark =
                    Bookmark::new(title, BLACK_COLOR_RGB, DEFAULT_TEXT_FORMAT, first_page_id);
                self.doc.add_bookmark(bookmark, None);
            }
            None => debug!("'{}' has no pages, no bookmark added", path.display()),
        }

        Ok(num_pages)
    }

    fn finalize(mut self, output_path: &Path) -> Result<()> {
        let write_error = |source: std::io::Error| Error::Write {
            path: output_path.to_path_buf(),
            source,
        };

        let pages_root = dictionary! {
            "Type" => "Pages",
            "Kids" => std::mem::take(&mut self.kids),
            "Count" => Object::Integer(self.page_count as i64),
        };
        self.doc
            .objects
            .insert(self.pages_root_id, Object::Dictionary(pages_root));

        let mut catalog = dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_root_id,
        };
        if let Some(outlines_id) = self.doc.build_outline() {
            catalog.set("Outlines", outlines_id);
            catalog.set("PageMode", Object::Name(b"UseOutlines".to_vec()));
        }
        self.doc
            .objects
            .insert(self.catalog_id, Object::Dictionary(catalog));

        self.doc.compress();

        let mut buffer = Vec::new();
        self.doc.save_to(&mut buffer).map_err(write_error)?;

        // an existing output is only replaced once the new one is complete on disk
        let output_dir = match output_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut staged = NamedTempFile::new_in(output_dir).map_err(write_error)?;
        staged.write_all(&buffer).map_err(write_error)?;
        staged.as_file().sync_all().map_err(write_error)?;
        staged
            .persist(output_path)
            .map_err(|persist_error| write_error(persist_error.error))?;

        Ok(())
    }
}

/// Outcome of a successful merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSummary {
    pub files_merged: usize,
    pub pages_merged: usize,
    pub source_dir: PathBuf,
    pub output_path: PathBuf,
}

impl fmt::Display for MergeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Successfully merged {} PDF files from the directory '{}' into the output file '{}'.",
            self.files_merged,
            self.source_dir.display(),
            self.output_path.display()
        )
    }
}

/// Names of the entries of `dir` ending with `.pdf` (case-sensitive), in natural order.
/// Sub-directories and entries whose name is not valid UTF-8 are skipped.
pub fn list_pdf_names(dir: impl AsRef<Path>) -> Result<Vec<String>> {
    let dir = dir.as_ref();
    let read_dir_error = |source: std::io::Error| Error::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut pdf_names = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(read_dir_error)? {
        let entry = entry.map_err(read_dir_error)?;

        let name = match entry.file_name().into_string() {
            Ok(name) => name,
            Err(raw_name) => {
                warn!("Skipping the entry {raw_name:?}: its name is not valid UTF-8");
                continue;
            }
        };

        if !name.ends_with(PDF_SUFFIX) {
            trace!("Skipping '{name}': not a PDF file name");
            continue;
        }

        if entry.path().is_dir() {
            debug!("Skipping the directory '{name}'");
            continue;
        }

        pdf_names.push(name);
    }

    natural::sort(&mut pdf_names);

    Ok(pdf_names)
}

/// Append every PDF of the source directory, in natural order, to `accumulator` and
/// write the result to the output path.
///
/// Nothing is written if the directory holds no PDF or if any of them cannot be read.
pub fn merge_directory<A: DocumentAccumulator>(
    config: &Config,
    mut accumulator: A,
) -> Result<MergeSummary> {
    let source_dir = config.source_dir();

    let pdf_names = list_pdf_names(source_dir)?;
    if pdf_names.is_empty() {
        return Err(Error::EmptyDirectory(source_dir.to_path_buf()));
    }

    let mut pages_merged = 0;
    for pdf_name in &pdf_names {
        if config.verbose() {
            info!("Adding {pdf_name} to the merger");
        } else {
            debug!("Adding {pdf_name} to the merger");
        }
        pages_merged += accumulator.append(&source_dir.join(pdf_name))?;
    }

    info!(
        "Writing {pages_merged} pages to '{}'",
        config.output_path().display()
    );
    accumulator.finalize(config.output_path())?;

    Ok(MergeSummary {
        files_merged: pdf_names.len(),
        pages_merged,
        source_dir: source_dir.to_path_buf(),
        output_path: config.output_path().to_path_buf(),
    })
}

/// [`merge_directory`] with a [`LopdfAccumulator`]
pub fn merge_pdfs_in_dir(config: &Config) -> Result<MergeSummary> {
    merge_directory(config, LopdfAccumulator::new())
}
