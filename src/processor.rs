//! Directory processing: collect pages, transform them in parallel, report
//!
//! The transform rewrites pages in place by default; with an output
//! directory the input tree is copied first and the copy rewritten, keeping
//! the generator output pristine (re-running over already-normalized pages
//! is lossy, see `DocumentOptions`).

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{FraglightError, Result};
use crate::highlight::Highlighter;
use crate::rewrite::{normalize_document, DocumentOptions, TransformResult};

/// Options for a processing run
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    /// Input HTML file or directory of generated pages
    pub input: PathBuf,
    /// Output directory; `None` rewrites in place
    pub output: Option<PathBuf>,
    /// Per-document transform configuration
    pub document: DocumentOptions,
}

/// Statistics from one processing run
#[derive(Debug, Default, Serialize)]
pub struct ProcessStats {
    /// HTML files scanned
    pub files_scanned: usize,
    /// Files whose content actually changed
    pub files_rewritten: usize,
    /// Files that failed to transform (logged and skipped)
    pub files_failed: usize,
    /// Fragment containers normalized across all files
    pub fragments_normalized: usize,
    /// Code blocks rewritten with highlight markup
    pub blocks_highlighted: usize,
    /// Code blocks left unhighlighted for lack of a grammar
    pub blocks_skipped: usize,
    /// Distinct language tags without a bundled grammar
    pub unsupported_languages: Vec<String>,
}

/// Processor for a documentation tree
pub struct Processor {
    options: ProcessOptions,
}

impl Processor {
    pub fn new(options: ProcessOptions) -> Self {
        Self { options }
    }

    /// Process the input path and return aggregated statistics.
    pub fn process(&self) -> Result<ProcessStats> {
        if !self.options.input.exists() {
            return Err(FraglightError::FileNotFound {
                path: self.options.input.display().to_string(),
            });
        }

        let root = self.prepare_target()?;

        let files = if root.is_dir() {
            collect_html_files(&root)
        } else {
            vec![root.clone()]
        };

        debug!(files = files.len(), root = %root.display(), "processing documentation tree");

        // ====================================================================
        // Parallel per-file transform
        // ====================================================================

        let files_rewritten = AtomicUsize::new(0);
        let files_failed = AtomicUsize::new(0);
        let fragments_normalized = AtomicUsize::new(0);
        let blocks_highlighted = AtomicUsize::new(0);
        let blocks_skipped = AtomicUsize::new(0);
        let unsupported_languages = Mutex::new(Vec::<String>::new());

        let document = &self.options.document;

        // One highlighter (and therefore one compiled grammar set) per
        // worker thread, not per file
        files.par_iter().for_each_init(Highlighter::new, |highlighter, path| {
            match process_file(path, document, highlighter) {
                Ok((result, changed)) => {
                    if changed {
                        files_rewritten.fetch_add(1, Ordering::Relaxed);
                    }
                    fragments_normalized.fetch_add(result.fragments_normalized, Ordering::Relaxed);
                    blocks_highlighted.fetch_add(result.blocks_highlighted, Ordering::Relaxed);
                    blocks_skipped.fetch_add(result.blocks_skipped, Ordering::Relaxed);

                    if !result.unsupported_languages.is_empty() {
                        let mut tags = unsupported_languages.lock().unwrap();
                        for tag in result.unsupported_languages {
                            if !tags.contains(&tag) {
                                tags.push(tag);
                            }
                        }
                    }
                }
                Err(e) => {
                    files_failed.fetch_add(1, Ordering::Relaxed);
                    warn!(file = %path.display(), error = %e, "failed to process page");
                }
            }
        });

        let mut unsupported = unsupported_languages.into_inner().unwrap();
        unsupported.sort();

        Ok(ProcessStats {
            files_scanned: files.len(),
            files_rewritten: files_rewritten.load(Ordering::Relaxed),
            files_failed: files_failed.load(Ordering::Relaxed),
            fragments_normalized: fragments_normalized.load(Ordering::Relaxed),
            blocks_highlighted: blocks_highlighted.load(Ordering::Relaxed),
            blocks_skipped: blocks_skipped.load(Ordering::Relaxed),
            unsupported_languages: unsupported,
        })
    }

    /// Resolve the tree to rewrite: the input itself, or a copy of it under
    /// the output directory.
    fn prepare_target(&self) -> Result<PathBuf> {
        let Some(output) = &self.options.output else {
            return Ok(self.options.input.clone());
        };

        if output == &self.options.input {
            return Ok(self.options.input.clone());
        }

        if self.options.input.is_dir() {
            if output.exists() {
                fs::remove_dir_all(output)?;
            }
            copy_dir_recursive(&self.options.input, output)?;
            Ok(output.clone())
        } else {
            fs::create_dir_all(output)?;
            let file_name = self.options.input.file_name().ok_or_else(|| {
                FraglightError::FileNotFound {
                    path: self.options.input.display().to_string(),
                }
            })?;
            let target = output.join(file_name);
            fs::copy(&self.options.input, &target)?;
            Ok(target)
        }
    }
}

/// Transform a single page, writing it back only if it changed.
///
/// Returns the per-document counters and whether the file was rewritten.
fn process_file(
    path: &Path,
    document: &DocumentOptions,
    highlighter: &mut Highlighter,
) -> Result<(TransformResult, bool)> {
    let html = fs::read_to_string(path)?;
    let (transformed, result) = normalize_document(&html, document, highlighter)?;

    let changed = transformed != html;
    if changed {
        fs::write(path, &transformed)?;
    }

    debug!(
        file = %path.display(),
        fragments = result.fragments_normalized,
        highlighted = result.blocks_highlighted,
        "processed page"
    );

    Ok((result, changed))
}

/// Recursively collect `.html`/`.htm` files, sorted by path.
///
/// Hidden directories are skipped; generator output does not hide pages.
pub fn collect_html_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    collect_html_files_recursive(dir, &mut files);
    files.sort();
    files
}

fn collect_html_files_recursive(dir: &Path, files: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(_) => return,
    };

    for entry in entries.flatten() {
        let path = entry.path();

        if is_hidden(&path) {
            continue;
        }

        if path.is_dir() {
            collect_html_files_recursive(&path, files);
        } else if path.is_file() && is_html_file(&path) {
            files.push(path);
        }
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with('.'))
}

fn is_html_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
}

/// Copy a directory tree verbatim.
fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_html_file() {
        assert!(is_html_file(Path::new("index.html")));
        assert!(is_html_file(Path::new("page.HTM")));
        assert!(!is_html_file(Path::new("style.css")));
        assert!(!is_html_file(Path::new("README")));
    }

    #[test]
    fn test_is_hidden() {
        assert!(is_hidden(Path::new(".git")));
        assert!(is_hidden(Path::new("doc/.cache")));
        assert!(!is_hidden(Path::new("doc/html")));
    }

    #[test]
    fn test_collect_html_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("a.html"), "<html></html>").unwrap();
        fs::write(dir.path().join("sub/b.htm"), "<html></html>").unwrap();
        fs::write(dir.path().join("style.css"), "body {}").unwrap();

        let files = collect_html_files(dir.path());
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("a.html"));
        assert!(files[1].ends_with("b.htm"));
    }

    #[test]
    fn test_missing_input_is_an_error() {
        let processor = Processor::new(ProcessOptions {
            input: PathBuf::from("/nonexistent/doc/html"),
            output: None,
            document: DocumentOptions::default(),
        });
        assert!(matches!(
            processor.process(),
            Err(FraglightError::FileNotFound { .. })
        ));
    }
}
