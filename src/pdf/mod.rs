//! PDF question answering
//!
//! [`PdfLibrary`] extracts text from PDF files, keeps it in a bounded
//! [`TextCache`] and answers questions by keyword retrieval over the cached
//! text. All operations are synchronous; callers on an async runtime should
//! run [`PdfLibrary::load`] on a blocking thread since extraction is CPU
//! bound.

pub mod cache;
pub mod search;

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::{AppError, Result};
use crate::utils::toml_config::PdfConfig;

pub use cache::{CacheLimits, CacheStats, CachedText, TextCache};

const PREVIEW_CHARS: usize = 500;

/// Source of per-page text for a PDF file.
pub trait TextExtractor: Send + Sync {
    /// Text of every page in order. Pages without text are empty strings.
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>>;
}

/// Extraction through the `pdf-extract` crate.
#[cfg(feature = "pdf")]
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

#[cfg(feature = "pdf")]
impl TextExtractor for PdfExtractor {
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>> {
        pdf_extract::extract_text_by_pages(path)
            .map_err(|e| AppError::Validation(format!("Error loading PDF: {}", e)))
    }
}

/// Stand-in used when the crate is built without the `pdf` feature.
#[cfg(not(feature = "pdf"))]
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

#[cfg(not(feature = "pdf"))]
impl TextExtractor for PdfExtractor {
    fn extract_pages(&self, _path: &Path) -> Result<Vec<String>> {
        Err(AppError::Config(
            "PDF support is disabled. Rebuild with the `pdf` feature".to_string(),
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadOutcome {
    Loaded {
        path: String,
        file_name: String,
        pages: usize,
        words: usize,
        preview: String,
    },
    AlreadyLoaded {
        path: String,
        file_name: String,
        words: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Answer {
    /// Matching sections; `total` counts all matches, `sections` holds the first few.
    Sections {
        question: String,
        total: usize,
        sections: Vec<String>,
    },
    /// Nothing matched; the opening lines of the document instead.
    Fallback { question: String, lines: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedPdf {
    pub path: String,
    pub file_name: String,
    pub words: usize,
    pub chars: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfSummary {
    pub file_name: String,
    pub words: usize,
    pub chars: usize,
    pub pages: usize,
    pub lines: Vec<String>,
}

/// Lexically normalize a path: drop `.` components and fold `..` into the
/// preceding component. The filesystem is not consulted.
pub fn normalize_path(path: &str) -> String {
    let mut parts: Vec<Component> = Vec::new();
    for component in Path::new(path.trim()).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return ".".to_string();
    }
    parts
        .iter()
        .collect::<PathBuf>()
        .to_string_lossy()
        .into_owned()
}

fn file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

fn not_loaded(path: &str) -> AppError {
    AppError::NotFound(format!(
        "PDF not loaded. Please use load_pdf first for: {}",
        file_name(path)
    ))
}

/// Loaded PDF documents and the questions asked of them.
pub struct PdfLibrary {
    cache: TextCache,
    extractor: Arc<dyn TextExtractor>,
    /// Paths being extracted right now
    loading: Mutex<HashSet<String>>,
    load_done: Condvar,
}

/// Exclusive right to load one path; released on drop.
struct LoadSlot<'a> {
    library: &'a PdfLibrary,
    path: String,
}

impl Drop for LoadSlot<'_> {
    fn drop(&mut self) {
        self.library.loading.lock().remove(&self.path);
        self.library.load_done.notify_all();
    }
}

impl PdfLibrary {
    pub fn new(cache: TextCache, extractor: Arc<dyn TextExtractor>) -> Self {
        Self {
            cache,
            extractor,
            loading: Mutex::new(HashSet::new()),
            load_done: Condvar::new(),
        }
    }

    /// Wait until no other thread is loading `path`, then claim it.
    fn claim(&self, path: &str) -> LoadSlot<'_> {
        let mut loading = self.loading.lock();
        while loading.contains(path) {
            self.load_done.wait(&mut loading);
        }
        loading.insert(path.to_string());
        LoadSlot {
            library: self,
            path: path.to_string(),
        }
    }

    pub fn from_config(config: &PdfConfig) -> Self {
        Self::new(TextCache::from_config(config), Arc::new(PdfExtractor))
    }

    pub fn cache(&self) -> &TextCache {
        &self.cache
    }

    pub fn load(&self, path: &str) -> Result<LoadOutcome> {
        let normalized = normalize_path(path);
        let fs_path = Path::new(&normalized);

        if !fs_path.exists() {
            return Err(AppError::Validation(format!(
                "PDF file not found at: {}",
                normalized
            )));
        }
        let is_pdf = fs_path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if !is_pdf {
            return Err(AppError::Validation(format!(
                "File is not a PDF: {}",
                normalized
            )));
        }

        // A concurrent load of the same path finishes first and is then
        // reported as already loaded.
        let _slot = self.claim(&normalized);
        if let Some(doc) = self.cache.get(&normalized) {
            return Ok(LoadOutcome::AlreadyLoaded {
                file_name: file_name(&normalized),
                words: doc.word_count(),
                path: normalized,
            });
        }

        let pages = self.extractor.extract_pages(fs_path)?;
        let page_count = pages.len();

        let mut text = String::new();
        for (i, page) in pages.iter().enumerate() {
            if !page.trim().is_empty() {
                text.push_str(&format!("\n--- Page {} ---\n{}\n", i + 1, page));
            }
        }
        if text.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "No text could be extracted from PDF: {}",
                normalized
            )));
        }

        let doc = CachedText {
            text: text.trim().to_string(),
            pages: page_count,
        };
        let words = doc.word_count();
        let preview = if doc.text.chars().count() > PREVIEW_CHARS {
            format!(
                "{}...",
                doc.text.chars().take(PREVIEW_CHARS).collect::<String>()
            )
        } else {
            doc.text.clone()
        };

        self.cache.insert(&normalized, doc)?;
        info!(path = %normalized, pages = page_count, words, "pdf loaded");

        Ok(LoadOutcome::Loaded {
            file_name: file_name(&normalized),
            path: normalized,
            pages: page_count,
            words,
            preview,
        })
    }

    pub fn ask(&self, path: &str, question: &str) -> Result<Answer> {
        let normalized = normalize_path(path);
        let doc = self
            .cache
            .get(&normalized)
            .ok_or_else(|| not_loaded(&normalized))?;

        let sections = search::matching_sections(&doc.text, question);
        if !sections.is_empty() {
            return Ok(Answer::Sections {
                question: question.to_string(),
                total: sections.len(),
                sections: sections.into_iter().take(search::MAX_SECTIONS).collect(),
            });
        }

        let lines = search::fallback_lines(&doc.text);
        if lines.is_empty() {
            return Err(AppError::NotFound(format!(
                "No relevant information found in the PDF for question: '{}'",
                question
            )));
        }
        Ok(Answer::Fallback {
            question: question.to_string(),
            lines,
        })
    }

    pub fn loaded(&self) -> Vec<LoadedPdf> {
        self.cache
            .documents()
            .into_iter()
            .map(|(path, doc)| LoadedPdf {
                file_name: file_name(&path),
                words: doc.word_count(),
                chars: doc.char_count(),
                path,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.cache.clear();
        info!("pdf cache cleared");
    }

    pub fn summary(&self, path: &str) -> Result<PdfSummary> {
        let normalized = normalize_path(path);
        let doc = self
            .cache
            .get(&normalized)
            .ok_or_else(|| not_loaded(&normalized))?;

        Ok(PdfSummary {
            file_name: file_name(&normalized),
            words: doc.word_count(),
            chars: doc.char_count(),
            pages: doc.pages,
            lines: search::summary_lines(&doc.text),
        })
    }
}
