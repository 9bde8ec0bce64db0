//! Directory-backed content store.
//!
//! Layout: `<root>/<folder>/<alias>.md` for ordered documents such as lessons
//! and `<root>/<folder>/<lang>.md` for pages kept in several languages.
//! Every lookup re-reads the files it needs; nothing is cached.

pub mod navigation;

use crate::content::{ContentDocument, frontmatter};
use relative_path::{Component, RelativePath, RelativePathBuf};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub use navigation::{Navigation, NavigationLink};

/// Language whose file is served when none of the requested ones exist.
pub const DEFAULT_LANGUAGE: &str = "en";

const MARKDOWN_EXTENSION: &str = "md";

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Content root not found: {0}")]
    RootNotFound(PathBuf),
    #[error("Invalid content path: {0}")]
    InvalidPath(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Listing data for one markdown file in a folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentEntry {
    /// File name without the `.md` extension.
    pub slug: String,
    /// Frontmatter alias, or the slug when the file declares none.
    pub alias: String,
    /// Frontmatter order, or 0.
    pub order: i64,
}

#[derive(Debug, Clone)]
pub struct ContentRepository {
    root: PathBuf,
    default_language: String,
}

impl ContentRepository {
    /// Open a repository rooted at an existing directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(RepositoryError::RootNotFound(root));
        }
        Ok(Self {
            root,
            default_language: DEFAULT_LANGUAGE.to_string(),
        })
    }

    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = language.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Names of all subdirectories of the content root, sorted.
    pub fn list_folders(&self) -> Result<Vec<String>, RepositoryError> {
        list_dirs(&self.root)
    }

    /// Names of all subdirectories of `folder`, sorted. A missing folder has none.
    pub fn list_subfolders(&self, folder: &str) -> Result<Vec<String>, RepositoryError> {
        let dir = self.folder_path(folder)?;
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        list_dirs(&dir)
    }

    /// Every markdown file in `folder`, ascending by order.
    ///
    /// Files are read in file-name order and the sort is stable, so equal
    /// orders keep that sequence.
    pub fn list_documents(&self, folder: &str) -> Result<Vec<DocumentEntry>, RepositoryError> {
        let dir = self.folder_path(folder)?;
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for path in markdown_files(&dir)? {
            let doc = read_document(&path)?;
            let slug = slug_of(&path);
            let alias = match doc.meta.alias() {
                "" => slug.clone(),
                alias => alias.to_string(),
            };
            entries.push(DocumentEntry {
                slug,
                alias,
                order: doc.meta.order().unwrap_or(0),
            });
        }

        entries.sort_by_key(|e| e.order);
        Ok(entries)
    }

    /// First document in `folder` whose alias matches.
    ///
    /// A linear scan that parses each file until a match; fine for a content
    /// site with tens of documents per folder.
    pub fn get_by_alias(
        &self,
        folder: &str,
        alias: &str,
    ) -> Result<Option<ContentDocument>, RepositoryError> {
        let dir = self.folder_path(folder)?;
        if !dir.is_dir() {
            return Ok(None);
        }

        for path in markdown_files(&dir)? {
            let doc = read_document(&path)?;
            let matches = match doc.meta.alias() {
                "" => slug_of(&path) == alias,
                declared => declared == alias,
            };
            if matches {
                return Ok(Some(doc));
            }
        }
        Ok(None)
    }

    /// The `<lang>.md` document for the first language that has one, falling
    /// back to the repository's default language.
    pub fn get_by_language<S: AsRef<str>>(
        &self,
        folder: &str,
        languages: &[S],
    ) -> Result<Option<ContentDocument>, RepositoryError> {
        let dir = self.folder_path(folder)?;
        if !dir.is_dir() {
            return Ok(None);
        }

        let candidates = languages
            .iter()
            .map(AsRef::as_ref)
            .chain(std::iter::once(self.default_language.as_str()));
        for lang in candidates {
            if !is_language_code(lang) {
                log::warn!("ignoring invalid language code {lang:?}");
                continue;
            }
            let path = dir.join(format!("{lang}.{MARKDOWN_EXTENSION}"));
            if path.is_file() {
                log::debug!("serving {folder} in {lang}");
                return read_document(&path).map(Some);
            }
        }
        Ok(None)
    }

    /// Resolve `folder` beneath the root, refusing paths that climb out of it.
    fn folder_path(&self, folder: &str) -> Result<PathBuf, RepositoryError> {
        if folder.starts_with(['/', '\\']) || folder.contains(['\0', '\\']) {
            return Err(RepositoryError::InvalidPath(folder.to_string()));
        }
        let relative: RelativePathBuf = RelativePath::new(folder).normalize();
        if relative
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(RepositoryError::InvalidPath(folder.to_string()));
        }
        Ok(relative.to_path(&self.root))
    }
}

fn is_language_code(lang: &str) -> bool {
    !lang.is_empty()
        && lang
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn list_dirs(dir: &Path) -> Result<Vec<String>, RepositoryError> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.path().is_dir()
            && let Some(name) = entry.file_name().to_str()
        {
            names.push(name.to_string());
        }
    }
    names.sort();
    Ok(names)
}

/// Markdown files directly inside `dir`, sorted by file name.
fn markdown_files(dir: &Path) -> Result<Vec<PathBuf>, RepositoryError> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file()
            && let Some(ext) = path.extension()
            && ext == MARKDOWN_EXTENSION
        {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Bytes that are not UTF-8 are replaced rather than failing the folder.
fn read_document(path: &Path) -> Result<ContentDocument, RepositoryError> {
    let text = match String::from_utf8(fs::read(path)?) {
        Ok(text) => text,
        Err(e) => {
            log::warn!("{} is not valid UTF-8", path.display());
            String::from_utf8_lossy(e.as_bytes()).into_owned()
        }
    };
    Ok(frontmatter::parse(&text))
}

fn slug_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
