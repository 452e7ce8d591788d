//! Where book content lives and which locale to read it in

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use folio_core::{BookError, ContentId};

use crate::localization::LocalizationResolver;

pub const DEFAULT_LOCALE: &str = "en_us";

/// The three kinds of content files a book is made of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Categories,
    Entries,
    Templates,
}

impl ContentKind {
    /// Directory holding this kind below the locale directory
    pub fn dir(self) -> &'static str {
        match self {
            ContentKind::Categories => "categories",
            ContentKind::Entries => "entries",
            ContentKind::Templates => "templates",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir())
    }
}

/// Configuration for content loading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Locale every content file must exist in
    pub default_locale: String,

    /// Locale to read, falling back to the default per file
    pub locale: String,

    /// Path prefix in front of every book directory; empty for none
    pub books_root: String,

    /// Extension of content documents
    pub extension: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            default_locale: DEFAULT_LOCALE.to_string(),
            locale: DEFAULT_LOCALE.to_string(),
            books_root: String::new(),
            extension: ".json".to_string(),
        }
    }
}

impl LoaderConfig {
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    pub fn with_books_root(mut self, root: impl Into<String>) -> Self {
        self.books_root = root.into();
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, BookError> {
        serde_json::from_str(json).map_err(|e| BookError::malformed("loader config", e))
    }

    /// Load configuration from a JSON file
    pub fn from_json(path: &Path) -> Result<Self, BookError> {
        let json = std::fs::read_to_string(path)?;
        serde_json::from_str(&json).map_err(|e| BookError::malformed(path.display(), e))
    }

    pub fn resolver(&self) -> LocalizationResolver {
        LocalizationResolver::new(&self.default_locale, &self.locale)
    }

    fn book_dir(&self, book_path: &str) -> String {
        if self.books_root.is_empty() {
            book_path.to_string()
        } else {
            format!("{}/{}", self.books_root.trim_matches('/'), book_path)
        }
    }

    /// The book's metadata document: `<ns>:[root/]<book>/book<ext>`
    pub fn book_file(&self, book: &ContentId) -> Result<ContentId, BookError> {
        book.with_path(format!("{}/book{}", self.book_dir(book.path()), self.extension))
    }

    /// Default-locale directory of one content kind:
    /// `<ns>:[root/]<book>/<default locale>/<kind>`
    pub fn kind_dir(&self, namespace: &str, book_path: &str, kind: ContentKind) -> Result<ContentId, BookError> {
        ContentId::new(
            namespace,
            format!("{}/{}/{}", self.book_dir(book_path), self.default_locale, kind.dir()),
        )
    }

    /// Relative name of a listed file below `dir`, extension stripped.
    /// Files with another extension give `None`.
    pub fn relative_name<'a>(&self, dir: &ContentId, file: &'a ContentId) -> Option<&'a str> {
        file.relative_to(dir)?
            .strip_suffix(self.extension.as_str())
            .filter(|name| !name.is_empty())
    }
}
