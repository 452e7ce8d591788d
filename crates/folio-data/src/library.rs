//! Every registered book, loaded from one content store

use std::sync::Arc;

use indexmap::IndexMap;

use folio_core::{Book, BookError, ContentId, Environment, StaticEnvironment};

use crate::config::LoaderConfig;
use crate::contents::{BookContents, LoadContext};
use crate::extensions::Extensions;
use crate::sources::ContentStore;

/// Registered books with their extension books, and the collaborators
/// they load with
pub struct Library {
    store: Arc<dyn ContentStore>,
    extensions: Extensions,
    config: LoaderConfig,
    environment: Arc<dyn Environment>,
    books: IndexMap<ContentId, BookContents>,
    /// Target book -> books adding content to it
    extension_books: IndexMap<ContentId, Vec<Book>>,
}

impl Library {
    pub fn new(store: Arc<dyn ContentStore>, config: LoaderConfig) -> Self {
        Self {
            store,
            extensions: Extensions::new(),
            config,
            environment: Arc::new(StaticEnvironment::new()),
            books: IndexMap::new(),
            extension_books: IndexMap::new(),
        }
    }

    pub fn with_environment(mut self, environment: Arc<dyn Environment>) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_extensions(mut self, extensions: Extensions) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn environment(&self) -> &dyn Environment {
        self.environment.as_ref()
    }

    pub fn store(&self) -> &dyn ContentStore {
        self.store.as_ref()
    }

    /// Read a book's metadata document from the store
    pub fn load_book(&self, id: ContentId, owner: impl Into<String>) -> Result<Book, BookError> {
        let file = self.config.book_file(&id)?;
        let mut reader = self
            .store
            .open(&file)?
            .ok_or_else(|| BookError::ContentNotFound(file.clone()))?;
        let mut json = String::new();
        std::io::Read::read_to_string(&mut reader, &mut json)?;
        Book::from_json(id, owner, &json)
    }

    /// Register a book. Books declaring an extension target are registered
    /// as extensions of it instead.
    pub fn register_book(&mut self, book: Book) {
        if let Some(target) = book.extension_target().cloned() {
            self.register_extension(target, book);
            return;
        }
        tracing::info!("Registered book {}", book.id());
        self.books.insert(book.id().clone(), BookContents::new(book));
    }

    /// Register `extension` as adding content to `target`
    pub fn register_extension(&mut self, target: ContentId, extension: Book) {
        tracing::info!("Registered {} as extension of {}", extension.id(), target);
        self.extension_books.entry(target).or_default().push(extension);
    }

    pub fn get(&self, id: &ContentId) -> Option<&BookContents> {
        self.books.get(id)
    }

    pub fn books(&self) -> impl Iterator<Item = &BookContents> {
        self.books.values()
    }

    /// Ids of the books extending `target`
    pub fn extensions_of(&self, target: &ContentId) -> Vec<&ContentId> {
        self.extension_books
            .get(target)
            .map(|books| books.iter().map(|b| b.id()).collect())
            .unwrap_or_default()
    }

    /// Fully reload every book, then let its extensions add their content.
    /// Ends the registration phase. Returns the number of errored books.
    pub fn reload_all(&mut self, locale: Option<&str>) -> usize {
        if let Some(locale) = locale {
            self.config.locale = locale.to_string();
        }
        self.extensions.freeze();

        let ctx = LoadContext {
            store: self.store.as_ref(),
            extensions: &self.extensions,
            config: &self.config,
            environment: self.environment.as_ref(),
        };

        let mut errored = 0;
        for (id, contents) in self.books.iter_mut() {
            contents.reload(false, &ctx);
            for extension in self.extension_books.get(id).into_iter().flatten() {
                if contents.is_errored() {
                    break;
                }
                contents.reload_from(true, extension.namespace(), &ctx);
            }
            if contents.is_errored() {
                errored += 1;
            }
        }
        for target in self.extension_books.keys() {
            if !self.books.contains_key(target) {
                tracing::warn!("Extensions registered for unknown book {}", target);
            }
        }
        errored
    }

    /// Prepare a book for display, optionally moving to `page` of `entry`.
    /// Returns the sound cue to play on opening.
    pub fn display_book(&self, book: &ContentId, entry: Option<&ContentId>, page: usize) -> Result<ContentId, BookError> {
        let contents = self
            .books
            .get(book)
            .ok_or_else(|| BookError::UnknownBook(book.clone()))?;
        let ctx = contents.navigation_context(self.environment.as_ref());

        contents.navigator().check_valid_current_entry(&ctx);
        if let Some(entry) = entry {
            contents.navigator().set_top_entry(entry, page, &ctx)?;
        }
        contents.navigator().show(&ctx);
        Ok(contents.book().open_sound())
    }

    /// Re-evaluate locks after the environment changed: read-states are
    /// recomputed and views that became locked are dropped
    pub fn refresh_locks(&self) {
        for contents in self.books.values() {
            contents.reads().invalidate();
            contents.check_valid_current_entry(self.environment.as_ref());
        }
    }
}

impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("store", &self.store.source_name())
            .field("config", &self.config)
            .field("books", &self.books.keys().collect::<Vec<_>>())
            .field("extension_books", &self.extension_books.len())
            .finish()
    }
}
