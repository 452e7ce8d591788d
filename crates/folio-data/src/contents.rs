//! Content repository of one book: loading, linking and navigation state

use std::sync::Arc;

use folio_core::navigation::NavigationContext;
use folio_core::{
    Book, BookError, BookGraph, BookIcon, BookView, ContentId, Entry, Environment, Navigator, ObjectKey, ReadNode,
    ReadState, ReadTracker, ViewLocation,
};
use folio_templates::{TemplateFactory, TemplateSet};

use crate::config::{ContentKind, LoaderConfig};
use crate::extensions::Extensions;
use crate::index::ObjectIndex;
use crate::sources::ContentStore;

/// Collaborators a reload reads from
#[derive(Clone, Copy)]
pub struct LoadContext<'a> {
    pub store: &'a dyn ContentStore,
    pub extensions: &'a Extensions,
    pub config: &'a LoaderConfig,
    pub environment: &'a dyn Environment,
}

/// What one successful reload added
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub categories: usize,
    pub entries: usize,
    pub templates: usize,
    pub objects: usize,
}

/// Contents of one book.
///
/// A failed reload leaves whatever it assigned before the failure in place
/// and records the error; see [`BookContents::is_errored`].
#[derive(Debug)]
pub struct BookContents {
    book: Book,
    graph: BookGraph,
    templates: TemplateSet,
    objects: ObjectIndex,
    index_icon: Option<BookIcon>,
    navigator: Navigator,
    reads: ReadTracker,
    errored: bool,
    last_error: Option<Arc<BookError>>,
}

impl BookContents {
    pub fn new(book: Book) -> Self {
        Self {
            book,
            graph: BookGraph::new(),
            templates: TemplateSet::new(),
            objects: ObjectIndex::new(),
            index_icon: None,
            navigator: Navigator::new(),
            reads: ReadTracker::new(),
            errored: false,
            last_error: None,
        }
    }

    /// Load this book's own content. A full reload (`is_override == false`)
    /// starts from an empty graph; an override adds to the current one.
    pub fn reload(&mut self, is_override: bool, ctx: &LoadContext<'_>) -> bool {
        let namespace = self.book.namespace().to_string();
        self.reload_from(is_override, &namespace, ctx)
    }

    /// Load content stored under `namespace` into this book. Extension books
    /// use this to add their content to the book they extend.
    pub fn reload_from(&mut self, is_override: bool, namespace: &str, ctx: &LoadContext<'_>) -> bool {
        self.errored = false;
        self.last_error = None;
        self.reads.invalidate();

        let result = if is_override {
            self.load(namespace, ctx)
        } else {
            self.reset(ctx).and_then(|_| self.load(namespace, ctx))
        };

        match result {
            Ok(summary) => {
                tracing::info!(
                    book = %self.book.id(),
                    source = namespace,
                    "Loaded {} categories, {} entries, {} templates, {} object mappings",
                    summary.categories,
                    summary.entries,
                    summary.templates,
                    summary.objects
                );
                true
            }
            Err(e) => {
                tracing::error!(book = %self.book.id(), "Error while loading contents: {}", e);
                self.errored = true;
                self.last_error = Some(Arc::new(e));
                false
            }
        }
    }

    fn reset(&mut self, ctx: &LoadContext<'_>) -> Result<(), BookError> {
        self.navigator.reset();
        self.graph.clear();
        self.objects.clear();
        self.templates.clear();
        self.templates.seed(ctx.extensions.templates());
        self.index_icon = None;
        self.index_icon = Some(self.book.index_icon()?);
        Ok(())
    }

    fn load(&mut self, namespace: &str, ctx: &LoadContext<'_>) -> Result<LoadSummary, BookError> {
        let categories = self.discover(ContentKind::Categories, namespace, ctx)?;
        let entries = self.discover(ContentKind::Entries, namespace, ctx)?;
        let templates = self.discover(ContentKind::Templates, namespace, ctx)?;

        let parser = ctx.extensions.parser();
        let resolver = ctx.config.resolver();
        let mut summary = LoadSummary::default();

        for (id, file) in categories {
            let reader = resolver.load_localized(ctx.store, &file)?;
            let category = parser.parse_category(id, namespace, reader)?;
            if category.can_add(ctx.environment) {
                self.graph.insert_category(category);
                summary.categories += 1;
            } else {
                tracing::debug!("Category {} excluded by its flag", category.id());
            }
        }

        for (id, file) in entries {
            let reader = resolver.load_localized(ctx.store, &file)?;
            let entry = parser.parse_entry(id, namespace, reader)?;
            if entry.can_add(ctx.environment) {
                self.graph.link_entry(entry)?;
                summary.entries += 1;
            } else {
                tracing::debug!("Entry {} excluded by its flag", entry.id());
            }
        }

        for (id, file) in templates {
            let json = resolver.read_localized(ctx.store, &file)?;
            let factory = TemplateFactory::from_json(id, json, Arc::clone(ctx.extensions.components()));
            factory.smoke_test()?;
            self.templates.insert(factory);
            summary.templates += 1;
        }

        self.graph.build_categories()?;
        let mappings = self.graph.build_entries(namespace, &self.templates)?;
        summary.objects = mappings.len();
        self.objects.extend(mappings);

        Ok(summary)
    }

    /// Content ids and their default-locale files for one kind, by id
    fn discover(
        &self,
        kind: ContentKind,
        namespace: &str,
        ctx: &LoadContext<'_>,
    ) -> Result<Vec<(ContentId, ContentId)>, BookError> {
        let dir = ctx.config.kind_dir(namespace, self.book.id().path(), kind)?;
        let mut found = Vec::new();
        for file in ctx.store.list_files(&dir)? {
            let Some(name) = ctx.config.relative_name(&dir, &file) else {
                continue;
            };
            let id = ContentId::new(namespace, name)?;
            tracing::debug!("Found {} {}", kind, id);
            found.push((id, file));
        }
        found.sort();
        Ok(found)
    }

    pub fn book(&self) -> &Book {
        &self.book
    }

    pub fn graph(&self) -> &BookGraph {
        &self.graph
    }

    pub fn templates(&self) -> &TemplateSet {
        &self.templates
    }

    pub fn objects(&self) -> &ObjectIndex {
        &self.objects
    }

    /// Icon of the index page, computed on full reload
    pub fn index_icon(&self) -> Option<&BookIcon> {
        self.index_icon.as_ref()
    }

    pub fn is_errored(&self) -> bool {
        self.errored
    }

    /// The error recorded by the last reload, for a diagnostic view
    pub fn last_error(&self) -> Option<&Arc<BookError>> {
        self.last_error.as_ref()
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn reads(&self) -> &ReadTracker {
        &self.reads
    }

    /// The entry page documenting an object
    pub fn entry_for_object(&self, object: &ObjectKey) -> Option<(&Entry, usize)> {
        let (id, page) = self.objects.get(object)?;
        Some((self.graph.entry(&id)?, page))
    }

    pub fn navigation_context<'a>(&'a self, environment: &'a dyn Environment) -> NavigationContext<'a> {
        NavigationContext::new(&self.graph, environment, &self.reads)
    }

    pub fn current_location(&self) -> ViewLocation {
        self.navigator.current_location()
    }

    pub fn open(&self, view: Box<dyn BookView>, push: bool, environment: &dyn Environment) -> bool {
        self.navigator.open(view, push, &self.navigation_context(environment))
    }

    pub fn set_top_entry(&self, entry: &ContentId, page: usize, environment: &dyn Environment) -> Result<(), BookError> {
        self.navigator
            .set_top_entry(entry, page, &self.navigation_context(environment))
    }

    pub fn check_valid_current_entry(&self, environment: &dyn Environment) -> bool {
        self.navigator
            .check_valid_current_entry(&self.navigation_context(environment))
    }

    pub fn read_state(&self, node: &ReadNode, environment: &dyn Environment) -> ReadState {
        self.reads.state(node, &self.graph, environment)
    }

    pub fn mark_read(&self, entry: &ContentId) -> Result<(), BookError> {
        let entry = self
            .graph
            .entry(entry)
            .ok_or_else(|| BookError::UnknownEntry(entry.clone()))?;
        self.reads.mark_read(entry);
        Ok(())
    }
}
