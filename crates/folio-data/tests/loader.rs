use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};

use folio_core::model::pages::{TemplatePage, TextPage};
use folio_core::{Book, BookError, BookIcon, ContentId, Environment, ObjectKey, ReadNode, ReadState, StaticEnvironment, ViewLocation};
use folio_data::{BookContents, DirectoryStore, Extensions, LoadContext, LoaderConfig, Library, MemoryStore};

fn id(raw: &str) -> ContentId {
    raw.parse().unwrap()
}

fn put(store: &MemoryStore, path: &str, body: Value) {
    store.insert(id(&format!("folio:guide/{}", path)), body.to_string());
}

/// A small book: two categories, three entries, one template
fn guide_store() -> MemoryStore {
    let store = MemoryStore::new();
    put(&store, "book.json", json!({"name": "Guide", "version": "2", "book_item": "folio:guide_book"}));
    put(&store, "en_us/categories/basics.json", json!({"name": "Basics"}));
    put(&store, "en_us/categories/machines.json", json!({"name": "Machines", "parent": "basics"}));
    put(
        &store,
        "en_us/entries/welcome.json",
        json!({"name": "Welcome", "category": "basics", "pages": [{"type": "text", "text": "Hello"}]}),
    );
    put(
        &store,
        "en_us/entries/gears.json",
        json!({
            "name": "Gears",
            "category": "machines",
            "pages": [
                {"type": "text", "text": "Gears turn"},
                {"type": "crafting", "recipe": "game:gear"},
                {"type": "card", "item": "game:axle", "title": "Axle"}
            ]
        }),
    );
    put(
        &store,
        "en_us/entries/extras.json",
        json!({"name": "Extras", "category": "basics", "flag": "folio:extras"}),
    );
    put(
        &store,
        "en_us/templates/card.json",
        json!({"components": [
            {"type": "header", "text": "#title"},
            {"type": "item", "item": "#item", "link_recipe": true}
        ]}),
    );
    store
}

struct Fixture {
    store: MemoryStore,
    extensions: Extensions,
    config: LoaderConfig,
    environment: StaticEnvironment,
}

impl Fixture {
    fn new(store: MemoryStore) -> Self {
        Self {
            store,
            extensions: Extensions::new(),
            config: LoaderConfig::default(),
            environment: StaticEnvironment::new(),
        }
    }

    fn ctx(&self) -> LoadContext<'_> {
        LoadContext {
            store: &self.store,
            extensions: &self.extensions,
            config: &self.config,
            environment: &self.environment,
        }
    }

    fn loaded(&self) -> BookContents {
        let mut contents = BookContents::new(Book::new(id("folio:guide")));
        assert!(contents.reload(false, &self.ctx()), "{:?}", contents.last_error());
        contents
    }
}

fn snapshot(contents: &BookContents) -> (Vec<(ContentId, Vec<ContentId>)>, Vec<(ContentId, ContentId, usize)>, Vec<ContentId>) {
    let categories = contents
        .graph()
        .categories()
        .map(|c| (c.id().clone(), c.entries().to_vec()))
        .collect();
    let entries = contents
        .graph()
        .entries()
        .map(|e| (e.id().clone(), e.category().clone(), e.pages().len()))
        .collect();
    let templates = contents.templates().ids().cloned().collect();
    (categories, entries, templates)
}

#[test]
fn test_full_reload_builds_graph() {
    let fixture = Fixture::new(guide_store());
    let contents = fixture.loaded();

    assert!(!contents.is_errored());
    assert_eq!(contents.graph().category_count(), 2);
    // Flag-gated entry is dropped, not an error
    assert_eq!(contents.graph().entry_count(), 2);
    assert!(contents.graph().entry(&id("folio:extras")).is_none());

    let basics = contents.graph().category(&id("folio:basics")).unwrap();
    assert_eq!(basics.children(), &[id("folio:machines")]);
    assert!(contents.graph().categories().all(|c| c.is_built()));
    assert!(contents.graph().entries().all(|e| e.is_built()));
    assert_eq!(
        contents.index_icon(),
        Some(&BookIcon::Object(ObjectKey::from_spec("folio:guide_book").unwrap()))
    );
}

#[test]
fn test_flag_includes_entry() {
    let mut fixture = Fixture::new(guide_store());
    fixture.environment = StaticEnvironment::new().with_flag("folio:extras");
    let contents = fixture.loaded();
    assert!(contents.graph().entry(&id("folio:extras")).is_some());
}

#[test]
fn test_flag_gated_category() {
    let store = guide_store();
    put(&store, "en_us/categories/workshop.json", json!({"name": "Workshop", "flag": "folio:workshop"}));

    let mut fixture = Fixture::new(store);
    let contents = fixture.loaded();
    assert!(!contents.is_errored());
    assert_eq!(contents.graph().category_count(), 2);
    assert!(contents.graph().category(&id("folio:workshop")).is_none());

    fixture.environment = StaticEnvironment::new().with_flag("folio:workshop");
    let contents = fixture.loaded();
    assert_eq!(contents.graph().category_count(), 3);
    assert!(contents.graph().category(&id("folio:workshop")).is_some());
}

#[test]
fn test_entry_in_excluded_category_fails_reload() {
    let store = guide_store();
    put(&store, "en_us/categories/workshop.json", json!({"name": "Workshop", "flag": "folio:workshop"}));
    put(
        &store,
        "en_us/entries/lathe.json",
        json!({"name": "Lathe", "category": "workshop", "pages": []}),
    );
    let fixture = Fixture::new(store);

    let mut contents = BookContents::new(Book::new(id("folio:guide")));
    assert!(!contents.reload(false, &fixture.ctx()));
    assert!(contents.is_errored());
    assert!(matches!(
        contents.last_error().unwrap().root_cause(),
        BookError::Linkage { node, .. } if *node == id("folio:lathe")
    ));
}

#[test]
fn test_full_reload_is_idempotent() {
    let fixture = Fixture::new(guide_store());
    let mut contents = fixture.loaded();
    let first = snapshot(&contents);
    let objects = contents.objects().len();

    assert!(contents.reload(false, &fixture.ctx()));
    assert_eq!(snapshot(&contents), first);
    assert_eq!(contents.objects().len(), objects);
}

#[test]
fn test_object_mappings() {
    let fixture = Fixture::new(guide_store());
    let contents = fixture.loaded();

    let (entry, page) = contents
        .entry_for_object(&ObjectKey::from_spec("game:gear").unwrap())
        .unwrap();
    assert_eq!(entry.id(), &id("folio:gears"));
    assert_eq!(page, 1);

    // Contributed by the bound template page
    let (entry, page) = contents
        .entry_for_object(&ObjectKey::from_spec("game:axle").unwrap())
        .unwrap();
    assert_eq!(entry.id(), &id("folio:gears"));
    assert_eq!(page, 2);
}

#[test]
fn test_unknown_page_kind_keeps_payload() {
    let fixture = Fixture::new(guide_store());
    let contents = fixture.loaded();
    let gears = contents.graph().entry(&id("folio:gears")).unwrap();

    let card = &gears.pages()[2];
    assert_eq!(card.kind(), "card");
    assert_eq!(card.downcast::<TemplatePage>().unwrap().template, "card");
    assert_eq!(card.field("title"), Some(&json!("Axle")));
    assert!(gears.pages()[0].downcast::<TextPage>().is_some());
}

#[test]
fn test_missing_template_fails_reload() {
    let store = guide_store();
    store.remove(&id("folio:guide/en_us/templates/card.json"));
    let fixture = Fixture::new(store);

    let mut contents = BookContents::new(Book::new(id("folio:guide")));
    assert!(!contents.reload(false, &fixture.ctx()));
    let error = contents.last_error().unwrap();
    assert!(matches!(error.root_cause(), BookError::UnknownTemplate(t) if *t == id("folio:card")));
}

#[test]
fn test_addon_templates_are_seeded() {
    let store = guide_store();
    store.remove(&id("folio:guide/en_us/templates/card.json"));
    let fixture = Fixture::new(store);
    fixture
        .extensions
        .register_template_json(
            id("folio:card"),
            json!({"components": [{"type": "item", "item": "#item", "link_recipe": true}]}).to_string(),
        )
        .unwrap();

    let contents = fixture.loaded();
    assert!(contents.templates().contains(&id("folio:card")));
    assert!(contents
        .entry_for_object(&ObjectKey::from_spec("game:axle").unwrap())
        .is_some());
}

#[test]
fn test_broken_template_is_construction_error() {
    let store = guide_store();
    store.insert(id("folio:guide/en_us/templates/broken.json"), "{\"components\": [{\"text\": 1}]}");
    let fixture = Fixture::new(store);

    let mut contents = BookContents::new(Book::new(id("folio:guide")));
    assert!(!contents.reload(false, &fixture.ctx()));
    assert!(matches!(
        contents.last_error().unwrap().as_ref(),
        BookError::Construction { template, .. } if *template == id("folio:broken")
    ));
}

#[test]
fn test_orphan_entry_marks_errored() {
    let store = guide_store();
    put(&store, "en_us/entries/orphan.json", json!({"name": "Orphan", "category": "nowhere"}));
    let fixture = Fixture::new(store);

    let mut contents = BookContents::new(Book::new(id("folio:guide")));
    assert!(!contents.reload(false, &fixture.ctx()));
    assert!(contents.is_errored());
    assert!(matches!(
        contents.last_error().unwrap().as_ref(),
        BookError::Linkage { node, .. } if *node == id("folio:orphan")
    ));
    // Content assigned before the failure stays in place
    assert_eq!(contents.graph().category_count(), 2);
    assert!(contents.graph().entry(&id("folio:orphan")).is_none());
}

#[test]
fn test_reload_clears_error() {
    let store = guide_store();
    put(&store, "en_us/entries/orphan.json", json!({"name": "Orphan", "category": "nowhere"}));
    let fixture = Fixture::new(store);
    let mut contents = BookContents::new(Book::new(id("folio:guide")));
    assert!(!contents.reload(false, &fixture.ctx()));

    fixture.store.remove(&id("folio:guide/en_us/entries/orphan.json"));
    assert!(contents.reload(false, &fixture.ctx()));
    assert!(!contents.is_errored());
    assert!(contents.last_error().is_none());
}

#[test]
fn test_malformed_document() {
    let store = guide_store();
    store.insert(id("folio:guide/en_us/entries/bad.json"), "{\"name\": ");
    let fixture = Fixture::new(store);
    let mut contents = BookContents::new(Book::new(id("folio:guide")));
    assert!(!contents.reload(false, &fixture.ctx()));
    assert!(matches!(
        contents.last_error().unwrap().as_ref(),
        BookError::MalformedDocument { .. }
    ));
}

#[test]
fn test_locale_fallback() {
    let store = guide_store();
    put(
        &store,
        "fr_fr/entries/welcome.json",
        json!({"name": "Bienvenue", "category": "basics", "pages": [{"type": "text", "text": "Bonjour"}]}),
    );
    let mut fixture = Fixture::new(store);
    fixture.config = LoaderConfig::default().with_locale("fr_fr");
    let contents = fixture.loaded();

    assert_eq!(contents.graph().entry(&id("folio:welcome")).unwrap().name(), "Bienvenue");
    // No French override: the default locale is used without error
    assert_eq!(contents.graph().entry(&id("folio:gears")).unwrap().name(), "Gears");
}

#[test]
fn test_full_reload_resets_navigation() {
    let fixture = Fixture::new(guide_store());
    let mut contents = fixture.loaded();
    contents
        .set_top_entry(&id("folio:gears"), 3, &fixture.environment)
        .unwrap();
    assert_eq!(contents.navigator().depth(), 1);

    assert!(contents.reload(false, &fixture.ctx()));
    assert!(!contents.navigator().has_current_view());
    assert_eq!(contents.navigator().depth(), 0);
}

#[test]
fn test_read_state_after_load() {
    let fixture = Fixture::new(guide_store());
    let contents = fixture.loaded();
    let env = &fixture.environment;

    assert_eq!(contents.read_state(&ReadNode::Book, env), ReadState::Unread);
    contents.mark_read(&id("folio:welcome")).unwrap();
    assert_eq!(contents.read_state(&ReadNode::Category(id("folio:basics")), env), ReadState::Unread);
    contents.mark_read(&id("folio:gears")).unwrap();
    assert_eq!(contents.read_state(&ReadNode::Book, env), ReadState::Read);
}

fn library_store() -> MemoryStore {
    let store = guide_store();
    store.insert(
        id("addon:guide/en_us/entries/pistons.json"),
        json!({"name": "Pistons", "category": "folio:machines", "advancement": "game:redstone"}).to_string(),
    );
    store.insert(
        id("addon:guide/en_us/entries/springs.json"),
        json!({"name": "Springs", "category": "folio:basics"}).to_string(),
    );
    store
}

/// Environment whose unlocks can change while a library holds it
#[derive(Default)]
struct Progress {
    redstone: AtomicBool,
}

impl Environment for Progress {
    fn is_flag_enabled(&self, _flag: &str) -> bool {
        false
    }

    fn is_unlocked(&self, advancement: &ContentId) -> bool {
        advancement.path() == "redstone" && self.redstone.load(Ordering::SeqCst)
    }
}

fn library(progress: Arc<Progress>) -> Library {
    let store: Arc<MemoryStore> = Arc::new(library_store());
    let mut library = Library::new(store, LoaderConfig::default()).with_environment(progress);
    let guide = library.load_book(id("folio:guide"), "folio").unwrap();
    library.register_book(guide);
    library.register_book(Book::new(id("addon:guide")).extending(id("folio:guide")));
    library
}

#[test]
fn test_extension_books_add_content() {
    let mut library = library(Arc::new(Progress::default()));
    assert_eq!(library.reload_all(None), 0);
    assert!(library.extensions().is_frozen());

    let contents = library.get(&id("folio:guide")).unwrap();
    assert_eq!(contents.book().name(), "Guide");
    assert!(contents.graph().entry(&id("addon:pistons")).is_some());
    let basics = contents.graph().category(&id("folio:basics")).unwrap();
    assert!(basics.entries().contains(&id("addon:springs")));
    assert!(basics.is_built());
    assert_eq!(library.extensions_of(&id("folio:guide")), vec![&id("addon:guide")]);
}

#[test]
fn test_display_book() {
    let mut library = library(Arc::new(Progress::default()));
    library.reload_all(None);

    let sound = library
        .display_book(&id("folio:guide"), Some(&id("folio:gears")), 2)
        .unwrap();
    assert_eq!(sound, id("folio:book_open"));

    let contents = library.get(&id("folio:guide")).unwrap();
    assert!(contents.navigator().is_shown());
    assert_eq!(
        contents.current_location(),
        ViewLocation::Entry { entry: id("folio:gears"), spread: 1 }
    );
    assert_eq!(contents.reads().highest_spread(&id("folio:gears")), Some(1));

    assert!(matches!(
        library.display_book(&id("folio:missing"), None, 0),
        Err(BookError::UnknownBook(_))
    ));
}

#[test]
fn test_relock_clears_navigation() {
    let progress = Arc::new(Progress::default());
    progress.redstone.store(true, Ordering::SeqCst);
    let mut library = library(Arc::clone(&progress));
    library.reload_all(None);

    library
        .display_book(&id("folio:guide"), Some(&id("addon:pistons")), 0)
        .unwrap();
    let contents = library.get(&id("folio:guide")).unwrap();
    assert_eq!(contents.navigator().depth(), 1);

    progress.redstone.store(false, Ordering::SeqCst);
    library.refresh_locks();
    assert!(!contents.navigator().has_current_view());
    assert_eq!(contents.navigator().depth(), 0);
}

#[test]
fn test_reload_all_with_locale() {
    let store = library_store();
    store.insert(
        id("folio:guide/de_de/categories/basics.json"),
        json!({"name": "Grundlagen"}).to_string(),
    );
    let mut library = Library::new(Arc::new(store), LoaderConfig::default());
    library.register_book(Book::new(id("folio:guide")));
    assert_eq!(library.reload_all(Some("de_de")), 0);
    assert_eq!(library.config().locale, "de_de");
    let contents = library.get(&id("folio:guide")).unwrap();
    assert_eq!(contents.graph().category(&id("folio:basics")).unwrap().name(), "Grundlagen");
}

#[test]
fn test_directory_store_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let write = |rel: &str, body: Value| {
        let path = dir.path().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, body.to_string()).unwrap();
    };
    write("folio/guide/book.json", json!({"name": "Guide"}));
    write("folio/guide/en_us/categories/basics.json", json!({"name": "Basics"}));
    write(
        "folio/guide/en_us/entries/nested/welcome.json",
        json!({"name": "Welcome", "category": "basics"}),
    );

    let mut library = Library::new(Arc::new(DirectoryStore::new(dir.path())), LoaderConfig::default());
    let book = library.load_book(id("folio:guide"), "folio").unwrap();
    library.register_book(book);
    assert_eq!(library.reload_all(None), 0);

    let contents = library.get(&id("folio:guide")).unwrap();
    assert!(contents.graph().entry(&id("folio:nested/welcome")).is_some());
}
