//! Command-line inspector: loads one book and prints what a reader would see

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use folio_core::navigation::NavigationSubscriber;
use folio_core::{Category, ContentId, Edition, Environment, ReadNode, ReadState, StaticEnvironment, ViewLocation};
use folio_data::{BookContents, DirectoryStore, Library, LoaderConfig};

/// Load a book from a content directory and print its structure
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(about = "Loads a book from <root>/<namespace>/<path> and prints its categories, entries and read state")]
struct Args {
    /// Content root directory
    root: PathBuf,

    /// Book id, as namespace:path
    book: String,

    /// Locale to read, falling back to the default locale per file
    #[arg(short, long)]
    locale: Option<String>,

    /// Loader configuration file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Environment flag to enable (can be specified multiple times)
    #[arg(short = 'f', long = "flag")]
    flags: Vec<String>,

    /// Treat every entry as unlocked
    #[arg(long)]
    unlock_all: bool,

    /// Extension book adding content to the book (can be specified multiple times)
    #[arg(short = 'x', long = "extension")]
    extensions: Vec<String>,

    /// Entry to open, as namespace:path
    #[arg(short, long)]
    entry: Option<String>,

    /// Page of the entry to open
    #[arg(short, long, default_value_t = 0)]
    page: usize,
}

/// Logs every view the book moves to
struct ViewLogger;

impl NavigationSubscriber for ViewLogger {
    fn on_view_change(&self, location: &ViewLocation) {
        info!("Now showing {}", location);
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match run(Args::parse()) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let mut config = match &args.config {
        Some(path) => LoaderConfig::from_json(path).with_context(|| format!("reading {}", path.display()))?,
        None => LoaderConfig::default(),
    };
    if let Some(locale) = &args.locale {
        config.locale = locale.clone();
    }

    let mut environment = StaticEnvironment::new();
    for flag in &args.flags {
        environment.set_flag(flag.as_str(), true);
    }
    if args.unlock_all {
        environment = environment.unlocking_everything();
    }

    let book_id: ContentId = args.book.parse().context("invalid book id")?;
    let store = Arc::new(DirectoryStore::new(&args.root));
    let mut library = Library::new(store, config).with_environment(Arc::new(environment));

    let book = library
        .load_book(book_id.clone(), book_id.namespace())
        .with_context(|| format!("loading book {}", book_id))?;
    library.register_book(book);
    for raw in &args.extensions {
        let id: ContentId = raw.parse().context("invalid extension id")?;
        let extension = library
            .load_book(id.clone(), id.namespace())
            .map(|b| b.extending(book_id.clone()))
            .with_context(|| format!("loading extension {}", id))?;
        library.register_book(extension);
    }

    library.reload_all(None);
    let contents = library
        .get(&book_id)
        .with_context(|| format!("{} is an extension, not a book", book_id))?;

    if let Some(error) = contents.last_error() {
        eprintln!("book {} failed to load: {}", book_id, error);
        let mut source = error.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {}", cause);
            source = cause.source();
        }
        return Ok(ExitCode::FAILURE);
    }

    let logger: Arc<dyn NavigationSubscriber> = Arc::new(ViewLogger);
    contents.navigator().add_subscriber(&logger);
    if let Some(raw) = &args.entry {
        let entry: ContentId = raw.parse().context("invalid entry id")?;
        library.display_book(&book_id, Some(&entry), args.page)?;
    }

    print_book(contents, library.environment());
    Ok(ExitCode::SUCCESS)
}

fn print_book(contents: &BookContents, environment: &dyn Environment) {
    let book = contents.book();
    let edition = match book.edition() {
        Edition::Subtitle(subtitle) => subtitle,
        Edition::Numbered(ordinal) => format!("{} edition", ordinal),
        Edition::Development => "development edition".to_string(),
    };
    println!("{} ({}) - {}", book.name(), book.id(), edition);
    if let Some(icon) = contents.index_icon() {
        println!("  icon: {:?}", icon);
    }
    println!(
        "  {} categories, {} entries, {} templates, {} documented objects",
        contents.graph().category_count(),
        contents.graph().entry_count(),
        contents.templates().len(),
        contents.objects().len()
    );
    println!("  read state: {}", marker(contents.read_state(&ReadNode::Book, environment)));

    for category in contents.graph().root_categories() {
        print_category(contents, category, environment, 1);
    }

    let location = contents.current_location();
    if location != ViewLocation::Landing {
        println!("current view: {}", location);
        for previous in contents.navigator().back_stack() {
            println!("  back: {}", previous);
        }
    }
}

fn print_category(contents: &BookContents, category: &Category, environment: &dyn Environment, depth: usize) {
    let indent = "  ".repeat(depth);
    let graph = contents.graph();
    let locked = if graph.is_category_locked(category.id(), environment) { " [locked]" } else { "" };
    println!(
        "{}{} {} ({}){}",
        indent,
        marker(contents.read_state(&ReadNode::Category(category.id().clone()), environment)),
        category.name(),
        category.id(),
        locked
    );

    for entry in graph.entries_in(category) {
        let locked = if entry.is_locked(environment) { " [locked]" } else { "" };
        println!(
            "{}  {} {} ({}, {} pages){}",
            indent,
            marker(contents.read_state(&ReadNode::Entry(entry.id().clone()), environment)),
            entry.name(),
            entry.id(),
            entry.pages().len(),
            locked
        );
    }
    for child in category.children() {
        if let Some(child) = graph.category(child) {
            print_category(contents, child, environment, depth + 1);
        }
    }
}

fn marker(state: ReadState) -> &'static str {
    match state {
        ReadState::Read => " ",
        ReadState::PartiallyRead => "~",
        ReadState::Unread => "*",
    }
}
