//! Book metadata

use serde::{Deserialize, Serialize};

use crate::{BookError, ContentId, ObjectKey};

const ORDINAL_SUFFIXES: [&str; 10] = ["th", "st", "nd", "rd", "th", "th", "th", "th", "th", "th"];

/// Representative object used when a book declares no item of its own
pub const DEFAULT_BOOK_ITEM: &str = "folio:guide_book";

/// `book.json` as written by content authors
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BookDocument {
    pub name: String,
    pub landing_text: String,
    pub subtitle: String,
    pub version: String,
    pub index_icon: Option<String>,
    pub book_item: Option<String>,
    pub open_sound: Option<String>,
    pub flip_sound: Option<String>,
    /// Book this one contributes content to, for extension books
    pub extend: Option<String>,
}

impl Default for BookDocument {
    fn default() -> Self {
        Self {
            name: String::new(),
            landing_text: String::new(),
            subtitle: String::new(),
            version: "0".to_string(),
            index_icon: None,
            book_item: None,
            open_sound: None,
            flip_sound: None,
            extend: None,
        }
    }
}

/// A registered book
#[derive(Debug, Clone)]
pub struct Book {
    id: ContentId,
    owner: String,
    name: String,
    landing_text: String,
    subtitle: String,
    version: String,
    index_icon: Option<String>,
    book_item: Option<String>,
    open_sound: Option<ContentId>,
    flip_sound: Option<ContentId>,
    extend: Option<ContentId>,
}

/// How the book's edition should be presented
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edition {
    /// Version `0`: show the subtitle as-is
    Subtitle(String),
    /// Positive integer version, as an ordinal (`2nd`)
    Numbered(String),
    /// Non-numeric version
    Development,
}

impl Book {
    /// Book owned by the namespace of its id, with default metadata
    pub fn new(id: ContentId) -> Self {
        Self {
            owner: id.namespace().to_string(),
            name: id.path().to_string(),
            id,
            landing_text: String::new(),
            subtitle: String::new(),
            version: "0".to_string(),
            index_icon: None,
            book_item: None,
            open_sound: None,
            flip_sound: None,
            extend: None,
        }
    }

    pub fn from_document(id: ContentId, owner: impl Into<String>, document: BookDocument) -> Result<Self, BookError> {
        let owner = owner.into();
        let parse = |raw: Option<String>| raw.map(|r| ContentId::parse_in(&r, &owner)).transpose();

        Ok(Self {
            open_sound: parse(document.open_sound)?,
            flip_sound: parse(document.flip_sound)?,
            extend: parse(document.extend)?,
            id,
            name: document.name,
            landing_text: document.landing_text,
            subtitle: document.subtitle,
            version: document.version,
            index_icon: document.index_icon.filter(|icon| !icon.is_empty()),
            book_item: document.book_item,
            owner,
        })
    }

    pub fn from_json(id: ContentId, owner: impl Into<String>, json: &str) -> Result<Self, BookError> {
        let document: BookDocument = serde_json::from_str(json).map_err(|e| BookError::malformed(&id, e))?;
        Self::from_document(id, owner, document)
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = subtitle.into();
        self
    }

    pub fn with_index_icon(mut self, spec: impl Into<String>) -> Self {
        self.index_icon = Some(spec.into());
        self
    }

    pub fn with_open_sound(mut self, sound: ContentId) -> Self {
        self.open_sound = Some(sound);
        self
    }

    pub fn extending(mut self, target: ContentId) -> Self {
        self.extend = Some(target);
        self
    }

    pub fn id(&self) -> &ContentId {
        &self.id
    }

    /// Namespace owning the book's content files
    pub fn namespace(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn landing_text(&self) -> &str {
        &self.landing_text
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn extension_target(&self) -> Option<&ContentId> {
        self.extend.as_ref()
    }

    pub fn open_sound(&self) -> ContentId {
        self.open_sound
            .clone()
            .unwrap_or_else(|| ContentId::known("folio", "book_open"))
    }

    pub fn flip_sound(&self) -> ContentId {
        self.flip_sound
            .clone()
            .unwrap_or_else(|| ContentId::known("folio", "book_flip"))
    }

    /// Icon for the book's index: the explicit spec, else the book item
    pub fn index_icon(&self) -> Result<BookIcon, BookError> {
        match &self.index_icon {
            Some(spec) => BookIcon::from_spec(spec, &self.owner),
            None => {
                let item = self.book_item.as_deref().unwrap_or(DEFAULT_BOOK_ITEM);
                BookIcon::from_spec(item, &self.owner)
            }
        }
    }

    pub fn edition(&self) -> Edition {
        match self.version.trim().parse::<u32>() {
            Ok(0) => Edition::Subtitle(self.subtitle.clone()),
            Ok(version) => Edition::Numbered(ordinal(version)),
            Err(_) => Edition::Development,
        }
    }
}

/// `1` -> `1st`, `12` -> `12th`, `23` -> `23rd`
pub fn ordinal(n: u32) -> String {
    match n % 100 {
        11..=13 => format!("{}th", n),
        _ => format!("{}{}", n, ORDINAL_SUFFIXES[(n % 10) as usize]),
    }
}

/// Icon shown for a book, category or entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookIcon {
    Object(ObjectKey),
    Texture(ContentId),
}

impl BookIcon {
    /// Specs ending in `.png` are textures, everything else names an object
    pub fn from_spec(spec: &str, namespace: &str) -> Result<Self, BookError> {
        let spec = spec.trim();
        if spec.ends_with(".png") {
            return ContentId::parse_in(spec, namespace).map(BookIcon::Texture);
        }
        ObjectKey::from_spec(spec)
            .map(BookIcon::Object)
            .ok_or_else(|| BookError::InvalidId(spec.to_string()))
    }
}
