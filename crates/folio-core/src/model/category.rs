//! Categories group entries and may nest under a parent category

use serde::Deserialize;

use super::BookIcon;
use crate::environment::{flag_matches, Environment};
use crate::{BookError, ContentId};

/// Category document as written by content authors
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryDocument {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub flag: String,
    #[serde(default)]
    pub sortnum: i32,
    #[serde(default)]
    pub secret: bool,
}

#[derive(Debug, Clone)]
pub struct Category {
    id: ContentId,
    name: String,
    description: String,
    icon: Option<BookIcon>,
    parent: Option<ContentId>,
    flag: String,
    sortnum: i32,
    secret: bool,
    entries: Vec<ContentId>,
    children: Vec<ContentId>,
    built: bool,
}

impl Category {
    pub fn from_document(id: ContentId, document: CategoryDocument, namespace: &str) -> Result<Self, BookError> {
        let icon = if document.icon.trim().is_empty() {
            None
        } else {
            Some(BookIcon::from_spec(&document.icon, namespace)?)
        };
        let parent = document
            .parent
            .filter(|p| !p.trim().is_empty())
            .map(|p| ContentId::parse_in(&p, namespace))
            .transpose()?;

        Ok(Self {
            id,
            name: document.name,
            description: document.description,
            icon,
            parent,
            flag: document.flag,
            sortnum: document.sortnum,
            secret: document.secret,
            entries: Vec::new(),
            children: Vec::new(),
            built: false,
        })
    }

    /// Inclusion predicate: categories behind an unset flag are dropped
    pub fn can_add(&self, environment: &dyn Environment) -> bool {
        flag_matches(environment, &self.flag)
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn id(&self) -> &ContentId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn icon(&self) -> Option<&BookIcon> {
        self.icon.as_ref()
    }

    pub fn parent(&self) -> Option<&ContentId> {
        self.parent.as_ref()
    }

    pub fn sortnum(&self) -> i32 {
        self.sortnum
    }

    pub fn is_secret(&self) -> bool {
        self.secret
    }

    /// Entries registered on this category, sorted once built
    pub fn entries(&self) -> &[ContentId] {
        &self.entries
    }

    /// Direct subcategories, known once built
    pub fn children(&self) -> &[ContentId] {
        &self.children
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    /// Entries added after build send the category back through build
    pub(crate) fn add_entry(&mut self, entry: &ContentId) {
        if !self.entries.contains(entry) {
            self.entries.push(entry.clone());
            self.built = false;
        }
    }

    pub(crate) fn add_child(&mut self, child: &ContentId) {
        if !self.children.contains(child) {
            self.children.push(child.clone());
        }
    }

    pub(crate) fn sort_children_by<K: Ord>(&mut self, key: impl Fn(&ContentId) -> K) {
        self.children.sort_by_key(|child| key(child));
    }

    pub(crate) fn finish_build(&mut self, entries: Vec<ContentId>) {
        self.entries = entries;
        self.built = true;
    }
}
