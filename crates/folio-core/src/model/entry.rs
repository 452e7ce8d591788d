//! Entries: ordered pages belonging to one category

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use super::{BookIcon, Page, PageBuildContext, PageContent, TemplateResolver};
use crate::environment::{flag_matches, Environment};
use crate::{BookError, BookGraph, ContentId, Decoded, ObjectKey};

/// Entry document as written by content authors
#[derive(Debug, Clone, Deserialize)]
pub struct EntryDocument {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub pages: Vec<Value>,
    #[serde(default)]
    pub advancement: Option<String>,
    #[serde(default)]
    pub flag: String,
    #[serde(default)]
    pub priority: bool,
    #[serde(default)]
    pub secret: bool,
    #[serde(default)]
    pub read_by_default: bool,
    #[serde(default)]
    pub sortnum: i32,
    /// Object spec -> page index, for objects no page declares itself
    #[serde(default)]
    pub extra_recipe_mappings: IndexMap<String, usize>,
}

#[derive(Debug)]
pub struct Entry {
    id: ContentId,
    name: String,
    category: ContentId,
    icon: Option<BookIcon>,
    pages: Vec<Page>,
    advancement: Option<ContentId>,
    flag: String,
    priority: bool,
    secret: bool,
    read_by_default: bool,
    sortnum: i32,
    extra_mappings: Vec<(ObjectKey, usize)>,
    built: bool,
}

impl Entry {
    pub fn from_document(
        id: ContentId,
        document: EntryDocument,
        pages: Vec<Decoded<Box<dyn PageContent>>>,
        namespace: &str,
    ) -> Result<Self, BookError> {
        let category = ContentId::parse_in(&document.category, namespace)?;
        let icon = if document.icon.trim().is_empty() {
            None
        } else {
            Some(BookIcon::from_spec(&document.icon, namespace)?)
        };
        let advancement = document
            .advancement
            .filter(|a| !a.trim().is_empty())
            .map(|a| ContentId::parse_in(&a, namespace))
            .transpose()?;
        let extra_mappings = document
            .extra_recipe_mappings
            .iter()
            .map(|(spec, page)| {
                ObjectKey::from_spec(spec)
                    .map(|key| (key, *page))
                    .ok_or_else(|| BookError::malformed(&id, format!("invalid object '{}' in extra_recipe_mappings", spec)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            id,
            name: document.name,
            category,
            icon,
            pages: pages.into_iter().map(Page::from).collect(),
            advancement,
            flag: document.flag,
            priority: document.priority,
            secret: document.secret,
            read_by_default: document.read_by_default,
            sortnum: document.sortnum,
            extra_mappings,
            built: false,
        })
    }

    /// Inclusion predicate: entries behind an unset flag are dropped
    pub fn can_add(&self, environment: &dyn Environment) -> bool {
        flag_matches(environment, &self.flag)
    }

    /// Locked until the reader unlocks the entry's progress marker
    pub fn is_locked(&self, environment: &dyn Environment) -> bool {
        self.advancement
            .as_ref()
            .map_or(false, |advancement| !environment.is_unlocked(advancement))
    }

    pub fn id(&self) -> &ContentId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &ContentId {
        &self.category
    }

    pub fn icon(&self) -> Option<&BookIcon> {
        self.icon.as_ref()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn advancement(&self) -> Option<&ContentId> {
        self.advancement.as_ref()
    }

    pub fn is_priority(&self) -> bool {
        self.priority
    }

    pub fn is_secret(&self) -> bool {
        self.secret
    }

    pub fn is_read_by_default(&self) -> bool {
        self.read_by_default
    }

    pub fn sortnum(&self) -> i32 {
        self.sortnum
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    /// Pages are shown two-up; an entry always has at least one spread
    pub fn spread_count(&self) -> usize {
        ((self.pages.len() + 1) / 2).max(1)
    }

    /// Build every page, returning object associations as (object, page index)
    pub fn build(
        &self,
        namespace: &str,
        graph: &BookGraph,
        templates: &dyn TemplateResolver,
    ) -> Result<Vec<(ObjectKey, usize)>, BookError> {
        if let Some((object, page)) = self.extra_mappings.iter().find(|(_, page)| *page >= self.pages.len()) {
            return Err(BookError::malformed(
                &self.id,
                format!("{} is mapped to page {} of {}", object, page, self.pages.len()),
            ));
        }
        let mut associations = self.extra_mappings.clone();
        for (idx, page) in self.pages.iter().enumerate() {
            let ctx = PageBuildContext {
                namespace,
                entry: &self.id,
                page: idx,
                source: page.source(),
                graph,
                templates,
            };
            let objects = page.content().build(&ctx)?;
            associations.extend(objects.into_iter().map(|object| (object, idx)));
        }
        Ok(associations)
    }

    pub(crate) fn mark_built(&mut self) {
        self.built = true;
    }
}
