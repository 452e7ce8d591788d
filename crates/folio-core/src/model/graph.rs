//! The linked category/entry graph of one book

use indexmap::IndexMap;

use super::{Category, Entry, TemplateResolver};
use crate::environment::Environment;
use crate::{BookError, ContentId, ObjectKey};

/// An object documented at a given page of an entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMapping {
    pub object: ObjectKey,
    pub entry: ContentId,
    pub page: usize,
}

/// Categories and entries of one book, keyed by id
#[derive(Debug, Default)]
pub struct BookGraph {
    categories: IndexMap<ContentId, Category>,
    entries: IndexMap<ContentId, Entry>,
}

impl BookGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.categories.clear();
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.entries.is_empty()
    }

    /// Add a category, replacing any previous one with the same id
    pub fn insert_category(&mut self, category: Category) {
        self.categories.insert(category.id().clone(), category);
    }

    /// Register an entry on its declared category and add it to the graph.
    ///
    /// Fails when the category is not in the graph; the entry is not added.
    pub fn link_entry(&mut self, entry: Entry) -> Result<(), BookError> {
        let category = self
            .categories
            .get_mut(entry.category())
            .ok_or_else(|| BookError::Linkage {
                node: entry.id().clone(),
                target: entry.category().to_string(),
            })?;
        category.add_entry(entry.id());
        self.entries.insert(entry.id().clone(), entry);
        Ok(())
    }

    pub fn category(&self, id: &ContentId) -> Option<&Category> {
        self.categories.get(id)
    }

    pub fn entry(&self, id: &ContentId) -> Option<&Entry> {
        self.entries.get(id)
    }

    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.values()
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn root_categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.values().filter(|c| c.is_root())
    }

    /// Entries of a category, in the category's order
    pub fn entries_in<'a>(&'a self, category: &'a Category) -> impl Iterator<Item = &'a Entry> + 'a {
        category.entries().iter().filter_map(move |id| self.entries.get(id))
    }

    /// A category is locked when it has content and all of it is locked
    pub fn is_category_locked(&self, id: &ContentId, environment: &dyn Environment) -> bool {
        let Some(category) = self.categories.get(id) else {
            return false;
        };
        if category.entries().is_empty() && category.children().is_empty() {
            return false;
        }
        self.entries_in(category).all(|e| e.is_locked(environment))
            && category
                .children()
                .iter()
                .all(|child| self.is_category_locked(child, environment))
    }

    /// Validate parents, sort entries and record children for every
    /// category not built yet. Runs after all entries are linked.
    pub fn build_categories(&mut self) -> Result<(), BookError> {
        let pending: Vec<ContentId> = self
            .categories
            .values()
            .filter(|c| !c.is_built())
            .map(|c| c.id().clone())
            .collect();

        for id in &pending {
            self.build_category(id)
                .map_err(|e| BookError::building("category", id, e))?;
        }
        self.sort_children();
        Ok(())
    }

    fn build_category(&mut self, id: &ContentId) -> Result<(), BookError> {
        let Some(category) = self.categories.get(id) else {
            return Ok(());
        };

        let parent = category.parent().cloned();
        if let Some(parent) = &parent {
            if !self.categories.contains_key(parent) {
                return Err(BookError::Linkage {
                    node: id.clone(),
                    target: parent.to_string(),
                });
            }
            self.check_acyclic(id)?;
        }

        let mut entries: Vec<&Entry> = self.entries_in(category).collect();
        entries.sort_by(|a, b| {
            b.is_priority()
                .cmp(&a.is_priority())
                .then(a.sortnum().cmp(&b.sortnum()))
                .then_with(|| a.name().cmp(b.name()))
        });
        let sorted: Vec<ContentId> = entries.iter().map(|e| e.id().clone()).collect();

        if let Some(parent) = parent.and_then(|p| self.categories.get_mut(&p)) {
            parent.add_child(id);
        }
        if let Some(category) = self.categories.get_mut(id) {
            category.finish_build(sorted);
        }
        Ok(())
    }

    fn check_acyclic(&self, id: &ContentId) -> Result<(), BookError> {
        let mut current = self.categories.get(id).and_then(|c| c.parent());
        let mut steps = 0;
        while let Some(parent) = current {
            if parent == id || steps > self.categories.len() {
                return Err(BookError::Linkage {
                    node: id.clone(),
                    target: format!("{} (cyclic parent chain)", parent),
                });
            }
            current = self.categories.get(parent).and_then(|c| c.parent());
            steps += 1;
        }
        Ok(())
    }

    fn sort_children(&mut self) {
        let order: IndexMap<ContentId, (i32, String)> = self
            .categories
            .values()
            .map(|c| (c.id().clone(), (c.sortnum(), c.name().to_string())))
            .collect();
        for category in self.categories.values_mut() {
            category.sort_children_by(|id| order.get(id).cloned());
        }
    }

    /// Build every entry not built yet, returning the object mappings its
    /// pages declare. Runs after [`BookGraph::build_categories`].
    pub fn build_entries(
        &mut self,
        namespace: &str,
        templates: &dyn TemplateResolver,
    ) -> Result<Vec<ObjectMapping>, BookError> {
        let pending: Vec<ContentId> = self
            .entries
            .values()
            .filter(|e| !e.is_built())
            .map(|e| e.id().clone())
            .collect();

        let mut mappings = Vec::new();
        for id in &pending {
            let Some(entry) = self.entries.get(id) else {
                continue;
            };
            let associations = entry
                .build(namespace, self, templates)
                .map_err(|e| BookError::building("entry", id, e))?;
            mappings.extend(associations.into_iter().map(|(object, page)| ObjectMapping {
                object,
                entry: id.clone(),
                page,
            }));
            if let Some(entry) = self.entries.get_mut(id) {
                entry.mark_built();
            }
        }
        Ok(mappings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::pages::page_registry;
    use crate::model::NoTemplates;
    use crate::{DocumentParser, StaticEnvironment};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn parser() -> DocumentParser {
        DocumentParser::new(Arc::new(page_registry()))
    }

    fn category(id: &str, doc: Value) -> Category {
        parser()
            .parse_category(id.parse().unwrap(), "folio", doc.to_string().as_bytes())
            .unwrap()
    }

    fn entry(id: &str, doc: Value) -> Entry {
        parser()
            .parse_entry(id.parse().unwrap(), "folio", doc.to_string().as_bytes())
            .unwrap()
    }

    fn id(raw: &str) -> ContentId {
        raw.parse().unwrap()
    }

    #[test]
    fn test_link_entry_requires_category() {
        let mut graph = BookGraph::new();
        let err = graph
            .link_entry(entry("folio:orphan", json!({"name": "Orphan", "category": "missing"})))
            .unwrap_err();
        assert!(matches!(err, BookError::Linkage { .. }));
        assert_eq!(graph.entry_count(), 0);
    }

    #[test]
    fn test_build_sorts_entries() {
        let mut graph = BookGraph::new();
        graph.insert_category(category("folio:basics", json!({"name": "Basics"})));
        graph.link_entry(entry("folio:b", json!({"name": "B", "category": "basics"}))).unwrap();
        graph.link_entry(entry("folio:a", json!({"name": "A", "category": "basics"}))).unwrap();
        graph.link_entry(entry("folio:late", json!({"name": "Late", "category": "basics", "sortnum": 5}))).unwrap();
        graph.link_entry(entry("folio:pinned", json!({"name": "Z", "category": "basics", "priority": true, "sortnum": 9}))).unwrap();

        graph.build_categories().unwrap();
        let basics = graph.category(&id("folio:basics")).unwrap();
        assert!(basics.is_built());
        let order: Vec<&str> = basics.entries().iter().map(|e| e.path()).collect();
        assert_eq!(order, vec!["pinned", "a", "b", "late"]);
    }

    #[test]
    fn test_build_records_children() {
        let mut graph = BookGraph::new();
        graph.insert_category(category("folio:root", json!({"name": "Root"})));
        graph.insert_category(category("folio:second", json!({"name": "Second", "parent": "root", "sortnum": 2})));
        graph.insert_category(category("folio:first", json!({"name": "First", "parent": "root", "sortnum": 1})));
        graph.build_categories().unwrap();

        let root = graph.category(&id("folio:root")).unwrap();
        assert_eq!(root.children(), &[id("folio:first"), id("folio:second")]);
        assert_eq!(graph.root_categories().count(), 1);
    }

    #[test]
    fn test_missing_parent_fails_build() {
        let mut graph = BookGraph::new();
        graph.insert_category(category("folio:child", json!({"name": "Child", "parent": "ghost"})));
        let err = graph.build_categories().unwrap_err();
        assert!(matches!(err.root_cause(), BookError::Linkage { .. }));
    }

    #[test]
    fn test_cyclic_parents_fail_build() {
        let mut graph = BookGraph::new();
        graph.insert_category(category("folio:a", json!({"name": "A", "parent": "b"})));
        graph.insert_category(category("folio:b", json!({"name": "B", "parent": "a"})));
        assert!(graph.build_categories().is_err());
    }

    #[test]
    fn test_build_entries_collects_mappings() {
        let mut graph = BookGraph::new();
        graph.insert_category(category("folio:basics", json!({"name": "Basics"})));
        graph
            .link_entry(entry(
                "folio:gears",
                json!({
                    "name": "Gears",
                    "category": "basics",
                    "pages": [
                        {"type": "text", "text": "intro"},
                        {"type": "spotlight", "item": "game:gear", "link_recipe": true}
                    ],
                    "extra_recipe_mappings": {"game:axle": 0}
                }),
            ))
            .unwrap();
        graph.build_categories().unwrap();
        let mappings = graph.build_entries("folio", &NoTemplates).unwrap();

        assert_eq!(mappings.len(), 2);
        assert!(mappings.contains(&ObjectMapping {
            object: ObjectKey::from_spec("game:gear").unwrap(),
            entry: id("folio:gears"),
            page: 1,
        }));
        assert!(graph.entry(&id("folio:gears")).unwrap().is_built());
    }

    #[test]
    fn test_extra_mapping_needs_object() {
        let err = parser()
            .parse_entry(
                id("folio:gears"),
                "folio",
                json!({"name": "Gears", "category": "basics", "extra_recipe_mappings": {"#3": 0}})
                    .to_string()
                    .as_bytes(),
            )
            .unwrap_err();
        assert!(matches!(err, BookError::MalformedDocument { .. }));
    }

    #[test]
    fn test_extra_mapping_past_last_page_fails_build() {
        let mut graph = BookGraph::new();
        graph.insert_category(category("folio:basics", json!({"name": "Basics"})));
        graph
            .link_entry(entry(
                "folio:gears",
                json!({
                    "name": "Gears",
                    "category": "basics",
                    "pages": [{"type": "text", "text": "intro"}],
                    "extra_recipe_mappings": {"game:axle": 1}
                }),
            ))
            .unwrap();
        graph.build_categories().unwrap();

        let err = graph.build_entries("folio", &NoTemplates).unwrap_err();
        assert!(matches!(err, BookError::Build { kind: "entry", .. }));
        assert!(matches!(err.root_cause(), BookError::MalformedDocument { .. }));
        assert!(!graph.entry(&id("folio:gears")).unwrap().is_built());
    }

    #[test]
    fn test_category_locking() {
        let mut graph = BookGraph::new();
        graph.insert_category(category("folio:secrets", json!({"name": "Secrets"})));
        graph.insert_category(category("folio:empty", json!({"name": "Empty"})));
        graph
            .link_entry(entry("folio:hidden", json!({"name": "Hidden", "category": "secrets", "advancement": "game:deep"})))
            .unwrap();
        graph.build_categories().unwrap();

        let env = StaticEnvironment::new();
        assert!(graph.is_category_locked(&id("folio:secrets"), &env));
        assert!(!graph.is_category_locked(&id("folio:empty"), &env));

        let unlocked = StaticEnvironment::new().with_unlocked(id("game:deep"));
        assert!(!graph.is_category_locked(&id("folio:secrets"), &unlocked));
    }
}
