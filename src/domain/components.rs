//! Output records of a classification run
//!
//! Architecture: Value Objects - Components mirror the taxonomy shape with identifiers attached
//! - A component exposes the node's own bucket under `_` and one nested entry per child
//! - The collection aggregates top-level components with run metadata

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeSet;

/// Key of the bucket holding identifiers owned by a node itself
pub const OWN_BUCKET: &str = "_";

/// Classified identifiers of one taxonomy node and its descendants
///
/// Serializes as a map whose first key is `_` (the node's own sorted
/// identifiers) followed by one entry per child, in taxonomy order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Categories {
    /// Identifiers owned by the node and by none of its descendants, sorted
    pub own: Vec<String>,
    /// Child components in taxonomy order
    pub children: Vec<Component>,
}

impl Categories {
    /// Categories of a node
    pub fn new(own: Vec<String>, children: Vec<Component>) -> Self {
        Self { own, children }
    }

    /// Categories of a child by name
    pub fn child(&self, name: &str) -> Option<&Categories> {
        self.children.iter().find(|c| c.name == name).map(|c| &c.categories)
    }

    /// Every identifier in this subtree, own bucket first, then children depth-first
    pub fn identifiers(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_identifiers(&mut out);
        out
    }

    fn collect_identifiers<'a>(&'a self, out: &mut Vec<&'a str>) {
        out.extend(self.own.iter().map(String::as_str));
        for child in &self.children {
            child.categories.collect_identifiers(out);
        }
    }

    /// Number of identifiers in this subtree
    pub fn len(&self) -> usize {
        self.own.len() + self.children.iter().map(|c| c.categories.len()).sum::<usize>()
    }

    /// Whether no identifier is classified anywhere in this subtree
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Serialize for Categories {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1 + self.children.len()))?;
        map.serialize_entry(OWN_BUCKET, &self.own)?;
        for child in &self.children {
            map.serialize_entry(&child.name, &child.categories)?;
        }
        map.end()
    }
}

/// The report record for one taxonomy node
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct Component {
    /// Display name of the node
    pub name: String,
    /// Own bucket and nested child categories
    pub categories: Categories,
}

impl Component {
    pub fn new(name: impl Into<String>, categories: Categories) -> Self {
        Self { name: name.into(), categories }
    }
}

/// Run metadata attached to a collection
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct CollectionMeta {
    /// Label of the identifier pool (e.g. the host application version)
    pub version: String,
    /// Size of the identifier pool
    pub total: usize,
    /// Number of identifiers owned by some node
    pub included: usize,
    /// Identifiers owned by no node, sorted
    pub excluded: Vec<String>,
}

/// Top-level result of a classification run
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct ComponentCollection {
    pub meta: CollectionMeta,
    pub components: Vec<Component>,
}

impl ComponentCollection {
    /// Package components with the counts of a finished run
    pub fn build(
        version: impl Into<String>,
        pool: &BTreeSet<String>,
        used: &BTreeSet<String>,
        components: Vec<Component>,
    ) -> Self {
        Self {
            meta: CollectionMeta {
                version: version.into(),
                total: pool.len(),
                included: used.len(),
                excluded: pool.difference(used).cloned().collect(),
            },
            components,
        }
    }

    /// Top-level component by name
    pub fn component(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.name == name)
    }

    /// Whether any identifier of the pool was left unclassified
    pub fn has_excluded(&self) -> bool {
        !self.meta.excluded.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn sample_component() -> Component {
        let leaf = Component::new(
            "Topography",
            Categories::new(vec!["OST_Topography".to_string()], Vec::new()),
        );
        Component::new("Site", Categories::new(vec!["OST_SiteProperty".to_string()], vec![leaf]))
    }

    #[test]
    fn test_categories_serialize_own_bucket_first() {
        let json = serde_json::to_string(&sample_component()).unwrap();

        assert_eq!(
            json,
            r#"{"name":"Site","categories":{"_":["OST_SiteProperty"],"Topography":{"_":["OST_Topography"]}}}"#
        );
    }

    #[test]
    fn test_identifiers_cover_subtree() {
        let component = sample_component();

        assert_eq!(component.categories.identifiers(), vec!["OST_SiteProperty", "OST_Topography"]);
        assert_eq!(component.categories.len(), 2);
        assert!(!component.categories.is_empty());
        assert_eq!(
            component.categories.child("Topography").map(|c| c.own.clone()),
            Some(vec!["OST_Topography".to_string()])
        );
        assert!(component.categories.child("Nope").is_none());
    }

    #[test]
    fn test_collection_meta_counts() {
        let pool = set(&["A", "B", "C"]);
        let used = set(&["B"]);

        let collection = ComponentCollection::build("2021", &pool, &used, vec![sample_component()]);

        assert_eq!(collection.meta.version, "2021");
        assert_eq!(collection.meta.total, 3);
        assert_eq!(collection.meta.included, 1);
        assert_eq!(collection.meta.excluded, vec!["A", "C"]);
        assert!(collection.has_excluded());
        assert!(collection.component("Site").is_some());

        let value = serde_json::to_value(&collection).unwrap();
        assert_eq!(value["meta"]["total"], 3);
        assert!(value["components"][0]["categories"]["_"].is_array());
    }
}
