//! Assembly of nested report components from classification state
//!
//! Architecture: Anti-Corruption Layer - Ownership tables are translated to the public report shape
//! - A node's own bucket never repeats an identifier reported anywhere below it
//! - Assembly reads classification state only and can be repeated freely

use crate::domain::{Categories, Component};
use crate::engine::{Ownership, Selection};
use crate::taxonomy::{NodeId, Taxonomy};
use std::collections::BTreeSet;

/// Builds components bottom-up from a classified taxonomy
#[derive(Debug, Clone, Copy)]
pub struct ComponentAssembler<'a> {
    taxonomy: &'a Taxonomy,
    ownership: &'a Ownership,
}

impl<'a> ComponentAssembler<'a> {
    pub fn new(taxonomy: &'a Taxonomy, ownership: &'a Ownership) -> Self {
        Self { taxonomy, ownership }
    }

    /// Assemble the component of a node and all its descendants
    pub fn assemble(&self, id: NodeId) -> Component {
        let node = self.taxonomy.node(id);
        let children: Vec<Component> =
            node.children().iter().map(|&child| self.assemble(child)).collect();

        let reported_below: BTreeSet<&str> =
            children.iter().flat_map(|child| child.categories.identifiers()).collect();
        let own: Vec<String> = self
            .ownership
            .assigned(id)
            .iter()
            .filter(|identifier| !reported_below.contains(identifier.as_str()))
            .cloned()
            .collect();

        Component::new(node.name(), Categories::new(own, children))
    }

    /// Assemble the components a selection asks for
    ///
    /// A node filter naming no node selects nothing.
    pub fn select(&self, selection: &Selection) -> Vec<Component> {
        match selection {
            Selection::Visible => {
                self.taxonomy.visible_roots().map(|root| self.assemble(root)).collect()
            }
            Selection::Node(name) => {
                self.taxonomy.find(name).map(|id| self.assemble(id)).into_iter().collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ClassificationEngine;
    use crate::taxonomy::NodeDef;

    fn forest() -> Taxonomy {
        Taxonomy::new(
            "assembly",
            vec![
                NodeDef::new("Skip").exclusive([".+Obsolete.*"]).hidden(),
                NodeDef::new("Modeling")
                    .include(["OST_Generic.*"])
                    .child(NodeDef::new("Walls").include(["OST_Wall.*"]))
                    .child(
                        NodeDef::new("Structural")
                            .include(["OST_Struct.+"])
                            .child(NodeDef::new("Framing").include(["OST_StructuralFraming.*"])),
                    ),
                NodeDef::new("Rendering").include(["OST_Entourage.*"]),
            ],
        )
        .unwrap()
    }

    const POOL: &[&str] = &[
        "OST_GenericModel",
        "OST_Walls",
        "OST_StructuralColumns",
        "OST_StructuralFraming",
        "OST_Entourage",
        "OST_WallsObsolete",
    ];

    #[test]
    fn test_nested_categories() {
        let taxonomy = forest();
        let classification =
            ClassificationEngine::new(&taxonomy).classify(POOL.iter().copied()).unwrap();

        let modeling = classification.assembler().assemble(taxonomy.find("Modeling").unwrap());
        let json = serde_json::to_value(&modeling).unwrap();

        assert_eq!(json["name"], "Modeling");
        assert_eq!(json["categories"]["_"], serde_json::json!(["OST_GenericModel"]));
        assert_eq!(json["categories"]["Walls"]["_"], serde_json::json!(["OST_Walls"]));
        assert_eq!(
            json["categories"]["Structural"]["_"],
            serde_json::json!(["OST_StructuralColumns"])
        );
        assert_eq!(
            json["categories"]["Structural"]["Framing"]["_"],
            serde_json::json!(["OST_StructuralFraming"])
        );
    }

    #[test]
    fn test_ancestor_bucket_drops_descendant_identifiers() {
        let taxonomy = forest();
        let modeling = taxonomy.find("Modeling").unwrap();
        let walls = taxonomy.find("Walls").unwrap();

        // Both the node and its child hold the identifier
        let mut ownership = Ownership::for_taxonomy(&taxonomy);
        ownership.hold(modeling, "OST_GenericModel");
        ownership.hold(modeling, "OST_Walls");
        ownership.hold(walls, "OST_Walls");

        let component = ComponentAssembler::new(&taxonomy, &ownership).assemble(modeling);

        assert_eq!(component.categories.own, vec!["OST_GenericModel"]);
        assert_eq!(
            component.categories.child("Walls").map(|c| c.own.clone()),
            Some(vec!["OST_Walls".to_string()])
        );
        assert!(!component.categories.own.contains(&"OST_Walls".to_string()));
    }

    #[test]
    fn test_assembly_is_idempotent() {
        let taxonomy = forest();
        let classification =
            ClassificationEngine::new(&taxonomy).classify(POOL.iter().copied()).unwrap();
        let assembler = classification.assembler();

        let first = assembler.select(&Selection::Visible);
        let second = assembler.select(&Selection::Visible);

        assert_eq!(first, second);
    }

    #[test]
    fn test_default_selection_skips_hidden_roots() {
        let taxonomy = forest();
        let classification =
            ClassificationEngine::new(&taxonomy).classify(POOL.iter().copied()).unwrap();

        let names: Vec<String> = classification
            .assembler()
            .select(&Selection::Visible)
            .into_iter()
            .map(|c| c.name)
            .collect();

        assert_eq!(names, vec!["Modeling", "Rendering"]);
    }

    #[test]
    fn test_named_selection_reaches_nested_and_hidden_nodes() {
        let taxonomy = forest();
        let classification =
            ClassificationEngine::new(&taxonomy).classify(POOL.iter().copied()).unwrap();
        let assembler = classification.assembler();

        let framing = assembler.select(&Selection::Node("Framing".to_string()));
        assert_eq!(framing.len(), 1);
        assert_eq!(framing[0].categories.own, vec!["OST_StructuralFraming"]);

        let skip = assembler.select(&Selection::Node("Skip".to_string()));
        assert_eq!(skip[0].categories.own, vec!["OST_WallsObsolete"]);

        assert!(assembler.select(&Selection::Node("Nope".to_string())).is_empty());
    }

    #[test]
    fn test_empty_nodes_have_empty_buckets() {
        let taxonomy = forest();
        let classification = ClassificationEngine::new(&taxonomy).classify(["OST_Walls"]).unwrap();

        let rendering = classification.assembler().assemble(taxonomy.find("Rendering").unwrap());

        assert!(rendering.categories.own.is_empty());
        assert!(rendering.categories.is_empty());
    }
}
