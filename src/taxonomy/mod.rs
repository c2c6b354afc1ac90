//! Taxonomy definition: an immutable forest of rule nodes
//!
//! Architecture: Repository - Nodes live in an arena and are addressed by `NodeId`
//! - Definitions are authored as nested `NodeDef` values and compiled once
//! - Per-run ownership is kept outside the arena, so one taxonomy serves many runs

pub mod builtin;

use crate::domain::{TaxonError, TaxonResult, OWN_BUCKET};
use crate::patterns::PatternSet;
use std::collections::HashSet;

/// Index of a node inside its taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Position of the node in the arena; ids are handed out in depth-first pre-order
    pub fn index(self) -> usize {
        self.0
    }
}

/// Authoring form of a taxonomy node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeDef {
    pub name: String,
    pub exclusives: Vec<String>,
    pub includes: Vec<String>,
    pub excludes: Vec<String>,
    pub children: Vec<NodeDef>,
    pub hidden: bool,
}

impl NodeDef {
    /// Create an empty node definition
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    /// Add exclusive claim patterns
    pub fn exclusive<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclusives.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Add include claim patterns
    pub fn include<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.includes.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Add exclude veto patterns
    pub fn exclude<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excludes.extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Append a child node
    pub fn child(mut self, child: NodeDef) -> Self {
        self.children.push(child);
        self
    }

    /// Keep the node out of default output
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

/// A compiled taxonomy node
#[derive(Debug, Clone)]
pub struct TaxonomyNode {
    name: String,
    exclusives: PatternSet,
    includes: PatternSet,
    excludes: PatternSet,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    hidden: bool,
    depth: usize,
}

impl TaxonomyNode {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn exclusives(&self) -> &PatternSet {
        &self.exclusives
    }

    pub fn includes(&self) -> &PatternSet {
        &self.includes
    }

    pub fn excludes(&self) -> &PatternSet {
        &self.excludes
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Distance from the forest root level (top-level nodes have depth 0)
    pub fn depth(&self) -> usize {
        self.depth
    }
}

/// Counts describing a taxonomy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaxonomyStats {
    pub nodes: usize,
    pub hidden_nodes: usize,
    pub exclusive_patterns: usize,
    pub include_patterns: usize,
    pub exclude_patterns: usize,
}

/// An immutable forest of taxonomy nodes
#[derive(Debug, Clone)]
pub struct Taxonomy {
    name: String,
    nodes: Vec<TaxonomyNode>,
    roots: Vec<NodeId>,
}

impl Taxonomy {
    /// Compile a forest of node definitions
    pub fn new(name: impl Into<String>, definitions: Vec<NodeDef>) -> TaxonResult<Self> {
        let mut taxonomy = Self { name: name.into(), nodes: Vec::new(), roots: Vec::new() };

        ensure_unique_names(&definitions, None)?;
        for definition in definitions {
            let id = taxonomy.insert(definition, None, 0)?;
            taxonomy.roots.push(id);
        }

        tracing::debug!(
            "Compiled taxonomy '{}' with {} nodes ({} top-level)",
            taxonomy.name,
            taxonomy.nodes.len(),
            taxonomy.roots.len()
        );

        Ok(taxonomy)
    }

    fn insert(
        &mut self,
        definition: NodeDef,
        parent: Option<NodeId>,
        depth: usize,
    ) -> TaxonResult<NodeId> {
        ensure_unique_names(&definition.children, Some(&definition.name))?;

        let compile = |patterns: Vec<String>| {
            PatternSet::new(patterns).map_err(|e| {
                TaxonError::pattern(format!("Node '{}': {}", definition.name, e))
            })
        };
        let exclusives = compile(definition.exclusives.clone())?;
        let includes = compile(definition.includes.clone())?;
        let excludes = compile(definition.excludes.clone())?;

        let id = NodeId(self.nodes.len());
        self.nodes.push(TaxonomyNode {
            name: definition.name,
            exclusives,
            includes,
            excludes,
            children: Vec::new(),
            parent,
            hidden: definition.hidden,
            depth,
        });

        let mut children = Vec::with_capacity(definition.children.len());
        for child in definition.children {
            children.push(self.insert(child, Some(id), depth + 1)?);
        }
        self.nodes[id.0].children = children;

        Ok(id)
    }

    /// Name the taxonomy was registered under
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Top-level nodes in declaration order
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Node by id
    ///
    /// Ids are only handed out by this taxonomy; an id from another taxonomy may panic.
    pub fn node(&self, id: NodeId) -> &TaxonomyNode {
        &self.nodes[id.0]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every node with its id, in depth-first pre-order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &TaxonomyNode)> {
        self.nodes.iter().enumerate().map(|(index, node)| (NodeId(index), node))
    }

    /// Depth-first pre-order walk of the subtree rooted at `root`
    pub fn preorder(&self, root: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.node(id).children.iter().rev());
        }
        order
    }

    /// First node named `name` in a depth-first search over the forest
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.roots
            .iter()
            .flat_map(|&root| self.preorder(root))
            .find(|&id| self.node(id).name == name)
    }

    /// Names from the top-level ancestor down to the node
    pub fn path(&self, id: NodeId) -> Vec<&str> {
        let mut path = vec![self.node(id).name()];
        let mut current = self.node(id).parent;
        while let Some(parent) = current {
            path.push(self.node(parent).name());
            current = self.node(parent).parent;
        }
        path.reverse();
        path
    }

    /// Top-level nodes shown when no node filter is given
    pub fn visible_roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.roots.iter().copied().filter(|&id| !self.node(id).hidden)
    }

    pub fn stats(&self) -> TaxonomyStats {
        self.nodes.iter().fold(TaxonomyStats::default(), |mut stats, node| {
            stats.nodes += 1;
            stats.hidden_nodes += usize::from(node.hidden);
            stats.exclusive_patterns += node.exclusives.len();
            stats.include_patterns += node.includes.len();
            stats.exclude_patterns += node.excludes.len();
            stats
        })
    }
}

/// Sibling names are used as output keys and must not collide, with each other
/// or with the own bucket
fn ensure_unique_names(siblings: &[NodeDef], parent: Option<&str>) -> TaxonResult<()> {
    let scope = || parent.map_or_else(|| "the top level".to_string(), |p| format!("'{p}'"));
    let mut seen = HashSet::new();
    for sibling in siblings {
        if sibling.name == OWN_BUCKET {
            return Err(TaxonError::definition(format!(
                "Node name '{}' under {} is reserved for the own bucket",
                sibling.name,
                scope()
            )));
        }
        if !seen.insert(sibling.name.as_str()) {
            return Err(TaxonError::definition(format!(
                "Duplicate node name '{}' under {}",
                sibling.name,
                scope()
            )));
        }
    }
    Ok(())
}
