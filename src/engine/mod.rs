//! Two-phase classification of an identifier pool against a taxonomy
//!
//! Architecture: Domain Service - The engine reads an immutable taxonomy and writes per-run state
//! - The exclusive pass runs over the whole forest before any include claim is tried
//! - Traversal state is an explicit context threaded through a depth-first walk
//!
//! Exclusive claims must be disjoint: an exclusive match on an identifier that an
//! earlier exclusive claim already took is a `TaxonomyConflict`. Exclude patterns
//! veto a node's own matches before that check, so a vetoed identifier never
//! conflicts. Include claims only see identifiers no exclusive claim took; when
//! two include claims overlap, the one visited later in depth-first order owns
//! the identifier.

use crate::assembler::ComponentAssembler;
use crate::domain::{ComponentCollection, TaxonError, TaxonResult};
use crate::taxonomy::{NodeId, Taxonomy};
use std::collections::{BTreeMap, BTreeSet};

/// Identifier sets shared by every node of the forest during a pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraversalContext {
    /// Identifiers owned by some node
    pub used: BTreeSet<String>,
    /// Identifiers still open to claims
    pub remaining: BTreeSet<String>,
}

/// Side table of per-node ownership, indexed by node id
#[derive(Debug, Clone, Default)]
pub struct Ownership {
    assigned: Vec<BTreeSet<String>>,
    owners: BTreeMap<String, NodeId>,
}

impl Ownership {
    /// An empty table with one slot per node of the taxonomy
    pub fn for_taxonomy(taxonomy: &Taxonomy) -> Self {
        Self { assigned: vec![BTreeSet::new(); taxonomy.len()], owners: BTreeMap::new() }
    }

    /// Add an identifier to a node's set without releasing it elsewhere
    #[cfg(test)]
    pub(crate) fn hold(&mut self, node: NodeId, identifier: &str) {
        self.owners.insert(identifier.to_string(), node);
        self.assigned[node.index()].insert(identifier.to_string());
    }

    /// Identifiers owned by the node
    pub fn assigned(&self, node: NodeId) -> &BTreeSet<String> {
        &self.assigned[node.index()]
    }

    /// The node owning the identifier, if any
    pub fn owner(&self, identifier: &str) -> Option<NodeId> {
        self.owners.get(identifier).copied()
    }

    /// Number of identifiers owned by any node
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Give the identifier to `node`, returning the node it was taken from
    fn claim(&mut self, node: NodeId, identifier: String) -> Option<NodeId> {
        let previous = self.owners.insert(identifier.clone(), node).filter(|&p| p != node);
        if let Some(previous) = previous {
            self.assigned[previous.index()].remove(&identifier);
        }
        self.assigned[node.index()].insert(identifier);
        previous
    }
}

/// Mutable state of one classification run
#[derive(Debug, Clone)]
pub struct RunState {
    pool: BTreeSet<String>,
    context: TraversalContext,
    ownership: Ownership,
}

impl RunState {
    /// Fresh state for a pool: nothing used, everything remaining
    pub fn new<I, S>(taxonomy: &Taxonomy, identifiers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let pool: BTreeSet<String> = identifiers.into_iter().map(Into::into).collect();
        Self {
            context: TraversalContext { used: BTreeSet::new(), remaining: pool.clone() },
            pool,
            ownership: Ownership::for_taxonomy(taxonomy),
        }
    }

    /// The whole identifier pool
    pub fn pool(&self) -> &BTreeSet<String> {
        &self.pool
    }

    pub fn context(&self) -> &TraversalContext {
        &self.context
    }

    pub fn ownership(&self) -> &Ownership {
        &self.ownership
    }

    /// Close the include pass: identifiers owned by some node leave `remaining`
    fn settle(&mut self) {
        let used = &self.context.used;
        self.context.remaining.retain(|identifier| !used.contains(identifier));
    }
}

/// Runs the exclusive and include passes over a taxonomy
#[derive(Debug, Clone, Copy)]
pub struct ClassificationEngine<'t> {
    taxonomy: &'t Taxonomy,
}

impl<'t> ClassificationEngine<'t> {
    pub fn new(taxonomy: &'t Taxonomy) -> Self {
        Self { taxonomy }
    }

    /// Classify a pool: exclusive pass over the forest, then include pass over the forest
    pub fn classify<I, S>(&self, identifiers: I) -> TaxonResult<Classification<'t>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = RunState::new(self.taxonomy, identifiers);

        for &root in self.taxonomy.roots() {
            self.run_exclusive_pass(root, &mut state)?;
        }
        let exclusive_claims = state.context.used.len();

        for &root in self.taxonomy.roots() {
            self.run_include_pass(root, &mut state);
        }
        state.settle();

        tracing::info!(
            "Classified {} identifiers against '{}': {} exclusive, {} include, {} unclassified",
            state.pool.len(),
            self.taxonomy.name(),
            exclusive_claims,
            state.context.used.len() - exclusive_claims,
            state.context.remaining.len()
        );

        Ok(Classification { taxonomy: self.taxonomy, state })
    }

    /// Apply exclusive claims to the subtree rooted at `node`, in depth-first pre-order
    pub fn run_exclusive_pass(&self, node: NodeId, state: &mut RunState) -> TaxonResult<()> {
        for id in self.taxonomy.preorder(node) {
            self.claim_exclusives(id, state)?;
        }
        Ok(())
    }

    /// Apply include claims to the subtree rooted at `node`, in depth-first pre-order
    pub fn run_include_pass(&self, node: NodeId, state: &mut RunState) {
        for id in self.taxonomy.preorder(node) {
            self.claim_includes(id, state);
        }
    }

    fn claim_exclusives(&self, id: NodeId, state: &mut RunState) -> TaxonResult<()> {
        let node = self.taxonomy.node(id);
        if node.exclusives().is_empty() {
            return Ok(());
        }

        let mut claimed = Vec::new();
        for identifier in &state.pool {
            let Some(pattern) = node.exclusives().first_match(identifier) else {
                continue;
            };
            if node.excludes().is_match(identifier) {
                tracing::debug!(
                    "'{}' vetoed by an exclude pattern of '{}'",
                    identifier,
                    node.name()
                );
                continue;
            }
            if state.context.used.contains(identifier) {
                let owner = state
                    .ownership
                    .owner(identifier)
                    .map(|owner| self.taxonomy.node(owner).name().to_string())
                    .unwrap_or_default();
                return Err(TaxonError::conflict(node.name(), pattern, identifier.as_str(), owner));
            }
            claimed.push(identifier.clone());
        }

        tracing::debug!("'{}' claims {} identifiers exclusively", node.name(), claimed.len());

        for identifier in claimed {
            state.context.remaining.remove(&identifier);
            state.context.used.insert(identifier.clone());
            state.ownership.claim(id, identifier);
        }
        Ok(())
    }

    fn claim_includes(&self, id: NodeId, state: &mut RunState) {
        let node = self.taxonomy.node(id);
        if node.includes().is_empty() {
            return;
        }

        let claimed: Vec<String> = state
            .context
            .remaining
            .iter()
            .filter(|identifier| {
                node.includes().is_match(identifier) && !node.excludes().is_match(identifier)
            })
            .cloned()
            .collect();

        tracing::debug!("'{}' includes {} identifiers", node.name(), claimed.len());

        // `remaining` stays as is: later nodes may still include these identifiers
        for identifier in claimed {
            state.context.used.insert(identifier.clone());
            if let Some(previous) = state.ownership.claim(id, identifier) {
                tracing::debug!(
                    "'{}' takes an identifier over from '{}'",
                    node.name(),
                    self.taxonomy.node(previous).name()
                );
            }
        }
    }
}

/// Which components a collection reports
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    /// Every top-level node that is not hidden
    #[default]
    Visible,
    /// The first node with this name in a depth-first search over the forest
    Node(String),
}

impl Selection {
    /// `Node` when a name is given, `Visible` otherwise
    pub fn from_filter(name: Option<impl Into<String>>) -> Self {
        name.map_or(Self::Visible, |n| Self::Node(n.into()))
    }
}

/// The frozen outcome of a classification run
#[derive(Debug, Clone)]
pub struct Classification<'t> {
    taxonomy: &'t Taxonomy,
    state: RunState,
}

impl<'t> Classification<'t> {
    pub fn taxonomy(&self) -> &'t Taxonomy {
        self.taxonomy
    }

    pub fn pool(&self) -> &BTreeSet<String> {
        &self.state.pool
    }

    /// Identifiers owned by some node
    pub fn used(&self) -> &BTreeSet<String> {
        &self.state.context.used
    }

    /// Identifiers owned by no node
    pub fn remaining(&self) -> &BTreeSet<String> {
        &self.state.context.remaining
    }

    pub fn ownership(&self) -> &Ownership {
        &self.state.ownership
    }

    /// Identifiers owned by the node
    pub fn assigned(&self, node: NodeId) -> &BTreeSet<String> {
        self.state.ownership.assigned(node)
    }

    /// The node owning the identifier, if any
    pub fn owner(&self, identifier: &str) -> Option<NodeId> {
        self.state.ownership.owner(identifier)
    }

    /// Name of the node owning the identifier, if any
    pub fn owner_name(&self, identifier: &str) -> Option<&'t str> {
        self.owner(identifier).map(|id| self.taxonomy.node(id).name())
    }

    pub fn assembler(&self) -> ComponentAssembler<'_> {
        ComponentAssembler::new(self.taxonomy, &self.state.ownership)
    }

    /// Assemble the selected components and package them with run metadata
    pub fn collect(
        &self,
        version: impl Into<String>,
        selection: &Selection,
    ) -> ComponentCollection {
        let components = self.assembler().select(selection);
        ComponentCollection::build(version, self.pool(), self.used(), components)
    }
}
