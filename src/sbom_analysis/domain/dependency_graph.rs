use super::{Component, ComponentId, Relationship};
use crate::shared::error::SbomError;
use std::collections::{BTreeMap, HashSet};

/// DependencyGraph aggregate: the component arena plus the adjacency
/// mapping from each component to the components it depends on.
///
/// Construction enforces that every relationship endpoint is a known
/// component; once built, the graph is read-only.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    components: BTreeMap<ComponentId, Component>,
    adjacency: BTreeMap<ComponentId, Vec<ComponentId>>,
    in_degree: BTreeMap<ComponentId, usize>,
    relationship_count: usize,
}

impl DependencyGraph {
    /// Builds the graph, failing on duplicate identifiers or on the first
    /// relationship endpoint (in declaration order) that is not a component.
    ///
    /// Children keep their declaration order; a repeated edge is kept once.
    pub fn new(
        components: Vec<Component>,
        relationships: &[Relationship],
    ) -> Result<Self, SbomError> {
        let mut arena = BTreeMap::new();
        for component in components {
            let id = component.id().clone();
            if arena.insert(id.clone(), component).is_some() {
                return Err(SbomError::DuplicateIdentifier {
                    identifier: id.to_string(),
                });
            }
        }

        let mut adjacency: BTreeMap<ComponentId, Vec<ComponentId>> = arena
            .keys()
            .map(|id| (id.clone(), Vec::new()))
            .collect();
        let mut in_degree: BTreeMap<ComponentId, usize> =
            arena.keys().map(|id| (id.clone(), 0)).collect();
        let mut seen_edges: HashSet<(&ComponentId, &ComponentId)> = HashSet::new();

        for relationship in relationships {
            let (parent, child) = (relationship.parent(), relationship.child());
            for endpoint in [parent, child] {
                if !arena.contains_key(endpoint) {
                    return Err(SbomError::DanglingReference {
                        identifier: endpoint.to_string(),
                        referenced_by: if endpoint == parent {
                            child.to_string()
                        } else {
                            parent.to_string()
                        },
                    });
                }
            }

            if !seen_edges.insert((parent, child)) {
                continue;
            }
            if let Some(children) = adjacency.get_mut(parent) {
                children.push(child.clone());
            }
            if let Some(degree) = in_degree.get_mut(child) {
                *degree += 1;
            }
        }

        let relationship_count = seen_edges.len();
        Ok(Self {
            components: arena,
            adjacency,
            in_degree,
            relationship_count,
        })
    }

    pub fn component(&self, id: &ComponentId) -> Option<&Component> {
        self.components.get(id)
    }

    /// Components in lexicographic identifier order
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    pub fn component_ids(&self) -> impl Iterator<Item = &ComponentId> {
        self.components.keys()
    }

    pub fn children(&self, id: &ComponentId) -> &[ComponentId] {
        self.adjacency.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn in_degree(&self, id: &ComponentId) -> usize {
        self.in_degree.get(id).copied().unwrap_or(0)
    }

    /// Components nothing depends on, sorted lexicographically
    pub fn roots(&self) -> Vec<ComponentId> {
        self.in_degree
            .iter()
            .filter(|(_, degree)| **degree == 0)
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Number of distinct edges
    pub fn relationship_count(&self) -> usize {
        self.relationship_count
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}
