use super::ComponentId;
use std::fmt;

/// One visit of a component during the depth-first unfolding of a root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub component: ComponentId,
    /// Index of the parent visit in the owning tree's arena
    pub parent: Option<usize>,
    pub depth: usize,
}

/// Edge from a visit back to one of its ancestors on the same path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackEdge {
    pub from: usize,
    pub to: usize,
}

/// Per-root unfolding of the dependency graph.
///
/// `nodes[0]` is always the root. A component reachable through several
/// paths appears once per path.
#[derive(Debug, Clone)]
pub struct DependencyTree {
    nodes: Vec<TreeNode>,
    back_edges: Vec<BackEdge>,
    truncated: bool,
}

impl DependencyTree {
    pub fn new(nodes: Vec<TreeNode>, back_edges: Vec<BackEdge>, truncated: bool) -> Self {
        Self {
            nodes,
            back_edges,
            truncated,
        }
    }

    pub fn root(&self) -> Option<&ComponentId> {
        self.nodes.first().map(|node| &node.component)
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn back_edges(&self) -> &[BackEdge] {
        &self.back_edges
    }

    /// True when the node budget stopped the unfolding early
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// (parent visit, child visit) pairs in visit order
    pub fn tree_edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| node.parent.map(|parent| (parent, index)))
    }
}

/// A dependency cycle, as the identifier path `a -> b -> ... -> a`.
///
/// Paths are stored rotated so the smallest identifier comes first, so the
/// same cycle found from different roots compares equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CycleDetected {
    path: Vec<ComponentId>,
}

impl CycleDetected {
    /// `members` lists each component on the cycle once, in edge order
    pub fn new(members: Vec<ComponentId>) -> Self {
        let mut path = members;
        if let Some(start) = path
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| a.cmp(b))
            .map(|(index, _)| index)
        {
            path.rotate_left(start);
        }
        if let Some(first) = path.first().cloned() {
            path.push(first);
        }
        Self { path }
    }

    /// Closed path; first and last entries are the same component
    pub fn path(&self) -> &[ComponentId] {
        &self.path
    }

    /// Distinct components on the cycle
    pub fn len(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for CycleDetected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<&str> = self.path.iter().map(ComponentId::as_str).collect();
        write!(f, "{}", rendered.join(" -> "))
    }
}

/// Result of walking a dependency graph from its roots
#[derive(Debug, Clone, Default)]
pub struct GraphAnalysis {
    /// Components with in-degree zero, sorted
    pub roots: Vec<ComponentId>,
    /// Starting points chosen because no root reaches them
    pub fallback_roots: Vec<ComponentId>,
    /// One tree per root, then one per fallback root
    pub trees: Vec<DependencyTree>,
    pub cycles: Vec<CycleDetected>,
}

impl GraphAnalysis {
    pub fn has_cycles(&self) -> bool {
        !self.cycles.is_empty()
    }

    pub fn total_visits(&self) -> usize {
        self.trees.iter().map(DependencyTree::len).sum()
    }
}
