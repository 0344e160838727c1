use crate::sbom_analysis::domain::{
    BackEdge, ComponentId, CycleDetected, DependencyGraph, DependencyTree, GraphAnalysis, TreeNode,
};
use std::collections::{BTreeSet, HashMap, HashSet};

/// DependencyAnalyzer service for walking a dependency graph
///
/// Computes the root set, unfolds one tree per root and records every
/// cycle met on the way. Pure business logic: no I/O, no recursion.
pub struct DependencyAnalyzer;

/// One frame of the explicit depth-first stack
struct Frame {
    node: usize,
    next_child: usize,
}

impl DependencyAnalyzer {
    /// Maximum visits per unfolded tree
    /// Diamond-heavy graphs grow exponentially when repeated per path
    pub const MAX_TREE_NODES: usize = 50_000;

    /// Walks the graph from its roots
    ///
    /// Roots are the components with in-degree zero, in lexicographic order.
    /// Components no root reaches (a fully cyclic graph, or a detached
    /// cycle) get a tree of their own, seeded from the smallest unreached
    /// identifier, and a warning is logged.
    pub fn analyze(graph: &DependencyGraph) -> GraphAnalysis {
        Self::analyze_with_budget(graph, Self::MAX_TREE_NODES)
    }

    pub fn analyze_with_budget(graph: &DependencyGraph, max_tree_nodes: usize) -> GraphAnalysis {
        let roots = graph.roots();
        let mut reached: HashSet<ComponentId> = HashSet::new();
        let mut cycles: BTreeSet<CycleDetected> = BTreeSet::new();
        let mut trees = Vec::with_capacity(roots.len());

        for root in &roots {
            let tree = Self::unfold(graph, root, max_tree_nodes, &mut cycles);
            reached.extend(tree.nodes().iter().map(|node| node.component.clone()));
            trees.push(tree);
        }

        let mut fallback_roots = Vec::new();
        while let Some(start) = graph.component_ids().find(|id| !reached.contains(*id)) {
            let start = start.clone();
            tracing::warn!(
                component = %start,
                "no root reaches this component; unfolding from it as a fallback root"
            );
            let tree = Self::unfold(graph, &start, max_tree_nodes, &mut cycles);
            reached.extend(tree.nodes().iter().map(|node| node.component.clone()));
            trees.push(tree);
            fallback_roots.push(start);
        }

        for cycle in &cycles {
            tracing::debug!(cycle = %cycle, "dependency cycle detected");
        }

        GraphAnalysis {
            roots,
            fallback_roots,
            trees,
            cycles: cycles.into_iter().collect(),
        }
    }

    /// Depth-first unfolding of `root` with an explicit stack.
    ///
    /// `on_path` maps each component on the current path to its visit index;
    /// meeting one of them again records a back-edge instead of descending.
    pub fn unfold(
        graph: &DependencyGraph,
        root: &ComponentId,
        max_tree_nodes: usize,
        cycles: &mut BTreeSet<CycleDetected>,
    ) -> DependencyTree {
        let mut nodes = vec![TreeNode {
            component: root.clone(),
            parent: None,
            depth: 0,
        }];
        let mut back_edges = Vec::new();
        let mut truncated = false;
        let mut on_path: HashMap<ComponentId, usize> = HashMap::from([(root.clone(), 0)]);
        let mut stack = vec![Frame {
            node: 0,
            next_child: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            let current = frame.node;
            let children = graph.children(&nodes[current].component);

            let Some(child) = children.get(frame.next_child) else {
                on_path.remove(&nodes[current].component);
                stack.pop();
                continue;
            };
            frame.next_child += 1;

            if let Some(&ancestor) = on_path.get(child) {
                back_edges.push(BackEdge {
                    from: current,
                    to: ancestor,
                });
                let members = stack
                    .iter()
                    .map(|f| nodes[f.node].component.clone())
                    .skip_while(|id| id != child)
                    .collect();
                cycles.insert(CycleDetected::new(members));
                continue;
            }

            if nodes.len() >= max_tree_nodes {
                if !truncated {
                    tracing::warn!(
                        root = %root,
                        limit = max_tree_nodes,
                        "dependency tree truncated; too many paths to unfold"
                    );
                }
                truncated = true;
                continue;
            }

            let index = nodes.len();
            let depth = nodes[current].depth + 1;
            nodes.push(TreeNode {
                component: child.clone(),
                parent: Some(current),
                depth,
            });
            on_path.insert(child.clone(), index);
            stack.push(Frame {
                node: index,
                next_child: 0,
            });
        }

        DependencyTree::new(nodes, back_edges, truncated)
    }
}
