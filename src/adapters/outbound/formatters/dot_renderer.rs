use crate::ports::outbound::TreeRenderer;
use crate::sbom_analysis::domain::{ComponentId, DependencyGraph, DependencyTree, GraphAnalysis};
use crate::shared::error::SbomError;
use crate::shared::Result;
use std::fmt::Write;

const GRAPH_HEADER: &str = "digraph DependencyGraph {\n    rankdir=LR;\n    node [shape=box, fontname=\"Helvetica\", fontsize=10];\n";

const BACK_EDGE_ATTRIBUTES: &str = "style=dashed, color=red, constraint=false, label=\"cycle\"";

/// Escapes a value for use inside a double-quoted DOT string
fn escape_dot(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' | '\r' => escaped.push(' '),
            other => escaped.push(other),
        }
    }
    escaped
}

/// GraphvizTreeRenderer adapter emitting one DOT cluster per root
///
/// Each visit of a component becomes its own node, so a component shared by
/// several paths is drawn once per path. Back-edges are drawn dashed and red
/// without influencing the layout.
pub struct GraphvizTreeRenderer;

impl GraphvizTreeRenderer {
    pub fn new() -> Self {
        Self
    }

    fn node_label(graph: &DependencyGraph, id: &ComponentId) -> String {
        match graph.component(id) {
            Some(component) => match component.version() {
                Some(version) => format!(
                    "{}\\n{}",
                    escape_dot(component.name()),
                    escape_dot(version)
                ),
                None => escape_dot(component.name()),
            },
            None => escape_dot(id.as_str()),
        }
    }

    fn render_tree(
        output: &mut String,
        graph: &DependencyGraph,
        tree_index: usize,
        tree: &DependencyTree,
    ) -> std::fmt::Result {
        let Some(root) = tree.root() else {
            return Ok(());
        };
        let node = |index: usize| format!("n{}_{}", tree_index, index);

        writeln!(output)?;
        writeln!(output, "    subgraph cluster_{} {{", tree_index)?;
        if tree.is_truncated() {
            writeln!(output, "        label=\"{} (truncated)\";", escape_dot(root.as_str()))?;
        } else {
            writeln!(output, "        label=\"{}\";", escape_dot(root.as_str()))?;
        }

        for (index, visit) in tree.nodes().iter().enumerate() {
            writeln!(
                output,
                "        {} [label=\"{}\"];",
                node(index),
                Self::node_label(graph, &visit.component)
            )?;
        }
        for (parent, child) in tree.tree_edges() {
            writeln!(output, "        {} -> {};", node(parent), node(child))?;
        }
        for back_edge in tree.back_edges() {
            writeln!(
                output,
                "        {} -> {} [{}];",
                node(back_edge.from),
                node(back_edge.to),
                BACK_EDGE_ATTRIBUTES
            )?;
        }

        writeln!(output, "    }}")
    }
}

impl Default for GraphvizTreeRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeRenderer for GraphvizTreeRenderer {
    fn render(&self, graph: &DependencyGraph, analysis: &GraphAnalysis) -> Result<String> {
        if analysis.trees.is_empty() && graph.is_empty() {
            return Err(SbomError::EmptyGraph.into());
        }

        let mut output = String::from(GRAPH_HEADER);
        for (tree_index, tree) in analysis.trees.iter().enumerate() {
            Self::render_tree(&mut output, graph, tree_index, tree)?;
        }
        output.push_str("}\n");

        Ok(output)
    }
}
