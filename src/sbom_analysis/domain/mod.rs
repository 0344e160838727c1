pub mod component;
pub mod dependency_graph;
pub mod dependency_tree;
pub mod relationship;
pub mod sbom_document;
pub mod vulnerability;

pub use component::{Component, ComponentId, ComponentType};
pub use dependency_graph::DependencyGraph;
pub use dependency_tree::{BackEdge, CycleDetected, DependencyTree, GraphAnalysis, TreeNode};
pub use relationship::Relationship;
pub use sbom_document::{DocumentEncoding, ParsedSbom, SbomFormat};
pub use vulnerability::{
    Advisory, ComponentVulnerabilities, CvssScore, Severity, SeverityBreakdown, SkippedLookup,
    VulnerabilityRecord, VulnerabilityReport,
};
