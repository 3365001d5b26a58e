//! Field dependency graph for cascading selections.
//!
//! Nodes are field ids borrowed from the template; an edge `parent → child`
//! means the child's valid options depend on the parent's current value.
//! Fields refer to each other by id only, so the graph is an index over the
//! template rather than a web of references.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeSet, HashMap};

use crate::core::TemplateDefect;
use crate::model::{Field, Template};

/// Color states for cycle detection using DFS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    /// Node has not been visited.
    White,
    /// Node is currently being visited (in the DFS stack).
    Gray,
    /// Node has been fully visited.
    Black,
}

/// Parent/child graph over a template's fields.
#[derive(Debug)]
pub struct DependencyGraph<'a> {
    template: &'a Template,
    graph: DiGraph<&'a str, ()>,
    node_map: HashMap<&'a str, NodeIndex>,
}

impl<'a> DependencyGraph<'a> {
    /// Create a graph with one node per field and no edges.
    pub fn new(template: &'a Template) -> Self {
        let mut graph = DiGraph::new();
        let mut node_map = HashMap::new();
        for field in template.fields() {
            node_map.entry(field.id.as_str()).or_insert_with(|| graph.add_node(field.id.as_str()));
        }

        Self {
            template,
            graph,
            node_map,
        }
    }

    /// Add a `parent → child` edge between two known fields.
    ///
    /// Returns `false` when either id is unknown. Duplicate edges are ignored.
    pub fn add_dependency(&mut self, parent: &str, child: &str) -> bool {
        let (Some(&from), Some(&to)) = (self.node_map.get(parent), self.node_map.get(child)) else {
            return false;
        };
        if !self.graph.contains_edge(from, to) {
            self.graph.add_edge(from, to, ());
        }
        true
    }

    /// Fields whose options depend on `field_id`, in template order.
    #[must_use]
    pub fn children_of(&self, field_id: &str) -> Vec<&'a Field> {
        self.related(field_id, Direction::Outgoing)
    }

    /// Field that scopes `field_id`'s options.
    ///
    /// When a field has several incoming edges the first in template order wins.
    #[must_use]
    pub fn parent_of(&self, field_id: &str) -> Option<&'a Field> {
        self.related(field_id, Direction::Incoming).into_iter().next()
    }

    fn related(&self, field_id: &str, direction: Direction) -> Vec<&'a Field> {
        let Some(&index) = self.node_map.get(field_id) else {
            return Vec::new();
        };
        let mut neighbors: Vec<NodeIndex> =
            self.graph.neighbors_directed(index, direction).collect();
        neighbors.sort_unstable();
        neighbors.into_iter().filter_map(|n| self.template.field(self.graph[n])).collect()
    }

    /// Find every cycle, each reported once as a chain that repeats its first id.
    #[must_use]
    pub fn detect_cycles(&self) -> Vec<Vec<String>> {
        let mut colors: HashMap<NodeIndex, Color> =
            self.graph.node_indices().map(|n| (n, Color::White)).collect();
        let mut path = Vec::new();
        let mut cycles = Vec::new();
        let mut seen = BTreeSet::new();

        for node in self.graph.node_indices() {
            if matches!(colors.get(&node), Some(Color::White)) {
                self.dfs_visit(node, &mut colors, &mut path, &mut cycles, &mut seen);
            }
        }

        cycles
    }

    fn dfs_visit(
        &self,
        node: NodeIndex,
        colors: &mut HashMap<NodeIndex, Color>,
        path: &mut Vec<NodeIndex>,
        cycles: &mut Vec<Vec<String>>,
        seen: &mut BTreeSet<Vec<NodeIndex>>,
    ) {
        colors.insert(node, Color::Gray);
        path.push(node);

        let mut neighbors: Vec<NodeIndex> = self.graph.neighbors(node).collect();
        neighbors.sort_unstable();
        for neighbor in neighbors {
            match colors.get(&neighbor) {
                Some(Color::Gray) => {
                    if let Some(start) = path.iter().position(|n| *n == neighbor) {
                        let members = &path[start..];
                        let mut key = members.to_vec();
                        key.sort_unstable();
                        if seen.insert(key) {
                            let mut chain: Vec<String> =
                                members.iter().map(|n| self.graph[*n].to_string()).collect();
                            chain.push(self.graph[neighbor].to_string());
                            cycles.push(chain);
                        }
                    }
                }
                Some(Color::White) => self.dfs_visit(neighbor, colors, path, cycles, seen),
                _ => {}
            }
        }

        path.pop();
        colors.insert(node, Color::Black);
    }

    /// Whether the graph has no cycles.
    #[must_use]
    pub fn is_acyclic(&self) -> bool {
        !petgraph::algo::is_cyclic_directed(&self.graph)
    }

    /// Get the total number of nodes in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the total number of edges (dependencies) in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

/// Build the graph from every field's parent and child links.
///
/// Links that name a missing field are reported as defects and left out of the
/// graph; cycles are reported once each.
pub fn build_graph(template: &Template) -> (DependencyGraph<'_>, Vec<TemplateDefect>) {
    let mut graph = DependencyGraph::new(template);
    let mut defects = Vec::new();

    for field in template.fields() {
        if let Some(parent) = &field.parent_field_id
            && !graph.add_dependency(parent, &field.id)
        {
            defects.push(TemplateDefect::DanglingDependency {
                field_id: field.id.clone(),
                relation: "parent".to_string(),
                missing_id: parent.clone(),
            });
        }
        if let Some(child) = &field.child_field_id
            && !graph.add_dependency(&field.id, child)
        {
            defects.push(TemplateDefect::DanglingDependency {
                field_id: field.id.clone(),
                relation: "child".to_string(),
                missing_id: child.clone(),
            });
        }
    }

    for chain in graph.detect_cycles() {
        tracing::debug!(target: "resolver", "Dependency cycle: {}", chain.join(" → "));
        defects.push(TemplateDefect::DependencyCycle {
            chain,
        });
    }

    (graph, defects)
}
