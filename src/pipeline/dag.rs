// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 deployflow contributors

//! Stage dependency graph
//!
//! Stages live in an arena keyed by name; edges point from a dependency
//! to the stage that waits on it. Edges are resolved by name lookup only.

use indexmap::IndexMap;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::errors::DeployflowError;
use crate::pipeline::Stage;

/// Visit state used by the cycle search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnStack,
    Done,
}

/// Dependency graph over a stage list
#[derive(Debug)]
pub struct StageGraph {
    graph: DiGraph<String, ()>,
    name_to_index: IndexMap<String, NodeIndex>,
}

impl StageGraph {
    /// Build the graph from stages whose references are already known to resolve.
    ///
    /// Unknown dependency names are reported rather than silently dropped.
    pub fn build(stages: &[Stage]) -> Result<Self, DeployflowError> {
        let mut graph = DiGraph::new();
        let mut name_to_index = IndexMap::with_capacity(stages.len());

        for stage in stages {
            let node = graph.add_node(stage.name.clone());
            name_to_index.insert(stage.name.clone(), node);
        }

        for stage in stages {
            let stage_node = name_to_index[&stage.name];
            for dep_name in &stage.depends_on {
                let dep_node = name_to_index.get(dep_name).ok_or_else(|| {
                    DeployflowError::UnknownDependency {
                        stage: stage.name.clone(),
                        dependency: dep_name.clone(),
                        available: name_to_index.keys().cloned().collect(),
                    }
                })?;
                graph.update_edge(*dep_node, stage_node, ());
            }
        }

        Ok(Self {
            graph,
            name_to_index,
        })
    }

    /// Find a cycle, returning the stage names along it with the first name repeated at the end.
    ///
    /// Depth-first over `dependsOn` edges in declaration order. Reaching a
    /// node that is still on the recursion stack closes a cycle.
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        let mut marks = vec![Mark::Unvisited; self.graph.node_count()];
        let mut path = Vec::new();

        for &start in self.name_to_index.values() {
            if marks[start.index()] == Mark::Unvisited {
                if let Some(cycle) = self.visit(start, &mut marks, &mut path) {
                    return Some(cycle.into_iter().map(|n| self.name_of(n).to_string()).collect());
                }
            }
        }

        None
    }

    fn visit(
        &self,
        node: NodeIndex,
        marks: &mut [Mark],
        path: &mut Vec<NodeIndex>,
    ) -> Option<Vec<NodeIndex>> {
        marks[node.index()] = Mark::OnStack;
        path.push(node);

        for dep in self.dependency_nodes(node) {
            match marks[dep.index()] {
                Mark::OnStack => {
                    let start = path.iter().position(|n| *n == dep).unwrap_or(0);
                    let mut cycle = path[start..].to_vec();
                    cycle.push(dep);
                    return Some(cycle);
                }
                Mark::Unvisited => {
                    if let Some(cycle) = self.visit(dep, marks, path) {
                        return Some(cycle);
                    }
                }
                Mark::Done => {}
            }
        }

        path.pop();
        marks[node.index()] = Mark::Done;
        None
    }

    /// Dependencies of a node in declaration order.
    ///
    /// petgraph walks adjacency lists newest-first, so the order is reversed here.
    fn dependency_nodes(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut deps: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(node, Direction::Incoming)
            .collect();
        deps.reverse();
        deps
    }

    fn name_of(&self, node: NodeIndex) -> &str {
        &self.graph[node]
    }

    /// Stage names in an order where every stage follows its dependencies
    pub fn topological_order_names(&self) -> Result<Vec<String>, DeployflowError> {
        toposort(&self.graph, None)
            .map(|nodes| {
                nodes
                    .into_iter()
                    .map(|n| self.name_of(n).to_string())
                    .collect()
            })
            .map_err(|_| DeployflowError::CircularDependency {
                path: self.find_cycle().unwrap_or_default(),
            })
    }

    /// Direct dependencies of a stage
    pub fn dependencies(&self, stage_name: &str) -> Option<Vec<String>> {
        let node = self.name_to_index.get(stage_name)?;
        Some(
            self.dependency_nodes(*node)
                .into_iter()
                .map(|n| self.name_of(n).to_string())
                .collect(),
        )
    }

    /// Generate Mermaid diagram of the stage graph
    pub fn to_mermaid(&self, stages: &[Stage]) -> String {
        let mut out = String::from("graph TD\n");

        for stage in stages {
            let id = crate::naming::to_job_id(&stage.name);
            if stage.manual_approval {
                out.push_str(&format!("    {}[/{} (manual)/]\n", id, stage.name));
            } else {
                out.push_str(&format!("    {}[{}]\n", id, stage.name));
            }
        }

        for edge in self.graph.raw_edges() {
            let from = crate::naming::to_job_id(self.name_of(edge.source()));
            let to = crate::naming::to_job_id(self.name_of(edge.target()));
            out.push_str(&format!("    {} --> {}\n", from, to));
        }

        out
    }

    /// Generate DOT diagram of the stage graph
    pub fn to_dot(&self, stages: &[Stage]) -> String {
        let mut out = String::from("digraph pipeline {\n");
        out.push_str("    rankdir=TB;\n");
        out.push_str("    node [shape=box, style=rounded];\n\n");

        for stage in stages.iter().filter(|s| s.manual_approval) {
            out.push_str(&format!("    \"{}\" [style=\"rounded,dashed\"];\n", stage.name));
        }

        for edge in self.graph.raw_edges() {
            out.push_str(&format!(
                "    \"{}\" -> \"{}\";\n",
                self.name_of(edge.source()),
                self.name_of(edge.target())
            ));
        }

        // Isolated nodes
        for (name, node) in &self.name_to_index {
            if self.graph.neighbors_undirected(*node).count() == 0 {
                out.push_str(&format!("    \"{}\";\n", name));
            }
        }

        out.push_str("}\n");
        out
    }

    /// Generate text representation of deployment order
    pub fn to_text(&self, stages: &[Stage]) -> Result<String, DeployflowError> {
        let order = self.topological_order_names()?;
        let mut out = String::new();

        for (i, name) in order.iter().enumerate() {
            let Some(stage) = stages.iter().find(|s| &s.name == name) else {
                continue;
            };
            let deps = self.dependencies(name).unwrap_or_default();

            out.push_str(&format!("{}. {}", i + 1, stage.name));
            if stage.manual_approval {
                out.push_str(" (manual)");
            }
            if !deps.is_empty() {
                out.push_str(&format!(" [depends: {}]", deps.join(", ")));
            }
            out.push('\n');
        }

        Ok(out)
    }
}
