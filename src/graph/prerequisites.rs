use crate::catalog::TaskCatalog;
use crate::error::{PricingError, PricingResult};
use crate::session::SprintLog;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use tracing::warn;

/// Prerequisite edges between catalog tasks, keyed by lowercase task name.
pub struct PrerequisiteGraph {
    pub graph: DiGraph<String, ()>,
    pub index: HashMap<String, NodeIndex>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingPrerequisite {
    pub task_name: String,
    pub prerequisite: String,
}

impl PrerequisiteGraph {
    /// Edges run prerequisite -> dependent. Names that are not in the catalog
    /// are skipped.
    pub fn build(catalog: &TaskCatalog) -> Self {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();

        for task in catalog.tasks() {
            let ix = graph.add_node(task.name.clone());
            index.insert(task.name.to_lowercase(), ix);
        }

        for task in catalog.tasks() {
            let Some(&dependent) = index.get(&task.name.to_lowercase()) else {
                continue;
            };
            for prerequisite in &task.prerequisites {
                match index.get(&prerequisite.trim().to_lowercase()) {
                    Some(&required) => {
                        graph.add_edge(required, dependent, ());
                    }
                    None => warn!(
                        task = %task.name,
                        prerequisite = %prerequisite,
                        "ignoring unknown prerequisite"
                    ),
                }
            }
        }

        Self { graph, index }
    }

    /// Task names with every prerequisite ahead of its dependents.
    pub fn topological_order(&self) -> PricingResult<Vec<String>> {
        let order = toposort(&self.graph, None).map_err(|cycle| {
            PricingError::invalid(format!(
                "prerequisite cycle involving '{}'",
                self.graph[cycle.node_id()]
            ))
        })?;
        Ok(order.into_iter().map(|ix| self.graph[ix].clone()).collect())
    }

    /// Log entries whose direct prerequisites are not in the log. Advisory only.
    pub fn missing_for(&self, log: &SprintLog) -> Vec<MissingPrerequisite> {
        let planned: Vec<String> = log
            .entries()
            .iter()
            .map(|entry| entry.task_name.to_lowercase())
            .collect();

        let mut missing = Vec::new();
        for entry in log.entries() {
            let Some(&ix) = self.index.get(&entry.task_name.to_lowercase()) else {
                continue;
            };
            for required in self
                .graph
                .neighbors_directed(ix, petgraph::Direction::Incoming)
            {
                let name = &self.graph[required];
                let item = MissingPrerequisite {
                    task_name: entry.task_name.clone(),
                    prerequisite: name.clone(),
                };
                if !planned.contains(&name.to_lowercase()) && !missing.contains(&item) {
                    missing.push(item);
                }
            }
        }
        missing
    }
}
