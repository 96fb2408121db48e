//! RelationGraph - foreign-key graph between catalog tables.
//!
//! One node per table, one directed edge per declared relation. Edge indices
//! follow declaration order, which the first-found search relies on.
//!
//! The module is organized into submodules:
//! - `path`: join path resolution (depth-first and breadth-first)

mod path;


use std::collections::{HashMap, HashSet};
use std::fmt;

use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sql::dialect::helpers::is_plain_identifier;

/// Errors raised while building a relation graph.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("invalid identifier '{0}' in relation")]
    InvalidIdentifier(String),

    #[error("malformed column reference '{0}', expected 'table.column'")]
    MalformedReference(String),

    #[error("relation {0} references its own table")]
    SelfReference(String),

    #[error("relation {0} is declared twice")]
    DuplicateRelation(String),
}

/// One directed foreign-key edge: `from_table.from_column -> to_table.to_column`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    pub from_table: String,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
}

impl Relation {
    pub fn new(from_table: &str, from_column: &str, to_table: &str, to_column: &str) -> Self {
        Self {
            from_table: from_table.into(),
            from_column: from_column.into(),
            to_table: to_table.into(),
            to_column: to_column.into(),
        }
    }

    /// Parse a relation from two `table.column` references.
    pub fn parse(from: &str, to: &str) -> Result<Self, GraphError> {
        let (from_table, from_column) = split_reference(from)?;
        let (to_table, to_column) = split_reference(to)?;
        Ok(Self::new(from_table, from_column, to_table, to_column))
    }

    fn identifiers(&self) -> [&str; 4] {
        [
            &self.from_table,
            &self.from_column,
            &self.to_table,
            &self.to_column,
        ]
    }
}

fn split_reference(reference: &str) -> Result<(&str, &str), GraphError> {
    match reference.split_once('.') {
        Some((table, column)) if !table.is_empty() && !column.is_empty() => Ok((table, column)),
        _ => Err(GraphError::MalformedReference(reference.into())),
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} -> {}.{}",
            self.from_table, self.from_column, self.to_table, self.to_column
        )
    }
}

/// One join step, oriented in the direction of travel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct JoinStep {
    pub from_table: String,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
}

impl JoinStep {
    fn forward(relation: &Relation) -> Self {
        Self {
            from_table: relation.from_table.clone(),
            from_column: relation.from_column.clone(),
            to_table: relation.to_table.clone(),
            to_column: relation.to_column.clone(),
        }
    }

    fn reverse(relation: &Relation) -> Self {
        Self {
            from_table: relation.to_table.clone(),
            from_column: relation.to_column.clone(),
            to_table: relation.from_table.clone(),
            to_column: relation.from_column.clone(),
        }
    }
}

/// An ordered sequence of join steps from a start table to an end table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JoinPath {
    pub steps: Vec<JoinStep>,
}

impl JoinPath {
    pub fn new(steps: Vec<JoinStep>) -> Self {
        Self { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, JoinStep> {
        self.steps.iter()
    }

    /// Tables visited by the path, start table first.
    pub fn tables(&self) -> Vec<&str> {
        let mut tables = Vec::with_capacity(self.steps.len() + 1);
        if let Some(first) = self.steps.first() {
            tables.push(first.from_table.as_str());
        }
        tables.extend(self.steps.iter().map(|s| s.to_table.as_str()));
        tables
    }
}

impl<'a> IntoIterator for &'a JoinPath {
    type Item = &'a JoinStep;
    type IntoIter = std::slice::Iter<'a, JoinStep>;

    fn into_iter(self) -> Self::IntoIter {
        self.steps.iter()
    }
}

/// How join paths are chosen when several exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinPathStrategy {
    /// Depth-first, first path in relation declaration order.
    #[default]
    FirstFound,
    /// Breadth-first, fewest joins.
    Shortest,
}

/// Foreign-key graph over the catalog's tables.
#[derive(Debug, Clone)]
pub struct RelationGraph {
    graph: DiGraph<String, Relation>,
    node_indices: HashMap<String, NodeIndex>,
}

impl RelationGraph {
    /// Build the graph, rejecting malformed, self-referencing and duplicate relations.
    pub fn new(relations: impl IntoIterator<Item = Relation>) -> Result<Self, GraphError> {
        let mut graph = DiGraph::new();
        let mut node_indices: HashMap<String, NodeIndex> = HashMap::new();
        let mut seen: HashSet<Relation> = HashSet::new();

        for relation in relations {
            if let Some(bad) = relation
                .identifiers()
                .into_iter()
                .find(|ident| !is_plain_identifier(ident))
            {
                return Err(GraphError::InvalidIdentifier(bad.into()));
            }
            if relation.from_table == relation.to_table {
                return Err(GraphError::SelfReference(relation.to_string()));
            }
            if !seen.insert(relation.clone()) {
                return Err(GraphError::DuplicateRelation(relation.to_string()));
            }

            let from = *node_indices
                .entry(relation.from_table.clone())
                .or_insert_with(|| graph.add_node(relation.from_table.clone()));
            let to = *node_indices
                .entry(relation.to_table.clone())
                .or_insert_with(|| graph.add_node(relation.to_table.clone()));
            graph.add_edge(from, to, relation);
        }

        Ok(Self {
            graph,
            node_indices,
        })
    }

    /// The target `(table, column)` of the relation declared on `table.column`.
    pub fn get_related_table(&self, table: &str, column: &str) -> Option<(&str, &str)> {
        self.graph
            .edge_weights()
            .find(|r| r.from_table == table && r.from_column == column)
            .map(|r| (r.to_table.as_str(), r.to_column.as_str()))
    }

    /// All relations in declaration order.
    pub fn relations(&self) -> Vec<&Relation> {
        self.graph.edge_weights().collect()
    }

    /// Tables that take part in at least one relation, in first-seen order.
    pub fn tables(&self) -> Vec<&str> {
        self.graph.node_weights().map(String::as_str).collect()
    }

    pub fn contains_table(&self, table: &str) -> bool {
        self.node_indices.contains_key(table)
    }
}
