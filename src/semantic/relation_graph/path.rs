//! Join path resolution for RelationGraph.
//!
//! Relations are walked in either direction. Both searches keep a visited set
//! of tables, so no path repeats an edge and cyclic schemas terminate.

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use tracing::debug;

use super::{JoinPath, JoinPathStrategy, JoinStep, RelationGraph};

/// An edge incident to a node, seen from that node.
#[derive(Clone, Copy)]
struct Incident {
    edge: EdgeIndex,
    other: NodeIndex,
    forward: bool,
}

/// Parent information for path reconstruction.
struct ParentInfo {
    parent: NodeIndex,
    step: Incident,
}

impl RelationGraph {
    /// Find a join path from `start` to `end`.
    ///
    /// Returns `None` when the tables are the same, unknown, or disconnected.
    pub fn find_join_path(
        &self,
        start: &str,
        end: &str,
        strategy: JoinPathStrategy,
    ) -> Option<JoinPath> {
        if start == end {
            return None;
        }
        let start_idx = *self.node_indices.get(start)?;
        let end_idx = *self.node_indices.get(end)?;

        let path = match strategy {
            JoinPathStrategy::FirstFound => {
                let mut visited = HashSet::new();
                self.depth_first(start_idx, end_idx, &mut visited)
                    .map(JoinPath::new)
            }
            JoinPathStrategy::Shortest => self.breadth_first(start_idx, end_idx),
        };

        debug!(
            start,
            end,
            ?strategy,
            steps = path.as_ref().map(JoinPath::len),
            "resolved join path"
        );
        path
    }

    /// Whether any chain of relations connects the two tables.
    pub fn has_path(&self, start: &str, end: &str) -> bool {
        self.find_join_path(start, end, JoinPathStrategy::Shortest)
            .is_some()
    }

    /// Edges touching `node` in declaration order, both orientations.
    fn incident(&self, node: NodeIndex) -> Vec<Incident> {
        let mut edges: Vec<Incident> = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .map(|e| Incident {
                edge: e.id(),
                other: e.target(),
                forward: true,
            })
            .chain(
                self.graph
                    .edges_directed(node, Direction::Incoming)
                    .map(|e| Incident {
                        edge: e.id(),
                        other: e.source(),
                        forward: false,
                    }),
            )
            .collect();
        edges.sort_by_key(|i| i.edge);
        edges
    }

    fn step(&self, incident: Incident) -> JoinStep {
        let relation = &self.graph[incident.edge];
        if incident.forward {
            JoinStep::forward(relation)
        } else {
            JoinStep::reverse(relation)
        }
    }

    /// Depth-first search: a direct edge to `end` wins, otherwise recurse
    /// through each unvisited neighbour. The visited set is shared across
    /// branches.
    fn depth_first(
        &self,
        current: NodeIndex,
        end: NodeIndex,
        visited: &mut HashSet<NodeIndex>,
    ) -> Option<Vec<JoinStep>> {
        visited.insert(current);
        let edges = self.incident(current);

        if let Some(direct) = edges.iter().find(|i| i.other == end) {
            return Some(vec![self.step(*direct)]);
        }

        for incident in edges {
            if visited.contains(&incident.other) {
                continue;
            }
            if let Some(rest) = self.depth_first(incident.other, end, visited) {
                let mut steps = Vec::with_capacity(rest.len() + 1);
                steps.push(self.step(incident));
                steps.extend(rest);
                return Some(steps);
            }
        }

        None
    }

    /// Breadth-first search with parent pointers.
    fn breadth_first(&self, start: NodeIndex, end: NodeIndex) -> Option<JoinPath> {
        let mut visited: HashSet<NodeIndex> = HashSet::new();
        let mut parents: HashMap<NodeIndex, ParentInfo> = HashMap::new();
        let mut queue: VecDeque<NodeIndex> = VecDeque::new();

        queue.push_back(start);
        visited.insert(start);

        while let Some(current) = queue.pop_front() {
            for incident in self.incident(current) {
                let neighbor = incident.other;
                if visited.contains(&neighbor) {
                    continue;
                }

                parents.insert(
                    neighbor,
                    ParentInfo {
                        parent: current,
                        step: incident,
                    },
                );

                if neighbor == end {
                    return Some(self.reconstruct_path(start, end, &parents));
                }

                visited.insert(neighbor);
                queue.push_back(neighbor);
            }
        }

        None
    }

    /// Walk parent pointers back from `end`, then reverse.
    fn reconstruct_path(
        &self,
        start: NodeIndex,
        end: NodeIndex,
        parents: &HashMap<NodeIndex, ParentInfo>,
    ) -> JoinPath {
        let mut steps = Vec::new();
        let mut current = end;

        while current != start {
            let info = &parents[&current];
            steps.push(self.step(info.step));
            current = info.parent;
        }

        steps.reverse();
        JoinPath::new(steps)
    }
}
