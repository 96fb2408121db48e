//! Join planning: aliases for every table a statement touches and the JOIN
//! clauses connecting them to the main table.

use std::collections::HashSet;

use tracing::debug;

use crate::semantic::alias::{AliasAllocator, AliasMap};
use crate::semantic::error::{CompileResult, GenerationError};
use crate::semantic::relation_graph::{JoinPathStrategy, JoinStep, RelationGraph};
use crate::sql::expr::{table_col, ExprExt};
use crate::sql::query::{Join, TableRef};

/// Aliases and joins for one statement.
#[derive(Debug, Clone, Default)]
pub struct JoinPlan {
    pub aliases: AliasMap,
    pub joins: Vec<Join>,
}

pub struct JoinBuilder<'a> {
    graph: &'a RelationGraph,
    strategy: JoinPathStrategy,
}

impl<'a> JoinBuilder<'a> {
    pub fn new(graph: &'a RelationGraph, strategy: JoinPathStrategy) -> Self {
        Self { graph, strategy }
    }

    /// Join every table in `tables` to the first one.
    ///
    /// `tables` must be free of duplicates. Each requested table is aliased
    /// before the intermediate tables of its path. A path step is emitted once,
    /// and a table already in FROM/JOIN is never joined again.
    pub fn build(&self, tables: &[String]) -> CompileResult<JoinPlan> {
        let Some((main_table, others)) = tables.split_first() else {
            return Err(GenerationError::invalid_input("no tables referenced"));
        };

        let mut aliases = AliasAllocator::new();
        aliases.assign(main_table);

        let mut joined: HashSet<String> = HashSet::from([main_table.clone()]);
        let mut used_steps: HashSet<JoinStep> = HashSet::new();
        let mut joins = Vec::new();

        for table in others {
            aliases.assign(table);

            let path = self
                .graph
                .find_join_path(main_table, table, self.strategy)
                .ok_or_else(|| GenerationError::no_join_path(main_table, table))?;

            for step in path.steps {
                if !used_steps.insert(step.clone()) {
                    continue;
                }
                let from_alias = aliases.assign(&step.from_table);
                let to_alias = aliases.assign(&step.to_table);

                if !joined.insert(step.to_table.clone()) {
                    debug!(table = %step.to_table, "table already joined, skipping step");
                    continue;
                }
                joins.push(Join::new(
                    TableRef::new(&step.to_table).with_alias(&to_alias),
                    table_col(&from_alias, &step.from_column)
                        .eq(table_col(&to_alias, &step.to_column)),
                ));
            }
        }

        Ok(JoinPlan {
            aliases: aliases.into_map(),
            joins,
        })
    }
}
