//! Alias allocation for the tables of one statement.
//!
//! Aliases are `t0`, `t1`, ... handed out in first-seen order. An allocator
//! lives for a single compilation and is dropped with it.

use std::collections::{HashMap, HashSet};

/// Assigns each table a unique short alias.
#[derive(Debug, Clone, Default)]
pub struct AliasAllocator {
    by_table: HashMap<String, String>,
    order: Vec<String>,
    taken: HashSet<String>,
    next: usize,
}

impl AliasAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Alias for `table`, allocating the next free `t<N>` on first sight.
    pub fn assign(&mut self, table: &str) -> String {
        if let Some(alias) = self.by_table.get(table) {
            return alias.clone();
        }

        let alias = loop {
            let candidate = format!("t{}", self.next);
            self.next += 1;
            if !self.taken.contains(&candidate) {
                break candidate;
            }
        };

        self.taken.insert(alias.clone());
        self.by_table.insert(table.to_string(), alias.clone());
        self.order.push(table.to_string());
        alias
    }

    /// Mark `alias` as taken without binding it to a table.
    pub fn reserve(&mut self, alias: &str) {
        self.taken.insert(alias.to_string());
    }

    pub fn get(&self, table: &str) -> Option<&str> {
        self.by_table.get(table).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Freeze the allocation into a map.
    pub fn into_map(self) -> AliasMap {
        let mut by_table = self.by_table;
        let entries = self
            .order
            .into_iter()
            .filter_map(|table| by_table.remove(&table).map(|alias| (table, alias)))
            .collect();
        AliasMap { entries }
    }
}

/// Table-to-alias mapping in first-seen order. The first entry is the main table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasMap {
    entries: Vec<(String, String)>,
}

impl AliasMap {
    pub fn get(&self, table: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(t, _)| t == table)
            .map(|(_, a)| a.as_str())
    }

    pub fn contains(&self, table: &str) -> bool {
        self.get(table).is_some()
    }

    /// The main table and its alias.
    pub fn main(&self) -> Option<(&str, &str)> {
        self.entries
            .first()
            .map(|(t, a)| (t.as_str(), a.as_str()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(t, a)| (t.as_str(), a.as_str()))
    }

    pub fn tables(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(t, _)| t.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
