// SPDX-License-Identifier: Apache-2.0

use super::port::CellMatch;
use super::shape::{FlipFlopShape, ALL_SHAPES};
use std::collections::BTreeMap;

/// Shape to chosen physical cell, built by the matcher and the expander
/// during one pass invocation.
///
/// Entries are first-writer-wins: once a shape is mapped, later inserts for
/// it are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingTable {
    entries: BTreeMap<FlipFlopShape, CellMatch>,
}

impl MappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, shape: FlipFlopShape) -> Option<&CellMatch> {
        self.entries.get(&shape)
    }

    pub fn contains(&self, shape: FlipFlopShape) -> bool {
        self.entries.contains_key(&shape)
    }

    /// Installs `cell_match` for `shape` unless the shape is already mapped.
    /// Returns whether the entry was installed.
    pub fn insert(&mut self, shape: FlipFlopShape, cell_match: CellMatch) -> bool {
        if self.entries.contains_key(&shape) {
            return false;
        }
        self.entries.insert(shape, cell_match);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mapped shapes in lexical order of their codes.
    pub fn iter(&self) -> impl Iterator<Item = (FlipFlopShape, &CellMatch)> {
        self.entries.iter().map(|(shape, m)| (*shape, m))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// One line of the mapping dump for `shape`.
    pub fn describe(&self, shape: FlipFlopShape) -> String {
        match self.get(shape) {
            None => format!("    unmapped dff cell: {}", shape.code()),
            Some(m) => format!(
                "    {} {}({});",
                m.cell_name,
                shape.display_name(),
                m.port_list()
            ),
        }
    }

    /// The full ten-line mapping dump, one line per shape.
    pub fn describe_all(&self) -> Vec<String> {
        ALL_SHAPES.iter().map(|s| self.describe(*s)).collect()
    }
}
