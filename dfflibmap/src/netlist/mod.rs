// SPDX-License-Identifier: Apache-2.0

//! Minimal cell-level netlist model the flip-flop mapper rewrites.
//!
//! A design owns modules; a module owns its wires and cell instances, keyed
//! by name. Names are carried both as map keys and on the values so that
//! code holding a single instance can still report it.

pub mod io;
pub mod selection;

use crate::error::{DffLibMapError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What a cell port is attached to; a port absent from the connection table
/// is unconnected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Signal {
    Net(String),
    Const(bool),
}

impl Signal {
    pub fn net(name: &str) -> Self {
        Signal::Net(name.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortDirection {
    Input,
    Output,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wire {
    #[serde(skip)]
    pub name: String,
    /// Set when the wire is also a module port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<PortDirection>,
}

impl Wire {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            port: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellInstance {
    #[serde(skip)]
    pub name: String,
    #[serde(rename = "type")]
    pub cell_type: String,
    #[serde(default)]
    pub connections: BTreeMap<String, Signal>,
}

impl CellInstance {
    pub fn new(name: &str, cell_type: &str) -> Self {
        Self {
            name: name.to_string(),
            cell_type: cell_type.to_string(),
            connections: BTreeMap::new(),
        }
    }

    pub fn with_connection(mut self, port: &str, signal: Signal) -> Self {
        self.connections.insert(port.to_string(), signal);
        self
    }

    pub fn connection(&self, port: &str) -> Option<&Signal> {
        self.connections.get(port)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    #[serde(skip)]
    pub name: String,
    #[serde(default)]
    pub wires: BTreeMap<String, Wire>,
    #[serde(default)]
    pub cells: BTreeMap<String, CellInstance>,
}

impl Module {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn add_wire(&mut self, wire: Wire) -> Result<()> {
        if self.wires.contains_key(&wire.name) {
            return Err(DffLibMapError::Netlist(format!(
                "module `{}' already has a wire named `{}'",
                self.name, wire.name
            )));
        }
        self.wires.insert(wire.name.clone(), wire);
        Ok(())
    }

    pub fn add_cell(&mut self, cell: CellInstance) -> Result<()> {
        if self.cells.contains_key(&cell.name) {
            return Err(DffLibMapError::Netlist(format!(
                "module `{}' already has a cell named `{}'",
                self.name, cell.name
            )));
        }
        self.cells.insert(cell.name.clone(), cell);
        Ok(())
    }

    pub fn cell(&self, name: &str) -> Option<&CellInstance> {
        self.cells.get(name)
    }

    /// Swaps in `cell` under its own name, handing back the instance it
    /// displaced.
    pub fn replace_cell(&mut self, cell: CellInstance) -> Option<CellInstance> {
        self.cells.insert(cell.name.clone(), cell)
    }

    pub fn cells_of_type<'a>(
        &'a self,
        cell_type: &'a str,
    ) -> impl Iterator<Item = &'a CellInstance> + 'a {
        self.cells.values().filter(move |c| c.cell_type == cell_type)
    }

    fn restore_names(&mut self) {
        for (name, wire) in self.wires.iter_mut() {
            wire.name = name.clone();
        }
        for (name, cell) in self.cells.iter_mut() {
            cell.name = name.clone();
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Design {
    #[serde(default)]
    pub modules: BTreeMap<String, Module>,
}

impl Design {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_module(&mut self, module: Module) -> Result<()> {
        if self.modules.contains_key(&module.name) {
            return Err(DffLibMapError::Netlist(format!(
                "design already has a module named `{}'",
                module.name
            )));
        }
        self.modules.insert(module.name.clone(), module);
        Ok(())
    }

    pub fn module(&self, name: &str) -> Option<&Module> {
        self.modules.get(name)
    }

    /// Copies map keys back onto the values after deserialization.
    pub(crate) fn restore_names(&mut self) {
        for (name, module) in self.modules.iter_mut() {
            module.name = name.clone();
            module.restore_names();
        }
    }
}

/// Source of fresh numeric suffixes for synthesized object names.
///
/// One allocator serves a whole invocation; ids are never reused.
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new(start: u64) -> Self {
        Self { next: start }
    }

    /// Hands out the next id. Fails once the counter is exhausted rather than
    /// wrapping around to ids that may already be in use.
    pub fn next_id(&mut self) -> Result<u64> {
        let id = self.next;
        self.next = id.checked_add(1).ok_or_else(|| {
            DffLibMapError::Netlist(format!("id counter exhausted at {}", id))
        })?;
        Ok(id)
    }

    /// The id the next call to `next_id` will return.
    pub fn peek(&self) -> u64 {
        self.next
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new(1)
    }
}
