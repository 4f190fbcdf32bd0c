// SPDX-License-Identifier: Apache-2.0

//! Replaces generic flip-flop instances with the physical cells chosen in the
//! mapping table, inserting inverters for pins of opposite polarity.

use super::mapping::MappingTable;
use super::port::{CellMatch, PinRole};
use super::shape::FlipFlopShape;
use crate::error::{DffLibMapError, Result};
use crate::netlist::selection::Selection;
use crate::netlist::{CellInstance, Design, IdAllocator, Module, Signal, Wire};
use std::collections::BTreeMap;

pub const INVERTER_CELL_TYPE: &str = "$_INV_";
pub const INVERTER_INPUT_PORT: &str = "A";
pub const INVERTER_OUTPUT_PORT: &str = "Y";

/// Prefixes of the synthesized wire and inverter names; both end in the id.
pub const SIGNAL_NAME_PREFIX: &str = "$dfflibmap$sig$";
pub const INVERTER_NAME_PREFIX: &str = "$dfflibmap$inv$";

/// Migration counts for one module, keyed by `(original type, new type)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleReport {
    pub module_name: String,
    pub migrations: BTreeMap<(String, String), usize>,
    pub inverters_added: usize,
}

impl ModuleReport {
    pub fn cells_mapped(&self) -> usize {
        self.migrations.values().sum()
    }

    /// The summary lines logged once the module is done.
    pub fn summary_lines(&self) -> Vec<String> {
        self.migrations
            .iter()
            .map(|((from, to), count)| format!("  mapped {} {} cells to {} cells.", count, from, to))
            .collect()
    }
}

/// First id past every synthesized name already present in `design`, so a
/// design that went through the pass before can go through it again.
pub fn next_free_id(design: &Design) -> u64 {
    let suffix_id = |name: &str| {
        name.strip_prefix(SIGNAL_NAME_PREFIX)
            .or_else(|| name.strip_prefix(INVERTER_NAME_PREFIX))
            .and_then(|suffix| suffix.parse::<u64>().ok())
    };
    design
        .modules
        .values()
        .flat_map(|m| m.wires.keys().chain(m.cells.keys()))
        .filter_map(|name| suffix_id(name))
        .max()
        .map_or(1, |highest| highest.saturating_add(1))
}

struct PlannedInverter {
    wire: Wire,
    cell: CellInstance,
}

/// A replacement cell plus the inverters it needs, not yet in the module.
struct PlannedCell {
    replacement: CellInstance,
    inverters: Vec<PlannedInverter>,
}

/// Builds a fresh wire plus an inverter cell between `original` and the new
/// cell's pin, and returns them with the signal the pin should connect to.
///
/// For the output role the inverter sits behind the cell (original net =
/// NOT pin); for every other role it sits in front (pin = NOT original net).
fn plan_inverter(
    ids: &mut IdAllocator,
    role: PinRole,
    original: &Signal,
) -> Result<(PlannedInverter, Signal)> {
    let id = ids.next_id()?;
    let wire_name = format!("{}{}", SIGNAL_NAME_PREFIX, id);
    let inverter_name = format!("{}{}", INVERTER_NAME_PREFIX, id);

    let inner = Signal::Net(wire_name.clone());
    let (input, output) = if role == PinRole::Output {
        (inner.clone(), original.clone())
    } else {
        (original.clone(), inner.clone())
    };
    let planned = PlannedInverter {
        wire: Wire::new(&wire_name),
        cell: CellInstance::new(&inverter_name, INVERTER_CELL_TYPE)
            .with_connection(INVERTER_INPUT_PORT, input)
            .with_connection(INVERTER_OUTPUT_PORT, output),
    };
    Ok((planned, inner))
}

fn plan_cell(
    original: &CellInstance,
    cell_match: &CellMatch,
    ids: &mut IdAllocator,
) -> Result<PlannedCell> {
    let mut planned = PlannedCell {
        replacement: CellInstance::new(&original.name, &cell_match.cell_name),
        inverters: Vec::new(),
    };
    for (pin_name, port_role) in &cell_match.ports {
        let Some(canonical) = port_role.role.canonical_port() else {
            continue;
        };
        let Some(signal) = original.connection(canonical) else {
            log::debug!(
                "{}: port {} unconnected, leaving pin {} open",
                original.name,
                canonical,
                pin_name
            );
            continue;
        };
        let signal = if port_role.inverted {
            let (inverter, inner) = plan_inverter(ids, port_role.role, signal)?;
            planned.inverters.push(inverter);
            inner
        } else {
            signal.clone()
        };
        planned.replacement.connections.insert(pin_name.clone(), signal);
    }
    Ok(planned)
}

fn check_names_free(module: &Module, plans: &[PlannedCell]) -> Result<()> {
    for inverter in plans.iter().flat_map(|p| &p.inverters) {
        if module.wires.contains_key(&inverter.wire.name) {
            return Err(DffLibMapError::Netlist(format!(
                "module `{}' already has a wire named `{}'",
                module.name, inverter.wire.name
            )));
        }
        if module.cells.contains_key(&inverter.cell.name) {
            return Err(DffLibMapError::Netlist(format!(
                "module `{}' already has a cell named `{}'",
                module.name, inverter.cell.name
            )));
        }
    }
    Ok(())
}

/// Rewrites every selected generic flip-flop in `module` that has a mapping.
///
/// Instances are visited in name order, and pins of each match in pin-name
/// order, so synthesized names depend only on the inputs and the starting
/// id. Every replacement and inverter is built and checked for name clashes
/// before the module is touched; on error the module is left as it was.
pub fn rewrite_module(
    module: &mut Module,
    table: &MappingTable,
    selection: &dyn Selection,
    ids: &mut IdAllocator,
) -> Result<ModuleReport> {
    log::info!("Mapping DFF cells in module `{}':", module.name);
    let mut report = ModuleReport {
        module_name: module.name.clone(),
        ..Default::default()
    };

    let mut plans = Vec::new();
    for cell in module.cells.values() {
        let Some(shape) = FlipFlopShape::from_code(&cell.cell_type) else {
            continue;
        };
        let Some(cell_match) = table.get(shape) else {
            continue;
        };
        if !selection.selects_cell(module, cell) {
            continue;
        }
        plans.push(plan_cell(cell, cell_match, ids)?);
    }
    check_names_free(module, &plans)?;

    for plan in plans {
        report.inverters_added += plan.inverters.len();
        for inverter in plan.inverters {
            module.add_wire(inverter.wire)?;
            module.add_cell(inverter.cell)?;
        }
        let new_type = plan.replacement.cell_type.clone();
        if let Some(previous) = module.replace_cell(plan.replacement) {
            *report
                .migrations
                .entry((previous.cell_type, new_type))
                .or_insert(0) += 1;
        }
    }

    for line in report.summary_lines() {
        log::info!("{}", line);
    }
    Ok(report)
}
