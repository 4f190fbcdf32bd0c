// SPDX-License-Identifier: Apache-2.0

//! Derives mappings for unmatched shapes from matched ones by flipping pin
//! polarities, without going back to the library.

use super::mapping::MappingTable;
use super::port::PinRole;
use super::shape::{derive_code, FlipFlopShape, DERIVATION_RULES};

/// Applies one derivation pattern to every shape currently in `table`.
///
/// Donors are taken from a snapshot of the table, so shapes derived by this
/// call do not act as donors until the next call. Returns whether any new
/// mapping was installed.
pub fn expand(table: &mut MappingTable, pattern: &str, invert_roles: &[PinRole]) -> bool {
    let derivations: Vec<(FlipFlopShape, FlipFlopShape)> = table
        .iter()
        .filter_map(|(from, _)| {
            let to = FlipFlopShape::from_code(&derive_code(pattern, from.code())?)?;
            Some((from, to))
        })
        .collect();

    let mut created = false;
    for (from, to) in derivations {
        if table.contains(to) {
            continue;
        }
        let Some(donor) = table.get(from) else {
            continue;
        };
        let derived = donor.with_inverted_roles(invert_roles);
        log::info!(
            "  create mapping for {} from mapping for {}.",
            to.code(),
            from.code()
        );
        created |= table.insert(to, derived);
    }
    created
}

/// Applies every derivation rule, in order, until a full round installs
/// nothing new. Returns the number of mappings created.
pub fn expand_to_fixpoint(table: &mut MappingTable) -> usize {
    let before = table.len();
    loop {
        let mut changed = false;
        for rule in DERIVATION_RULES.iter() {
            changed |= expand(table, rule.pattern, rule.invert_roles);
        }
        if !changed {
            break;
        }
    }
    table.len() - before
}
