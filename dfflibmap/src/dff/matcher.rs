// SPDX-License-Identifier: Apache-2.0

//! Finds, for each generic flip-flop shape, the physical Liberty cell that
//! implements it directly and the role each of its pins plays.
//!
//! A cell qualifies for a shape when its `ff` group clocks on a single pin of
//! the right edge, loads `next_state` from a single pin, and (for shapes with
//! reset) has a `clear` (reset to 0) or `preset` (reset to 1) driven by a
//! single pin of the right polarity. Every other input must be one of those
//! pins, and some output must present the stored state. Among qualifying
//! cells the one with the fewest pins wins; ties keep the earlier cell.

use super::port::{CellMatch, PinRole, PortRole, PortTable};
use super::shape::FlipFlopShape;
use crate::error::{DffLibMapError, Result};
use crate::liberty::Block;

/// Strips quoting and blanks so expressions compare textually.
pub fn normalize_expression(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '"' | ' ' | '\t'))
        .collect()
}

/// A pin reference parsed from an `ff` attribute such as `"RN'"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinExpr {
    pub pin_name: String,
    /// False when the expression carries an inversion marker.
    pub positive: bool,
}

/// Parses a single-pin expression: a trailing `'` or a leading `!` marks it
/// as inverted. Returns `None` for empty expressions.
pub fn parse_pin_expr(text: &str) -> Option<PinExpr> {
    let value = normalize_expression(text);
    if let Some(name) = value.strip_suffix('\'') {
        Some(PinExpr {
            pin_name: name.to_string(),
            positive: false,
        })
    } else if let Some(name) = value.strip_prefix('!') {
        Some(PinExpr {
            pin_name: name.to_string(),
            positive: false,
        })
    } else if value.is_empty() {
        None
    } else {
        Some(PinExpr {
            pin_name: value,
            positive: true,
        })
    }
}

fn named_pins(cell: &Block) -> impl Iterator<Item = (String, &Block)> {
    cell.sub_blocks_of_type("pin")
        .filter_map(|pin| pin.single_name().map(|name| (name, pin)))
}

/// Looks up `attr_name` on the `ff` group and resolves it to a pin the cell
/// declares.
fn resolve_pin(cell: &Block, ff: &Block, attr_name: &str) -> Option<PinExpr> {
    let expr = parse_pin_expr(&ff.attr_string(attr_name)?)?;
    if named_pins(cell).any(|(name, _)| name == expr.pin_name) {
        Some(expr)
    } else {
        None
    }
}

/// A qualifying cell with its pin assignment and non-internal pin count.
#[derive(Debug)]
struct Candidate {
    cell_match: CellMatch,
    num_pins: usize,
}

/// Why a cell was passed over for a shape; logged at debug level.
#[derive(Debug)]
enum Rejection {
    NotAFlop,
    Clock,
    NextState,
    Reset(&'static str),
    UnexplainedInput(String),
    NoOutput,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::NotAFlop => write!(f, "no ff group"),
            Rejection::Clock => write!(f, "clock pin missing or of the wrong edge"),
            Rejection::NextState => write!(f, "next_state does not name a pin"),
            Rejection::Reset(attr) => write!(f, "{} missing or of the wrong polarity", attr),
            Rejection::UnexplainedInput(pin) => write!(f, "input {} has no role", pin),
            Rejection::NoOutput => write!(f, "no output presents the stored state"),
        }
    }
}

pub struct CellMatcher<'a> {
    library: &'a Block,
}

impl<'a> CellMatcher<'a> {
    /// Checks that `library` is a Liberty `library` group.
    pub fn new(library: &'a Block) -> Result<Self> {
        if library.block_type != "library" {
            return Err(DffLibMapError::Format(format!(
                "Format error in liberty file: expected top-level `library` group, got `{}`",
                library.block_type
            )));
        }
        Ok(Self { library })
    }

    fn cells(&self) -> impl Iterator<Item = (String, &'a Block)> {
        self.library
            .sub_blocks_of_type("cell")
            .filter_map(|cell| cell.single_name().map(|name| (name, cell)))
    }

    fn evaluate(
        &self,
        cell_name: &str,
        cell: &Block,
        shape: FlipFlopShape,
    ) -> std::result::Result<Candidate, Rejection> {
        let ff = cell.find_block("ff").ok_or(Rejection::NotAFlop)?;

        let clock = resolve_pin(cell, ff, "clocked_on")
            .filter(|p| p.positive == shape.clock_polarity())
            .ok_or(Rejection::Clock)?;
        let next = resolve_pin(cell, ff, "next_state").ok_or(Rejection::NextState)?;
        let reset = if shape.has_reset() {
            let attr_name = if shape.reset_value() {
                "preset"
            } else {
                "clear"
            };
            let reset = resolve_pin(cell, ff, attr_name)
                .filter(|p| p.positive == shape.reset_polarity())
                .ok_or(Rejection::Reset(attr_name))?;
            Some(reset)
        } else {
            None
        };

        let mut ports = PortTable::new();
        ports.insert(clock.pin_name, PortRole::new(PinRole::Clock));
        if let Some(reset) = reset {
            ports.insert(reset.pin_name, PortRole::new(PinRole::Reset));
        }
        ports.insert(next.pin_name, PortRole::new(PinRole::Data));

        // The output must present the stored state; when next_state is
        // inverted the stored state is the complement of the data input.
        let state_index = if next.positive { 0 } else { 1 };
        let Some(state_var) = ff.qualifier_string(state_index) else {
            log::warn!(
                "cell {}: ff group has no state variable #{}; skipping",
                cell_name,
                state_index
            );
            return Err(Rejection::NoOutput);
        };
        let state_var = normalize_expression(&state_var);

        let mut num_pins = 0;
        let mut found_output = false;
        for (pin_name, pin) in named_pins(cell) {
            let Some(direction) = pin.attr_string("direction") else {
                continue;
            };
            if direction == "internal" {
                continue;
            }
            num_pins += 1;

            if direction == "input" && !ports.contains_key(&pin_name) {
                return Err(Rejection::UnexplainedInput(pin_name));
            }
            if direction == "output" {
                if let Some(function) = pin.attr_string("function") {
                    if normalize_expression(&function) == state_var {
                        ports.insert(pin_name.clone(), PortRole::new(PinRole::Output));
                        found_output = true;
                    }
                }
            }
            ports.entry(pin_name).or_insert_with(PortRole::unused);
        }

        if !found_output {
            return Err(Rejection::NoOutput);
        }
        Ok(Candidate {
            cell_match: CellMatch {
                cell_name: cell_name.to_string(),
                ports,
            },
            num_pins,
        })
    }

    /// Scans the library in declaration order for the best cell for `shape`.
    /// A later candidate displaces the current best only with strictly fewer
    /// pins.
    pub fn find_match(&self, shape: FlipFlopShape) -> Option<CellMatch> {
        let mut best: Option<Candidate> = None;
        for (cell_name, cell) in self.cells() {
            match self.evaluate(&cell_name, cell, shape) {
                Ok(candidate) => {
                    let better = best
                        .as_ref()
                        .map_or(true, |b| candidate.num_pins < b.num_pins);
                    if better {
                        best = Some(candidate);
                    }
                }
                Err(Rejection::NotAFlop) => {}
                Err(why) => log::debug!(
                    "cell {} rejected for {}: {}",
                    cell_name,
                    shape.display_name(),
                    why
                ),
            }
        }
        let best = best?;
        log::info!(
            "  cell {} is a direct match for cell type {}.",
            best.cell_match.cell_name,
            shape.display_name()
        );
        Some(best.cell_match)
    }
}
