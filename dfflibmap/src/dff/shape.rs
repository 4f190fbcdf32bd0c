// SPDX-License-Identifier: Apache-2.0

//! The ten canonical generic flip-flop shapes and the wildcard-pattern
//! algebra over their type codes.

use super::port::PinRole;
use std::fmt;

/// A generic D flip-flop configuration as produced by earlier synthesis.
///
/// Codes follow `$_DFF_<clk>[<rst><val>]_`: the clock edge (`P` positive,
/// `N` negative), then for shapes with an asynchronous reset its polarity
/// (`P` active-high) and the value the reset asserts the output to.
///
/// Variant order matches the lexical order of the codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FlipFlopShape {
    DffNN0,
    DffNN1,
    DffNP0,
    DffNP1,
    DffN,
    DffPN0,
    DffPN1,
    DffPP0,
    DffPP1,
    DffP,
}

/// All shapes in the order they are matched and reported.
pub const ALL_SHAPES: [FlipFlopShape; 10] = [
    FlipFlopShape::DffN,
    FlipFlopShape::DffP,
    FlipFlopShape::DffNN0,
    FlipFlopShape::DffNN1,
    FlipFlopShape::DffNP0,
    FlipFlopShape::DffNP1,
    FlipFlopShape::DffPN0,
    FlipFlopShape::DffPN1,
    FlipFlopShape::DffPP0,
    FlipFlopShape::DffPP1,
];

impl FlipFlopShape {
    pub fn code(self) -> &'static str {
        match self {
            FlipFlopShape::DffN => "$_DFF_N_",
            FlipFlopShape::DffP => "$_DFF_P_",
            FlipFlopShape::DffNN0 => "$_DFF_NN0_",
            FlipFlopShape::DffNN1 => "$_DFF_NN1_",
            FlipFlopShape::DffNP0 => "$_DFF_NP0_",
            FlipFlopShape::DffNP1 => "$_DFF_NP1_",
            FlipFlopShape::DffPN0 => "$_DFF_PN0_",
            FlipFlopShape::DffPN1 => "$_DFF_PN1_",
            FlipFlopShape::DffPP0 => "$_DFF_PP0_",
            FlipFlopShape::DffPP1 => "$_DFF_PP1_",
        }
    }

    /// The code without its leading `$`, as used in diagnostics.
    pub fn display_name(self) -> &'static str {
        &self.code()[1..]
    }

    pub fn from_code(code: &str) -> Option<FlipFlopShape> {
        ALL_SHAPES.iter().copied().find(|s| s.code() == code)
    }

    /// Looks up the shape for the given parameters; `reset_polarity` and
    /// `reset_value` are ignored when `has_reset` is false.
    pub fn from_params(
        clock_polarity: bool,
        has_reset: bool,
        reset_polarity: bool,
        reset_value: bool,
    ) -> FlipFlopShape {
        match (clock_polarity, has_reset, reset_polarity, reset_value) {
            (false, false, _, _) => FlipFlopShape::DffN,
            (true, false, _, _) => FlipFlopShape::DffP,
            (false, true, false, false) => FlipFlopShape::DffNN0,
            (false, true, false, true) => FlipFlopShape::DffNN1,
            (false, true, true, false) => FlipFlopShape::DffNP0,
            (false, true, true, true) => FlipFlopShape::DffNP1,
            (true, true, false, false) => FlipFlopShape::DffPN0,
            (true, true, false, true) => FlipFlopShape::DffPN1,
            (true, true, true, false) => FlipFlopShape::DffPP0,
            (true, true, true, true) => FlipFlopShape::DffPP1,
        }
    }

    fn polarity_letters(self) -> &'static [u8] {
        let code = self.code().as_bytes();
        &code[6..code.len() - 1]
    }

    /// True when the flop captures on the rising clock edge.
    pub fn clock_polarity(self) -> bool {
        self.polarity_letters()[0] == b'P'
    }

    pub fn has_reset(self) -> bool {
        self.polarity_letters().len() == 3
    }

    /// True when the reset is active-high. Meaningless without a reset.
    pub fn reset_polarity(self) -> bool {
        self.has_reset() && self.polarity_letters()[1] == b'P'
    }

    /// The value the reset asserts the output to. Meaningless without a reset.
    pub fn reset_value(self) -> bool {
        self.has_reset() && self.polarity_letters()[2] == b'1'
    }
}

impl fmt::Display for FlipFlopShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

fn complement(c: char) -> Option<char> {
    match c {
        'P' => Some('N'),
        'N' => Some('P'),
        '1' => Some('0'),
        '0' => Some('1'),
        _ => None,
    }
}

/// Applies a wildcard pattern to a shape code.
///
/// `?` matches any character and keeps it, `*` matches a polarity character
/// and complements it (`P`/`N`, `1`/`0`), and any other character must match
/// exactly. Returns `None` when the pattern does not apply to `code`.
pub fn derive_code(pattern: &str, code: &str) -> Option<String> {
    if pattern.chars().count() != code.chars().count() {
        return None;
    }
    pattern
        .chars()
        .zip(code.chars())
        .map(|(p, c)| match p {
            '?' => Some(c),
            '*' => complement(c),
            _ if p == c => Some(c),
            _ => None,
        })
        .collect()
}

/// A polarity-flip derivation: shapes matching `pattern` lend their mapping
/// to the derived shape, with the `inverted` flag toggled on `invert_roles`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivationRule {
    pub pattern: &'static str,
    pub invert_roles: &'static [PinRole],
}

/// The derivation rules, in the order the expander applies them on each
/// pass.
pub const DERIVATION_RULES: [DerivationRule; 4] = [
    // Clock edge of a shape without reset.
    DerivationRule {
        pattern: "$_DFF_*_",
        invert_roles: &[PinRole::Clock],
    },
    // Clock edge of a shape with reset.
    DerivationRule {
        pattern: "$_DFF_*??_",
        invert_roles: &[PinRole::Clock],
    },
    DerivationRule {
        pattern: "$_DFF_?*?_",
        invert_roles: &[PinRole::Reset],
    },
    // Storing the complement turns a reset-to-0 flop into a reset-to-1 one.
    DerivationRule {
        pattern: "$_DFF_??*_",
        invert_roles: &[PinRole::Data, PinRole::Output],
    },
];

impl DerivationRule {
    pub fn apply(&self, shape: FlipFlopShape) -> Option<FlipFlopShape> {
        derive_code(self.pattern, shape.code()).and_then(|code| FlipFlopShape::from_code(&code))
    }
}
