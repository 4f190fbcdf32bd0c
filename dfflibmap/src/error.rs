// SPDX-License-Identifier: Apache-2.0

use std::fmt;

/// Fatal conditions raised by the flip-flop mapping pass and its collaborators.
///
/// Non-fatal outcomes (a shape with no matching cell, a netlist instance that
/// is unmapped or not selected) are not errors; they are logged and skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DffLibMapError {
    /// The library description root is not a `library` group.
    Format(String),
    /// A required option is missing or an input file cannot be opened.
    Config(String),
    /// The Liberty text is malformed.
    Parse(String),
    /// The design netlist cannot be read, written, or edited as requested.
    Netlist(String),
}

impl fmt::Display for DffLibMapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DffLibMapError::Format(msg) => write!(f, "format error: {}", msg),
            DffLibMapError::Config(msg) => write!(f, "config error: {}", msg),
            DffLibMapError::Parse(msg) => write!(f, "liberty parse error: {}", msg),
            DffLibMapError::Netlist(msg) => write!(f, "netlist error: {}", msg),
        }
    }
}

impl std::error::Error for DffLibMapError {}

pub type Result<T> = std::result::Result<T, DffLibMapError>;
