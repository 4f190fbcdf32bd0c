// SPDX-License-Identifier: Apache-2.0

//! Which modules and cell instances a pass may touch.

use super::{CellInstance, Module};
use crate::error::{DffLibMapError, Result};
use regex::Regex;

pub trait Selection {
    fn selects_module(&self, module: &Module) -> bool;
    fn selects_cell(&self, module: &Module, cell: &CellInstance) -> bool;
}

/// Selects every module and every cell.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectAll;

impl Selection for SelectAll {
    fn selects_module(&self, _module: &Module) -> bool {
        true
    }

    fn selects_cell(&self, _module: &Module, _cell: &CellInstance) -> bool {
        true
    }
}

/// Translates a shell-style glob (`*`, `?`) into an anchored regex.
fn glob_to_regex(glob: &str) -> Result<Regex> {
    let mut pattern = String::from("^");
    for c in glob.chars() {
        match c {
            '*' => pattern.push_str(".*"),
            '?' => pattern.push('.'),
            _ => pattern.push_str(&regex::escape(&c.to_string())),
        }
    }
    pattern.push('$');
    Regex::new(&pattern)
        .map_err(|e| DffLibMapError::Config(format!("Invalid selection pattern `{}': {}", glob, e)))
}

#[derive(Debug, Clone)]
struct SelectionTerm {
    module: Regex,
    /// `None` selects every cell of a matching module.
    cell: Option<Regex>,
}

/// Selection built from `module` or `module/cell` glob arguments. No
/// arguments selects everything.
#[derive(Debug, Clone, Default)]
pub struct PatternSelection {
    terms: Vec<SelectionTerm>,
}

impl PatternSelection {
    pub fn new<S: AsRef<str>>(args: &[S]) -> Result<Self> {
        let terms = args
            .iter()
            .map(|arg| {
                let arg = arg.as_ref();
                let (module, cell) = match arg.split_once('/') {
                    Some((module, cell)) => (module, Some(cell)),
                    None => (arg, None),
                };
                Ok(SelectionTerm {
                    module: glob_to_regex(module)?,
                    cell: cell.map(glob_to_regex).transpose()?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { terms })
    }

    pub fn is_everything(&self) -> bool {
        self.terms.is_empty()
    }
}

impl Selection for PatternSelection {
    fn selects_module(&self, module: &Module) -> bool {
        self.is_everything() || self.terms.iter().any(|t| t.module.is_match(&module.name))
    }

    fn selects_cell(&self, module: &Module, cell: &CellInstance) -> bool {
        self.is_everything()
            || self.terms.iter().any(|t| {
                t.module.is_match(&module.name)
                    && t.cell.as_ref().map_or(true, |c| c.is_match(&cell.name))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn selection_outcome(selection: &PatternSelection, module: &str, cell: &str) -> (bool, bool) {
        let m = Module::new(module);
        let c = CellInstance::new(cell, "$_DFF_P_");
        (selection.selects_module(&m), selection.selects_cell(&m, &c))
    }

    #[test_case(&[], "top", "ff0" => (true, true); "empty selects everything")]
    #[test_case(&["top"], "top", "ff0" => (true, true); "whole module")]
    #[test_case(&["top"], "sub", "ff0" => (false, false); "other module")]
    #[test_case(&["top/ff?"], "top", "ff0" => (true, true); "single char glob")]
    #[test_case(&["top/ff?"], "top", "ff10" => (true, false); "module kept cell dropped")]
    #[test_case(&["*/ff*"], "sub", "ff10" => (true, true); "star globs")]
    #[test_case(&["a.b"], "axb", "c" => (false, false); "dots are literal")]
    #[test_case(&["sub", "top/q*"], "top", "q1" => (true, true); "any term may match")]
    fn test_pattern_selection(args: &[&str], module: &str, cell: &str) -> (bool, bool) {
        selection_outcome(&PatternSelection::new(args).unwrap(), module, cell)
    }

    #[test]
    fn test_select_all() {
        let m = Module::new("anything");
        let c = CellInstance::new("x", "y");
        assert!(SelectAll.selects_module(&m));
        assert!(SelectAll.selects_cell(&m, &c));
    }
}
