// SPDX-License-Identifier: Apache-2.0

//! The flip-flop technology-mapping pass: match library cells, expand the
//! mapping over polarity variants, then rewrite the selected netlist.

use crate::dff::expand::expand_to_fixpoint;
use crate::dff::matcher::CellMatcher;
use crate::dff::rewrite::{rewrite_module, ModuleReport};
use crate::dff::shape::ALL_SHAPES;
use crate::dff::MappingTable;
use crate::error::{DffLibMapError, Result};
use crate::liberty::{parse_liberty_file, Block};
use crate::netlist::selection::Selection;
use crate::netlist::{Design, IdAllocator};
use std::path::PathBuf;

/// Inputs that come from the command line rather than the design.
#[derive(Debug, Clone, Default)]
pub struct DffLibMapOptions {
    pub liberty: Option<PathBuf>,
}

/// What one invocation did: the mapping it used and per-module counts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DffLibMapReport {
    pub mapping: MappingTable,
    pub modules: Vec<ModuleReport>,
}

impl DffLibMapReport {
    pub fn cells_mapped(&self) -> usize {
        self.modules.iter().map(|m| m.cells_mapped()).sum()
    }
}

/// Mapping state for a single invocation. Created empty, populated from one
/// library, and cleared when the invocation ends so nothing carries over to
/// the next one.
#[derive(Debug, Default)]
pub struct DffLibMapContext {
    table: MappingTable,
}

impl DffLibMapContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the matcher over every shape and then the expander to its
    /// fixpoint.
    pub fn populate(&mut self, library: &Block) -> Result<()> {
        let matcher = CellMatcher::new(library)?;
        for shape in ALL_SHAPES {
            if let Some(cell_match) = matcher.find_match(shape) {
                self.table.insert(shape, cell_match);
            }
        }
        expand_to_fixpoint(&mut self.table);

        log::info!("  final dff cell mappings:");
        for line in self.table.describe_all() {
            log::info!("{}", line);
        }
        Ok(())
    }

    pub fn mapping(&self) -> &MappingTable {
        &self.table
    }

    pub fn rewrite(
        &self,
        design: &mut Design,
        selection: &dyn Selection,
        ids: &mut IdAllocator,
    ) -> Result<Vec<ModuleReport>> {
        let mut reports = Vec::new();
        for module in design.modules.values_mut() {
            if !selection.selects_module(module) {
                continue;
            }
            reports.push(rewrite_module(module, &self.table, selection, ids)?);
        }
        Ok(reports)
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }
}

fn log_header() {
    log::info!(
        "Executing DFFLIBMAP pass (mapping DFF cells to sequential cells from liberty file)."
    );
}

fn run_with_library(
    library: &Block,
    design: &mut Design,
    selection: &dyn Selection,
    ids: &mut IdAllocator,
) -> Result<DffLibMapReport> {
    let mut context = DffLibMapContext::new();
    let outcome = context.populate(library).and_then(|()| {
        let modules = context.rewrite(design, selection, ids)?;
        Ok(DffLibMapReport {
            mapping: context.mapping().clone(),
            modules,
        })
    });
    context.clear();
    outcome
}

/// Builds the complete mapping table for `library` without touching any
/// netlist.
pub fn build_mapping(library: &Block) -> Result<MappingTable> {
    log_header();
    let mut context = DffLibMapContext::new();
    context.populate(library)?;
    Ok(context.table)
}

/// Maps every selected generic flip-flop in `design` onto cells of `library`.
pub fn run_dfflibmap(
    library: &Block,
    design: &mut Design,
    selection: &dyn Selection,
    ids: &mut IdAllocator,
) -> Result<DffLibMapReport> {
    log_header();
    run_with_library(library, design, selection, ids)
}

/// Resolves the library path in `options` and parses it.
pub fn load_library(options: &DffLibMapOptions) -> Result<Block> {
    let Some(path) = options.liberty.as_ref() else {
        return Err(DffLibMapError::Config(
            "Missing `-liberty liberty_file' option!".to_string(),
        ));
    };
    parse_liberty_file(path)
}

/// Like `run_dfflibmap`, but reads the library named in `options` first.
/// Configuration problems are reported before any matching starts.
pub fn run_dfflibmap_with_options(
    options: &DffLibMapOptions,
    design: &mut Design,
    selection: &dyn Selection,
    ids: &mut IdAllocator,
) -> Result<DffLibMapReport> {
    log_header();
    let library = load_library(options)?;
    run_with_library(&library, design, selection, ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dff::FlipFlopShape;
    use crate::liberty::parse_liberty_str;
    use crate::liberty::test_utils::{make_test_library, TEST_LIBRARY_TEXT};
    use crate::netlist::selection::SelectAll;
    use crate::netlist::{CellInstance, Module, Signal};
    use std::io::Write;

    fn one_flop_design(cell_type: &str) -> Design {
        let mut top = Module::new("top");
        top.add_cell(
            CellInstance::new("ff0", cell_type)
                .with_connection("C", Signal::net("clk"))
                .with_connection("D", Signal::net("d"))
                .with_connection("Q", Signal::net("q")),
        )
        .unwrap();
        let mut design = Design::new();
        design.add_module(top).unwrap();
        design
    }

    #[test]
    fn test_build_mapping_covers_all_shapes() {
        let _ = env_logger::builder().is_test(true).try_init();
        let table = build_mapping(&make_test_library()).unwrap();
        for shape in ALL_SHAPES {
            assert!(table.contains(shape), "{} unmapped", shape);
        }
        assert_eq!(table.get(FlipFlopShape::DffP).unwrap().cell_name, "DFFN");
        assert_eq!(
            table.describe(FlipFlopShape::DffP),
            "    DFFN _DFF_P_(.CLK(~C), .D(D), .Q(Q));"
        );
    }

    #[test]
    fn test_non_library_root_is_a_format_error() {
        let root = parse_liberty_str("cell (x) { }").unwrap();
        let mut design = one_flop_design("$_DFF_P_");
        let err = run_dfflibmap(&root, &mut design, &SelectAll, &mut IdAllocator::default())
            .unwrap_err();
        assert!(matches!(err, DffLibMapError::Format(_)));
    }

    #[test]
    fn test_missing_liberty_option_is_a_config_error() {
        let mut design = one_flop_design("$_DFF_P_");
        let err = run_dfflibmap_with_options(
            &DffLibMapOptions::default(),
            &mut design,
            &SelectAll,
            &mut IdAllocator::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            DffLibMapError::Config("Missing `-liberty liberty_file' option!".to_string())
        );
        assert_eq!(design, one_flop_design("$_DFF_P_"));
    }

    #[test]
    fn test_unreadable_liberty_file_is_a_config_error() {
        let options = DffLibMapOptions {
            liberty: Some(PathBuf::from("/nonexistent/cells.lib")),
        };
        let mut design = one_flop_design("$_DFF_P_");
        let err = run_dfflibmap_with_options(
            &options,
            &mut design,
            &SelectAll,
            &mut IdAllocator::default(),
        )
        .unwrap_err();
        assert!(matches!(err, DffLibMapError::Config(_)), "{}", err);
    }

    #[test]
    fn test_run_from_file_reports_counts() {
        let mut tmp = tempfile::Builder::new().suffix(".lib").tempfile().unwrap();
        tmp.write_all(TEST_LIBRARY_TEXT.as_bytes()).unwrap();
        let options = DffLibMapOptions {
            liberty: Some(tmp.path().to_path_buf()),
        };
        let mut design = one_flop_design("$_DFF_N_");
        let mut ids = IdAllocator::new(1);
        let report =
            run_dfflibmap_with_options(&options, &mut design, &SelectAll, &mut ids).unwrap();

        assert_eq!(report.cells_mapped(), 1);
        assert_eq!(report.modules.len(), 1);
        assert_eq!(report.modules[0].module_name, "top");
        assert_eq!(report.mapping.len(), 10);
        let ff0 = design.module("top").unwrap().cell("ff0").unwrap();
        assert_eq!(ff0.cell_type, "DFFN");
        assert_eq!(ff0.connection("CLK"), Some(&Signal::net("clk")));
    }
}
