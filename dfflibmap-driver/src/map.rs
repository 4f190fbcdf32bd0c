// SPDX-License-Identifier: Apache-2.0

use crate::config::{get_liberty_path, get_start_id, DffLibMapConfig};
use crate::report_cli_error::report_cli_error_and_exit;
use anyhow::Context;
use clap::ArgMatches;
use dfflibmap::dff::rewrite::next_free_id;
use dfflibmap::netlist::io::{design_to_json, load_design_json, write_design_json};
use dfflibmap::netlist::selection::PatternSelection;
use dfflibmap::netlist::IdAllocator;
use dfflibmap::{run_dfflibmap_with_options, DffLibMapOptions};
use std::path::Path;

struct MapRequest<'a> {
    design: &'a Path,
    output: Option<&'a Path>,
    options: DffLibMapOptions,
    start_id: Option<u64>,
    selection: Vec<String>,
}

fn map(request: &MapRequest) -> anyhow::Result<()> {
    let mut design = load_design_json(request.design)?;
    let selection = PatternSelection::new(&request.selection)?;
    let start_id = request
        .start_id
        .unwrap_or_else(|| next_free_id(&design));
    log::debug!("synthesized names start at id {}", start_id);
    let mut ids = IdAllocator::new(start_id);
    let report = run_dfflibmap_with_options(&request.options, &mut design, &selection, &mut ids)?;
    log::info!(
        "mapped {} cells in {} modules; next free id {}",
        report.cells_mapped(),
        report.modules.len(),
        ids.peek()
    );

    match request.output {
        Some(path) => write_design_json(path, &design)
            .with_context(|| format!("writing mapped design for `{}'", request.design.display()))?,
        None => println!("{}", design_to_json(&design)?),
    }
    Ok(())
}

pub fn handle_map(matches: &ArgMatches, config: &Option<DffLibMapConfig>) {
    let Some(design) = matches.get_one::<String>("design") else {
        report_cli_error_and_exit(Some("map"), &anyhow::anyhow!("missing design file"), &[]);
    };
    let request = MapRequest {
        design: Path::new(design),
        output: matches.get_one::<String>("output").map(Path::new),
        options: DffLibMapOptions {
            liberty: get_liberty_path(matches, config),
        },
        start_id: get_start_id(matches, config),
        selection: matches
            .get_many::<String>("selection")
            .map(|values| values.cloned().collect())
            .unwrap_or_default(),
    };
    if let Err(e) = map(&request) {
        report_cli_error_and_exit(Some("map"), &e, &[("design", design.as_str())]);
    }
}
