// SPDX-License-Identifier: Apache-2.0

use crate::config::{get_liberty_path, DffLibMapConfig};
use crate::report_cli_error::report_cli_error_and_exit;
use clap::ArgMatches;
use dfflibmap::{build_mapping, load_library, DffLibMapOptions};

fn show_mapping(options: &DffLibMapOptions) -> anyhow::Result<Vec<String>> {
    let library = load_library(options)?;
    let table = build_mapping(&library)?;
    Ok(table.describe_all())
}

/// Prints the final ten-shape mapping for a library on stdout.
pub fn handle_show_mapping(matches: &ArgMatches, config: &Option<DffLibMapConfig>) {
    let options = DffLibMapOptions {
        liberty: get_liberty_path(matches, config),
    };
    match show_mapping(&options) {
        Ok(lines) => {
            for line in lines {
                println!("{}", line.trim_start());
            }
        }
        Err(e) => report_cli_error_and_exit(Some("show-mapping"), &e, &[]),
    }
}
