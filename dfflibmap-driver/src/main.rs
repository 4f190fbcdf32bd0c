// SPDX-License-Identifier: Apache-2.0

//! Command line driver for mapping generic flip-flops onto Liberty cells.
//!
//! Subcommands:
//! - `map`: rewrite a JSON design against a library.
//! - `show-mapping`: print the shape-to-cell table a library yields.
//! - `version`

mod config;
mod map;
mod report_cli_error;
mod show_mapping;

use clap::{Arg, ArgAction};
use config::{load_config, DffLibMapConfig};
use report_cli_error::report_cli_error_and_exit;

trait AppExt {
    fn add_liberty_arg(self) -> Self;
}

impl AppExt for clap::Command {
    fn add_liberty_arg(self) -> Self {
        (self as clap::Command).arg(
            Arg::new("liberty")
                .long("liberty")
                .value_name("LIBERTY_FILE")
                .help("Liberty library to map onto (may be gzipped); overrides the config file")
                .action(ArgAction::Set),
        )
    }
}

fn main() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();

    log::debug!(
        "dfflibmap-driver starting; version: {}",
        env!("CARGO_PKG_VERSION")
    );

    let matches = clap::Command::new("dfflibmap-driver")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Maps generic flip-flops onto sequential cells from a Liberty library")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("CONFIG_TOML")
                .help("Path to a TOML file supplying `liberty` and `start_id` defaults")
                .action(ArgAction::Set),
        )
        .subcommand(clap::Command::new("version").about("Prints the version of the driver"))
        .subcommand(
            clap::Command::new("map")
                .about("Replaces generic flip-flops in a JSON design with library cells")
                .arg(
                    Arg::new("design")
                        .help("The input design JSON file")
                        .required(true)
                        .index(1),
                )
                .add_liberty_arg()
                .arg(
                    Arg::new("output")
                        .long("output")
                        .value_name("OUTPUT_JSON")
                        .help("Where to write the mapped design (default: stdout)")
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("start_id")
                        .long("start_id")
                        .value_name("N")
                        .help("First id used in synthesized wire and inverter names (default: past any already in the design)")
                        .value_parser(clap::value_parser!(u64))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("selection")
                        .help("`module` or `module/cell` globs limiting what is rewritten")
                        .num_args(0..)
                        .index(2)
                        .action(ArgAction::Append),
                ),
        )
        .subcommand(
            clap::Command::new("show-mapping")
                .about("Prints the flip-flop mapping a library yields")
                .add_liberty_arg(),
        )
        .get_matches();

    let config: Option<DffLibMapConfig> = matches.get_one::<String>("config").map(|path| {
        load_config(std::path::Path::new(path)).unwrap_or_else(|e| {
            report_cli_error_and_exit(None, &e, &[("config", path.as_str())])
        })
    });

    if let Some(matches) = matches.subcommand_matches("map") {
        map::handle_map(matches, &config);
    } else if let Some(matches) = matches.subcommand_matches("show-mapping") {
        show_mapping::handle_show_mapping(matches, &config);
    } else if matches.subcommand_matches("version").is_some() {
        println!("{}", env!("CARGO_PKG_VERSION"));
    } else {
        report_cli_error_and_exit(None, &anyhow::anyhow!("No valid subcommand provided."), &[]);
    }
}
