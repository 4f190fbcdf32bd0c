// SPDX-License-Identifier: Apache-2.0

//! Fatal error reporting for the subcommand handlers.

use colored::Colorize;

/// Prints `error` on stderr and exits with status 1.
///
/// The outermost message is highlighted on the first line; each underlying
/// cause follows on its own line, then the `details` the handler attached
/// (input paths and the like).
pub fn report_cli_error_and_exit(
    subcommand: Option<&str>,
    error: &anyhow::Error,
    details: &[(&str, &str)],
) -> ! {
    let location = match subcommand {
        Some(subcommand) => format!("dfflibmap-driver {}", subcommand),
        None => "dfflibmap-driver".to_string(),
    };
    eprintln!("{}: {}", location, error.to_string().red().bold());
    for cause in error.chain().skip(1) {
        eprintln!("  caused by: {}", cause);
    }
    for (key, value) in details {
        eprintln!("  while processing {} `{}'", key, value);
    }
    std::process::exit(1);
}
