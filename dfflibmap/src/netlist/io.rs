// SPDX-License-Identifier: Apache-2.0

//! Reading and writing designs as JSON.

use super::Design;
use crate::error::{DffLibMapError, Result};
use std::path::Path;

pub fn parse_design_json(text: &str) -> Result<Design> {
    let mut design: Design = serde_json::from_str(text)
        .map_err(|e| DffLibMapError::Netlist(format!("malformed design JSON: {}", e)))?;
    design.restore_names();
    Ok(design)
}

pub fn design_to_json(design: &Design) -> Result<String> {
    serde_json::to_string_pretty(design)
        .map_err(|e| DffLibMapError::Netlist(format!("serializing design: {}", e)))
}

pub fn load_design_json(path: &Path) -> Result<Design> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        DffLibMapError::Netlist(format!("Can't read design `{}': {}", path.display(), e))
    })?;
    log::debug!("loaded {} bytes of design JSON from {}", text.len(), path.display());
    parse_design_json(&text)
}

pub fn write_design_json(path: &Path, design: &Design) -> Result<()> {
    let mut text = design_to_json(design)?;
    text.push('\n');
    std::fs::write(path, text).map_err(|e| {
        DffLibMapError::Netlist(format!("Can't write design `{}': {}", path.display(), e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::netlist::{CellInstance, Signal};
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"{
        "modules": {
            "top": {
                "wires": { "clk": { "port": "input" }, "d": {}, "q": {} },
                "cells": {
                    "ff0": {
                        "type": "$_DFF_P_",
                        "connections": {
                            "C": { "net": "clk" },
                            "D": { "net": "d" },
                            "Q": { "net": "q" }
                        }
                    },
                    "tie": { "type": "$_BUF_", "connections": { "A": { "const": false } } }
                }
            }
        }
    }"#;

    #[test]
    fn test_names_come_from_keys() {
        let design = parse_design_json(SAMPLE).unwrap();
        let top = design.module("top").unwrap();
        assert_eq!(top.name, "top");
        assert_eq!(top.wires["clk"].name, "clk");
        let ff0 = top.cell("ff0").unwrap();
        assert_eq!(
            ff0,
            &CellInstance::new("ff0", "$_DFF_P_")
                .with_connection("C", Signal::net("clk"))
                .with_connection("D", Signal::net("d"))
                .with_connection("Q", Signal::net("q"))
        );
        assert_eq!(
            top.cell("tie").unwrap().connection("A"),
            Some(&Signal::Const(false))
        );
    }

    #[test]
    fn test_file_round_trip() {
        let design = parse_design_json(SAMPLE).unwrap();
        let tmp = tempfile::NamedTempFile::new().unwrap();
        write_design_json(tmp.path(), &design).unwrap();
        assert_eq!(load_design_json(tmp.path()).unwrap(), design);
    }

    #[test]
    fn test_malformed_json_is_a_netlist_error() {
        let err = parse_design_json("{ \"modules\": [").unwrap_err();
        assert!(matches!(err, DffLibMapError::Netlist(_)), "{}", err);
    }
}
