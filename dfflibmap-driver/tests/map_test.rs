// SPDX-License-Identifier: Apache-2.0

use pretty_assertions::assert_eq;
use std::path::Path;
use std::process::{Command, Output};

const LIBRARY: &str = r#"
library (demo) {
    cell (DFFN) {
        ff (IQ, IQN) { clocked_on : "CLK'"; next_state : "D"; }
        pin (CLK) { direction : input; }
        pin (D) { direction : input; }
        pin (Q) { direction : output; function : "IQ"; }
    }
}
"#;

const DESIGN: &str = r#"{
    "modules": {
        "top": {
            "wires": { "clk": {}, "d": {}, "q": {} },
            "cells": {
                "ff0": {
                    "type": "$_DFF_P_",
                    "connections": { "C": { "net": "clk" }, "D": { "net": "d" }, "Q": { "net": "q" } }
                }
            }
        }
    }
}"#;

fn write_fixtures(dir: &Path) -> (String, String) {
    let lib = dir.join("cells.lib");
    let design = dir.join("design.json");
    std::fs::write(&lib, LIBRARY).unwrap();
    std::fs::write(&design, DESIGN).unwrap();
    (
        lib.to_str().unwrap().to_string(),
        design.to_str().unwrap().to_string(),
    )
}

fn run(args: &[&str]) -> Output {
    let driver = env!("CARGO_BIN_EXE_dfflibmap-driver");
    Command::new(driver)
        .args(args)
        .output()
        .expect("dfflibmap-driver invocation should run")
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "driver failed: status={:?}\nstdout={}\nstderr={}",
        output.status,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr),
    );
}

#[test]
fn test_map_inserts_clock_inverter() {
    let tmp = tempfile::tempdir().unwrap();
    let (lib, design) = write_fixtures(tmp.path());
    let out_path = tmp.path().join("mapped.json");

    let output = run(&[
        "map",
        &design,
        "--liberty",
        &lib,
        "--start_id",
        "10",
        "--output",
        out_path.to_str().unwrap(),
    ]);
    assert_success(&output);

    let mapped: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
    let cells = &mapped["modules"]["top"]["cells"];
    assert_eq!(cells["ff0"]["type"], "DFFN");
    assert_eq!(cells["ff0"]["connections"]["CLK"]["net"], "$dfflibmap$sig$10");
    assert_eq!(cells["$dfflibmap$inv$10"]["type"], "$_INV_");
    assert_eq!(cells["$dfflibmap$inv$10"]["connections"]["A"]["net"], "clk");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cell DFFN is a direct match for cell type _DFF_N_."), "{}", stderr);
    assert!(stderr.contains("create mapping for $_DFF_P_ from mapping for $_DFF_N_."), "{}", stderr);
    assert!(stderr.contains("mapped 1 $_DFF_P_ cells to DFFN cells."), "{}", stderr);
}

#[test]
fn test_config_file_supplies_liberty_and_start_id() {
    let tmp = tempfile::tempdir().unwrap();
    let (lib, design) = write_fixtures(tmp.path());
    let config = tmp.path().join("dfflibmap.toml");
    std::fs::write(&config, format!("liberty = {:?}\nstart_id = 77\n", lib)).unwrap();

    let output = run(&["--config", config.to_str().unwrap(), "map", &design]);
    assert_success(&output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("$dfflibmap$inv$77"), "{}", stdout);
}

#[test]
fn test_remapping_a_mapped_design_picks_fresh_ids() {
    let tmp = tempfile::tempdir().unwrap();
    let (lib, design) = write_fixtures(tmp.path());
    // A second generic flop, so the second run has something left to map.
    let two_flops = DESIGN.replace(
        "\"ff0\": {",
        "\"ff1\": { \"type\": \"$_DFF_P_\", \"connections\": { \"C\": { \"net\": \"clk\" } } },\n                \"ff0\": {",
    );
    std::fs::write(&design, two_flops).unwrap();
    let first = tmp.path().join("first.json");
    let second = tmp.path().join("second.json");

    let output = run(&["map", &design, "--liberty", &lib, "top/ff0", "--output", first.to_str().unwrap()]);
    assert_success(&output);
    let output = run(&["map", first.to_str().unwrap(), "--liberty", &lib, "--output", second.to_str().unwrap()]);
    assert_success(&output);

    let mapped: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&second).unwrap()).unwrap();
    let cells = &mapped["modules"]["top"]["cells"];
    assert_eq!(cells["ff0"]["connections"]["CLK"]["net"], "$dfflibmap$sig$1");
    assert_eq!(cells["ff1"]["type"], "DFFN");
    assert_eq!(cells["ff1"]["connections"]["CLK"]["net"], "$dfflibmap$sig$2");
    assert_eq!(cells["$dfflibmap$inv$2"]["connections"]["A"]["net"], "clk");
}

#[test]
fn test_error_causes_are_listed() {
    let tmp = tempfile::tempdir().unwrap();
    let config = tmp.path().join("dfflibmap.toml");
    std::fs::write(&config, "libery = \"x\"\n").unwrap();
    let output = run(&["--config", config.to_str().unwrap(), "version"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("parsing config file"), "{}", stderr);
    assert!(stderr.contains("caused by: "), "{}", stderr);
    assert!(stderr.contains("unknown field"), "{}", stderr);
}

#[test]
fn test_selection_excluding_the_cell_leaves_it_generic() {
    let tmp = tempfile::tempdir().unwrap();
    let (lib, design) = write_fixtures(tmp.path());
    let output = run(&["map", &design, "--liberty", &lib, "top/other*"]);
    assert_success(&output);
    let mapped: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(mapped["modules"]["top"]["cells"]["ff0"]["type"], "$_DFF_P_");
}

#[test]
fn test_missing_liberty_is_reported() {
    let tmp = tempfile::tempdir().unwrap();
    let (_, design) = write_fixtures(tmp.path());
    let output = run(&["map", &design]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Missing `-liberty liberty_file' option!"), "{}", stderr);
}

#[test]
fn test_show_mapping_prints_all_shapes() {
    let tmp = tempfile::tempdir().unwrap();
    let (lib, _) = write_fixtures(tmp.path());
    let output = run(&["show-mapping", "--liberty", &lib]);
    assert_success(&output);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 10);
    assert_eq!(lines[0], "DFFN _DFF_N_(.CLK(C), .D(D), .Q(Q));");
    assert_eq!(lines[1], "DFFN _DFF_P_(.CLK(~C), .D(D), .Q(Q));");
    assert_eq!(lines[2], "unmapped dff cell: $_DFF_NN0_");
}

#[test]
fn test_version() {
    let output = run(&["version"]);
    assert_success(&output);
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        env!("CARGO_PKG_VERSION")
    );
}
