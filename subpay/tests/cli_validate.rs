//! CLI tests for the `subpay` binary.
//!
//! Spawns the binary and verifies exit codes and output for seed export,
//! seed validation, config initialization and the pay-intent quote.

use std::fs;
use std::process::Command;

use subpay::exit_codes;
use subpay::io::config::{DemoConfig, load_config};
use subpay::io::seed_store::{SeedFile, write_seed};
use subpay::state::seed_state;

#[test]
fn validate_accepts_exported_seed() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("seed.json");

    let status = Command::new(env!("CARGO_BIN_EXE_subpay"))
        .current_dir(temp.path())
        .args(["seed", "--out"])
        .arg(&path)
        .status()
        .expect("subpay seed");
    assert_eq!(status.code(), Some(exit_codes::OK));

    let output = Command::new(env!("CARGO_BIN_EXE_subpay"))
        .current_dir(temp.path())
        .arg("validate")
        .arg(&path)
        .output()
        .expect("subpay validate");
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "ok: 2 plans, 1 strategies, 3 timeline entries"
    );
}

#[test]
fn validate_rejects_duplicate_plan_ids() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("seed.json");
    let mut seed = SeedFile::from_state(&seed_state());
    let dup = seed.plans[0].clone();
    seed.plans.push(dup);
    write_seed(&path, &seed).expect("write seed");

    let output = Command::new(env!("CARGO_BIN_EXE_subpay"))
        .current_dir(temp.path())
        .arg("validate")
        .arg(&path)
        .output()
        .expect("subpay validate");
    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    assert!(String::from_utf8_lossy(&output.stderr).contains("duplicate plan id"));
}

#[test]
fn quote_falls_back_on_malformed_amount() {
    let temp = tempfile::tempdir().expect("tempdir");
    let output = Command::new(env!("CARGO_BIN_EXE_subpay"))
        .current_dir(temp.path())
        .args(["quote", "--amount", "not-a-number"])
        .output()
        .expect("subpay quote");
    assert_eq!(output.status.code(), Some(exit_codes::OK));

    let quote: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(quote["merchant"], "Netflix");
    assert_eq!(quote["base_amount_usd"], 19.0);
    assert_eq!(quote["total_usd"], 21.0);
    assert_eq!(quote["estimated_coverage_pct"], 6);
}

#[test]
fn walkthrough_uses_config_file() {
    let temp = tempfile::tempdir().expect("tempdir");
    fs::write(
        temp.path().join("subpay.toml"),
        "network_env = \"mainnet\"\n",
    )
    .expect("write config");

    let output = Command::new(env!("CARGO_BIN_EXE_subpay"))
        .current_dir(temp.path())
        .args(["walkthrough", "--merchant", "Hulu", "--amount", "8"])
        .output()
        .expect("subpay walkthrough");
    assert_eq!(output.status.code(), Some(exit_codes::OK));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    let plan_id = report["plan_id"].as_str().expect("plan id");
    assert!(plan_id.starts_with("pln_hulu_"));
    assert_eq!(report["entries"].as_array().map(Vec::len), Some(3));
    assert_eq!(report["state"]["network_env"], "mainnet");
    let url = report["entries"][0]["explorer_url"].as_str().expect("url");
    assert!(url.starts_with("https://flowscan.io/tx/0xmock_topup_"));
}

#[test]
fn init_config_writes_defaults_once() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("subpay.toml");

    let output = Command::new(env!("CARGO_BIN_EXE_subpay"))
        .current_dir(temp.path())
        .arg("init-config")
        .output()
        .expect("subpay init-config");
    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert_eq!(load_config(&path).expect("load"), DemoConfig::default());

    fs::write(&path, "demo_mode = false\n").expect("edit config");
    let output = Command::new(env!("CARGO_BIN_EXE_subpay"))
        .current_dir(temp.path())
        .arg("init-config")
        .output()
        .expect("subpay init-config");
    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    assert!(String::from_utf8_lossy(&output.stderr).contains("already exists"));
    assert!(!load_config(&path).expect("load").demo_mode);

    let status = Command::new(env!("CARGO_BIN_EXE_subpay"))
        .current_dir(temp.path())
        .args(["init-config", "--force"])
        .status()
        .expect("subpay init-config --force");
    assert_eq!(status.code(), Some(exit_codes::OK));
    assert!(load_config(&path).expect("load").demo_mode);
}
