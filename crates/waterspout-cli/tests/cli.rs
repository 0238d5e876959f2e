//! End-to-end tests of the `waterspout` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// The binary, run from an empty directory with no inherited overrides.
fn waterspout(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("waterspout").expect("binary built");
    cmd.current_dir(dir.path())
        .env_remove("RUST_LOG")
        .env_remove("WATERSPOUT_CONFIG")
        .env_remove("WATERSPOUT_DISPATCH__TIER")
        .env_remove("WATERSPOUT_DISPATCH__ALLOW_FALLBACK")
        .env_remove("WATERSPOUT_LOGGING__LEVEL");
    cmd
}

#[test]
fn test_probe_prints_features_and_chain() {
    let dir = TempDir::new().expect("tempdir");
    waterspout(&dir)
        .arg("probe")
        .assert()
        .success()
        .stdout(predicate::str::contains("FPU"))
        .stdout(predicate::str::contains("Chain:"));
}

#[test]
fn test_probe_json_reports_forced_scalar() {
    let dir = TempDir::new().expect("tempdir");
    let output = waterspout(&dir)
        .args(["probe", "--tier", "fpu", "--no-fallback", "--json"])
        .output()
        .expect("run");
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(report["selected"], "fpu");
    assert_eq!(report["requested"], "fpu");
    assert_eq!(report["chain"], serde_json::json!(["fpu"]));
    assert!(report["features"]
        .as_array()
        .expect("features")
        .contains(&serde_json::json!("FPU")));
}

#[test]
fn test_probe_rejects_unknown_tier() {
    let dir = TempDir::new().expect("tempdir");
    waterspout(&dir)
        .args(["probe", "--tier", "avx512"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("avx512"));
}

#[test]
fn test_probe_without_fallback_fails_on_foreign_tier() {
    let foreign = if cfg!(target_arch = "aarch64") { "sse2" } else { "neon" };
    let dir = TempDir::new().expect("tempdir");
    waterspout(&dir)
        .args(["probe", "--tier", foreign, "--no-fallback"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not compiled into this binary"));
}

#[test]
fn test_verify_passes_on_selected_tier() {
    let dir = TempDir::new().expect("tempdir");
    waterspout(&dir)
        .args(["verify", "--size", "257"])
        .assert()
        .success()
        .stdout(predicate::str::contains("80/80 checks passed"));
}

#[test]
fn test_config_file_drives_selection() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(
        dir.path().join("waterspout.toml"),
        "[dispatch]\ntier = \"fpu\"\n\n[logging]\nlevel = \"warn\"\n",
    )
    .expect("write config");

    waterspout(&dir)
        .args(["probe", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"selected\": \"fpu\""));
}

#[test]
fn test_env_overrides_config_file() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(dir.path().join("custom.toml"), "[dispatch]\ntier = \"sse2\"\n")
        .expect("write config");

    waterspout(&dir)
        .args(["--config", "custom.toml", "config"])
        .env("WATERSPOUT_DISPATCH__TIER", "fpu")
        .assert()
        .success()
        .stdout(predicate::str::contains("tier = \"fpu\""));
}

#[test]
fn test_config_prints_defaults() {
    let dir = TempDir::new().expect("tempdir");
    waterspout(&dir)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("[dispatch]"))
        .stdout(predicate::str::contains("tier = \"auto\""))
        .stdout(predicate::str::contains("allow_fallback = true"))
        .stdout(predicate::str::contains("level = \"info\""));
}

#[test]
fn test_invalid_config_file_is_reported() {
    let dir = TempDir::new().expect("tempdir");
    std::fs::write(dir.path().join("waterspout.toml"), "[dispatch]\ntier = 5\n")
        .expect("write config");

    waterspout(&dir)
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("loading configuration"));
}
