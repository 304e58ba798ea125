//! Basic CLI E2E tests.
//!
//! Each test runs the `impact` binary against its own temporary data
//! directory and checks the JSON it prints.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (code, stdout, stderr).
fn run_cli(data_dir: &Path, args: &[&str]) -> (i32, String, String) {
    let output = Command::new(env!("CARGO_BIN_EXE_impact"))
        .args(args)
        .env("IMPACT_DATA_DIR", data_dir)
        .env("IMPACT_USER", "alice")
        .env("IMPACT_ORG", "acme")
        .env_remove("ANTHROPIC_API_KEY")
        .env_remove("DB_NAME")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (code, stdout, stderr)
}

fn run_json(data_dir: &Path, args: &[&str]) -> serde_json::Value {
    let (code, stdout, stderr) = run_cli(data_dir, args);
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    serde_json::from_str(&stdout).expect("stdout is JSON")
}

#[test]
fn test_catalog_types() {
    let dir = tempfile::tempdir().unwrap();
    let types = run_json(dir.path(), &["catalog", "types"]);
    assert_eq!(types.as_array().unwrap().len(), 4);
}

#[test]
fn test_catalog_unknown_phase() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, stderr) = run_cli(dir.path(), &["catalog", "phase", "launch"]);
    assert_eq!(code, 1);
    let body: serde_json::Value = serde_json::from_str(stderr.lines().last().unwrap()).unwrap();
    assert!(body["detail"].as_str().unwrap().contains("launch"));
}

#[test]
fn test_assessment_to_project() {
    let dir = tempfile::tempdir().unwrap();
    let mut args = vec!["assessment", "create", "--type", "general_readiness", "--project", "Atlas"];
    for dim in [
        "leadership_commitment=4",
        "organizational_culture=3",
        "resource_availability=4",
        "stakeholder_engagement=3",
        "training_capability=4",
    ] {
        args.push("--score");
        args.push(dim);
    }
    let assessment = run_json(dir.path(), &args);
    let assessment_id = assessment["id"].as_str().unwrap().to_string();

    let project = run_json(dir.path(), &["project", "from-assessment", &assessment_id]);
    assert_eq!(project["name"], "Atlas");
    assert_eq!(project["current_phase"], "investigate");

    let project_id = project["id"].as_str().unwrap();
    let status = run_json(dir.path(), &["project", "workflow-status", project_id]);
    assert_eq!(status["phases_total"], 6);

    let monitoring = run_json(dir.path(), &["analytics", "risk-monitoring", project_id]);
    assert_eq!(monitoring["current_status"]["current_week"], 1);
}

#[test]
fn test_missing_identity_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_impact"))
        .args(["project", "list"])
        .env("IMPACT_DATA_DIR", dir.path())
        .env_remove("IMPACT_USER")
        .env_remove("IMPACT_ORG")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Not authenticated"));
}

#[test]
fn test_config_set_and_get() {
    let dir = tempfile::tempdir().unwrap();
    let (code, _, _) = run_cli(dir.path(), &["config", "set", "analytics.default_total_budget", "120000"]);
    assert_eq!(code, 0);
    let (code, stdout, _) = run_cli(dir.path(), &["config", "get", "analytics.default_total_budget"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim().parse::<f64>().unwrap(), 120000.0);
}

#[test]
fn test_completions() {
    let dir = tempfile::tempdir().unwrap();
    let (code, stdout, _) = run_cli(dir.path(), &["completions", "bash"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("impact"));
}
