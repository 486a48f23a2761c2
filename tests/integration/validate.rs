use jobtmpl_cli::test_utils::TemplateFixture;
use predicates::prelude::*;
use serde_json::json;

use crate::common::TestProject;

/// A document without a parent validates on its own
#[test]
fn test_validate_standalone_document() {
    let project = TestProject::new().unwrap();
    project.write_document(&TemplateFixture::standalone()).unwrap();

    project
        .run_jobtmpl(&["validate", "standalone.yaml"])
        .unwrap()
        .assert_success()
        .assert_stdout_contains("✓")
        .assert_stdout_contains("standalone.yaml is valid");
}

/// Every violation is listed, and the exit status is non-zero
#[test]
fn test_validate_reports_all_violations() {
    let project = TestProject::new().unwrap();
    project.write_document(&TemplateFixture::structurally_invalid()).unwrap();

    let output = project.run_jobtmpl(&["validate", "invalid.yaml"]).unwrap();
    output
        .assert_failure()
        .assert_stdout_contains("has 2 error(s)")
        .assert_stdout_contains("\"description\" is required")
        .assert_stdout_contains("\"config.image\" must be a string")
        .assert_stderr_contains("Template validation failed with 2 error(s)");
    assert_eq!(output.code, Some(1));
}

/// JSON report for a structural failure carries paths and the parsed document
#[test]
fn test_validate_json_structural_failure() {
    let project = TestProject::new().unwrap();
    project.write_document(&TemplateFixture::structurally_invalid()).unwrap();

    let output = project.run_jobtmpl(&["validate", "invalid.yaml", "--format", "json"]).unwrap();
    output.assert_failure();

    let report = output.json();
    assert_eq!(
        report["errors"],
        json!([
            {"path": ["description"], "message": "\"description\" is required"},
            {"path": ["config", "image"], "message": "\"config.image\" must be a string"}
        ])
    );
    assert_eq!(report["template"]["config"]["image"], json!(42));
    assert!(report.get("warnMessages").is_none());
}

/// Composition against a templates directory, with warnings in the report
#[test]
fn test_validate_composes_with_parent() {
    let project = TestProject::new().unwrap();
    project.add_template(&TemplateFixture::node_base()).unwrap();
    project.add_template(&TemplateFixture::node_base_v1_0()).unwrap();
    project.write_document(&TemplateFixture::ordered_child()).unwrap();
    let templates = project.templates_path().display().to_string();

    let output = project
        .run_jobtmpl(&["validate", "ordered-child.yaml", "--templates-dir", &templates, "--format", "json"])
        .unwrap();
    output.assert_success();

    let report = output.json();
    assert_eq!(report["errors"], json!([]));
    assert_eq!(report["warnMessages"], json!(["lint step definition not found; skipping"]));

    let config = &report["template"]["config"];
    assert_eq!(config["image"], json!("node:20"));
    assert_eq!(config["templateId"], json!("tools/node-base@1.2.0"));
    assert_eq!(config["secrets"], json!(["NPM_TOKEN", "SENTRY_TOKEN"]));
    assert_eq!(
        config["steps"],
        json!([
            {"install": "npm ci"},
            {"test": "npm run test:ci"},
            {"teardown-clean": "rm -rf node_modules"}
        ])
    );
    assert_eq!(config["environment"]["TEMPLATE_FULLNAME"], json!("tools/node-base"));
    assert!(config.get("order").is_none());
    assert!(config.get("template").is_none());
}

/// Warnings fail the run in strict mode
#[test]
fn test_validate_strict_fails_on_warnings() {
    let project = TestProject::new().unwrap();
    project.add_template(&TemplateFixture::node_base()).unwrap();
    project.write_document(&TemplateFixture::ordered_child()).unwrap();
    let templates = project.templates_path().display().to_string();

    project
        .jobtmpl()
        .args(["validate", "ordered-child.yaml", "--templates-dir", &templates, "--strict"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("⚠ lint step definition not found; skipping"));
}

/// A missing locked step in `order` is fatal and names the step
#[test]
fn test_validate_missing_locked_step_is_fatal() {
    let project = TestProject::new().unwrap();
    project.add_template(&TemplateFixture::node_base()).unwrap();
    project.write_document(&TemplateFixture::incomplete_order_child()).unwrap();
    let templates = project.templates_path().display().to_string();

    let output = project
        .run_jobtmpl(&["validate", "incomplete-order-child.yaml", "--templates-dir", &templates, "--format", "json"])
        .unwrap();
    output.assert_failure();

    let report = output.json();
    assert_eq!(report["fatal"], json!("composition"));
    assert!(report["detail"].as_str().unwrap().contains("teardown-clean"));
}

/// An unknown parent is fatal and names the reference
#[test]
fn test_validate_unknown_parent() {
    let project = TestProject::new().unwrap();
    project.write_document(&TemplateFixture::ordered_child()).unwrap();
    let templates = project.templates_path().display().to_string();

    project
        .jobtmpl()
        .args(["validate", "ordered-child.yaml", "--templates-dir", &templates])
        .assert()
        .failure()
        .stdout(predicate::str::contains("composition error"))
        .stdout(predicate::str::contains("Template tools/node-base@1 does not exist"));
}

/// Malformed text is a parse failure, not a list of violations
#[test]
fn test_validate_malformed_document() {
    let project = TestProject::new().unwrap();
    project.write_document(&TemplateFixture::malformed()).unwrap();

    project
        .jobtmpl()
        .args(["validate", "malformed.yaml", "--format", "json"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"fatal\": \"parse\""));
}

/// A missing input file is reported on stderr
#[test]
fn test_validate_missing_file() {
    let project = TestProject::new().unwrap();

    project
        .jobtmpl()
        .args(["validate", "absent.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("absent.yaml"));
}
