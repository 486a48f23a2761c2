use jobtmpl_cli::test_utils::TemplateFixture;
use predicates::prelude::*;
use serde_json::json;

use crate::common::TestProject;

/// `templates_dir` from the config file backs the store
#[test]
fn test_templates_dir_from_config() {
    let project = TestProject::new().unwrap();
    project.add_template(&TemplateFixture::node_base()).unwrap();
    project.write_document(&TemplateFixture::wrapping_child()).unwrap();
    let templates = project.templates_path().display().to_string().replace('\\', "/");
    project.write_config(&format!("templates_dir = \"{templates}\"\n")).unwrap();

    let output = project.run_jobtmpl(&["validate", "wrapping-child.yaml", "--format", "json"]).unwrap();
    output.assert_success();
    assert_eq!(output.json()["template"]["config"]["image"], json!("node:20"));
}

/// `strict = true` in the config file turns warnings into failures
#[test]
fn test_strict_from_config() {
    let project = TestProject::new().unwrap();
    project.add_template(&TemplateFixture::node_base()).unwrap();
    project.write_document(&TemplateFixture::wrapping_child()).unwrap();
    project.write_config("strict = true\n").unwrap();
    let templates = project.templates_path().display().to_string();

    project
        .jobtmpl()
        .args(["validate", "wrapping-child.yaml", "--templates-dir", &templates])
        .assert()
        .failure();
}

/// An unreadable config is reported with its path
#[test]
fn test_invalid_config_file() {
    let project = TestProject::new().unwrap();
    project.write_document(&TemplateFixture::standalone()).unwrap();
    project.write_config("strict = \"sometimes\"\n").unwrap();

    project
        .jobtmpl()
        .args(["validate", "standalone.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to parse config"));
}

/// `--namespace` changes which namespace is implicit in references
#[test]
fn test_namespace_flag() {
    let project = TestProject::new().unwrap();
    project.add_template(&TemplateFixture::node_base()).unwrap();
    std::fs::write(
        project.project_path().join("short-ref.yaml"),
        "\
name: short
version: 1.0.0
description: Short reference
maintainer: dev@example.com
config:
  template: node-base
",
    )
    .unwrap();
    let templates = project.templates_path().display().to_string();

    project
        .jobtmpl()
        .args(["validate", "short-ref.yaml", "--templates-dir", &templates])
        .assert()
        .failure()
        .stdout(predicate::str::contains("does not exist"));

    let output = project
        .run_jobtmpl(&[
            "--namespace",
            "tools",
            "validate",
            "short-ref.yaml",
            "--templates-dir",
            &templates,
            "--format",
            "json",
        ])
        .unwrap();
    output.assert_success();
    let environment = &output.json()["template"]["config"]["environment"];
    assert_eq!(environment["TEMPLATE_FULLNAME"], json!("node-base"));
    assert_eq!(environment["TEMPLATE_NAMESPACE"], json!("tools"));
}

#[test]
fn test_verbose_logs_to_stderr() {
    let project = TestProject::new().unwrap();
    project.write_document(&TemplateFixture::standalone()).unwrap();

    let output = project.run_jobtmpl(&["-v", "validate", "standalone.yaml", "--format", "json"]).unwrap();
    output.assert_success();
    assert!(!output.stderr.is_empty());
    assert_eq!(output.json()["errors"], json!([]));
}
