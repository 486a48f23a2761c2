//! Merge invariants checked across a spread of parent/child shapes.

use jobtmpl_cli::compose::compose;
use jobtmpl_cli::store::InMemoryStore;
use jobtmpl_cli::template::{JobConfig, Step, TemplateDocument};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

fn document(name: &str, config: JobConfig) -> TemplateDocument {
    TemplateDocument {
        id: None,
        namespace: Some("tools".to_string()),
        name: name.to_string(),
        version: "1.0.0".to_string(),
        description: "property fixture".to_string(),
        maintainer: "ci@example.com".to_string(),
        config,
        images: None,
    }
}

fn child_of(config: JobConfig) -> TemplateDocument {
    document(
        "child",
        JobConfig {
            template: Some("tools/parent@1".to_string()),
            ..config
        },
    )
}

fn store_with(config: JobConfig) -> InMemoryStore {
    InMemoryStore::default().with_template(document("parent", config))
}

fn step_sets() -> Vec<(Vec<Step>, Vec<Step>)> {
    vec![
        (
            vec![Step::command("build", "make"), Step::locked("audit", "npm audit")],
            vec![Step::command("audit", "true"), Step::command("build", "make fast")],
        ),
        (
            vec![Step::locked("teardown-a", "cleanup"), Step::command("test", "run")],
            vec![Step::command("teardown-a", "skip"), Step::command("teardown-b", "report")],
        ),
        (
            vec![
                Step::command("teardown-logs", "upload"),
                Step::locked("install", "npm ci"),
                Step::command("test", "npm test"),
            ],
            vec![
                Step::command("teardown-x", "x"),
                Step::command("preinstall", "setup"),
                Step::command("install", "npm install"),
                Step::command("posttest", "coverage"),
            ],
        ),
    ]
}

#[tokio::test]
async fn test_no_template_returns_config_unchanged() {
    let configs = vec![
        JobConfig {
            image: Some("alpine".to_string()),
            steps: Some(vec![Step::command("build", "make")]),
            ..JobConfig::default()
        },
        JobConfig {
            image: Some("node:20".to_string()),
            secrets: strings(&["A", "A", "B"]),
            requires: Some(strings(&["~pr"])),
            cache: Some(false),
            steps: Some(vec![Step::locked("teardown-z", "z"), Step::command("build", "make")]),
            ..JobConfig::default()
        },
    ];
    let store = store_with(JobConfig::default());

    for config in configs {
        let doc = document("solo", config.clone());
        let result = compose(&doc, Some(&store), "default").await.unwrap();
        assert_eq!(result.flattened_config, config);
        assert!(result.warnings.is_empty());
    }
}

#[tokio::test]
async fn test_secret_and_source_path_union_is_exact() {
    let cases = [
        (vec!["A", "B"], vec!["B", "C"]),
        (vec![], vec!["X", "X"]),
        (vec!["P", "P", "Q"], vec![]),
        (vec!["K"], vec!["K"]),
    ];

    for (parent, child) in cases {
        let store = store_with(JobConfig {
            secrets: strings(&parent),
            source_paths: strings(&parent),
            ..JobConfig::default()
        });
        let doc = child_of(JobConfig {
            secrets: strings(&child),
            source_paths: strings(&child),
            ..JobConfig::default()
        });

        let merged = compose(&doc, Some(&store), "default").await.unwrap().flattened_config;
        for list in [&merged.secrets, &merged.source_paths] {
            let mut expected: Vec<&str> = Vec::new();
            for entry in parent.iter().chain(&child) {
                if !expected.contains(entry) {
                    expected.push(entry);
                }
            }
            assert_eq!(list, &strings(&expected));
        }
    }
}

/// `None` for wrap mode, otherwise an `order` naming every step on both sides.
fn modes(parent_steps: &[Step], child_steps: &[Step]) -> [Option<Vec<String>>; 2] {
    let mut order: Vec<String> = Vec::new();
    for step in parent_steps.iter().chain(child_steps) {
        if !order.contains(&step.name) {
            order.push(step.name.clone());
        }
    }
    [None, Some(order)]
}

#[tokio::test]
async fn test_locked_steps_keep_parent_command() {
    for (parent_steps, child_steps) in step_sets() {
        for order in modes(&parent_steps, &child_steps) {
            let store = store_with(JobConfig {
                steps: Some(parent_steps.clone()),
                ..JobConfig::default()
            });
            let doc = child_of(JobConfig {
                steps: Some(child_steps.clone()),
                order: order.clone(),
                ..JobConfig::default()
            });

            let result = compose(&doc, Some(&store), "default").await.unwrap();
            let merged = result.flattened_config.steps.unwrap();

            for locked in parent_steps.iter().filter(|step| step.definition.is_locked()) {
                let found: Vec<&Step> = merged.iter().filter(|step| step.name == locked.name).collect();
                assert_eq!(found.len(), 1, "locked step {} appears once (order: {order:?})", locked.name);
                assert_eq!(found[0].definition.command(), locked.definition.command());

                if child_steps.iter().any(|step| step.name == locked.name) {
                    let expected = format!(
                        "cannot override locked step {}; using step definition from template tools/parent@1",
                        locked.name
                    );
                    assert!(
                        result.warnings.contains(&expected),
                        "missing warning for {} (order: {order:?}): {:?}",
                        locked.name,
                        result.warnings
                    );
                }
            }
        }
    }
}

#[tokio::test]
async fn test_teardown_steps_come_last() {
    for (parent_steps, child_steps) in step_sets() {
        for order in modes(&parent_steps, &child_steps) {
            let store = store_with(JobConfig {
                steps: Some(parent_steps.clone()),
                ..JobConfig::default()
            });
            let doc = child_of(JobConfig {
                steps: Some(child_steps.clone()),
                order,
                ..JobConfig::default()
            });

            let merged = compose(&doc, Some(&store), "default").await.unwrap().flattened_config.steps.unwrap();
            let first_teardown = merged.iter().position(Step::is_teardown).unwrap_or(merged.len());
            assert!(
                merged[first_teardown..].iter().all(Step::is_teardown),
                "teardown steps must trail: {merged:?}"
            );
        }
    }
}

#[tokio::test]
async fn test_order_must_cover_locked_steps() {
    let store = store_with(JobConfig {
        steps: Some(vec![
            Step::locked("a", "1"),
            Step::locked("b", "2"),
            Step::command("c", "3"),
        ]),
        ..JobConfig::default()
    });
    let doc = child_of(JobConfig {
        order: Some(strings(&["a", "c"])),
        ..JobConfig::default()
    });

    let err = compose(&doc, Some(&store), "default").await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("missing: b"), "{message}");
    assert!(!message.contains("missing: a"), "{message}");
}
