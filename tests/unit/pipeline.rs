use jobtmpl_cli::schema::{PathSegment, validate_document};
use jobtmpl_cli::store::InMemoryStore;
use jobtmpl_cli::template::{Step, TemplateDocument, parse_document};
use jobtmpl_cli::test_utils::{TemplateFixture, init_test_logging};
use jobtmpl_cli::validator::{FatalKind, ValidationOutcome, validate_template};
use serde_json::json;

fn document(fixture: &TemplateFixture) -> TemplateDocument {
    let value = parse_document(&fixture.content).unwrap();
    validate_document(&value).unwrap()
}

fn store() -> InMemoryStore {
    InMemoryStore::default()
        .with_template(document(&TemplateFixture::node_base()))
        .with_template(document(&TemplateFixture::node_base_v1_0()))
}

#[tokio::test]
async fn test_standalone_template_round_trips() {
    init_test_logging(None);
    let fixture = TemplateFixture::standalone();
    let store = store();

    let outcome = validate_template(&fixture.content, Some(&store), "default").await.unwrap();
    let report = serde_json::to_value(outcome.to_report().unwrap().unwrap()).unwrap();

    assert_eq!(
        report,
        json!({
            "errors": [],
            "template": {
                "name": "lint",
                "version": "0.1.0",
                "description": "Lint only",
                "maintainer": "dev@example.com",
                "config": {
                    "image": "alpine:3",
                    "steps": [{"lint": "make lint"}]
                }
            }
        })
    );
}

#[tokio::test]
async fn test_ordered_child_composes() {
    init_test_logging(None);
    let store = store();

    let outcome = validate_template(&TemplateFixture::ordered_child().content, Some(&store), "default")
        .await
        .unwrap();
    let ValidationOutcome::Composed {
        document,
        warnings,
    } = outcome
    else {
        panic!("expected composition to succeed");
    };

    assert_eq!(warnings, vec!["lint step definition not found; skipping"]);
    assert_eq!(
        document.config.steps,
        Some(vec![
            Step::command("install", "npm ci"),
            Step::command("test", "npm run test:ci"),
            Step::command("teardown-clean", "rm -rf node_modules"),
        ])
    );
    assert_eq!(document.config.environment["NODE_ENV"], "test");
    assert_eq!(document.config.environment["TEMPLATE_VERSION"], "1.2.0");
}

#[tokio::test]
async fn test_older_parent_by_exact_version() {
    let store = store();
    let child = TemplateFixture::ordered_child()
        .content
        .replace("tools/node-base@1", "tools/node-base@1.0.0")
        .replace(", teardown-clean]", "]");

    let outcome = validate_template(&child, Some(&store), "default").await.unwrap();
    let ValidationOutcome::Composed {
        document,
        ..
    } = outcome
    else {
        panic!("expected composition to succeed");
    };
    assert_eq!(document.config.image.as_deref(), Some("node:18"));
    assert_eq!(document.config.environment["TEMPLATE_VERSION"], "1.0.0");
}

#[tokio::test]
async fn test_incomplete_order_is_fatal() {
    let store = store();
    let outcome = validate_template(&TemplateFixture::incomplete_order_child().content, Some(&store), "default")
        .await
        .unwrap();

    let ValidationOutcome::Fatal {
        kind,
        detail,
    } = outcome
    else {
        panic!("expected a fatal outcome");
    };
    assert_eq!(kind, FatalKind::Composition);
    assert!(detail.contains("teardown-clean"));
    assert!(detail.contains("tools/node-base@1.2.0"));
}

#[tokio::test]
async fn test_structural_violations_surface_as_data() {
    let outcome = validate_template(&TemplateFixture::structurally_invalid().content, None, "default")
        .await
        .unwrap();

    let ValidationOutcome::StructurallyInvalid {
        partial,
        violations,
    } = outcome
    else {
        panic!("expected structural violations");
    };
    assert_eq!(violations.len(), 2);
    assert_eq!(violations[0].path, vec![PathSegment::from("description")]);
    assert_eq!(partial["name"], json!("broken"));
}

#[tokio::test]
async fn test_no_store_leaves_reference_unresolved() {
    let outcome = validate_template(&TemplateFixture::wrapping_child().content, None, "default")
        .await
        .unwrap();

    let ValidationOutcome::Composed {
        document,
        warnings,
    } = outcome
    else {
        panic!("expected the document back unchanged");
    };
    assert!(warnings.is_empty());
    assert_eq!(document.config.template.as_deref(), Some("tools/node-base"));
    assert_eq!(document.config.steps.map(|steps| steps.len()), Some(4));
}
