//! Field rules for the template schema.
//!
//! Fields are checked in a fixed order (top-level identity fields, then
//! `config`, then `images`, then unknown keys) so violation lists are stable.

use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;

use super::{PathSegment, Violation, label_of};

static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.-]+$").expect("name pattern is valid"));

static NAMESPACE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.-]+(/[\w.-]+)*$").expect("namespace pattern is valid"));

static VERSION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(\.\d+)?(\.\d+)?$").expect("version pattern is valid"));

static STEP_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w-]+$").expect("step name pattern is valid"));

static TEMPLATE_REF_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([\w.-]+/)*[\w.-]+(@[\w.-]+)?$").expect("template reference pattern is valid")
});

static ENV_KEY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("env key pattern is valid"));

static SECRET_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z_][A-Z0-9_]*$").expect("secret pattern is valid"));

const DOCUMENT_KEYS: &[&str] =
    &["id", "namespace", "name", "version", "description", "maintainer", "config", "images"];

const CONFIG_KEYS: &[&str] = &[
    "image",
    "environment",
    "settings",
    "annotations",
    "secrets",
    "sourcePaths",
    "requires",
    "blockedBy",
    "freezeWindows",
    "cache",
    "parameters",
    "order",
    "template",
    "templateId",
    "steps",
];

#[derive(Clone, Copy, PartialEq, Eq)]
enum Presence {
    Required,
    Optional,
}

#[derive(Default)]
struct Checker {
    violations: Vec<Violation>,
}

fn child(path: &[PathSegment], segment: impl Into<PathSegment>) -> Vec<PathSegment> {
    let mut next = path.to_vec();
    next.push(segment.into());
    next
}

/// Check a whole document, applying coercions in place. Returns every violation.
pub(super) fn check_document(document: &mut Value) -> Vec<Violation> {
    let mut checker = Checker::default();

    let Some(root) = document.as_object_mut() else {
        checker.must_be(&[], "of type object");
        return checker.violations;
    };

    checker.id_field(root, &[], "id");
    checker.string_field(root, &[], "namespace", Presence::Optional, Some(&NAMESPACE_PATTERN));
    checker.string_field(root, &[], "name", Presence::Required, Some(&NAME_PATTERN));
    checker.version_field(root);
    checker.string_field(root, &[], "description", Presence::Required, None);
    checker.string_field(root, &[], "maintainer", Presence::Required, None);

    let config_path = child(&[], "config");
    match root.get_mut("config") {
        None => checker.required(&config_path),
        Some(config) => checker.config(config, &config_path),
    }

    checker.images(root);
    checker.unknown_keys(root, &[], DOCUMENT_KEYS);

    checker.violations
}

impl Checker {
    fn push(&mut self, path: &[PathSegment], detail: &str) {
        self.violations.push(Violation {
            path: path.to_vec(),
            message: format!("\"{}\" {detail}", label_of(path)),
        });
    }

    fn required(&mut self, path: &[PathSegment]) {
        self.push(path, "is required");
    }

    fn must_be(&mut self, path: &[PathSegment], what: &str) {
        self.push(path, &format!("must be {what}"));
    }

    fn not_allowed(&mut self, path: &[PathSegment]) {
        self.push(path, "is not allowed");
    }

    fn pattern(&mut self, path: &[PathSegment], value: &str, pattern: &Regex) -> bool {
        if pattern.is_match(value) {
            return true;
        }
        self.push(
            path,
            &format!("with value \"{value}\" fails to match the required pattern: {}", pattern.as_str()),
        );
        false
    }

    fn unknown_keys(&mut self, map: &Map<String, Value>, path: &[PathSegment], allowed: &[&str]) {
        for key in map.keys() {
            if !allowed.contains(&key.as_str()) {
                self.not_allowed(&child(path, key.as_str()));
            }
        }
    }

    /// Validate a string leaf; returns `true` when present and valid.
    fn string_value(&mut self, value: &Value, path: &[PathSegment], pattern: Option<&Regex>) -> bool {
        match value {
            Value::String(s) if s.is_empty() => {
                self.push(path, "is not allowed to be empty");
                false
            }
            Value::String(s) => pattern.is_none_or(|p| self.pattern(path, s, p)),
            _ => {
                self.must_be(path, "a string");
                false
            }
        }
    }

    fn string_field(
        &mut self,
        map: &Map<String, Value>,
        parent: &[PathSegment],
        key: &str,
        presence: Presence,
        pattern: Option<&Regex>,
    ) {
        let path = child(parent, key);
        match map.get(key) {
            None if presence == Presence::Required => self.required(&path),
            None => {}
            Some(value) => {
                self.string_value(value, &path, pattern);
            }
        }
    }

    fn id_field(&mut self, map: &Map<String, Value>, parent: &[PathSegment], key: &str) {
        match map.get(key) {
            None | Some(Value::String(_)) => {}
            Some(Value::Number(n)) if n.is_u64() => {}
            Some(_) => self.must_be(&child(parent, key), "one of [number, string]"),
        }
    }

    fn version_field(&mut self, root: &mut Map<String, Value>) {
        let path = child(&[], "version");
        match root.get_mut("version") {
            None => self.required(&path),
            Some(value) => {
                if let Value::Number(n) = value {
                    let text = n.to_string();
                    if self.pattern(&path, &text, &VERSION_PATTERN) {
                        *value = Value::String(text);
                    }
                } else {
                    self.string_value(value, &path, Some(&VERSION_PATTERN));
                }
            }
        }
    }

    fn config(&mut self, config: &mut Value, path: &[PathSegment]) {
        let Some(config) = config.as_object_mut() else {
            self.must_be(path, "of type object");
            return;
        };

        let extends = config.get("template").is_some_and(|t| !t.is_null());
        let inherited = if extends {
            Presence::Optional
        } else {
            Presence::Required
        };

        self.string_field(config, path, "image", inherited, None);
        self.environment(config, path);
        self.object_field(config, path, "settings");
        self.object_field(config, path, "annotations");
        self.string_list(config, path, "secrets", Some(&SECRET_PATTERN));
        self.string_list(config, path, "sourcePaths", None);
        self.string_or_list(config, path, "requires");
        self.string_or_list(config, path, "blockedBy");
        self.string_list(config, path, "freezeWindows", None);
        self.boolean_field(config, path, "cache");
        self.parameters(config, path);
        self.string_list(config, path, "order", Some(&STEP_NAME_PATTERN));
        self.string_field(config, path, "template", Presence::Optional, Some(&TEMPLATE_REF_PATTERN));
        self.id_field(config, path, "templateId");

        let steps_path = child(path, "steps");
        match config.get("steps") {
            None if inherited == Presence::Required => self.required(&steps_path),
            None => {}
            Some(steps) => self.steps(steps, &steps_path),
        }

        self.unknown_keys(config, path, CONFIG_KEYS);
    }

    fn object_field(&mut self, map: &Map<String, Value>, parent: &[PathSegment], key: &str) {
        if let Some(value) = map.get(key)
            && !value.is_object()
        {
            self.must_be(&child(parent, key), "of type object");
        }
    }

    fn boolean_field(&mut self, map: &Map<String, Value>, parent: &[PathSegment], key: &str) {
        if let Some(value) = map.get(key)
            && !value.is_boolean()
        {
            self.must_be(&child(parent, key), "a boolean");
        }
    }

    fn string_list(
        &mut self,
        map: &Map<String, Value>,
        parent: &[PathSegment],
        key: &str,
        item_pattern: Option<&Regex>,
    ) {
        let path = child(parent, key);
        match map.get(key) {
            None => {}
            Some(Value::Array(items)) => {
                for (i, item) in items.iter().enumerate() {
                    self.string_value(item, &child(&path, i), item_pattern);
                }
            }
            Some(_) => self.must_be(&path, "an array"),
        }
    }

    fn string_or_list(&mut self, map: &mut Map<String, Value>, parent: &[PathSegment], key: &str) {
        let path = child(parent, key);
        let Some(value) = map.get_mut(key) else {
            return;
        };
        match value {
            Value::String(_) => {
                if self.string_value(value, &path, None) {
                    let single = value.take();
                    *value = Value::Array(vec![single]);
                }
            }
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    self.string_value(item, &child(&path, i), None);
                }
            }
            _ => self.must_be(&path, "one of [string, array]"),
        }
    }

    fn environment(&mut self, config: &mut Map<String, Value>, parent: &[PathSegment]) {
        let path = child(parent, "environment");
        let Some(value) = config.get_mut("environment") else {
            return;
        };
        let Some(environment) = value.as_object_mut() else {
            self.must_be(&path, "of type object");
            return;
        };

        for (key, value) in environment.iter_mut() {
            let entry_path = child(&path, key.as_str());
            if !ENV_KEY_PATTERN.is_match(key) {
                self.not_allowed(&entry_path);
                continue;
            }
            match value {
                Value::String(_) => {}
                Value::Number(n) => {
                    let text = n.to_string();
                    *value = Value::String(text);
                }
                Value::Bool(b) => {
                    let text = b.to_string();
                    *value = Value::String(text);
                }
                _ => self.must_be(&entry_path, "one of [string, number, boolean]"),
            }
        }
    }

    fn parameters(&mut self, config: &Map<String, Value>, parent: &[PathSegment]) {
        let path = child(parent, "parameters");
        let Some(value) = config.get("parameters") else {
            return;
        };
        let Some(parameters) = value.as_object() else {
            self.must_be(&path, "of type object");
            return;
        };

        for (name, parameter) in parameters {
            let parameter_path = child(&path, name.as_str());
            match parameter {
                Value::String(_) | Value::Array(_) => self.parameter_value(parameter, &parameter_path),
                Value::Object(detailed) => {
                    let value_path = child(&parameter_path, "value");
                    match detailed.get("value") {
                        None => self.required(&value_path),
                        Some(value) => self.parameter_value(value, &value_path),
                    }
                    self.string_field(detailed, &parameter_path, "description", Presence::Optional, None);
                    self.unknown_keys(detailed, &parameter_path, &["value", "description"]);
                }
                _ => self.must_be(&parameter_path, "one of [string, array, object]"),
            }
        }
    }

    fn parameter_value(&mut self, value: &Value, path: &[PathSegment]) {
        match value {
            Value::String(_) => {}
            Value::Array(choices) => {
                for (i, choice) in choices.iter().enumerate() {
                    if !choice.is_string() {
                        self.must_be(&child(path, i), "a string");
                    }
                }
            }
            _ => self.must_be(path, "one of [string, array]"),
        }
    }

    fn steps(&mut self, steps: &Value, path: &[PathSegment]) {
        let Some(entries) = steps.as_array() else {
            self.must_be(path, "an array");
            return;
        };

        for (i, entry) in entries.iter().enumerate() {
            let entry_path = child(path, i);
            let Some(entry) = entry.as_object() else {
                self.must_be(&entry_path, "of type object");
                continue;
            };
            if entry.len() != 1 {
                self.push(&entry_path, "must have 1 key");
                continue;
            }

            for (name, definition) in entry {
                let step_path = child(&entry_path, name.as_str());
                if !STEP_NAME_PATTERN.is_match(name) {
                    self.not_allowed(&step_path);
                    continue;
                }
                self.step_definition(definition, &step_path);
            }
        }
    }

    fn step_definition(&mut self, definition: &Value, path: &[PathSegment]) {
        match definition {
            Value::String(_) => {
                self.string_value(definition, path, None);
            }
            Value::Object(spec) => {
                self.string_field(spec, path, "command", Presence::Required, None);
                self.boolean_field(spec, path, "locked");
                self.unknown_keys(spec, path, &["command", "locked"]);
            }
            _ => self.must_be(path, "one of [string, object]"),
        }
    }

    fn images(&mut self, root: &Map<String, Value>) {
        let path = child(&[], "images");
        let Some(value) = root.get("images") else {
            return;
        };
        let Some(images) = value.as_object() else {
            self.must_be(&path, "of type object");
            return;
        };
        for (label, image) in images {
            self.string_value(image, &child(&path, label.as_str()), None);
        }
    }
}
