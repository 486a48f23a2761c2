//! Canned template documents
//!
//! The parent fixtures share the `tools` namespace so children can reference
//! them as `tools/<name>@<version>`.

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// A template document and the file name it is written under.
#[derive(Clone, Debug)]
pub struct TemplateFixture {
    pub name: String,
    pub content: String,
}

impl TemplateFixture {
    fn new(name: &str, content: &str) -> Self {
        Self {
            name: name.to_string(),
            content: content.trim_start().to_string(),
        }
    }

    /// Parent with a locked teardown step and an image alias.
    pub fn node_base() -> Self {
        Self::new(
            "node-base",
            r"
namespace: tools
name: node-base
version: 1.2.0
description: Node.js build base
maintainer: ci-team@example.com
images:
  lts: node:20
config:
  image: lts
  environment:
    NODE_ENV: test
  secrets: [NPM_TOKEN]
  steps:
    - install: npm ci
    - test: npm test
    - teardown-clean:
        command: rm -rf node_modules
        locked: true
",
        )
    }

    /// Older release of [`node_base`](Self::node_base).
    pub fn node_base_v1_0() -> Self {
        Self::new(
            "node-base-1.0",
            r"
namespace: tools
name: node-base
version: 1.0.0
description: Node.js build base
maintainer: ci-team@example.com
config:
  image: node:18
  steps:
    - install: npm install
    - test: npm test
",
        )
    }

    /// Child that orders the parent's steps and covers the locked teardown.
    pub fn ordered_child() -> Self {
        Self::new(
            "ordered-child",
            r"
name: web-app
version: 2.0.0
description: Web app build
maintainer: web@example.com
config:
  template: tools/node-base@1
  order: [install, lint, test, teardown-clean]
  secrets: [SENTRY_TOKEN, NPM_TOKEN]
  steps:
    - test: npm run test:ci
",
        )
    }

    /// Child whose `order` leaves out the parent's locked teardown.
    pub fn incomplete_order_child() -> Self {
        Self::new(
            "incomplete-order-child",
            r"
name: web-app
version: 2.0.1
description: Web app build
maintainer: web@example.com
config:
  template: tools/node-base@1.2.0
  order: [install, test]
",
        )
    }

    /// Child that wraps the parent's steps.
    pub fn wrapping_child() -> Self {
        Self::new(
            "wrapping-child",
            r"
name: api
version: 1.0.0
description: API build
maintainer: api@example.com
config:
  template: tools/node-base
  steps:
    - preinstall: npm config set fund false
    - test: npm run test:api
    - teardown-clean: echo skip
    - teardown-report: ./report.sh
",
        )
    }

    /// Standalone template with no parent.
    pub fn standalone() -> Self {
        Self::new(
            "standalone",
            r"
name: lint
version: 0.1.0
description: Lint only
maintainer: dev@example.com
config:
  image: alpine:3
  steps:
    - lint: make lint
",
        )
    }

    /// Missing `description`, numeric `image`.
    pub fn structurally_invalid() -> Self {
        Self::new(
            "invalid",
            r"
name: broken
version: 1.0.0
maintainer: dev@example.com
config:
  image: 42
  steps:
    - build: make
",
        )
    }

    /// Text that does not parse.
    pub fn malformed() -> Self {
        Self::new("malformed", "name: [unclosed\n")
    }

    /// Write the document to `<dir>/<name>.yaml`.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(format!("{}.yaml", self.name));
        fs::write(&path, &self.content)?;
        Ok(path)
    }
}
