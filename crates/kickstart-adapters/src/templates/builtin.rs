//! Templates compiled into the binary.
//!
//! Text files are `{{VARIABLE}}` templates rendered through
//! [`RenderContext`]. The manifest is built as JSON instead, so the package
//! name is always the exact project name whatever characters it contains.

use serde_json::{Map, Value, json};
use tracing::debug;

use kickstart_core::{
    application::ports::{Artifact, Features, ScaffoldTemplates},
    domain::{ProjectStructure, RenderContext, TaskError},
};

/// The default template set.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTemplates;

impl BuiltinTemplates {
    pub fn new() -> Self {
        Self
    }
}

impl ScaffoldTemplates for BuiltinTemplates {
    fn render(
        &self,
        artifact: Artifact,
        ctx: &RenderContext,
        features: Features,
    ) -> Result<ProjectStructure, TaskError> {
        debug!(%artifact, react = features.react, app = features.app, "Rendering");

        let mut out = ProjectStructure::new();
        match artifact {
            Artifact::Manifest => out.add_file("package.json", manifest(ctx, features)?),
            Artifact::Readme => {
                let body = if features.app { README_APP } else { README_LIB };
                out.add_file("README.md", ctx.render(body));
            }
            Artifact::LinterConfig => {
                let body = if features.react { ESLINT_REACT } else { ESLINT };
                out.add_file("eslint.config.js", ctx.render(body));
            }
            Artifact::License => {
                let body = match ctx.get("LICENSE") {
                    Some("MIT") | None => LICENSE_MIT,
                    Some(_) => LICENSE_OTHER,
                };
                out.add_file("LICENSE", ctx.render(body));
            }
            Artifact::CiWorkflow => {
                out.add_file(".github/workflows/ci.yml", ctx.render(CI_WORKFLOW));
                if !features.app {
                    out.add_file(".github/workflows/publish.yml", ctx.render(PUBLISH_WORKFLOW));
                }
            }
            Artifact::Sources => {
                out.add_directory("src");
                out.add_directory("test");
                out.add_file(".gitignore", GITIGNORE);
                out.add_file("src/index.js", ctx.render(INDEX_JS));
                out.add_file("test/index.test.js", ctx.render(INDEX_TEST_JS));
                if features.react {
                    out.add_file("src/App.jsx", ctx.render(APP_JSX));
                    out.add_file("test/App.test.jsx", ctx.render(APP_TEST_JSX));
                }
            }
            Artifact::Infrastructure => {
                out.add_file("infra/main.tf", ctx.render(MAIN_TF));
            }
            Artifact::LocalEnv => out.add_file(".env", local_env(ctx)),
        }
        Ok(out)
    }
}

fn manifest(ctx: &RenderContext, features: Features) -> Result<String, TaskError> {
    let var = |key: &str| ctx.get(key).unwrap_or_default().to_string();

    let mut scripts = Map::new();
    scripts.insert("lint".into(), json!("eslint ."));
    scripts.insert(
        "test".into(),
        json!(if features.react { "vitest run" } else { "node --test" }),
    );

    let mut dev_dependencies = Map::new();
    dev_dependencies.insert("eslint".into(), json!("^9.0.0"));
    dev_dependencies.insert("@eslint/js".into(), json!("^9.0.0"));

    let mut manifest = json!({
        "name": ctx.project_name(),
        "version": var("VERSION"),
        "description": "",
        "main": "src/index.js",
        "type": "module",
        "license": var("LICENSE"),
        "author": var("AUTHOR"),
        "engines": { "node": format!(">={}", var("NODE_VERSION")) },
    });

    if features.react {
        dev_dependencies.insert("vitest".into(), json!("^2.0.0"));
        dev_dependencies.insert("jsdom".into(), json!("^25.0.0"));
        dev_dependencies.insert("@testing-library/react".into(), json!("^16.0.0"));
        dev_dependencies.insert("eslint-plugin-react".into(), json!("^7.35.0"));
        manifest["dependencies"] = json!({
            "react": "^18.3.0",
            "react-dom": "^18.3.0",
        });
    }
    if features.app {
        manifest["private"] = json!(true);
        manifest["homepage"] = json!(format!("https://{}", ctx.project_name()));
    } else {
        manifest["files"] = json!(["src"]);
    }
    manifest["scripts"] = Value::Object(scripts);
    manifest["devDependencies"] = Value::Object(dev_dependencies);

    serde_json::to_string_pretty(&manifest)
        .map(|s| s + "\n")
        .map_err(|e| TaskError::validation(format!("manifest could not be serialized: {e}")))
}

fn local_env(ctx: &RenderContext) -> String {
    let url = ctx
        .get("LOCAL_DATABASE_URL")
        .or_else(|| ctx.get("DATABASE_URL"))
        .unwrap_or_default();
    format!("DATABASE_URL={url}\nNODE_ENV=development\n")
}

const README_LIB: &str = r#"# {{PROJECT_NAME}}

## Install

```sh
npm install {{PROJECT_NAME}}
```

## Development

```sh
npm install
npm test
```
"#;

const README_APP: &str = r#"# {{PROJECT_NAME}}

Served at https://{{DOMAIN}}.

## Development

```sh
npm install
npm test
```

Local settings live in `.env` (not committed). Infrastructure is defined
in `infra/`. The remote workspace is linked to this repository and plans
and applies it on every push to the default branch.
"#;

const ESLINT: &str = r#"import js from "@eslint/js";

export default [js.configs.recommended];
"#;

const ESLINT_REACT: &str = r#"import js from "@eslint/js";
import react from "eslint-plugin-react";

export default [
  js.configs.recommended,
  {
    files: ["**/*.jsx"],
    plugins: { react },
    languageOptions: { parserOptions: { ecmaFeatures: { jsx: true } } },
    rules: react.configs.recommended.rules,
  },
];
"#;

const LICENSE_MIT: &str = r#"MIT License

Copyright (c) {{YEAR}} {{AUTHOR}}

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the "Software"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.
"#;

const LICENSE_OTHER: &str = "Copyright (c) {{YEAR}} {{AUTHOR}}\n\nLicensed under {{LICENSE}}.\n";

const CI_WORKFLOW: &str = r#"name: CI

on:
  push:
    branches: [main, master]
    tags: ["v*"]
  pull_request:

jobs:
  test:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v4
      - uses: actions/setup-node@v4
        with:
          node-version: "{{NODE_VERSION}}"
      - run: npm ci
      - run: npm run lint
      - run: npm test
"#;

const PUBLISH_WORKFLOW: &str = r#"name: Publish

on:
  push:
    tags: ["v*"]

jobs:
  publish:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v4
      - uses: actions/setup-node@v4
        with:
          node-version: "{{NODE_VERSION}}"
          registry-url: "https://registry.npmjs.org"
      - run: npm ci
      - run: npm publish --access public
        env:
          NODE_AUTH_TOKEN: ${{ secrets.NPM_TOKEN }}
"#;

const GITIGNORE: &str = "node_modules/\ncoverage/\ndist/\n.env\n";

const INDEX_JS: &str = r#"export function hello(name = "world") {
  return `hello from {{PROJECT_NAME}}, ${name}`;
}
"#;

const INDEX_TEST_JS: &str = r#"import { test } from "node:test";
import assert from "node:assert/strict";
import { hello } from "../src/index.js";

test("hello greets", () => {
  assert.match(hello("you"), /you/);
});
"#;

const APP_JSX: &str = r#"export default function App() {
  return <h1>{{PROJECT_NAME_PASCAL}}</h1>;
}
"#;

const APP_TEST_JSX: &str = r#"// @vitest-environment jsdom
import { render, screen } from "@testing-library/react";
import { expect, test } from "vitest";
import App from "../src/App.jsx";

test("renders the title", () => {
  render(<App />);
  expect(screen.getByText("{{PROJECT_NAME_PASCAL}}")).toBeDefined();
});
"#;

const MAIN_TF: &str = r#"terraform {
  required_providers {
    aws = {
      source  = "hashicorp/aws"
      version = "~> 5.0"
    }
  }
}

variable "domain" {
  type = string
}

variable "database_url" {
  type      = string
  sensitive = true
}

resource "aws_s3_bucket" "site" {
  bucket = var.domain
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn render(artifact: Artifact, name: &str, features: Features) -> ProjectStructure {
        let ctx = RenderContext::new(name)
            .with_variable("VERSION", "0.1.0")
            .with_variable("LICENSE", "MIT")
            .with_variable("NODE_VERSION", "20");
        BuiltinTemplates::new().render(artifact, &ctx, features).unwrap()
    }

    fn manifest_json(name: &str, features: Features) -> Value {
        let s = render(Artifact::Manifest, name, features);
        let file = s.files().next().unwrap();
        serde_json::from_str(&file.content).unwrap()
    }

    #[test]
    fn manifest_names_the_package_exactly() {
        let m = manifest_json("@acme/widgets", Features::default());
        assert_eq!(m["name"], "@acme/widgets");
        assert_eq!(m["version"], "0.1.0");
        assert_eq!(m["engines"]["node"], ">=20");
        assert!(m.get("dependencies").is_none());
    }

    #[test]
    fn react_adds_framework_dependencies_and_component() {
        let features = Features {
            react: true,
            app: false,
        };
        let m = manifest_json("ui-kit", features);
        assert!(m["dependencies"]["react"].is_string());
        assert!(m["devDependencies"]["vitest"].is_string());

        let sources = render(Artifact::Sources, "ui-kit", features);
        assert!(sources.files().any(|f| f.path.ends_with("App.jsx")));
        assert!(sources.validate().is_ok());
    }

    #[test]
    fn app_manifest_is_private() {
        let m = manifest_json(
            "shop.example.com",
            Features {
                react: false,
                app: true,
            },
        );
        assert_eq!(m["private"], true);
    }

    #[test]
    fn license_renders_year_and_author() {
        let ctx = RenderContext::new("x").with_variable("AUTHOR", "Ada");
        let s = BuiltinTemplates::new()
            .render(Artifact::License, &ctx, Features::default())
            .unwrap();
        let text = &s.files().next().unwrap().content;
        assert!(text.contains("Ada"));
        assert!(!text.contains("{{YEAR}}"));
    }

    #[test]
    fn local_env_prefers_the_local_database() {
        let ctx = RenderContext::new("x")
            .with_variable("DATABASE_URL", "postgresql://remote")
            .with_variable("LOCAL_DATABASE_URL", "postgresql://local");
        assert!(local_env(&ctx).starts_with("DATABASE_URL=postgresql://local\n"));
    }
}
