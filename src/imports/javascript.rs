//! JavaScript / TypeScript import detector
//!
//! Recognizes ES-module imports and re-exports with string targets
//! (`import x from './x'`, `import './side-effect'`, `export * from './y'`),
//! CommonJS `require('...')` and dynamic `import('...')`.

use super::framework::ImportDetector;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static ES_MODULE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*(?:import|export)[ \t]+(?:[\w*{}\s,$]+?\s+from\s*)?['"]([^'"\n]+)['"]"#)
        .expect("valid regex")
});

static REQUIRE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\brequire\s*\(\s*['"]([^'"\n]+)['"]\s*\)"#).expect("valid regex")
});

static DYNAMIC_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bimport\s*\(\s*['"]([^'"\n]+)['"]\s*\)"#).expect("valid regex")
});

/// JavaScript / TypeScript language family
pub struct JavaScriptDetector;

impl ImportDetector for JavaScriptDetector {
    fn language_name(&self) -> &str {
        "JavaScript"
    }

    fn file_extensions(&self) -> &[&str] {
        &["js", "jsx", "ts", "tsx", "mjs", "cjs"]
    }

    fn module_extension(&self) -> Option<&str> {
        Some(".js")
    }

    fn detect(&self, content: &str) -> BTreeSet<String> {
        [&*ES_MODULE, &*REQUIRE, &*DYNAMIC_IMPORT]
            .into_iter()
            .flat_map(|re| re.captures_iter(content))
            .map(|caps| caps[1].to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(src: &str) -> Vec<String> {
        JavaScriptDetector.detect(src).into_iter().collect()
    }

    #[test]
    fn test_es_module_forms() {
        let src = r#"
import React, { useState } from 'react';
import * as api from "./api";
import './styles.css';
import type { User } from '../types/user';
export { format } from './format';
export * from "./utils";
"#;
        assert_eq!(
            detect(src),
            vec!["../types/user", "./api", "./format", "./styles.css", "./utils", "react"]
        );
    }

    #[test]
    fn test_multiline_brace_import() {
        let src = "import {\n  fetchUser,\n  saveUser,\n} from './store/users';\n";
        assert_eq!(detect(src), vec!["./store/users"]);
    }

    #[test]
    fn test_require_and_dynamic_import() {
        let src = "const fs = require('fs');\nconst db = require(\"./db\");\nconst page = await import('./pages/home');\n";
        assert_eq!(detect(src), vec!["./db", "./pages/home", "fs"]);
    }

    #[test]
    fn test_plain_exports_are_ignored() {
        let src = "export const answer = 42;\nexport default function main() {}\n";
        assert!(detect(src).is_empty());
    }
}
