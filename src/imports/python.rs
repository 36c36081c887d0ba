//! Python import detector
//!
//! Recognizes `import a.b.c`, `import a, b as c` and `from a.b import c`,
//! including relative forms such as `from .c import d` and `from . import x`.

use super::framework::ImportDetector;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static FROM_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*from[ \t]+(\.+[\w.]*|[\w.]+)[ \t]+import\b").expect("valid regex")
});

static PLAIN_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*import[ \t]+([\w.]+(?:[ \t]+as[ \t]+\w+)?(?:[ \t]*,[ \t]*[\w.]+(?:[ \t]+as[ \t]+\w+)?)*)")
        .expect("valid regex")
});

/// Python language family
pub struct PythonDetector;

impl ImportDetector for PythonDetector {
    fn language_name(&self) -> &str {
        "Python"
    }

    fn file_extensions(&self) -> &[&str] {
        &["py", "pyi"]
    }

    fn module_extension(&self) -> Option<&str> {
        Some(".py")
    }

    fn detect(&self, content: &str) -> BTreeSet<String> {
        let mut imports = BTreeSet::new();

        for caps in FROM_IMPORT.captures_iter(content) {
            imports.insert(caps[1].to_string());
        }

        for caps in PLAIN_IMPORT.captures_iter(content) {
            for item in caps[1].split(',') {
                // `a.b as c` binds c, but the module is still a.b
                if let Some(module) = item.split_whitespace().next() {
                    imports.insert(module.to_string());
                }
            }
        }

        imports
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(src: &str) -> Vec<String> {
        PythonDetector.detect(src).into_iter().collect()
    }

    #[test]
    fn test_plain_and_from_imports() {
        let src = "import os\nimport app.models.user\nfrom app.services import billing\n";
        assert_eq!(detect(src), vec!["app.models.user", "app.services", "os"]);
    }

    #[test]
    fn test_import_lists_and_aliases() {
        let src = "import numpy as np, pandas\nimport a.b as ab\n";
        assert_eq!(detect(src), vec!["a.b", "numpy", "pandas"]);
    }

    #[test]
    fn test_relative_imports() {
        let src = "from .c import helper\nfrom ..pkg.mod import X\nfrom . import sibling\n";
        assert_eq!(detect(src), vec![".", "..pkg.mod", ".c"]);
    }

    #[test]
    fn test_indented_imports_are_found() {
        let src = "def lazy():\n    import json\n    from app import cache\n";
        assert_eq!(detect(src), vec!["app", "json"]);
    }

    #[test]
    fn test_no_false_positive_on_identifiers() {
        let src = "important = 1\nfromage = 'brie'\nx = imported_value\n";
        assert!(detect(src).is_empty());
    }
}
