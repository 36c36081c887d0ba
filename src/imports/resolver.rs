//! Import Resolver - Maps import strings to files of the ingested set
//!
//! Resolution algorithm, first match wins:
//! 1. Relative import (`./x`, `../x`, Python `.x`) → join with the importing
//!    file's directory, try the path as written, then each extension (the
//!    importing family's own first), then `<dir>/<index name><ext>`
//! 2. Dotted module path (`a.b.c`, no `/`) → `a/b/c` + the family's module
//!    extension
//! 3. Anything else → unresolved
//!
//! A candidate only counts when it is in the known path set: resolution never
//! touches the filesystem or the network.

use super::framework::{default_registry, DetectorRegistry};
use crate::config::ResolverConfig;
use std::collections::{BTreeSet, HashSet};

/// Detects and resolves imports against a known set of repository paths
pub struct ImportResolver {
    registry: DetectorRegistry,
    extensions: Vec<String>,
    index_names: Vec<String>,
}

impl Default for ImportResolver {
    fn default() -> Self {
        Self::new(&ResolverConfig::default())
    }
}

impl ImportResolver {
    /// Create a resolver with the built-in language families
    pub fn new(config: &ResolverConfig) -> Self {
        Self::with_registry(default_registry(), config)
    }

    /// Create a resolver with a custom detector registry
    pub fn with_registry(registry: DetectorRegistry, config: &ResolverConfig) -> Self {
        Self {
            registry,
            extensions: config.extensions.clone(),
            index_names: config.index_names.clone(),
        }
    }

    /// Import targets written in a file. Unrecognized file types have none.
    pub fn detect_imports(&self, path: &str, content: &str) -> BTreeSet<String> {
        match self.registry.find_detector(path) {
            Some(detector) => detector.detect(content),
            None => BTreeSet::new(),
        }
    }

    /// Resolve one import of `current_path` to a member of `known_paths`
    pub fn resolve(&self, current_path: &str, import: &str, known_paths: &HashSet<String>) -> Option<String> {
        let module_ext = self
            .registry
            .find_detector(current_path)
            .and_then(|d| d.module_extension());

        // 1. Relative imports
        if let Some(base) = relative_base(current_path, import) {
            return self
                .relative_candidates(&base?, module_ext)
                .into_iter()
                .find(|candidate| known_paths.contains(candidate));
        }

        // 2. Dotted module paths
        if !import.contains('/') {
            let module_ext = module_ext?;
            let candidate = format!("{}{}", import.replace('.', "/"), module_ext);
            return known_paths.contains(&candidate).then_some(candidate);
        }

        // 3. Package imports, aliases, absolute paths
        None
    }

    /// Detect and resolve every import of a file, dropping the unresolved ones
    pub fn resolve_imports(&self, path: &str, content: &str, known_paths: &HashSet<String>) -> BTreeSet<String> {
        let mut resolved = BTreeSet::new();

        for import in self.detect_imports(path, content) {
            match self.resolve(path, &import, known_paths) {
                Some(target) => {
                    resolved.insert(target);
                }
                None => tracing::trace!("Unresolved import {:?} in {}", import, path),
            }
        }

        resolved
    }

    /// Candidate files for a normalized relative base, in trial order
    fn relative_candidates(&self, base: &str, module_ext: Option<&str>) -> Vec<String> {
        // Same-family files win over cross-language siblings
        let extensions: Vec<&str> = module_ext
            .into_iter()
            .chain(self.extensions.iter().map(String::as_str).filter(|ext| Some(*ext) != module_ext))
            .collect();
        let mut candidates = Vec::new();

        if !base.is_empty() {
            candidates.push(base.to_string());
            for ext in &extensions {
                candidates.push(format!("{}{}", base, ext));
            }
        }

        for index in &self.index_names {
            for ext in &extensions {
                candidates.push(join(base, &format!("{}{}", index, ext)));
            }
        }

        candidates
    }
}

/// Base path of a relative import.
///
/// `None` when the import is not relative; `Some(None)` when it is relative
/// but climbs above the repository root.
fn relative_base(current_path: &str, import: &str) -> Option<Option<String>> {
    let dir = parent_dir(current_path);

    if import == "." || import == ".." || import.starts_with("./") || import.starts_with("../") {
        return Some(normalize(dir, import));
    }

    if import.starts_with('.') && !import.contains('/') {
        // Python: one dot is the current package, each extra dot climbs one level
        let rest = import.trim_start_matches('.');
        let dots = import.len() - rest.len();
        let mut relative = "../".repeat(dots - 1);
        relative.push_str(&rest.replace('.', "/"));
        return Some(normalize(dir, &relative));
    }

    None
}

fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

/// Join `relative` onto `dir`, folding `.` and `..` segments
fn normalize(dir: &str, relative: &str) -> Option<String> {
    let mut segments: Vec<&str> = dir.split('/').filter(|s| !s.is_empty()).collect();

    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            other => segments.push(other),
        }
    }

    Some(segments.join("/"))
}
