//! Import detector framework
//!
//! Each language family provides a detector that pulls import targets out of
//! raw source text. Detection is textual and best-effort; the resolver and
//! the pipeline never see language-specific logic.

use std::collections::BTreeSet;
use std::path::Path;

/// Trait for per-language-family import detectors
pub trait ImportDetector: Send + Sync {
    /// Get the language family name (for display)
    fn language_name(&self) -> &str;

    /// Get file extensions this detector handles (without the dot)
    fn file_extensions(&self) -> &[&str];

    /// Primary extension of the family: appended to dotted module paths
    /// (`a.b.c` -> `a/b/c.py`) and tried first for relative imports.
    ///
    /// `None` disables dotted module resolution for the family.
    fn module_extension(&self) -> Option<&str> {
        None
    }

    /// Check if this detector can handle a file
    fn can_handle(&self, path: &Path) -> bool {
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            self.file_extensions().contains(&ext)
        } else {
            false
        }
    }

    /// Extract the import targets written in a source file
    fn detect(&self, content: &str) -> BTreeSet<String>;
}

/// Registry of import detectors
#[derive(Default)]
pub struct DetectorRegistry {
    detectors: Vec<Box<dyn ImportDetector>>,
}

impl DetectorRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a detector
    pub fn register(&mut self, detector: impl ImportDetector + 'static) {
        self.detectors.push(Box::new(detector));
    }

    /// Find the detector for a file
    pub fn find_detector(&self, path: &str) -> Option<&dyn ImportDetector> {
        let path = Path::new(path);
        self.detectors
            .iter()
            .find(|d| d.can_handle(path))
            .map(|d| d.as_ref())
    }

    /// Get all registered detectors
    pub fn detectors(&self) -> &[Box<dyn ImportDetector>] {
        &self.detectors
    }
}

/// Create a default registry with the built-in language families
pub fn default_registry() -> DetectorRegistry {
    let mut registry = DetectorRegistry::new();
    registry.register(super::python::PythonDetector);
    registry.register(super::javascript::JavaScriptDetector);
    registry
}
