//! Import detection and resolution
//!
//! Each language family provides a textual detector; the resolver maps the
//! detected import strings onto files of the ingested set.
//!
//! Detection is pattern matching over raw source, not parsing: imports inside
//! comments or strings may be picked up.

pub mod framework;
pub mod python;
pub mod javascript;
pub mod resolver;

pub use framework::{default_registry, DetectorRegistry, ImportDetector};
pub use javascript::JavaScriptDetector;
pub use python::PythonDetector;
pub use resolver::ImportResolver;
