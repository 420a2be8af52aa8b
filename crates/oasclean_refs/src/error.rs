//! Typed errors for reference analysis.
//!
//! Every variant carries the structural path and, where the loader annotated it, the
//! source line, so a caller can print a diagnostic without walking the document again.

use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::classify::{UndefinedComponent, UnusedComponent};

#[derive(Debug, Error)]
pub enum AnalysisError {
    /// No `swagger`/`openapi` key, or a version that does not parse
    #[error("missing version: {0}")]
    MissingVersion(String),

    #[error("unsupported {key} version '{version}' (expected {expected})")]
    UnsupportedVersion { key: &'static str, version: String, expected: &'static str },

    #[error("component {path}{} is nested inside component {owner}", at_line(.line))]
    NestedComponent { path: String, owner: String, line: Option<usize> },

    #[error(
        "unsupported remote reference '{reference}' (document '{document}') at {path}{}",
        at_line(.line)
    )]
    UnsupportedReference { path: String, reference: String, document: String, line: Option<usize> },

    #[error(transparent)]
    UndefinedReferences(#[from] UndefinedReferences),

    /// An unused-components warning a caller chose to treat as fatal
    #[error(transparent)]
    UnusedComponents(#[from] UnusedComponentsWarning),
}

/// Components that are required but never declared.
///
/// The unused set found by the same run is kept alongside for diagnostics.
#[derive(Debug, Clone, Error, Serialize)]
#[error("undefined components: {}", join_paths(.undefined))]
pub struct UndefinedReferences {
    pub undefined: BTreeMap<String, UndefinedComponent>,
    pub unused: BTreeMap<String, UnusedComponent>,
}

/// Declared components that nothing in the live document reaches.
#[derive(Debug, Clone, Error, Serialize)]
#[error("{} unused components: {}", .unused.len(), join_paths(.unused))]
pub struct UnusedComponentsWarning {
    pub unused: BTreeMap<String, UnusedComponent>,
}

impl UnusedComponentsWarning {
    /// Treat the warning as a hard failure.
    pub fn escalate(self) -> AnalysisError {
        AnalysisError::UnusedComponents(self)
    }
}

fn at_line(line: &Option<usize>) -> String {
    line.map(|l| format!(" (line {})", l)).unwrap_or_default()
}

fn join_paths<V>(map: &BTreeMap<String, V>) -> String {
    map.keys().cloned().collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_include_line_when_known() {
        let err = AnalysisError::UnsupportedReference {
            path: "/paths//wibble/post/requestBody".to_string(),
            reference: "../floob.yaml/components/requestBodies/x".to_string(),
            document: "../floob.yaml".to_string(),
            line: Some(7),
        };
        let msg = err.to_string();
        assert!(msg.contains("../floob.yaml/components/requestBodies/x"));
        assert!(msg.contains("/paths//wibble/post/requestBody (line 7)"));

        let err = AnalysisError::NestedComponent {
            path: "/a/b".to_string(),
            owner: "/a".to_string(),
            line: None,
        };
        assert_eq!(err.to_string(), "component /a/b is nested inside component /a");
    }

    #[test]
    fn test_escalated_warning_lists_paths() {
        let mut unused = BTreeMap::new();
        for path in ["/components/schemas/B", "/components/schemas/A"] {
            unused.insert(
                path.to_string(),
                UnusedComponent {
                    path: path.to_string(),
                    section: "schemas".to_string(),
                    line: None,
                },
            );
        }
        let err = UnusedComponentsWarning { unused }.escalate();
        assert_eq!(
            err.to_string(),
            "2 unused components: /components/schemas/A, /components/schemas/B"
        );
    }
}
