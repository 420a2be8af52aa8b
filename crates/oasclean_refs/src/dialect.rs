use log::debug;
use oasclean_core::{Node, Scalar, StructuralPath};
use regex::Regex;
use serde::Serialize;
use std::{fmt, sync::LazyLock};

use crate::error::AnalysisError;

/// `major[.minor[.patch]]` with an optional pre-release/build suffix
static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?P<major>\d+)(?:\.\d+)?(?:\.\d+)?(?:[-+][0-9A-Za-z.-]+)?\s*$").unwrap()
});

/// Component sections of an OpenAPI 3 document, under `/components`
pub const V3_SECTIONS: &[&str] =
    &["parameters", "requestBodies", "responses", "schemas", "securitySchemas"];

/// Component sections of a Swagger 2 document, at the root
pub const V2_SECTIONS: &[&str] =
    &["parameters", "responses", "definitions", "securityDefinitions"];

/// Which component grammar a document follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Swagger 2.x
    V2,
    /// OpenAPI 3.x
    V3,
}

impl Dialect {
    /// Read the dialect off the document root's `swagger` or `openapi` key.
    ///
    /// `swagger` is checked first and must have major version 2; `openapi` must have major 3.
    pub fn detect(root: &Node) -> Result<Dialect, AnalysisError> {
        if root.as_object().is_none() {
            return Err(AnalysisError::MissingVersion("document root is not an object".into()));
        }

        let (key, dialect, value, expected) = if let Some(v) = root.get("swagger") {
            ("swagger", Dialect::V2, v, "2.x")
        } else if let Some(v) = root.get("openapi") {
            ("openapi", Dialect::V3, v, "3.x")
        } else {
            return Err(AnalysisError::MissingVersion(
                "document has neither a 'swagger' nor an 'openapi' key".into(),
            ));
        };

        let version = match value {
            Node::Scalar(Scalar::Null) | Node::Object(_) | Node::Array(_) => {
                return Err(AnalysisError::MissingVersion(format!("'{}' has no version", key)));
            }
            Node::Scalar(s) => s.to_string(),
        };

        let Some(caps) = VERSION_RE.captures(&version) else {
            return Err(AnalysisError::MissingVersion(format!(
                "unparsable {} version '{}'",
                key, version
            )));
        };

        let wanted = match dialect {
            Dialect::V2 => "2",
            Dialect::V3 => "3",
        };
        if caps["major"].trim_start_matches('0') != wanted {
            return Err(AnalysisError::UnsupportedVersion { key, version, expected });
        }

        debug!("Detected {} {}", key, version);
        Ok(dialect)
    }

    pub fn sections(&self) -> &'static [&'static str] {
        match self {
            Dialect::V2 => V2_SECTIONS,
            Dialect::V3 => V3_SECTIONS,
        }
    }

    /// Whether `path` names a component declaration.
    ///
    /// OpenAPI 3: `/components/<section>/<name>`. Swagger 2: `/<section>/<name>`.
    pub fn is_declaration(&self, path: &StructuralPath) -> bool {
        match self {
            Dialect::V3 => {
                path.len() == 3
                    && path.key_at(0) == Some("components")
                    && path.key_at(1).is_some_and(|s| V3_SECTIONS.contains(&s))
                    && path.key_at(2).is_some()
            }
            Dialect::V2 => {
                path.len() == 2
                    && path.key_at(0).is_some_and(|s| V2_SECTIONS.contains(&s))
                    && path.key_at(1).is_some()
            }
        }
    }

    /// Section name of a declaration path rendered as a string (`schemas`, `definitions`, ...).
    pub fn section_of<'a>(&self, path: &'a str) -> Option<&'a str> {
        let idx = match self {
            Dialect::V3 => 2,
            Dialect::V2 => 1,
        };
        path.split('/').nth(idx).filter(|s| self.sections().contains(s))
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::V2 => f.write_str("swagger 2"),
            Dialect::V3 => f.write_str("openapi 3"),
        }
    }
}
