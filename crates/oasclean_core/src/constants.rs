//! Constants shared by loading, annotation and dumping.
//!
//! The line annotation key is injected into object nodes by the YAML loader and must be
//! skipped by every structural walk and stripped before a document is written back out.

/// Non-structural key carrying the 1-based source line of an object node
pub const LINE_KEY: &str = "__line__";

/// Extensions recognized as YAML documents
pub const YAML_EXTENSIONS: &[&str] = &["yaml", "yml"];

/// Extensions recognized as JSON documents
pub const JSON_EXTENSIONS: &[&str] = &["json"];

/// Infix inserted before the extension of a default output file name (`api.san.yaml`)
pub const SANITIZED_INFIX: &str = "san";

/// Output path meaning "write to standard output"
pub const STDOUT_PATH: &str = "-";
