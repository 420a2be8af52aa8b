//! Core document handling for oasclean tools.
//!
//! This crate provides the plumbing around OpenAPI/Swagger reference analysis:
//! - A generic document tree (`Node`) with per-object source line annotations
//! - Structural paths addressing nodes from the document root
//! - Loading documents from files, URLs or inline text (YAML or JSON)
//! - Writing rewritten documents back out without clobbering their inputs
//! - Collecting documents from directories

mod collector;
mod constants;
mod dumper;
mod lines;
mod loader;
mod node;
mod path;
mod types;

// Re-export public API
pub use collector::{collect_documents, expand_inputs};
pub use constants::{JSON_EXTENSIONS, LINE_KEY, SANITIZED_INFIX, STDOUT_PATH, YAML_EXTENSIONS};
pub use dumper::{DumpError, OutputTarget, dump, render, sanitized_name};
pub use lines::annotate_lines;
pub use loader::{LoadError, load, parse};
pub use node::{Node, Scalar, UnsupportedKey};
pub use path::{Segment, StructuralPath};
pub use types::{Document, Format, Source};
