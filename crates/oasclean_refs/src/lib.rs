//! Reference analysis for OpenAPI 3 and Swagger 2 documents.
//!
//! A document is walked once to build a graph of its components and of every node holding a
//! `$ref`. Each component is then classified by backward reachability from the live document
//! (everything outside component declarations):
//! - **undefined**: reachable but never declared, which fails the analysis
//! - **unused**: declared but unreachable, a warning the caller may escalate
//!
//! # Examples
//!
//! ```no_run
//! use oasclean_core::{Format, parse};
//! use oasclean_refs::{AnalysisError, analyze};
//!
//! # fn main() -> anyhow::Result<()> {
//! let root = parse("openapi: 3.0.0\npaths: {}\n", Format::Yaml)?;
//! match analyze(&root) {
//!     Ok(analysis) => {
//!         if let Some(warning) = analysis.warning() {
//!             println!("{}", warning);
//!         }
//!     }
//!     Err(AnalysisError::UndefinedReferences(e)) => println!("{}", e),
//!     Err(e) => return Err(e.into()),
//! }
//! # Ok(())
//! # }
//! ```

mod analyzer;
mod checker;
mod classify;
mod config;
mod dialect;
mod error;
mod graph;
mod reachability;
mod reporter;
mod types;

// Re-export public API
pub use analyzer::{Analysis, analyze};
pub use checker::{check_source, run_reference_check};
pub use classify::{Classification, ReferrerInfo, UndefinedComponent, UnusedComponent, classify};
pub use config::{Config, InputFormat, ReportFormat, log_level};
pub use dialect::{Dialect, V2_SECTIONS, V3_SECTIONS};
pub use error::{AnalysisError, UndefinedReferences, UnusedComponentsWarning};
pub use graph::{EntryKind, GraphBuilder, GraphEntry, REF_KEY, ReferenceGraph};
pub use reporter::{print_clean_message, print_document, print_json, print_report_tree};
pub use types::{CheckResult, DocumentReport};
