//! Unused component cleanup for OpenAPI 3 and Swagger 2 documents.
//!
//! Each document is analyzed with `oasclean_refs`. When it has no undefined references, its
//! unused components are tagged with a vendor extension (`x-unused: true` by default) or
//! removed, and the result is written next to the input as `<name>.san.<ext>`. The input
//! itself is never overwritten.
//!
//! # Examples
//!
//! ```no_run
//! use clap::Parser;
//! use oasclean_sanitize::{SanitizeConfig, print_sanitize_report, run_sanitize};
//! use std::io::{BufWriter, Write};
//!
//! # fn main() -> anyhow::Result<()> {
//! let cfg = SanitizeConfig::parse_from(["sanitize", "--remove", "api.yaml"]);
//! let result = run_sanitize(&cfg)?;
//!
//! let mut stdout = BufWriter::new(std::io::stdout());
//! print_sanitize_report(&mut stdout, &result)?;
//! stdout.flush()?;
//! # Ok(())
//! # }
//! ```

mod config;
mod constants;
mod reporter;
mod rewrite;
mod sanitizer;
mod types;

// Re-export public API
pub use config::SanitizeConfig;
pub use constants::DEFAULT_TAG;
pub use reporter::print_sanitize_report;
pub use rewrite::{RewriteMode, RewriteStats, rewrite};
pub use sanitizer::{run_sanitize, sanitize_source};
pub use types::{SanitizeReport, SanitizeResult};
