use clap::Parser;
use log::LevelFilter;
use oasclean_core::{Format, STDOUT_PATH};
use oasclean_refs::{InputFormat, ReportFormat, log_level};
use std::path::PathBuf;

use crate::{constants::DEFAULT_TAG, rewrite::RewriteMode};

#[derive(Debug, Clone, Parser)]
#[command(name = "sanitize")]
#[command(about = "Tag or remove unused components and write a sanitized copy of each document")]
pub struct SanitizeConfig {
    /// Documents to sanitize: files, directories, URLs or inline YAML/JSON text
    #[arg(required = true)]
    pub inputs: Vec<String>,

    /// Format of inputs whose name does not reveal it (inline text, extensionless URLs)
    #[arg(long, value_enum)]
    pub input_format: Option<InputFormat>,

    /// Vendor extension set to `true` on each unused component
    #[arg(short, long, default_value = DEFAULT_TAG)]
    pub tag: String,

    /// Remove unused components instead of tagging them
    #[arg(short, long, conflicts_with = "tag")]
    pub remove: bool,

    /// Output path (`-` for stdout). Defaults to `<name>.san.<ext>` next to the input.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Log debug output
    #[arg(short = 'g', long, conflicts_with = "quiet")]
    pub debug: bool,

    /// Log warnings and errors only
    #[arg(short, long)]
    pub quiet: bool,
}

impl SanitizeConfig {
    pub fn mode(&self) -> RewriteMode {
        if self.remove { RewriteMode::Delete } else { RewriteMode::Tag(self.tag.clone()) }
    }

    pub fn input_hint(&self) -> Option<Format> {
        self.input_format.map(Format::from)
    }

    pub fn log_level(&self) -> LevelFilter {
        log_level(self.debug, self.quiet)
    }

    /// Whether the sanitized document goes to stdout, leaving stdout unusable for the report.
    pub fn writes_to_stdout(&self) -> bool {
        self.output.as_deref().is_some_and(|p| p.as_os_str() == STDOUT_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mode_is_tag() {
        let cfg = SanitizeConfig::try_parse_from(["sanitize", "api.yaml"]).unwrap();
        assert_eq!(cfg.mode(), RewriteMode::Tag("x-unused".into()));
        assert!(!cfg.writes_to_stdout());
    }

    #[test]
    fn test_remove_and_output() {
        let cfg =
            SanitizeConfig::try_parse_from(["sanitize", "-r", "-o", "-", "api.yaml"]).unwrap();
        assert_eq!(cfg.mode(), RewriteMode::Delete);
        assert!(cfg.writes_to_stdout());
    }

    #[test]
    fn test_remove_conflicts_with_explicit_tag() {
        let args = ["sanitize", "-r", "-t", "x-dead", "a.yaml"];
        assert!(SanitizeConfig::try_parse_from(args).is_err());
        let cfg = SanitizeConfig::try_parse_from(["sanitize", "-t", "x-dead", "a.yaml"]).unwrap();
        assert_eq!(cfg.mode(), RewriteMode::Tag("x-dead".into()));
    }
}
