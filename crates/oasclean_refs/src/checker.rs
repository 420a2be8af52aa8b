use anyhow::{Result, anyhow};
use log::{debug, info, warn};
use oasclean_core::{Format, Source, expand_inputs, load};
use rayon::prelude::*;
use std::thread;

use crate::{
    analyzer::analyze,
    config::Config,
    types::{CheckResult, DocumentReport},
};

pub fn run_reference_check(cfg: &Config) -> Result<CheckResult> {
    info!("Starting reference check");

    let sources = expand_inputs(&cfg.inputs)?;
    if sources.is_empty() {
        warn!("No documents found in {:?}", cfg.inputs);
        return Err(anyhow!("No documents found in {:?}", cfg.inputs));
    }
    info!("Checking {} documents", sources.len());

    let hint = cfg.input_hint();
    let reports: Vec<DocumentReport> =
        sources.par_iter().map(|source| check_source(source, hint)).collect();

    let result = CheckResult { documents_analyzed: reports.len(), reports };
    info!(
        "Checked {} documents: {} failed, {} unused components",
        result.documents_analyzed,
        result.failures(),
        result.unused_total()
    );
    Ok(result)
}

/// Load and analyze one document. Failures become part of the report, never an `Err`.
pub fn check_source(source: &Source, hint: Option<Format>) -> DocumentReport {
    debug!("Thread {:?} checking {}", thread::current().id(), source.describe());

    let document = match load(source, hint) {
        Ok(document) => document,
        Err(e) => {
            warn!("Failed to load {}: {}", source.describe(), e);
            return DocumentReport::failed(source, e.to_string());
        }
    };

    match analyze(&document.root) {
        Ok(analysis) => DocumentReport::from_analysis(source, &analysis),
        Err(e) => {
            debug!("Analysis of {} failed: {}", source.describe(), e);
            DocumentReport::from_analysis_error(source, e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{InputFormat, ReportFormat};
    use std::{
        fs,
        path::{Path, PathBuf},
    };
    use tempfile::TempDir;

    fn create_test_file(dir: &Path, path: &str, content: &str) -> PathBuf {
        let file_path = dir.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    fn config(inputs: Vec<String>) -> Config {
        Config {
            inputs,
            input_format: None,
            lax: false,
            format: ReportFormat::Text,
            debug: false,
            quiet: false,
        }
    }

    const CLEAN: &str = "openapi: 3.0.0\npaths:\n  /a:\n    get:\n      $ref: '#/components/schemas/A'\ncomponents:\n  schemas:\n    A:\n      type: string\n";
    const UNUSED: &str =
        "swagger: '2.0'\npaths: {}\ndefinitions:\n  Lonely:\n    type: string\n";
    const UNDEFINED: &str = "openapi: 3.0.0\npaths:\n  /a:\n    get:\n      $ref: '#/components/schemas/Ghost'\n";

    #[test]
    fn test_directory_of_documents() {
        let temp_dir = TempDir::new().unwrap();
        create_test_file(temp_dir.path(), "clean.yaml", CLEAN);
        create_test_file(temp_dir.path(), "nested/unused.yml", UNUSED);
        create_test_file(temp_dir.path(), "undefined.yaml", UNDEFINED);
        create_test_file(temp_dir.path(), "notes.txt", "not a document");

        let cfg = config(vec![temp_dir.path().to_string_lossy().to_string()]);
        let result = run_reference_check(&cfg).unwrap();

        assert_eq!(result.documents_analyzed, 3);
        assert_eq!(result.failures(), 1);
        assert_eq!(result.undefined_total(), 1);
        assert_eq!(result.unused_total(), 1);
        assert!(result.should_fail(true));

        let unused = result.reports.iter().find(|r| r.source.ends_with("unused.yml")).unwrap();
        assert_eq!(unused.unused[0].path, "/definitions/Lonely");
        assert!(!unused.is_failure());
    }

    #[test]
    fn test_lax_tolerates_unused() {
        let temp_dir = TempDir::new().unwrap();
        let file = create_test_file(temp_dir.path(), "unused.yaml", UNUSED);
        let result = run_reference_check(&config(vec![file.to_string_lossy().to_string()])).unwrap();
        assert!(result.should_fail(false));
        assert!(!result.should_fail(true));
        assert!(!result.is_clean());
    }

    #[test]
    fn test_inline_json_input() {
        let mut cfg = config(vec![r#"{"openapi": "3.0.0", "paths": {}}"#.to_string()]);
        cfg.input_format = Some(InputFormat::Json);
        let result = run_reference_check(&cfg).unwrap();
        assert!(result.is_clean());
        assert_eq!(result.reports[0].source, "<inline>");
    }

    #[test]
    fn test_load_failure_is_reported() {
        let report = check_source(&Source::Inline("openapi: [unclosed".into()), Some(Format::Yaml));
        assert!(report.is_failure());
        assert!(report.error.unwrap().contains("invalid YAML"));
    }

    #[test]
    fn test_empty_directory_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let cfg = config(vec![temp_dir.path().to_string_lossy().to_string()]);
        assert!(run_reference_check(&cfg).is_err());
    }
}
