use oasclean_core::Source;
use serde::Serialize;

use crate::{
    analyzer::Analysis,
    classify::{UndefinedComponent, UnusedComponent},
    dialect::Dialect,
    error::AnalysisError,
};

/// Outcome of checking one document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentReport {
    pub source: String,
    pub dialect: Option<Dialect>,
    pub components: usize,
    pub undefined: Vec<UndefinedComponent>,
    pub unused: Vec<UnusedComponent>,
    /// Set when the document could not be loaded or analyzed
    pub error: Option<String>,
}

impl DocumentReport {
    pub fn from_analysis(source: &Source, analysis: &Analysis) -> Self {
        Self {
            source: source.describe(),
            dialect: Some(analysis.dialect),
            components: analysis.declared_components(),
            undefined: Vec::new(),
            unused: analysis.unused().values().cloned().collect(),
            error: None,
        }
    }

    /// Undefined references keep both sets so the report still lists them.
    pub fn from_analysis_error(source: &Source, err: AnalysisError) -> Self {
        let message = err.to_string();
        let mut report = Self::failed(source, message);
        if let AnalysisError::UndefinedReferences(e) = err {
            report.undefined = e.undefined.into_values().collect();
            report.unused = e.unused.into_values().collect();
        }
        report
    }

    pub fn failed(source: &Source, message: String) -> Self {
        Self {
            source: source.describe(),
            dialect: None,
            components: 0,
            undefined: Vec::new(),
            unused: Vec::new(),
            error: Some(message),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }

    pub fn is_clean(&self) -> bool {
        self.error.is_none() && self.unused.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub reports: Vec<DocumentReport>,
    pub documents_analyzed: usize,
}

impl CheckResult {
    pub fn failures(&self) -> usize {
        self.reports.iter().filter(|r| r.is_failure()).count()
    }

    pub fn undefined_total(&self) -> usize {
        self.reports.iter().map(|r| r.undefined.len()).sum()
    }

    pub fn unused_total(&self) -> usize {
        self.reports.iter().map(|r| r.unused.len()).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.reports.iter().all(DocumentReport::is_clean)
    }

    /// Whether the run should exit non-zero. Unused components only count without `lax`.
    pub fn should_fail(&self, lax: bool) -> bool {
        self.failures() > 0 || (!lax && self.unused_total() > 0)
    }
}
