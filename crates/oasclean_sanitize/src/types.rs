use oasclean_refs::DocumentReport;
use serde::Serialize;

use crate::rewrite::RewriteStats;

#[derive(Debug, Clone, Serialize)]
pub struct SanitizeReport {
    #[serde(flatten)]
    pub document: DocumentReport,
    /// Where the sanitized document was written, if it was
    pub output: Option<String>,
    pub stats: RewriteStats,
}

impl SanitizeReport {
    pub fn is_failure(&self) -> bool {
        self.document.is_failure()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizeResult {
    pub reports: Vec<SanitizeReport>,
    pub documents_analyzed: usize,
}

impl SanitizeResult {
    pub fn failures(&self) -> usize {
        self.reports.iter().filter(|r| r.is_failure()).count()
    }

    pub fn written(&self) -> usize {
        self.reports.iter().filter(|r| r.output.is_some()).count()
    }

    pub fn tagged_total(&self) -> usize {
        self.reports.iter().map(|r| r.stats.tagged).sum()
    }

    pub fn deleted_total(&self) -> usize {
        self.reports.iter().map(|r| r.stats.deleted).sum()
    }
}
