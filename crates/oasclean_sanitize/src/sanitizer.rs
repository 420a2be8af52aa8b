use anyhow::{Result, anyhow, bail};
use log::{debug, info, warn};
use oasclean_core::{Format, OutputTarget, Source, dump, expand_inputs, load};
use oasclean_refs::{DocumentReport, analyze};
use rayon::prelude::*;
use std::{path::Path, thread};

use crate::{
    config::SanitizeConfig,
    rewrite::{RewriteMode, RewriteStats, rewrite},
    types::{SanitizeReport, SanitizeResult},
};

pub fn run_sanitize(cfg: &SanitizeConfig) -> Result<SanitizeResult> {
    info!("Starting sanitize");

    let sources = expand_inputs(&cfg.inputs)?;
    if sources.is_empty() {
        warn!("No documents found in {:?}", cfg.inputs);
        return Err(anyhow!("No documents found in {:?}", cfg.inputs));
    }
    if cfg.output.is_some() && sources.len() > 1 {
        bail!("--output needs exactly one input document, got {}", sources.len());
    }

    let mode = cfg.mode();
    let hint = cfg.input_hint();
    let output = cfg.output.as_deref();
    info!("Sanitizing {} documents ({:?})", sources.len(), mode);

    let reports: Vec<SanitizeReport> =
        sources.par_iter().map(|source| sanitize_source(source, hint, &mode, output)).collect();

    let result = SanitizeResult { documents_analyzed: reports.len(), reports };
    info!(
        "Sanitized {} of {} documents: {} tagged, {} deleted",
        result.written(),
        result.documents_analyzed,
        result.tagged_total(),
        result.deleted_total()
    );
    Ok(result)
}

/// Load, analyze, rewrite and write one document.
///
/// Nothing is written for a document with undefined references: its unused set is still
/// reported, but the document needs fixing by hand first.
pub fn sanitize_source(
    source: &Source,
    hint: Option<Format>,
    mode: &RewriteMode,
    output: Option<&Path>,
) -> SanitizeReport {
    debug!("Thread {:?} sanitizing {}", thread::current().id(), source.describe());
    let failed = |document: DocumentReport| SanitizeReport {
        document,
        output: None,
        stats: RewriteStats::default(),
    };

    let mut document = match load(source, hint) {
        Ok(document) => document,
        Err(e) => {
            warn!("Failed to load {}: {}", source.describe(), e);
            return failed(DocumentReport::failed(source, e.to_string()));
        }
    };

    let analysis = match analyze(&document.root) {
        Ok(analysis) => analysis,
        Err(e) => {
            debug!("Analysis of {} failed: {}", source.describe(), e);
            return failed(DocumentReport::from_analysis_error(source, e));
        }
    };
    let mut report = DocumentReport::from_analysis(source, &analysis);

    let stats = rewrite(&mut document.root, &analysis.unused_paths(), mode);

    let written = OutputTarget::for_source(source, output).and_then(|target| {
        dump(&document.root, document.format, &target)?;
        Ok(target)
    });
    match written {
        Ok(target) => {
            info!("Wrote {}", target.describe());
            SanitizeReport { document: report, output: Some(target.describe()), stats }
        }
        Err(e) => {
            warn!("Failed to write sanitized {}: {}", source.describe(), e);
            report.error = Some(e.to_string());
            SanitizeReport { document: report, output: None, stats }
        }
    }
}
