use log::{debug, info};
use oasclean_core::Node;
use std::collections::{BTreeMap, BTreeSet};

use crate::{
    classify::{Classification, UnusedComponent, classify},
    dialect::Dialect,
    error::{AnalysisError, UndefinedReferences, UnusedComponentsWarning},
    graph::{GraphBuilder, ReferenceGraph},
};

/// Result of a successful analysis: the document has no undefined references.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub dialect: Dialect,
    pub graph: ReferenceGraph,
    pub classification: Classification,
}

impl Analysis {
    pub fn unused(&self) -> &BTreeMap<String, UnusedComponent> {
        &self.classification.unused
    }

    pub fn unused_paths(&self) -> BTreeSet<String> {
        self.classification.unused.keys().cloned().collect()
    }

    /// Declared component count.
    pub fn declared_components(&self) -> usize {
        self.graph.components().filter(|e| e.declared).count()
    }

    /// `None` when every declared component is used.
    pub fn warning(&self) -> Option<UnusedComponentsWarning> {
        if self.classification.unused.is_empty() {
            None
        } else {
            Some(UnusedComponentsWarning { unused: self.classification.unused.clone() })
        }
    }
}

/// Detect the dialect, build the reference graph and classify every component.
///
/// Undefined references fail the analysis. Unused components do not; they are exposed through
/// [`Analysis::warning`] so the caller decides whether to tolerate them.
pub fn analyze(root: &Node) -> Result<Analysis, AnalysisError> {
    let dialect = Dialect::detect(root)?;
    let mut graph = GraphBuilder::new(dialect).build(root)?;
    let classification = classify(&mut graph);

    if !classification.undefined.is_empty() {
        info!("{} undefined components", classification.undefined.len());
        return Err(UndefinedReferences {
            undefined: classification.undefined,
            unused: classification.unused,
        }
        .into());
    }

    debug!("{} unused components", classification.unused.len());
    Ok(Analysis { dialect, graph, classification })
}
