use log::{debug, trace};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::graph::ReferenceGraph;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferrerInfo {
    pub path: String,
    pub line: Option<usize>,
}

/// A component something live references but the document never declares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UndefinedComponent {
    pub path: String,
    pub referrers: Vec<ReferrerInfo>,
}

/// A declared component nothing live reaches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnusedComponent {
    pub path: String,
    /// Component section (`schemas`, `definitions`, ...)
    pub section: String,
    pub line: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub undefined: BTreeMap<String, UndefinedComponent>,
    pub unused: BTreeMap<String, UnusedComponent>,
}

impl Classification {
    pub fn is_clean(&self) -> bool {
        self.undefined.is_empty() && self.unused.is_empty()
    }
}

/// Sort every component into undefined (required, never declared), unused (declared, not
/// required) or neither. The two sets are disjoint.
pub fn classify(graph: &mut ReferenceGraph) -> Classification {
    let paths: Vec<String> = graph.components().map(|e| e.path.clone()).collect();
    debug!("Classifying {} components", paths.len());

    let mut result = Classification::default();
    for path in paths {
        let required = graph.is_required(&path, &mut HashSet::new());
        let Some(entry) = graph.entry(&path) else {
            continue;
        };

        if required && !entry.declared {
            trace!("Undefined: {}", path);
            let referrers = entry
                .referrers
                .iter()
                .map(|r| ReferrerInfo {
                    path: r.clone(),
                    line: graph.entry(r).and_then(|e| e.line),
                })
                .collect();
            result.undefined.insert(path.clone(), UndefinedComponent { path, referrers });
        } else if !required
            && entry.declared
            && let Some(section) = graph.dialect().section_of(&path)
        {
            trace!("Unused: {}", path);
            let section = section.to_string();
            let line = entry.line;
            result.unused.insert(path.clone(), UnusedComponent { path, section, line });
        }
    }

    debug!("{} undefined, {} unused", result.undefined.len(), result.unused.len());
    result
}
