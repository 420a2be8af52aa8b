use anyhow::{Context, Result};
use ignore::WalkBuilder;
use log::{debug, trace};
use std::path::{Path, PathBuf};

use crate::types::{Format, Source};

/// Every YAML/JSON document below `root`, honoring ignore files, sorted by path.
pub fn collect_documents(root: &Path) -> Result<Vec<PathBuf>> {
    debug!("Collecting documents under {}", root.display());
    let mut files: Vec<PathBuf> = Vec::new();
    let walker = WalkBuilder::new(root).hidden(false).ignore(true).git_ignore(true).build();

    for res in walker {
        let dent = res.with_context(|| format!("Failed to walk {}", root.display()))?;
        let p = dent.path();
        if !p.is_file() {
            continue;
        }
        if Format::from_name(&p.to_string_lossy()).is_some() {
            trace!("Found document: {}", p.display());
            files.push(p.to_path_buf());
        }
    }

    files.sort();
    debug!("Collected {} documents", files.len());
    Ok(files)
}

/// Turn command-line inputs into sources, expanding directories into the documents they hold.
pub fn expand_inputs(inputs: &[String]) -> Result<Vec<Source>> {
    let mut sources = Vec::new();
    for input in inputs {
        let path = Path::new(input);
        if path.is_dir() {
            sources.extend(collect_documents(path)?.into_iter().map(Source::File));
        } else {
            sources.push(Source::resolve(input));
        }
    }
    Ok(sources)
}
