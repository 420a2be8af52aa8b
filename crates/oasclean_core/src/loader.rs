use log::{debug, info, trace};
use std::{fs, path::PathBuf};
use thiserror::Error;

use crate::{
    lines::annotate_lines,
    node::{Node, UnsupportedKey},
    types::{Document, Format, Source},
};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unable to determine the format of {name} (expected .yaml, .yml or .json)")]
    UnknownFormat { name: String },

    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    UnsupportedKey(#[from] UnsupportedKey),
}

/// Load and parse a document.
///
/// `hint` is used when the format cannot be derived from a file name. YAML documents are
/// annotated with source lines; JSON documents are not.
pub fn load(source: &Source, hint: Option<Format>) -> Result<Document, LoadError> {
    info!("Loading {}", source.describe());

    let (text, format) = match source {
        Source::File(path) => {
            let format = detect_format(&path.to_string_lossy(), hint)?;
            let text = fs::read_to_string(path)
                .map_err(|source| LoadError::Io { path: path.clone(), source })?;
            (text, format)
        }
        Source::Url { url, file_name } => {
            let format = detect_format(file_name, hint)?;
            (fetch(url)?, format)
        }
        Source::Inline(text) => (text.clone(), hint.unwrap_or_else(|| Format::sniff(text))),
    };
    debug!("Parsing {} bytes as {}", text.len(), format);

    let root = parse(&text, format)?;
    Ok(Document { source: source.clone(), format, root })
}

/// Parse document text into a node tree.
pub fn parse(text: &str, format: Format) -> Result<Node, LoadError> {
    match format {
        Format::Yaml => {
            let value: serde_yaml::Value = serde_yaml::from_str(text)?;
            let mut root = Node::from_yaml(value)?;
            let annotated = annotate_lines(&mut root, text);
            debug!("Annotated {} objects with source lines", annotated);
            Ok(root)
        }
        Format::Json => {
            let value: serde_json::Value = serde_json::from_str(text)?;
            Ok(Node::from(value))
        }
    }
}

fn detect_format(name: &str, hint: Option<Format>) -> Result<Format, LoadError> {
    match Format::from_name(name).or(hint) {
        Some(format) => {
            trace!("Detected {} format for {}", format, name);
            Ok(format)
        }
        None => Err(LoadError::UnknownFormat { name: name.to_string() }),
    }
}

fn fetch(url: &str) -> Result<String, LoadError> {
    debug!("Fetching {}", url);
    let to_err = |source| LoadError::Http { url: url.to_string(), source };
    let response = reqwest::blocking::get(url).map_err(to_err)?;
    let response = response.error_for_status().map_err(to_err)?;
    response.text().map_err(to_err)
}
