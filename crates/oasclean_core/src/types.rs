use regex::Regex;
use serde::Serialize;
use std::{
    fmt,
    path::{Path, PathBuf},
    sync::LazyLock,
};

use crate::{
    constants::{JSON_EXTENSIONS, YAML_EXTENSIONS},
    node::Node,
};

static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:http|ftp)s?://.*/(?P<filename>(?P<root>.*)(?P<ext>\.\w*))$")
        .expect("URL pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Yaml,
    Json,
}

impl Format {
    /// Format implied by the extension of a file name or URL path.
    pub fn from_name(name: &str) -> Option<Format> {
        let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
        if YAML_EXTENSIONS.contains(&ext.as_str()) {
            Some(Format::Yaml)
        } else if JSON_EXTENSIONS.contains(&ext.as_str()) {
            Some(Format::Json)
        } else {
            None
        }
    }

    /// Guess the format of inline text: JSON documents open with `{`.
    pub fn sniff(text: &str) -> Format {
        if text.trim_start().starts_with('{') { Format::Json } else { Format::Yaml }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Yaml => f.write_str("yaml"),
            Format::Json => f.write_str("json"),
        }
    }
}

/// Where a document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Url { url: String, file_name: String },
    /// The argument is the document text itself
    Inline(String),
}

impl Source {
    /// Classify a command-line argument: an existing file, a URL naming a file, or inline text.
    pub fn resolve(arg: &str) -> Source {
        let path = Path::new(arg);
        if path.is_file() {
            return Source::File(path.to_path_buf());
        }
        if let Some(caps) = URL_RE.captures(arg) {
            return Source::Url { url: arg.to_string(), file_name: caps["filename"].to_string() };
        }
        Source::Inline(arg.to_string())
    }

    /// Short human readable name used in reports.
    pub fn describe(&self) -> String {
        match self {
            Source::File(path) => path.display().to_string(),
            Source::Url { url, .. } => url.clone(),
            Source::Inline(_) => "<inline>".to_string(),
        }
    }
}

/// A parsed document together with its origin.
#[derive(Debug, Clone)]
pub struct Document {
    pub source: Source,
    pub format: Format,
    pub root: Node,
}
