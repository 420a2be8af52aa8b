use log::{debug, info};
use path_clean::clean;
use serde::Serialize;
use std::{
    env, fs,
    io::{self, Write},
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::{
    constants::{SANITIZED_INFIX, STDOUT_PATH},
    node::Node,
    types::{Format, Source},
};

#[derive(Debug, Error)]
pub enum DumpError {
    #[error("no output file name can be derived for {0}, pass an explicit output path")]
    NoOutputPath(String),

    #[error("will not overwrite original file {path}")]
    WouldOverwriteInput { path: PathBuf },

    #[error("will not overwrite existing file {path}")]
    OutputExists { path: PathBuf },

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to serialize JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Stdout,
    File(PathBuf),
}

impl OutputTarget {
    /// Decide where the rewritten form of `source` goes.
    ///
    /// An explicit `-` means stdout. Without an explicit path, file inputs get a sibling
    /// `<stem>.san.<ext>`, URLs get the same name in the working directory, and inline text
    /// has no default. The original input is never a valid target.
    pub fn for_source(source: &Source, explicit: Option<&Path>) -> Result<Self, DumpError> {
        let path = match explicit {
            Some(path) if path == Path::new(STDOUT_PATH) => return Ok(OutputTarget::Stdout),
            Some(path) => path.to_path_buf(),
            None => match source {
                Source::File(input) => {
                    let name = input.file_name().map(|n| n.to_string_lossy().to_string());
                    let name = name.ok_or_else(|| DumpError::NoOutputPath(source.describe()))?;
                    input.with_file_name(sanitized_name(&name))
                }
                Source::Url { file_name, .. } => PathBuf::from(sanitized_name(file_name)),
                Source::Inline(_) => return Err(DumpError::NoOutputPath(source.describe())),
            },
        };

        if let Source::File(input) = source
            && same_path(input, &path)
        {
            return Err(DumpError::WouldOverwriteInput { path });
        }
        debug!("Output target for {}: {}", source.describe(), path.display());
        Ok(OutputTarget::File(path))
    }

    pub fn describe(&self) -> String {
        match self {
            OutputTarget::Stdout => "<stdout>".to_string(),
            OutputTarget::File(path) => path.display().to_string(),
        }
    }
}

/// `api.yaml` becomes `api.san.yaml`; a name without extension gets `.san` appended.
pub fn sanitized_name(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{}.{}.{}", stem, SANITIZED_INFIX, ext),
        _ => format!("{}.{}", name, SANITIZED_INFIX),
    }
}

fn same_path(a: &Path, b: &Path) -> bool {
    let absolute = |p: &Path| {
        if p.is_absolute() {
            clean(p)
        } else {
            env::current_dir().map(|cwd| clean(cwd.join(p))).unwrap_or_else(|_| clean(p))
        }
    };
    absolute(a) == absolute(b)
}

/// Serialize a document without its line annotations.
pub fn render(root: &Node, format: Format) -> Result<String, DumpError> {
    let mut clean_root = root.clone();
    clean_root.strip_line_annotations();

    match format {
        Format::Yaml => Ok(serde_yaml::to_string(&clean_root)?),
        Format::Json => {
            let mut buf = Vec::new();
            let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
            let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
            clean_root.serialize(&mut ser)?;
            buf.push(b'\n');
            Ok(String::from_utf8_lossy(&buf).into_owned())
        }
    }
}

/// Write a document to `target`, refusing to replace an existing file.
pub fn dump(root: &Node, format: Format, target: &OutputTarget) -> Result<(), DumpError> {
    let text = render(root, format)?;

    match target {
        OutputTarget::Stdout => {
            let path = PathBuf::from(STDOUT_PATH);
            let mut stdout = io::stdout().lock();
            stdout
                .write_all(text.as_bytes())
                .and_then(|_| stdout.flush())
                .map_err(|source| DumpError::Io { path, source })?;
        }
        OutputTarget::File(path) => {
            let mut file =
                fs::OpenOptions::new().write(true).create_new(true).open(path).map_err(
                    |source| {
                        if source.kind() == io::ErrorKind::AlreadyExists {
                            DumpError::OutputExists { path: path.clone() }
                        } else {
                            DumpError::Io { path: path.clone(), source }
                        }
                    },
                )?;
            file.write_all(text.as_bytes())
                .map_err(|source| DumpError::Io { path: path.clone(), source })?;
        }
    }

    info!("Wrote {} document to {}", format, target.describe());
    Ok(())
}
