use log::{info, warn};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::model::Description;

/// File extensions recognized as description documents in folder mode.
pub const DESCRIPTION_EXTENSIONS: [&str; 3] = ["json", "yaml", "yml"];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path} as JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse {path} as YAML: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("no description could be loaded from {0}")]
    EmptyFolder(PathBuf),
}

/// Load one description document, decoding it by extension.
pub fn load_file(path: &Path) -> Result<Description, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    match extension(path).as_deref() {
        Some("json") => serde_json::from_str(&content).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            source,
        }),
        // YAML is a superset of JSON, so anything else is tried as YAML
        _ => serde_yaml::from_str(&content).map_err(|source| LoadError::Yaml {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Load every description document in `dir`, in file name order.
///
/// A document that fails to load is reported and skipped; the folder only
/// fails when nothing could be loaded.
pub fn load_folder(dir: &Path) -> Result<Vec<(PathBuf, Description)>, LoadError> {
    let entries = std::fs::read_dir(dir).map_err(|source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.is_file())
        .filter(|path| {
            extension(path).is_some_and(|ext| DESCRIPTION_EXTENSIONS.contains(&ext.as_str()))
        })
        .collect();
    paths.sort();

    let mut descriptions = Vec::new();
    for path in paths {
        match load_file(&path) {
            Ok(description) => {
                info!("Loaded {}", path.display());
                descriptions.push((path, description));
            }
            Err(e) => warn!("Skipping {}: {}", path.display(), e),
        }
    }

    if descriptions.is_empty() {
        return Err(LoadError::EmptyFolder(dir.to_path_buf()));
    }
    Ok(descriptions)
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}
