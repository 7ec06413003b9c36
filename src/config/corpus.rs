// src/config/corpus.rs

//! Corpus descriptors derived from the DATA argument.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::errors::{LauncherError, Result};
use crate::fs::FileSystem;
use crate::types::ConfigKind;

/// One corpus as seen by the compiler and the frontend.
///
/// Fields the launcher does not interpret are kept in `extra` and written
/// back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusDescriptor {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rtl: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<PathBuf>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamic: Option<bool>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CorpusDescriptor {
    /// Descriptor for a corpus directory given on the command line.
    pub fn from_directory(id: String, directory: PathBuf, kind: ConfigKind, rtl: bool) -> Self {
        Self {
            id,
            config: Some(kind.to_string()),
            rtl: Some(rtl),
            directory: Some(directory),
            files: None,
            dynamic: None,
            extra: Map::new(),
        }
    }

    pub fn has_storage(&self) -> bool {
        self.directory.is_some() || self.files.as_ref().is_some_and(|f| !f.is_empty())
    }
}

/// Load the corpora to serve from `data`.
///
/// - a directory is one corpus, named after the directory, with `kind` and
///   `rtl` taken from the command line;
/// - a `.json` file holds either `{"corpora": [...]}`, a flat array, or a
///   single corpus object.
pub fn load_corpora(
    fs: &dyn FileSystem,
    data: &Path,
    kind: ConfigKind,
    rtl: bool,
) -> Result<Vec<CorpusDescriptor>> {
    let corpora = if fs.is_dir(data) {
        vec![directory_corpus(fs, data, kind, rtl)?]
    } else if fs.is_file(data) && has_json_extension(data) {
        let text = fs.read_to_string(data)?;
        let json: Value = serde_json::from_str(&text)
            .map_err(|e| invalid(data, format!("not valid JSON: {e}")))?;
        corpora_from_json(data, json)?
    } else if fs.exists(data) {
        return Err(invalid(
            data,
            "expected a corpus directory or a .json descriptor file".to_string(),
        ));
    } else {
        return Err(invalid(data, "no such file or directory".to_string()));
    };

    check_corpora(data, &corpora)?;
    debug!(count = corpora.len(), data = %data.display(), "loaded corpora");
    Ok(corpora)
}

fn directory_corpus(
    fs: &dyn FileSystem,
    data: &Path,
    kind: ConfigKind,
    rtl: bool,
) -> Result<CorpusDescriptor> {
    let directory = fs.absolute(data)?;
    let id = directory
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| invalid(data, "cannot derive a corpus id from this path".to_string()))?;
    Ok(CorpusDescriptor::from_directory(id, directory, kind, rtl))
}

fn corpora_from_json(data: &Path, json: Value) -> Result<Vec<CorpusDescriptor>> {
    let items = match json {
        Value::Object(mut obj) => match obj.remove("corpora") {
            Some(Value::Array(items)) => items,
            Some(_) => return Err(invalid(data, "\"corpora\" must be an array".to_string())),
            None => vec![Value::Object(obj)],
        },
        Value::Array(items) => items,
        _ => {
            return Err(invalid(
                data,
                "expected a JSON object or array".to_string(),
            ));
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value(item).map_err(|e| invalid(data, format!("corpus #{i}: {e}")))
        })
        .collect()
}

fn check_corpora(data: &Path, corpora: &[CorpusDescriptor]) -> Result<()> {
    if corpora.is_empty() {
        return Err(invalid(data, "no corpus described".to_string()));
    }

    let mut seen = HashSet::new();
    for corpus in corpora {
        if corpus.id.trim().is_empty() {
            return Err(invalid(data, "corpus with an empty id".to_string()));
        }
        if !seen.insert(corpus.id.as_str()) {
            return Err(invalid(data, format!("duplicate corpus id '{}'", corpus.id)));
        }
        if !corpus.has_storage() {
            warn!(corpus = %corpus.id, "corpus has neither `directory` nor `files`");
        }
    }
    Ok(())
}

fn has_json_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}

fn invalid(path: &Path, reason: String) -> LauncherError {
    LauncherError::InvalidData {
        path: path.to_path_buf(),
        reason,
    }
}
