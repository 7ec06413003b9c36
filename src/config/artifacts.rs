// src/config/artifacts.rs

//! JSON files generated for the compiler and the frontend.

use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use tracing::info;

use crate::config::corpus::CorpusDescriptor;
use crate::config::runtime::{RuntimeConfig, LOCAL_INSTANCE};
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::types::{DescriptorShape, FrontendLayout};

/// Content of the corpus descriptor file.
pub fn descriptor_document(shape: DescriptorShape, corpora: &[CorpusDescriptor]) -> Value {
    match shape {
        DescriptorShape::Wrapped => json!({ "corpora": corpora }),
        DescriptorShape::Flat => json!(corpora),
    }
}

/// Groups document listing the local corpora for the frontend.
pub fn groups_document(backend_url: Option<&str>, corpora: &[CorpusDescriptor]) -> Value {
    let style = if corpora.len() == 1 { "single" } else { "dropdown" };
    let groups = json!([{
        "id": LOCAL_INSTANCE,
        "name": LOCAL_INSTANCE,
        "style": style,
        "corpora": corpora,
    }]);
    match backend_url {
        Some(url) => json!({ "backend_server": url, "groups": groups }),
        None => json!({ "groups": groups }),
    }
}

/// Instance table mapping `host:port` to its backend and descriptor.
pub fn instances_document(cfg: &RuntimeConfig) -> Value {
    let mut table = serde_json::Map::new();
    table.insert(
        cfg.instance_key(),
        json!({ "backend": cfg.backend_url(), "desc": LOCAL_INSTANCE }),
    );
    Value::Object(table)
}

/// Write the corpus descriptor and the frontend configuration.
///
/// Returns the written paths.
pub fn write_artifacts(
    fs: &dyn FileSystem,
    cfg: &RuntimeConfig,
    corpora: &[CorpusDescriptor],
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    let descriptor = cfg.descriptor_path();
    write_json(
        fs,
        &descriptor,
        &descriptor_document(cfg.profile.compiler.descriptor_shape, corpora),
    )?;
    written.push(descriptor);

    match cfg.profile.frontend.layout {
        FrontendLayout::Legacy => {
            let path = cfg.frontend_config_path();
            let url = cfg.backend_url();
            write_json(fs, &path, &groups_document(Some(&url), corpora))?;
            written.push(path);
        }
        FrontendLayout::Instances => {
            let instances = cfg.instances_path();
            write_json(fs, &instances, &instances_document(cfg))?;
            written.push(instances);

            let desc = cfg.frontend_config_path();
            write_json(fs, &desc, &groups_document(None, corpora))?;
            written.push(desc);
        }
    }

    info!(files = ?written, "wrote corpus and frontend configuration");
    Ok(written)
}

fn write_json(fs: &dyn FileSystem, path: &Path, value: &Value) -> Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    fs.write(path, text.as_bytes())?;
    Ok(())
}
