// tests/artifacts.rs

use std::error::Error;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};

use gmlaunch::config::model::RawProfile;
use gmlaunch::config::{write_artifacts, CorpusDescriptor, LauncherProfile};
use gmlaunch::fs::mock::MockFileSystem;
use gmlaunch::types::{ConfigKind, DescriptorShape, FrontendLayout};
use gmlaunch_test_utils::builders::RuntimeConfigBuilder;

type TestResult = Result<(), Box<dyn Error>>;

fn corpus(id: &str) -> CorpusDescriptor {
    CorpusDescriptor::from_directory(
        id.to_string(),
        PathBuf::from(format!("/data/{id}")),
        ConfigKind::Ud,
        false,
    )
}

fn read_json(fs: &MockFileSystem, path: &str) -> Result<Value, Box<dyn Error>> {
    let bytes = fs.contents(path).ok_or_else(|| format!("{path} not written"))?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn profile(edit: impl FnOnce(&mut RawProfile)) -> Result<LauncherProfile, Box<dyn Error>> {
    let mut raw = RawProfile::default();
    edit(&mut raw);
    Ok(LauncherProfile::try_from(raw)?)
}

#[test]
fn legacy_layout_writes_descriptor_and_frontend_config() -> TestResult {
    let cfg = RuntimeConfigBuilder::new("/data/UD_Test", Path::new("/w")).build();
    let fs = MockFileSystem::new();

    let written = write_artifacts(&fs, &cfg, &[corpus("UD_Test")])?;

    assert_eq!(
        written,
        vec![
            PathBuf::from("/w/corpora/local.json"),
            PathBuf::from("/w/grew_match/config.json")
        ]
    );
    assert_eq!(
        read_json(&fs, "/w/corpora/local.json")?,
        json!({"corpora": [{
            "id": "UD_Test", "config": "ud", "rtl": false, "directory": "/data/UD_Test"
        }]})
    );

    let config = read_json(&fs, "/w/grew_match/config.json")?;
    assert_eq!(config["backend_server"], "http://localhost:8899/");
    assert_eq!(config["groups"][0]["id"], "local");
    assert_eq!(config["groups"][0]["style"], "single");
    assert_eq!(config["groups"][0]["corpora"][0]["id"], "UD_Test");
    Ok(())
}

#[test]
fn several_corpora_use_a_dropdown() -> TestResult {
    let cfg = RuntimeConfigBuilder::new("/data/set.json", Path::new("/w")).build();
    let fs = MockFileSystem::new();

    write_artifacts(&fs, &cfg, &[corpus("a"), corpus("b")])?;

    let config = read_json(&fs, "/w/grew_match/config.json")?;
    assert_eq!(config["groups"][0]["style"], "dropdown");
    assert_eq!(config["groups"][0]["corpora"].as_array().map(Vec::len), Some(2));
    Ok(())
}

#[test]
fn instances_layout_and_flat_descriptor() -> TestResult {
    let profile = profile(|raw| {
        raw.frontend.layout = FrontendLayout::Instances;
        raw.compiler.descriptor_shape = DescriptorShape::Flat;
    })?;
    let cfg = RuntimeConfigBuilder::new("/data/UD_Test", Path::new("/w"))
        .ports(9001, 9000)
        .profile(profile)
        .build();
    let fs = MockFileSystem::new();

    let written = write_artifacts(&fs, &cfg, &[corpus("UD_Test")])?;
    assert_eq!(written.len(), 3);

    assert!(read_json(&fs, "/w/corpora/local.json")?.is_array());
    assert_eq!(
        read_json(&fs, "/w/grew_match/instances.json")?,
        json!({"localhost:9000": {"backend": "http://localhost:9001/", "desc": "local"}})
    );
    let desc = read_json(&fs, "/w/grew_match/instances/local.json")?;
    assert!(desc.get("backend_server").is_none());
    assert_eq!(desc["groups"][0]["corpora"][0]["id"], "UD_Test");
    Ok(())
}

#[test]
fn unknown_descriptor_fields_are_written_back() -> TestResult {
    let cfg = RuntimeConfigBuilder::new("/data/set.json", Path::new("/w")).build();
    let fs = MockFileSystem::new();
    let mut c = corpus("a");
    c.extra.insert("audio".to_string(), json!(true));

    write_artifacts(&fs, &cfg, &[c])?;

    assert_eq!(read_json(&fs, "/w/corpora/local.json")?["corpora"][0]["audio"], true);
    Ok(())
}
