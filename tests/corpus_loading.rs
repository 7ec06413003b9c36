// tests/corpus_loading.rs

use std::error::Error;
use std::path::{Path, PathBuf};

use gmlaunch::config::load_corpora;
use gmlaunch::errors::{LauncherError, EXIT_INVALID_DATA};
use gmlaunch::fs::mock::MockFileSystem;
use gmlaunch::fs::RealFileSystem;
use gmlaunch::types::ConfigKind;

type TestResult = Result<(), Box<dyn Error>>;

fn assert_invalid(err: LauncherError, needle: &str) {
    assert_eq!(err.exit_code(), EXIT_INVALID_DATA);
    match err {
        LauncherError::InvalidData { ref reason, .. } => {
            assert!(reason.contains(needle), "reason {reason:?} lacks {needle:?}")
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn directory_becomes_one_corpus_named_after_it() -> TestResult {
    let dir = tempfile::tempdir()?;
    let corpus = dir.path().join("UD_French-Sequoia");
    std::fs::create_dir(&corpus)?;

    let corpora = load_corpora(&RealFileSystem, &corpus, ConfigKind::Sud, true)?;

    assert_eq!(corpora.len(), 1);
    let c = &corpora[0];
    assert_eq!(c.id, "UD_French-Sequoia");
    assert_eq!(c.config.as_deref(), Some("sud"));
    assert_eq!(c.rtl, Some(true));
    assert_eq!(c.directory.as_deref(), Some(corpus.as_path()));
    Ok(())
}

#[test]
fn json_file_accepts_wrapped_flat_and_single_shapes() -> TestResult {
    let fs = MockFileSystem::new();
    fs.add_file(
        "/d/wrapped.json",
        r#"{"corpora": [{"id": "a", "directory": "/c/a"}, {"id": "b", "files": ["/c/b.conllu"]}]}"#,
    );
    fs.add_file("/d/flat.json", r#"[{"id": "a", "directory": "/c/a"}]"#);
    fs.add_file(
        "/d/single.json",
        r#"{"id": "solo", "directory": "/c/solo", "audio": true}"#,
    );

    let wrapped = load_corpora(&fs, Path::new("/d/wrapped.json"), ConfigKind::Ud, false)?;
    assert_eq!(
        wrapped.iter().map(|c| c.id.as_str()).collect::<Vec<_>>(),
        ["a", "b"]
    );
    assert_eq!(wrapped[1].files, Some(vec![PathBuf::from("/c/b.conllu")]));

    let flat = load_corpora(&fs, Path::new("/d/flat.json"), ConfigKind::Ud, false)?;
    assert_eq!(flat.len(), 1);

    // Command-line kind and rtl do not override a JSON description.
    let single = load_corpora(&fs, Path::new("/d/single.json"), ConfigKind::Sud, true)?;
    assert_eq!(single[0].id, "solo");
    assert_eq!(single[0].config, None);
    assert_eq!(single[0].rtl, None);
    assert_eq!(single[0].extra.get("audio"), Some(&serde_json::Value::Bool(true)));
    Ok(())
}

#[test]
fn other_paths_are_invalid_data() {
    let fs = MockFileSystem::new();
    fs.add_file("/d/corpus.conllu", "# sent_id = 1\n");
    fs.add_file("/d/broken.json", "{ not json");

    let err = load_corpora(&fs, Path::new("/d/corpus.conllu"), ConfigKind::Ud, false).unwrap_err();
    assert_invalid(err, "expected a corpus directory or a .json descriptor file");

    let err = load_corpora(&fs, Path::new("/d/missing"), ConfigKind::Ud, false).unwrap_err();
    assert_invalid(err, "no such file or directory");

    let err = load_corpora(&fs, Path::new("/d/broken.json"), ConfigKind::Ud, false).unwrap_err();
    assert_invalid(err, "not valid JSON");
}

#[test]
fn corpus_lists_must_be_non_empty_with_unique_ids() {
    let fs = MockFileSystem::new();
    fs.add_file("/d/empty.json", r#"{"corpora": []}"#);
    fs.add_file("/d/dup.json", r#"[{"id": "a"}, {"id": "a"}]"#);
    fs.add_file("/d/noid.json", r#"[{"directory": "/c/a"}]"#);

    let err = load_corpora(&fs, Path::new("/d/empty.json"), ConfigKind::Ud, false).unwrap_err();
    assert_invalid(err, "no corpus described");

    let err = load_corpora(&fs, Path::new("/d/dup.json"), ConfigKind::Ud, false).unwrap_err();
    assert_invalid(err, "duplicate corpus id 'a'");

    let err = load_corpora(&fs, Path::new("/d/noid.json"), ConfigKind::Ud, false).unwrap_err();
    assert_invalid(err, "corpus #0");
}
