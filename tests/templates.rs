// tests/templates.rs

use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use proptest::prelude::*;

use gmlaunch::compile::{CorpusCompiler, MaterializingCompiler};
use gmlaunch::config::{ConfigMaterializer, Placeholders, TemplateSet};
use gmlaunch::errors::LauncherError;
use gmlaunch::fs::mock::MockFileSystem;
use gmlaunch::fs::RealFileSystem;
use gmlaunch_test_utils::builders::RuntimeConfigBuilder;
use gmlaunch_test_utils::fakes::{call_log, FakeCompiler};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn backend_templates_get_runtime_values() -> TestResult {
    let work = tempfile::tempdir()?;
    let cfg = RuntimeConfigBuilder::new("/data/c", work.path())
        .ports(9001, 9000)
        .build();
    let backend = &cfg.layout.backend_dir;
    std::fs::create_dir_all(backend)?;
    std::fs::write(
        backend.join("gmb.conf.in__TEMPLATE"),
        "log_dir: __LOG__\nconfig: __CONFIG__\ncorpora: __CORPORA__\nextern: __EXTERN__\n",
    )?;
    std::fs::write(backend.join("Makefile.options__TEMPLATE"), "PORT=__PORT__\n")?;

    let templates = TemplateSet::new(
        Arc::new(RealFileSystem),
        cfg.template_pairs(),
        cfg.placeholders(),
    );
    assert_eq!(templates.render_all()?, 5);

    let conf = std::fs::read_to_string(backend.join("gmb.conf.in"))?;
    let root = work.path().display();
    assert_eq!(
        conf,
        format!(
            "log_dir: {root}/log\nconfig: {root}/grew_match/config.json\n\
             corpora: {root}/corpora/\nextern: {root}/grew_match_back/static/\n"
        )
    );
    assert_eq!(
        std::fs::read_to_string(backend.join("Makefile.options"))?,
        "PORT=9001\n"
    );
    Ok(())
}

#[test]
fn missing_template_and_unresolved_token_write_nothing() {
    let fs = MockFileSystem::new();
    fs.add_file("/b/in", "a __UNKNOWN__ b\n");
    let m = ConfigMaterializer::new(&fs).unwrap();

    let err = m
        .render(Path::new("/b/absent"), Path::new("/b/out"), &Placeholders::new())
        .unwrap_err();
    assert!(matches!(err, LauncherError::TemplateMissing(_)));

    let err = m
        .render(Path::new("/b/in"), Path::new("/b/out"), &Placeholders::new())
        .unwrap_err();
    match err {
        LauncherError::UnresolvedPlaceholder { placeholder, .. } => {
            assert_eq!(placeholder, "UNKNOWN")
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(fs.written().is_empty());
}

#[tokio::test]
async fn only_forced_compiles_re_render_templates() -> TestResult {
    let fs = Arc::new(MockFileSystem::new());
    fs.add_file("/b/gmb.conf.in__TEMPLATE", "port: __PORT__\n");
    let mut p = Placeholders::new();
    p.set("PORT", "8899");
    let templates = TemplateSet::new(
        fs.clone(),
        vec![(
            PathBuf::from("/b/gmb.conf.in__TEMPLATE"),
            PathBuf::from("/b/gmb.conf.in"),
        )],
        p,
    );
    let log = call_log();
    let mut compiler = MaterializingCompiler::new(FakeCompiler::new(log.clone()), templates);

    compiler.compile(false).await?;
    assert!(fs.written().is_empty());

    compiler.compile(true).await?;
    assert_eq!(fs.written(), vec![PathBuf::from("/b/gmb.conf.in")]);
    assert_eq!(fs.contents("/b/gmb.conf.in"), Some(b"port: 8899\n".to_vec()));
    assert_eq!(*log.lock().unwrap(), vec!["compile", "compile:clean"]);
    Ok(())
}

fn line_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z =:/._-]{0,20}",
        Just("__LOG__".to_string()),
        Just("__PORT__".to_string()),
        Just("x__PORT__y".to_string()),
        Just("__init__".to_string()),
    ]
}

proptest! {
    #[test]
    fn rendering_is_deterministic_and_leaves_no_tokens(
        lines in proptest::collection::vec(line_strategy(), 0..12),
        crlf in any::<bool>(),
    ) {
        let eol = if crlf { "\r\n" } else { "\n" };
        let template = lines.join(eol);

        let fs = MockFileSystem::new();
        fs.add_file("/t/in", template.clone());
        let m = ConfigMaterializer::new(&fs).unwrap();
        let mut p = Placeholders::new();
        p.set("LOG", "/w/log").set("PORT", "8899");

        m.render(Path::new("/t/in"), Path::new("/t/a"), &p).unwrap();
        m.render(Path::new("/t/in"), Path::new("/t/b"), &p).unwrap();
        let a = String::from_utf8(fs.contents("/t/a").unwrap()).unwrap();
        let b = String::from_utf8(fs.contents("/t/b").unwrap()).unwrap();

        prop_assert_eq!(&a, &b);
        prop_assert!(!a.contains("__LOG__") && !a.contains("__PORT__"));
        prop_assert_eq!(a.matches(eol).count(), template.matches(eol).count());
        prop_assert_eq!(
            a.matches("__init__").count(),
            template.matches("__init__").count()
        );
    }
}
