// src/config/template.rs

//! Template rendering for backend configuration files.
//!
//! Templates are plain text files containing tokens such as `__LOG__` or
//! `__PORT__`. Rendering replaces every token with its value and keeps every
//! other byte of the template unchanged, so rendering the same template with
//! the same values always produces the same file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use regex::{Captures, Regex};
use tracing::debug;

use crate::errors::{LauncherError, Result};
use crate::fs::FileSystem;

/// Matches `__NAME__` where NAME is upper-case words joined by single `_`.
const TOKEN_PATTERN: &str = r"__([A-Z0-9]+(?:_[A-Z0-9]+)*)__";

/// Whether `name` is a valid placeholder name (the part between `__`).
pub fn is_placeholder_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('_')
        && !name.ends_with('_')
        && !name.contains("__")
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

/// Placeholder name → value.
///
/// A `None` value marks a placeholder that is known but could not be
/// resolved (e.g. its environment variable is not set). Using such a
/// placeholder in a template is an error, declaring it is not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Placeholders {
    values: BTreeMap<String, Option<String>>,
}

impl Placeholders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(name.into(), Some(value.into()));
        self
    }

    pub fn set_unresolved(&mut self, name: impl Into<String>) -> &mut Self {
        self.values.insert(name.into(), None);
        self
    }

    /// Value of a resolved placeholder.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(|v| v.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.values
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }
}

/// Renders templates through a [`FileSystem`].
#[derive(Debug)]
pub struct ConfigMaterializer<'a> {
    fs: &'a dyn FileSystem,
    token: Regex,
}

impl<'a> ConfigMaterializer<'a> {
    pub fn new(fs: &'a dyn FileSystem) -> Result<Self> {
        let token = Regex::new(TOKEN_PATTERN).context("compiling placeholder pattern")?;
        Ok(Self { fs, token })
    }

    /// Render `template` into `output`, returning the number of substitutions.
    ///
    /// Nothing is written when the template is missing or uses a placeholder
    /// without a value.
    pub fn render(
        &self,
        template: &Path,
        output: &Path,
        placeholders: &Placeholders,
    ) -> Result<usize> {
        if !self.fs.is_file(template) {
            return Err(LauncherError::TemplateMissing(template.to_path_buf()));
        }
        let source = self.fs.read_to_string(template)?;

        self.check_resolved(template, &source, placeholders)?;

        let mut substitutions = 0;
        let mut rendered = String::with_capacity(source.len());
        for line in source.split_inclusive('\n') {
            let replaced = self.token.replace_all(line, |caps: &Captures<'_>| {
                substitutions += 1;
                // Every token was checked above.
                placeholders.get(&caps[1]).unwrap_or_default().to_string()
            });
            rendered.push_str(&replaced);
        }

        self.fs.write(output, rendered.as_bytes())?;
        debug!(
            template = %template.display(),
            output = %output.display(),
            substitutions,
            "rendered template"
        );
        Ok(substitutions)
    }

    fn check_resolved(
        &self,
        template: &Path,
        source: &str,
        placeholders: &Placeholders,
    ) -> Result<()> {
        for caps in self.token.captures_iter(source) {
            let name = &caps[1];
            if placeholders.get(name).is_none() {
                return Err(LauncherError::UnresolvedPlaceholder {
                    placeholder: name.to_string(),
                    template: template.to_path_buf(),
                });
            }
        }
        Ok(())
    }
}

/// The backend templates of a run, with the values to render them with.
///
/// Rendered once at startup and again before every forced recompilation.
#[derive(Debug, Clone)]
pub struct TemplateSet {
    fs: Arc<dyn FileSystem>,
    pairs: Vec<(PathBuf, PathBuf)>,
    placeholders: Placeholders,
}

impl TemplateSet {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        pairs: Vec<(PathBuf, PathBuf)>,
        placeholders: Placeholders,
    ) -> Self {
        Self {
            fs,
            pairs,
            placeholders,
        }
    }

    /// Template → output pairs, in rendering order.
    pub fn pairs(&self) -> &[(PathBuf, PathBuf)] {
        &self.pairs
    }

    /// Render every template; stops at the first failure.
    pub fn render_all(&self) -> Result<usize> {
        let materializer = ConfigMaterializer::new(self.fs.as_ref())?;
        let mut total = 0;
        for (template, output) in self.pairs.iter() {
            total += materializer.render(template, output, &self.placeholders)?;
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn values() -> Placeholders {
        let mut p = Placeholders::new();
        p.set("LOG", "/work/log").set("PORT", "8899");
        p
    }

    #[test]
    fn substitutes_every_occurrence_and_keeps_the_rest() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "/t/in",
            "log = __LOG__\nport=__PORT__ # __PORT__\r\n__init__ stays\n",
        );
        let m = ConfigMaterializer::new(&fs).unwrap();

        let n = m
            .render(Path::new("/t/in"), Path::new("/t/out"), &values())
            .unwrap();

        assert_eq!(n, 3);
        assert_eq!(
            fs.contents("/t/out").unwrap(),
            b"log = /work/log\nport=8899 # 8899\r\n__init__ stays\n"
        );
    }

    #[test]
    fn adjacent_tokens_are_distinct() {
        let fs = MockFileSystem::new();
        fs.add_file("/t/in", "__LOG____PORT__");
        let m = ConfigMaterializer::new(&fs).unwrap();

        m.render(Path::new("/t/in"), Path::new("/t/out"), &values())
            .unwrap();

        assert_eq!(fs.contents("/t/out").unwrap(), b"/work/log8899");
    }

    #[test]
    fn unknown_token_is_rejected_before_writing() {
        let fs = MockFileSystem::new();
        fs.add_file("/t/in", "a = __LOG__\nb = __CORPUSBANK__\n");
        let m = ConfigMaterializer::new(&fs).unwrap();

        let err = m
            .render(Path::new("/t/in"), Path::new("/t/out"), &values())
            .unwrap_err();

        match err {
            LauncherError::UnresolvedPlaceholder {
                placeholder,
                template,
            } => {
                assert_eq!(placeholder, "CORPUSBANK");
                assert_eq!(template, PathBuf::from("/t/in"));
            }
            other => panic!("expected UnresolvedPlaceholder, got {other:?}"),
        }
        assert!(fs.written().is_empty());
        assert!(!fs.exists(Path::new("/t/out")));
    }

    #[test]
    fn declared_but_unset_token_is_rejected() {
        let fs = MockFileSystem::new();
        fs.add_file("/t/in", "bank = __CORPUSBANK__\n");
        let mut p = values();
        p.set_unresolved("CORPUSBANK");
        let m = ConfigMaterializer::new(&fs).unwrap();

        let err = m
            .render(Path::new("/t/in"), Path::new("/t/out"), &p)
            .unwrap_err();

        assert!(matches!(err, LauncherError::UnresolvedPlaceholder { .. }));
        assert!(fs.written().is_empty());
    }

    #[test]
    fn unset_token_not_used_by_template_is_fine() {
        let fs = MockFileSystem::new();
        fs.add_file("/t/in", "log = __LOG__\n");
        let mut p = values();
        p.set_unresolved("CORPUSBANK");
        let m = ConfigMaterializer::new(&fs).unwrap();

        assert!(
            m.render(Path::new("/t/in"), Path::new("/t/out"), &p)
                .is_ok()
        );
    }

    #[test]
    fn missing_template_is_reported() {
        let fs = MockFileSystem::new();
        let m = ConfigMaterializer::new(&fs).unwrap();

        let err = m
            .render(Path::new("/nope"), Path::new("/t/out"), &values())
            .unwrap_err();

        assert!(matches!(err, LauncherError::TemplateMissing(p) if p == PathBuf::from("/nope")));
    }

    #[test]
    fn template_set_renders_in_order_and_stops_at_first_failure() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file("/b/a.in", "__LOG__\n");
        fs.add_file("/b/c.in", "__PORT__\n");
        let set = TemplateSet::new(
            fs.clone(),
            vec![
                (PathBuf::from("/b/a.in"), PathBuf::from("/b/a")),
                (PathBuf::from("/b/missing.in"), PathBuf::from("/b/m")),
                (PathBuf::from("/b/c.in"), PathBuf::from("/b/c")),
            ],
            values(),
        );

        let err = set.render_all().unwrap_err();

        assert!(matches!(err, LauncherError::TemplateMissing(_)));
        assert_eq!(fs.written(), vec![PathBuf::from("/b/a")]);
    }

    #[test]
    fn placeholder_names() {
        assert!(is_placeholder_name("CORPUSBANK"));
        assert!(is_placeholder_name("GREW_2"));
        assert!(!is_placeholder_name("lower"));
        assert!(!is_placeholder_name("_X"));
        assert!(!is_placeholder_name("A__B"));
        assert!(!is_placeholder_name(""));
    }
}
