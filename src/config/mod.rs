// src/config/mod.rs

//! Configuration for gmlaunch.
//!
//! Responsibilities:
//! - Define the TOML-backed launcher profile (`model.rs`), load it
//!   (`loader.rs`) and validate it (`validate.rs`).
//! - Resolve the immutable [`RuntimeConfig`] from CLI and environment
//!   (`runtime.rs`).
//! - Derive corpus descriptors from the DATA argument (`corpus.rs`).
//! - Write the generated JSON files (`artifacts.rs`) and render the backend
//!   templates (`template.rs`).

pub mod artifacts;
pub mod corpus;
pub mod loader;
pub mod model;
pub mod runtime;
pub mod template;
pub mod validate;

pub use artifacts::write_artifacts;
pub use corpus::{load_corpora, CorpusDescriptor};
pub use loader::{load_and_validate, load_from_path, resolve_profile};
pub use model::{LauncherProfile, RawProfile, TemplateSpec};
pub use runtime::{Layout, RuntimeConfig};
pub use template::{ConfigMaterializer, Placeholders, TemplateSet};
