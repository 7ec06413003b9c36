// src/config/loader.rs

use std::fs;
use std::path::Path;

use anyhow::Context;

use crate::config::model::{LauncherProfile, RawProfile};
use crate::errors::Result;

/// Load a launcher profile from a TOML file without semantic validation.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawProfile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading launcher profile {:?}", path))?;

    let profile: RawProfile = toml::from_str(&contents)?;

    Ok(profile)
}

/// Load a launcher profile from a TOML file and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<LauncherProfile> {
    let raw_profile = load_from_path(&path)?;
    let profile = LauncherProfile::try_from(raw_profile)?;
    Ok(profile)
}

/// Resolve the profile to use: the given file, or the built-in one.
pub fn resolve_profile(path: Option<&Path>) -> Result<LauncherProfile> {
    match path {
        Some(path) => load_and_validate(path),
        None => Ok(LauncherProfile::builtin()),
    }
}
