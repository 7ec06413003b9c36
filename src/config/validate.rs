// src/config/validate.rs

use crate::config::model::{LauncherProfile, RawProfile};
use crate::config::template::is_placeholder_name;
use crate::errors::{LauncherError, Result};

/// Placeholders filled from the runtime layout; profiles may not redefine them.
pub const BUILTIN_PLACEHOLDERS: [&str; 5] = ["LOG", "CONFIG", "CORPORA", "EXTERN", "PORT"];

impl TryFrom<RawProfile> for LauncherProfile {
    type Error = LauncherError;

    fn try_from(raw: RawProfile) -> std::result::Result<Self, Self::Error> {
        validate_raw_profile(&raw)?;
        Ok(LauncherProfile::new_unchecked(raw))
    }
}

fn validate_raw_profile(profile: &RawProfile) -> Result<()> {
    validate_command("[frontend].command", &profile.frontend.command)?;
    validate_command("[backend].command", &profile.backend.command)?;
    validate_dirs(profile)?;
    validate_compiler(profile)?;
    validate_health(profile)?;
    validate_templates(profile)?;
    validate_env_placeholders(profile)?;
    Ok(())
}

fn validate_command(what: &str, command: &[String]) -> Result<()> {
    match command.first() {
        Some(program) if !program.trim().is_empty() => Ok(()),
        _ => Err(LauncherError::ConfigError(format!(
            "{what} must start with a program name"
        ))),
    }
}

fn validate_dirs(profile: &RawProfile) -> Result<()> {
    for (what, dir) in [
        ("[frontend].dir", &profile.frontend.dir),
        ("[backend].dir", &profile.backend.dir),
    ] {
        if dir.trim().is_empty() {
            return Err(LauncherError::ConfigError(format!(
                "{what} must not be empty"
            )));
        }
    }

    if profile.frontend.dir == profile.backend.dir {
        return Err(LauncherError::ConfigError(format!(
            "frontend and backend cannot share the directory '{}'",
            profile.frontend.dir
        )));
    }
    Ok(())
}

fn validate_compiler(profile: &RawProfile) -> Result<()> {
    if profile.compiler.program.trim().is_empty() {
        return Err(LauncherError::ConfigError(
            "[compiler].program must not be empty".to_string(),
        ));
    }
    if profile.compiler.descriptor_name.trim().is_empty() {
        return Err(LauncherError::ConfigError(
            "[compiler].descriptor_name must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_health(profile: &RawProfile) -> Result<()> {
    if profile.health.max_attempts == 0 {
        return Err(LauncherError::ConfigError(
            "[health].max_attempts must be >= 1 (got 0)".to_string(),
        ));
    }
    if profile.backend.request_timeout_secs == 0 {
        return Err(LauncherError::ConfigError(
            "[backend].request_timeout_secs must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_templates(profile: &RawProfile) -> Result<()> {
    for template in profile.templates.iter() {
        if template.source.as_os_str().is_empty() || template.target.as_os_str().is_empty() {
            return Err(LauncherError::ConfigError(
                "[[template]] entries need both `source` and `target`".to_string(),
            ));
        }
        if template.source == template.target {
            return Err(LauncherError::ConfigError(format!(
                "template {:?} would overwrite itself",
                template.source
            )));
        }
    }
    Ok(())
}

fn validate_env_placeholders(profile: &RawProfile) -> Result<()> {
    for (name, var) in profile.env_placeholders.iter() {
        if !is_placeholder_name(name) {
            return Err(LauncherError::ConfigError(format!(
                "placeholder name '{name}' must use only A-Z, 0-9 and '_'"
            )));
        }
        if BUILTIN_PLACEHOLDERS.contains(&name.as_str()) {
            return Err(LauncherError::ConfigError(format!(
                "placeholder '{name}' is built in and cannot be read from the environment"
            )));
        }
        if var.trim().is_empty() {
            return Err(LauncherError::ConfigError(format!(
                "placeholder '{name}' needs an environment variable name"
            )));
        }
    }
    Ok(())
}
