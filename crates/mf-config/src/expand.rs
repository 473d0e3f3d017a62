//! `${VAR}` and `${VAR:-default}` expansion for configuration strings.

use std::env::VarError;

use crate::ConfigError;

/// Expand environment variable references in a configuration value.
///
/// Bare `$VAR` is left alone so that passwords and URLs containing a dollar
/// sign survive unchanged.
pub(crate) fn expand_env(value: &str, field: &str) -> Result<String, ConfigError> {
    if !value.contains("${") {
        return Ok(value.to_owned());
    }

    let expanded = shellexpand::env_with_context(value, lookup).map_err(|e| {
        let message = match e.cause {
            VarError::NotPresent => format!("${{{}}} not set", e.var_name),
            VarError::NotUnicode(_) => format!("${{{}}} is not valid unicode", e.var_name),
        };
        ConfigError::EnvVar {
            field: field.to_owned(),
            message,
        }
    })?;

    Ok(expanded.into_owned())
}

/// Strict lookup: an unset variable is an error unless a `:-default` is given.
fn lookup(var: &str) -> Result<Option<String>, VarError> {
    std::env::var(var).map(Some)
}
