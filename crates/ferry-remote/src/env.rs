//! `NAME=VALUE` environment declarations for remote jobs

use crate::Result;
use ferry_core::Error;
use std::collections::BTreeMap;

const SECRET_PREFIX: &str = "secret:";

/// Plain and secret environment of a job
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedEnv {
    pub env: BTreeMap<String, String>,
    /// Variable name to `secret:<name>` locator
    pub secret_env: BTreeMap<String, String>,
}

/// Parse environment declarations. Values of the form `secret:<name>` are
/// resolved by the platform and land in `secret_env`.
pub fn parse_env<S: AsRef<str>>(declarations: &[S]) -> Result<ParsedEnv> {
    let mut parsed = ParsedEnv::default();
    for declaration in declarations {
        let declaration = declaration.as_ref();
        let (name, value) = declaration.split_once('=').ok_or_else(|| {
            Error::Validation(format!(
                "Invalid environment variable '{}': expected NAME=VALUE",
                declaration
            ))
        })?;
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            return Err(Error::Validation(format!(
                "Invalid environment variable name in '{}'",
                declaration
            ))
            .into());
        }

        if value.starts_with(SECRET_PREFIX) && value.len() > SECRET_PREFIX.len() {
            parsed.env.remove(name);
            parsed.secret_env.insert(name.to_string(), value.to_string());
        } else {
            parsed.secret_env.remove(name);
            parsed.env.insert(name.to_string(), value.to_string());
        }
    }
    Ok(parsed)
}
