//! Schema-level validation (no filesystem access).

use crate::error::{ConfigError, Result};
use crate::options::MiddlewareConfig;

impl MiddlewareConfig {
    /// Validate method and header names.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.methods.is_empty() {
            return Err(ConfigError::invalid(
                "methods",
                "At least one HTTP method is required (e.g. [\"GET\", \"HEAD\"])",
            ));
        }

        for method in &self.methods {
            if !is_token(method) {
                return Err(ConfigError::invalid(
                    "methods",
                    format!("'{method}' is not a valid HTTP method name"),
                ));
            }
        }

        for name in self.headers.keys() {
            if !is_token(name) {
                return Err(ConfigError::invalid(
                    "headers",
                    format!("'{name}' is not a valid header name"),
                ));
            }
        }

        if let Some(public_path) = &self.public_path {
            if public_path.chars().any(char::is_control) {
                return Err(ConfigError::invalid(
                    "public_path",
                    "Public path must not contain control characters",
                ));
            }
        }

        Ok(())
    }
}

// RFC 7230 token characters
fn is_token(value: &str) -> bool {
    !value.is_empty()
        && value.bytes().all(|b| {
            b.is_ascii_alphanumeric()
                || matches!(
                    b,
                    b'!' | b'#'
                        | b'$'
                        | b'%'
                        | b'&'
                        | b'\''
                        | b'*'
                        | b'+'
                        | b'-'
                        | b'.'
                        | b'^'
                        | b'_'
                        | b'`'
                        | b'|'
                        | b'~'
                )
        })
}
