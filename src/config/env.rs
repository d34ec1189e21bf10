//! Environment-provided credentials for the scoring API.

use crate::error::ScreenError;

/// Name of the environment variable holding the WiseASR access key.
pub const ACCESS_KEY_VAR: &str = "ETRI_ACCESS_KEY";

/// Name of the environment variable holding the utterance language code
/// (e.g. "korean").
pub const LANGUAGE_CODE_VAR: &str = "ETRI_LANGUAGE_CODE";

/// Scoring API credential and language code, read from the process
/// environment at startup.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_key: String,
    pub language_code: String,
}

impl Credentials {
    /// Loads both required settings, failing fast when either is missing.
    ///
    /// # Errors
    /// - `ConfigurationMissing` naming the absent variable
    pub fn from_env() -> Result<Self, ScreenError> {
        let access_key = read_var(ACCESS_KEY_VAR)?;
        let language_code = read_var(LANGUAGE_CODE_VAR)?;
        Ok(Self {
            access_key,
            language_code,
        })
    }
}

fn read_var(name: &'static str) -> Result<String, ScreenError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ScreenError::ConfigurationMissing(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_variable_names_itself() {
        let err = read_var("PRATE_TEST_UNSET_VARIABLE").unwrap_err();
        assert!(err.to_string().contains("PRATE_TEST_UNSET_VARIABLE"));
    }

    #[test]
    fn blank_variable_is_treated_as_missing() {
        std::env::set_var("PRATE_TEST_BLANK_VARIABLE", "   ");
        assert!(read_var("PRATE_TEST_BLANK_VARIABLE").is_err());
        std::env::remove_var("PRATE_TEST_BLANK_VARIABLE");
    }
}
