use std::env;
use std::time::Duration;

use url::Url;

use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_TABLE: &str = "gogebashvili_1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 5;

/// Where the backend lives and which content table to play.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: String,
    pub table: String,
    pub timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            table: DEFAULT_TABLE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ApiConfig {
    /// Read `DEDAENA_API_BASE_URL`, `DEDAENA_TABLE` and
    /// `DEDAENA_API_TIMEOUT_SECS`, falling back to the defaults.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Url` if the base URL does not parse.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ApiError> {
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let base_url = non_blank("DEDAENA_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let table = non_blank("DEDAENA_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string());
        let timeout_secs = match non_blank("DEDAENA_API_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "ignoring invalid DEDAENA_API_TIMEOUT_SECS");
                DEFAULT_TIMEOUT_SECS
            }),
            None => DEFAULT_TIMEOUT_SECS,
        };

        Self {
            base_url,
            table,
            timeout: Duration::from_secs(timeout_secs),
        }
        .validated()
    }

    #[must_use]
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    fn validated(mut self) -> Result<Self, ApiError> {
        Url::parse(self.base_url.trim())?;
        self.base_url = self.base_url.trim().trim_end_matches('/').to_string();
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = ApiConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ApiConfig::default());
    }

    #[test]
    fn reads_overrides_and_trims_trailing_slash() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("DEDAENA_API_BASE_URL", "https://dedaena.example/api/"),
            ("DEDAENA_TABLE", "gogebashvili_2"),
            ("DEDAENA_API_TIMEOUT_SECS", "12"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://dedaena.example/api");
        assert_eq!(config.table, "gogebashvili_2");
        assert_eq!(config.timeout, Duration::from_secs(12));
    }

    #[test]
    fn bad_timeout_falls_back_and_bad_url_fails() {
        let config =
            ApiConfig::from_lookup(lookup(&[("DEDAENA_API_TIMEOUT_SECS", "soon")])).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        let err = ApiConfig::from_lookup(lookup(&[("DEDAENA_API_BASE_URL", "not a url")]));
        assert!(matches!(err, Err(ApiError::Url(_))));
    }
}
