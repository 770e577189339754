//! Client configuration.

use serde::Deserialize;

fn default_region() -> String {
    "us-east-1".to_string()
}

/// Process-wide settings, read-only after the client is built.
///
/// `bucket` and `region` select the target container; store adapters read
/// them when establishing their connection (the in-memory store ignores
/// both). With `soft_deletes` enabled, delete marks objects with a
/// `DeletedAt` tag instead of removing them, and reads filter tagged
/// objects out.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Target container in the object store.
    pub bucket: String,

    /// Store endpoint selection.
    #[serde(default = "default_region")]
    pub region: String,

    /// Delete via `DeletedAt` tags instead of object removal.
    #[serde(default)]
    pub soft_deletes: bool,
}

impl Config {
    /// Builds a configuration for the given bucket and region.
    pub fn new(bucket: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            region: region.into(),
            soft_deletes: false,
        }
    }

    /// Enables or disables soft-delete mode.
    #[must_use]
    pub fn with_soft_deletes(mut self, enabled: bool) -> Self {
        self.soft_deletes = enabled;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("", default_region())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_with_defaults() {
        let config: Config = serde_json::from_str(r#"{"bucket":"records"}"#).unwrap();
        assert_eq!(config.bucket, "records");
        assert_eq!(config.region, "us-east-1");
        assert!(!config.soft_deletes);
    }

    #[test]
    fn builder_sets_soft_deletes() {
        let config = Config::new("records", "eu-west-1").with_soft_deletes(true);
        assert!(config.soft_deletes);
        assert_eq!(config.region, "eu-west-1");
    }
}
