//! Engine configuration: resolver depth, provisioning defaults, cache TTL.

use serde::Deserialize;

use super::error::ValidationError;

/// Configuration for the relationship and upsert engines.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Descendant expansion depth for the family tree view (minimum 2)
    #[serde(default = "default_tree_depth")]
    pub tree_depth: u32,

    /// Initial password for provisioned accounts
    #[serde(default = "default_password")]
    pub default_password: String,

    /// TTL for the dashboard statistics cache, in seconds
    #[serde(default = "default_stats_cache_ttl")]
    pub stats_cache_ttl_secs: u64,
}

impl EngineConfig {
    /// Validate engine configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.tree_depth < 2 {
            return Err(ValidationError::TreeDepthTooSmall);
        }
        if self.default_password.is_empty() {
            return Err(ValidationError::EmptyDefaultPassword);
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tree_depth: default_tree_depth(),
            default_password: default_password(),
            stats_cache_ttl_secs: default_stats_cache_ttl(),
        }
    }
}

fn default_tree_depth() -> u32 {
    2
}

fn default_password() -> String {
    "123456".to_string()
}

fn default_stats_cache_ttl() -> u64 {
    300
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn shallow_tree_depth_is_rejected() {
        let config = EngineConfig {
            tree_depth: 1,
            ..EngineConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
