//! Deployment settings: an optional config file layered under `ETHBTC_*`
//! environment variables

use ethbtc_core::DeployConfig;

/// Load `DeployConfig` from `path` (extension optional, file may be absent)
/// and the environment. Nested keys use `__`, e.g. `ETHBTC_ORACLE__ROUNDING`.
pub fn load_config(path: &str) -> Result<DeployConfig, config::ConfigError> {
    config::Config::builder()
        .add_source(config::File::with_name(path).required(false))
        .add_source(
            config::Environment::with_prefix("ETHBTC")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethbtc_core::{FeedFailurePolicy, RoundingMode};
    use std::fs;

    #[test]
    fn test_file_then_env_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ethbtc.toml");
        fs::write(
            &path,
            r#"
network = "mainnet"
artifacts_dir = "deployments"

[oracle]
failure_policy = "abort"
rounding = "ceil"
"#,
        )
        .unwrap();

        std::env::set_var("ETHBTC_ORACLE__FAILURE_POLICY", "skip");
        let loaded = load_config(path.to_str().unwrap());
        std::env::remove_var("ETHBTC_ORACLE__FAILURE_POLICY");

        let config = loaded.unwrap();
        assert_eq!(config.network, "mainnet");
        assert_eq!(config.oracle.failure_policy, FeedFailurePolicy::Skip);
        assert_eq!(config.oracle.rounding, RoundingMode::Ceil);
        assert_eq!(
            config.artifacts_dir.as_deref(),
            Some(std::path::Path::new("deployments"))
        );
        assert_eq!(config.rpc_timeout_secs, 10);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(dir.path().join("absent").to_str().unwrap()).unwrap();
        assert_eq!(config.address_book_path, std::path::Path::new("deployedAddresses.json"));
        assert!(config.artifacts_dir.is_none());
    }
}
