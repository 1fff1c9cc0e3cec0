//! Wallet configuration: JSON file, environment overrides, defaults.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use balance::SearchConfig;
use prover::{ArtifactSource, FsArtifacts, HttpArtifacts, SnarkjsCli};
use serde::{Deserialize, Serialize};

pub const ENV_PREFIX: &str = "CONFBAL_";

/// Where circuit artifacts live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactLocation {
    Dir(PathBuf),
    Url(String),
}

impl Default for ArtifactLocation {
    fn default() -> Self { ArtifactLocation::Dir(PathBuf::from("circuits")) }
}

impl ArtifactLocation {
    pub fn source(&self) -> Arc<dyn ArtifactSource> {
        match self {
            ArtifactLocation::Dir(dir) => Arc::new(FsArtifacts::new(dir.clone())),
            ArtifactLocation::Url(url) => Arc::new(HttpArtifacts::new(url.clone())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    pub chain_id: u64,
    pub token_id: u64,
    /// Upper bound of the discrete-log search.
    pub max_balance: u64,
    pub cache_capacity: usize,
    pub artifacts: ArtifactLocation,
    pub snarkjs_bin: PathBuf,
    pub log_json: bool,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            chain_id: 1,
            token_id: 0,
            max_balance: 100_000,
            cache_capacity: 1_000,
            artifacts: ArtifactLocation::default(),
            snarkjs_bin: PathBuf::from("snarkjs"),
            log_json: false,
        }
    }
}

impl WalletConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parse config {}", path.display()))
    }

    /// Defaults overridden by `CONFBAL_*` environment variables.
    pub fn from_env() -> Result<Self> { Self::default().with_overrides(|key| std::env::var(key).ok()) }

    /// Apply overrides from `lookup`, which maps a full variable name to its value.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));
        if let Some(v) = var("CHAIN_ID") {
            self.chain_id = v.parse().with_context(|| format!("{ENV_PREFIX}CHAIN_ID={v}"))?;
        }
        if let Some(v) = var("TOKEN_ID") {
            self.token_id = v.parse().with_context(|| format!("{ENV_PREFIX}TOKEN_ID={v}"))?;
        }
        if let Some(v) = var("MAX_BALANCE") {
            self.max_balance = v.parse().with_context(|| format!("{ENV_PREFIX}MAX_BALANCE={v}"))?;
        }
        if let Some(v) = var("CACHE_CAPACITY") {
            self.cache_capacity = v.parse().with_context(|| format!("{ENV_PREFIX}CACHE_CAPACITY={v}"))?;
        }
        if let Some(v) = var("ARTIFACTS_DIR") {
            self.artifacts = ArtifactLocation::Dir(PathBuf::from(v));
        }
        // URL wins when both are set
        if let Some(v) = var("ARTIFACTS_URL") {
            self.artifacts = ArtifactLocation::Url(v);
        }
        if let Some(v) = var("SNARKJS") {
            self.snarkjs_bin = PathBuf::from(v);
        }
        if let Some(v) = var("LOG_JSON") {
            self.log_json = matches!(v.as_str(), "1" | "true" | "yes");
        }
        Ok(self)
    }

    pub fn search_config(&self) -> SearchConfig {
        SearchConfig { max_value: self.max_balance, cache_capacity: self.cache_capacity, ..SearchConfig::default() }
    }

    pub fn snarkjs(&self) -> SnarkjsCli { SnarkjsCli::new(self.snarkjs_bin.clone()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallet.json");
        std::fs::write(&path, r#"{"chain_id": 43114, "artifacts": {"url": "https://cdn.example/zk"}}"#).unwrap();
        let cfg = WalletConfig::from_file(&path).unwrap();
        assert_eq!(cfg.chain_id, 43114);
        assert_eq!(cfg.artifacts, ArtifactLocation::Url("https://cdn.example/zk".into()));
        assert_eq!(cfg.max_balance, 100_000);
        assert_eq!(cfg.cache_capacity, 1_000);
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = [
            ("CONFBAL_MAX_BALANCE", "5000"),
            ("CONFBAL_ARTIFACTS_DIR", "/opt/circuits"),
            ("CONFBAL_LOG_JSON", "true"),
        ]
        .into_iter()
        .collect();
        let cfg = WalletConfig::default().with_overrides(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(cfg.max_balance, 5000);
        assert_eq!(cfg.artifacts, ArtifactLocation::Dir("/opt/circuits".into()));
        assert!(cfg.log_json);
        assert_eq!(cfg.search_config().max_value, 5000);
        assert_eq!(cfg.search_config().small_range, SearchConfig::default().small_range);
    }

    #[test]
    fn bad_numbers_are_reported() {
        let err = WalletConfig::default()
            .with_overrides(|k| (k == "CONFBAL_CHAIN_ID").then(|| "mainnet".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("CONFBAL_CHAIN_ID"));
    }
}
