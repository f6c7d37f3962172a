//! Bridge config loader (strict parsing).

pub mod schema;

use std::fs;

use meshbridge_core::error::{MeshBridgeError, Result};

pub use schema::{BridgeConfig, BrokerSection, DedupKeyMode, NamespaceConfig, RelaySection};

pub fn load_from_file(path: &str) -> Result<BridgeConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| MeshBridgeError::BadConfig(format!("read config {path} failed: {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<BridgeConfig> {
    let cfg: BridgeConfig = serde_yaml::from_str(s)
        .map_err(|e| MeshBridgeError::BadConfig(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
