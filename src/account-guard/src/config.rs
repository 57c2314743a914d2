use std::{fs, path::Path};

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Guard bootstrap: the administrator and the targets to allowlist per mode.
///
/// ```json
/// { "admin": "0x…", "whitelist": ["0x…"], "whitelistSend": ["0x…"] }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuardConfig {
    pub admin: Address,
    #[serde(default)]
    pub whitelist: Vec<Address>,
    #[serde(default)]
    pub whitelist_send: Vec<Address>,
}

impl GuardConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}
