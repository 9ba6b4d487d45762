// src/settings.rs
//! Runtime settings.
//!
//! Values come from `ACCESS_KEY_*` environment variables (optionally loaded
//! from a `.env` file by the binary) layered over built-in defaults.
//!
//! | Variable | Default |
//! |---|---|
//! | `ACCESS_KEY_STORAGE_DIR` | `.near-access-key` |
//! | `ACCESS_KEY_MAINNET_RPC_URL` | `https://rpc.mainnet.near.org` |
//! | `ACCESS_KEY_TESTNET_RPC_URL` | `https://rpc.testnet.near.org` |
//! | `ACCESS_KEY_WALLET_URL` | `http://127.0.0.1:3030` |
//! | `ACCESS_KEY_WALLET_ID` | `http-bridge` |
//! | `ACCESS_KEY_LISTEN_ADDR` | `127.0.0.1:3000` |

use crate::blockchain::near_client::{RpcEndpoints, MAINNET_RPC_URL, TESTNET_RPC_URL};
use crate::error::Result;
use config::{Config, Environment};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

const ENV_PREFIX: &str = "ACCESS_KEY";

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Settings {
    /// Directory holding the persisted access key
    pub storage_dir: PathBuf,
    pub mainnet_rpc_url: String,
    pub testnet_rpc_url: String,
    /// Base URL of the interactive wallet bridge
    pub wallet_url: String,
    pub wallet_id: String,
    pub listen_addr: SocketAddr,
}

impl Settings {
    /// Loads settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::load(Environment::with_prefix(ENV_PREFIX))
    }

    /// Loads settings from the given environment source over the defaults.
    pub fn load(environment: Environment) -> Result<Self> {
        let settings = Config::builder()
            .set_default("storage_dir", ".near-access-key")?
            .set_default("mainnet_rpc_url", MAINNET_RPC_URL)?
            .set_default("testnet_rpc_url", TESTNET_RPC_URL)?
            .set_default("wallet_url", "http://127.0.0.1:3030")?
            .set_default("wallet_id", "http-bridge")?
            .set_default("listen_addr", "127.0.0.1:3000")?
            .add_source(environment)
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Endpoint table handed to the delegated signer.
    ///
    /// # Returns
    /// [`RpcEndpoints`] holding the configured mainnet and testnet URLs
    pub fn rpc_endpoints(&self) -> RpcEndpoints {
        RpcEndpoints {
            mainnet: self.mainnet_rpc_url.clone(),
            testnet: self.testnet_rpc_url.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(map))
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::load(env(&[])).unwrap();
        assert_eq!(settings.storage_dir, PathBuf::from(".near-access-key"));
        assert_eq!(settings.rpc_endpoints(), RpcEndpoints::default());
        assert_eq!(settings.wallet_id, "http-bridge");
        assert_eq!(settings.listen_addr.port(), 3000);
    }

    #[test]
    fn test_environment_overrides() {
        let settings = Settings::load(env(&[
            ("ACCESS_KEY_TESTNET_RPC_URL", "http://localhost:3030"),
            ("ACCESS_KEY_STORAGE_DIR", "/tmp/keys"),
            ("ACCESS_KEY_LISTEN_ADDR", "0.0.0.0:8080"),
        ]))
        .unwrap();

        assert_eq!(settings.testnet_rpc_url, "http://localhost:3030");
        assert_eq!(settings.mainnet_rpc_url, MAINNET_RPC_URL);
        assert_eq!(settings.storage_dir, PathBuf::from("/tmp/keys"));
        assert_eq!(settings.listen_addr.port(), 8080);
    }

    #[test]
    fn test_invalid_listen_addr_is_a_config_error() {
        let result = Settings::load(env(&[("ACCESS_KEY_LISTEN_ADDR", "not an address")]));
        assert!(matches!(result, Err(crate::error::Error::Config(_))));
    }
}
