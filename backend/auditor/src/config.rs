//! Application configuration loaded from environment variables.

use crate::errors::{AuditorError, Result};

#[derive(Debug, Clone)]
pub struct Config {
    /// Soroban RPC endpoint (e.g. https://soroban-testnet.stellar.org)
    pub rpc_url: String,
    /// The escrow contract address (Strkey format)
    pub contract_id: String,
    /// Path to the SQLite database file
    pub database_url: String,
    /// Port for the REST API server
    pub api_port: u16,
    /// How often (in seconds) to poll the RPC for new events
    pub poll_interval_secs: u64,
    /// Maximum number of events to fetch per RPC request
    pub events_per_page: u32,
    /// Ledger to start from if no cursor is saved
    pub start_ledger: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup. Missing optional keys fall
    /// back to their defaults; `CONTRACT_ID` is required.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            rpc_url: var("RPC_URL", "https://soroban-testnet.stellar.org"),
            contract_id: lookup("CONTRACT_ID")
                .filter(|id| !id.trim().is_empty())
                .ok_or_else(|| {
                    AuditorError::Config("CONTRACT_ID environment variable is required".to_string())
                })?,
            database_url: var("DATABASE_URL", "sqlite:./momentum_audit.db"),
            api_port: parse("API_PORT", &var("API_PORT", "3001"))?,
            poll_interval_secs: parse("POLL_INTERVAL_SECS", &var("POLL_INTERVAL_SECS", "5"))?,
            events_per_page: parse("EVENTS_PER_PAGE", &var("EVENTS_PER_PAGE", "100"))?,
            start_ledger: parse("START_LEDGER", &var("START_LEDGER", "0"))?,
        })
    }
}

fn parse<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| AuditorError::Config(format!("Invalid {key}: {raw:?}")))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_applied() {
        let config = Config::from_lookup(lookup(&[("CONTRACT_ID", "CESCROW")])).unwrap();
        assert_eq!(config.contract_id, "CESCROW");
        assert_eq!(config.rpc_url, "https://soroban-testnet.stellar.org");
        assert_eq!(config.database_url, "sqlite:./momentum_audit.db");
        assert_eq!(config.api_port, 3001);
        assert_eq!(config.poll_interval_secs, 5);
        assert_eq!(config.events_per_page, 100);
        assert_eq!(config.start_ledger, 0);
    }

    #[test]
    fn overrides_parsed() {
        let config = Config::from_lookup(lookup(&[
            ("CONTRACT_ID", "CESCROW"),
            ("API_PORT", "8080"),
            ("POLL_INTERVAL_SECS", "30"),
            ("START_LEDGER", "123456"),
        ]))
        .unwrap();
        assert_eq!(config.api_port, 8080);
        assert_eq!(config.poll_interval_secs, 30);
        assert_eq!(config.start_ledger, 123_456);
    }

    #[test]
    fn missing_contract_id_rejected() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, AuditorError::Config(_)));
    }

    #[test]
    fn invalid_port_rejected() {
        let err = Config::from_lookup(lookup(&[("CONTRACT_ID", "C"), ("API_PORT", "http")]))
            .unwrap_err();
        assert!(err.to_string().contains("API_PORT"));
    }
}
