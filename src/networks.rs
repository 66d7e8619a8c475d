//! Network characteristics registry.
//!
//! Each market network publishes in its own local time zone and at its own
//! native sample rate. The registry is plain data passed by reference into
//! the query builders; nothing here is process-global, so tests can run
//! against synthetic networks.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::error::QueryError;

/// Per-network facts the generator needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkCharacteristics {
    /// Canonical uppercase network code ("NEM", "WEM").
    pub code: String,
    /// Local market time zone. `None` means the network publishes without
    /// one; the query builder normalizes that to UTC.
    pub timezone: Option<Tz>,
    /// Native samples per reported unit. NEM dispatches on 5-minute
    /// intervals, so hourly-equivalent energy divides its sums by 12.
    pub sample_scale: i64,
}

impl NetworkCharacteristics {
    /// A scale below 1 is meaningless as a divisor and is clamped.
    pub fn new(code: &str, timezone: Option<Tz>, sample_scale: i64) -> Self {
        Self {
            code: code.trim().to_uppercase(),
            timezone,
            sample_scale: sample_scale.max(1),
        }
    }
}

/// Registry of known networks, keyed by canonical code.
#[derive(Debug, Clone, Default)]
pub struct NetworkRegistry {
    networks: HashMap<String, NetworkCharacteristics>,
}

impl NetworkRegistry {
    /// Empty registry; callers register their own networks.
    pub fn new() -> Self {
        Self::default()
    }

    /// The two production networks: NEM (eastern states, 5-minute
    /// dispatch, market time fixed to +10:00) and WEM (Western Australia).
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(NetworkCharacteristics::new(
            "NEM",
            Some(chrono_tz::Australia::Brisbane),
            12,
        ));
        registry.register(NetworkCharacteristics::new(
            "WEM",
            Some(chrono_tz::Australia::Perth),
            1,
        ));
        registry
    }

    /// Inserts or replaces a network, canonicalizing its code.
    pub fn register(&mut self, characteristics: NetworkCharacteristics) {
        let mut entry = characteristics;
        entry.code = entry.code.trim().to_uppercase();
        self.networks.insert(entry.code.clone(), entry);
    }

    /// Case-insensitive lookup. There is no default network: an
    /// unregistered code is the caller's error.
    pub fn lookup(&self, code: &str) -> Result<&NetworkCharacteristics, QueryError> {
        self.networks
            .get(&code.trim().to_uppercase())
            .ok_or_else(|| QueryError::UnknownNetwork(code.to_string()))
    }

    /// Registered codes, sorted for stable diagnostics output.
    pub fn codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.networks.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }

    /// Extends the registry from a JSON file of network definitions.
    /// Definitions for already-registered codes replace the existing entry.
    pub fn load_overrides(&mut self, path: &Path) -> Result<usize> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read network definitions from {}", path.display()))?;
        let definitions: Vec<NetworkDefinition> = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse network definitions in {}", path.display()))?;
        let count = definitions.len();
        for definition in definitions {
            self.register(definition.into_characteristics());
        }
        tracing::info!(
            path = %path.display(),
            networks = count,
            "loaded network definitions"
        );
        Ok(count)
    }
}

#[derive(Debug, Deserialize)]
struct NetworkDefinition {
    code: String,
    #[serde(default)]
    timezone: Option<Tz>,
    #[serde(default)]
    sample_scale: Option<i64>,
}

impl NetworkDefinition {
    fn into_characteristics(self) -> NetworkCharacteristics {
        let scale = self.sample_scale.filter(|v| *v > 0).unwrap_or(1);
        NetworkCharacteristics::new(&self.code, self.timezone, scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_networks_resolve_case_insensitively() {
        let registry = NetworkRegistry::builtin();
        let nem = registry.lookup("nem").unwrap();
        assert_eq!(nem.code, "NEM");
        assert_eq!(nem.timezone, Some(chrono_tz::Australia::Brisbane));
        assert_eq!(nem.sample_scale, 12);

        let wem = registry.lookup(" WEM ").unwrap();
        assert_eq!(wem.timezone, Some(chrono_tz::Australia::Perth));
        assert_eq!(wem.sample_scale, 1);
    }

    #[test]
    fn unknown_codes_fail_without_fallback() {
        let registry = NetworkRegistry::builtin();
        assert_eq!(
            registry.lookup("XEM"),
            Err(QueryError::UnknownNetwork("XEM".to_string()))
        );
        assert!(NetworkRegistry::new().lookup("NEM").is_err());
    }

    #[test]
    fn register_canonicalizes_codes_and_clamps_scale() {
        let mut registry = NetworkRegistry::new();
        registry.register(NetworkCharacteristics::new(" apvi ", None, 0));
        let apvi = registry.lookup("APVI").unwrap();
        assert_eq!(apvi.code, "APVI");
        assert_eq!(apvi.timezone, None);
        assert_eq!(apvi.sample_scale, 1);
    }

    #[test]
    fn codes_listing_is_sorted() {
        let registry = NetworkRegistry::builtin();
        assert_eq!(registry.codes(), vec!["NEM", "WEM"]);
    }

    #[test]
    fn overrides_extend_and_replace() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("networks.json");
        std::fs::write(
            &path,
            r#"[
                {"code": "apvi", "timezone": "Australia/Perth", "sample_scale": 4},
                {"code": "WEM", "sample_scale": 2},
                {"code": "BARE"}
            ]"#,
        )
        .unwrap();

        let mut registry = NetworkRegistry::builtin();
        let loaded = registry.load_overrides(&path).unwrap();
        assert_eq!(loaded, 3);

        let apvi = registry.lookup("APVI").unwrap();
        assert_eq!(apvi.timezone, Some(chrono_tz::Australia::Perth));
        assert_eq!(apvi.sample_scale, 4);

        // WEM replaced wholesale: no timezone in the definition, none kept.
        let wem = registry.lookup("WEM").unwrap();
        assert_eq!(wem.timezone, None);
        assert_eq!(wem.sample_scale, 2);

        let bare = registry.lookup("BARE").unwrap();
        assert_eq!(bare.timezone, None);
        assert_eq!(bare.sample_scale, 1);
    }

    #[test]
    fn override_errors_name_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        let err = NetworkRegistry::new().load_overrides(&missing).unwrap_err();
        assert!(err.to_string().contains("absent.json"));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{not json").unwrap();
        let err = NetworkRegistry::new().load_overrides(&bad).unwrap_err();
        assert!(err.to_string().contains("bad.json"));
    }
}
