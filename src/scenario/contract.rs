//! Versioned selector contracts
//!
//! A contract names every static selector a scenario relies on. Scenarios
//! look their selectors up here instead of hardcoding them, contracts can be
//! overridden from TOML files, and the static part is checked against the
//! live page before the first interaction.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::browser::{PageDriver, Selector};
use crate::core::{Result, VerifyError};

/// Version of the contract schema understood by this build
pub const CONTRACT_VERSION: u32 = 1;

/// One named selector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractEntry {
    pub selector: Selector,
    /// Only appears after interaction; excluded from the load-time check
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dynamic: bool,
}

/// Selectors a scenario depends on, keyed by role in the scenario
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectorContract {
    pub scenario: String,
    pub version: u32,
    #[serde(default)]
    pub selectors: BTreeMap<String, ContractEntry>,
}

/// A static selector that matched nothing on the live page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractMiss {
    pub key: String,
    pub selector: Selector,
}

impl fmt::Display for ContractMiss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.key, self.selector)
    }
}

impl SelectorContract {
    /// Empty contract at the current version
    pub fn new(scenario: impl Into<String>) -> Self {
        Self {
            scenario: scenario.into(),
            version: CONTRACT_VERSION,
            selectors: BTreeMap::new(),
        }
    }

    /// Add a selector present from page load
    pub fn with(mut self, key: &str, selector: Selector) -> Self {
        self.selectors.insert(
            key.to_string(),
            ContractEntry {
                selector,
                dynamic: false,
            },
        );
        self
    }

    /// Add a selector that only appears after interaction
    pub fn with_dynamic(mut self, key: &str, selector: Selector) -> Self {
        self.selectors.insert(
            key.to_string(),
            ContractEntry {
                selector,
                dynamic: true,
            },
        );
        self
    }

    /// Look up a selector by key
    pub fn get(&self, key: &str) -> Result<Selector> {
        self.selectors
            .get(key)
            .map(|entry| entry.selector.clone())
            .ok_or_else(|| {
                VerifyError::contract(format!(
                    "'{}' contract has no selector named '{}'",
                    self.scenario, key
                ))
            })
    }

    /// Entries checked at load time
    pub fn static_entries(&self) -> impl Iterator<Item = (&String, &ContractEntry)> {
        self.selectors.iter().filter(|(_, entry)| !entry.dynamic)
    }

    /// Parse a contract, rejecting other schema versions
    pub fn from_toml(content: &str) -> Result<Self> {
        let contract: SelectorContract = toml::from_str(content)
            .map_err(|e| VerifyError::contract(format!("Failed to parse contract: {}", e)))?;
        if contract.version != CONTRACT_VERSION {
            return Err(VerifyError::contract(format!(
                "'{}' contract is version {}, expected {}",
                contract.scenario, contract.version, CONTRACT_VERSION
            )));
        }
        Ok(contract)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| VerifyError::contract(format!("Failed to serialize contract: {}", e)))
    }

    /// Apply `<dir>/<scenario>.toml` on top of this contract, if it exists
    pub fn with_overrides_from(self, dir: &Path) -> Result<Self> {
        let path = dir.join(format!("{}.toml", self.scenario));
        if !path.exists() {
            return Ok(self);
        }

        let content = fs::read_to_string(&path)?;
        let overrides = Self::from_toml(&content)?;
        if overrides.scenario != self.scenario {
            return Err(VerifyError::contract(format!(
                "{} declares scenario '{}', expected '{}'",
                path.display(),
                overrides.scenario,
                self.scenario
            )));
        }

        debug!(path = %path.display(), keys = overrides.selectors.len(), "contract overrides");
        Ok(self.overlay(overrides))
    }

    /// Entries of `other` replace entries with the same key
    pub fn overlay(mut self, other: SelectorContract) -> Self {
        self.selectors.extend(other.selectors);
        self
    }

    /// Count every static selector on the live page; returns the misses
    pub async fn verify<D>(&self, driver: &D) -> Result<Vec<ContractMiss>>
    where
        D: PageDriver + ?Sized,
    {
        let mut misses = Vec::new();
        for (key, entry) in self.static_entries() {
            let state = driver.query(&entry.selector).await?;
            if state.count == 0 {
                misses.push(ContractMiss {
                    key: key.clone(),
                    selector: entry.selector.clone(),
                });
            }
        }
        Ok(misses)
    }
}
