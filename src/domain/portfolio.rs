//! Portfolio model - farms and vaults as returned by yieldwatch.
//!
//! The upstream payload is loosely typed: every platform decides which
//! fields it fills in. Farms are kept as raw JSON until the eligibility
//! filter has run, then each vault is decoded on its own so that one
//! malformed record never takes the rest of the cycle down with it.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// The `result` object of a successful response: farm name → farm JSON.
///
/// A `BTreeMap` keeps iteration order stable, so identical responses
/// always translate to identically ordered samples.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortfolioResult {
    farms: BTreeMap<String, Value>,
}

impl PortfolioResult {
    /// Wrap an already-decoded farm map.
    pub fn new(farms: BTreeMap<String, Value>) -> Self {
        Self { farms }
    }

    /// Build from the JSON `result` object. Returns `None` if it is not an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self::new(map.into_iter().collect())),
            _ => None,
        }
    }

    /// Number of farms in the response, eligible or not.
    pub fn farm_count(&self) -> usize {
        self.farms.len()
    }

    /// Farms that carry vault data, in name order.
    ///
    /// A farm qualifies only when `vaults` is present and non-null and
    /// `vaults.vaults` is present and non-null. Staking-only platforms
    /// fail this check and are skipped without complaint.
    pub fn vault_farms(&self) -> impl Iterator<Item = VaultFarm<'_>> {
        self.farms.iter().filter_map(|(name, farm)| {
            let vaults = non_null(farm.get("vaults")?)?;
            let list = non_null(vaults.get("vaults")?)?;
            Some(VaultFarm {
                name: name.as_str(),
                vaults: list,
            })
        })
    }
}

fn non_null(value: &Value) -> Option<&Value> {
    if value.is_null() { None } else { Some(value) }
}

/// A farm that passed the eligibility filter.
#[derive(Debug, Clone, Copy)]
pub struct VaultFarm<'a> {
    /// Farm (platform) name, e.g. `beefy`.
    pub name: &'a str,
    /// The raw `vaults.vaults` value. Expected to be an array.
    pub vaults: &'a Value,
}

impl<'a> VaultFarm<'a> {
    /// The raw vault entries, or `None` if `vaults.vaults` is not an array.
    pub fn entries(&self) -> Option<&'a [Value]> {
        self.vaults.as_array().map(Vec::as_slice)
    }
}

/// One decoded vault position.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultRecord {
    /// Display name of the vault.
    pub name: String,
    /// Symbol of the token deposited into the vault.
    pub deposit_token: String,
    /// Symbol of the token paid out as reward.
    pub reward_token: String,
    /// Current token balance, compounding included.
    pub current_tokens: f64,
    /// Tokens originally deposited.
    pub deposited_tokens: f64,
    /// Rewards accrued but not yet harvested.
    pub pending_rewards: f64,
    /// Rewards already harvested. Not every platform reports this.
    #[serde(default)]
    pub harvested_rewards: Option<f64>,
    #[serde(rename = "priceInUSDDepositToken")]
    pub price_in_usd_deposit_token: f64,
    #[serde(rename = "priceInUSDRewardToken")]
    pub price_in_usd_reward_token: f64,
    /// Annual percentage yield as reported upstream.
    pub apy: f64,
}

impl VaultRecord {
    /// Decode a single vault entry belonging to `farm`.
    pub fn decode(farm: &str, index: usize, raw: &Value) -> Result<Self, MalformedVaultError> {
        Self::deserialize(raw).map_err(|e| MalformedVaultError {
            farm: farm.to_string(),
            index,
            vault: raw.get("name").and_then(Value::as_str).map(str::to_string),
            reason: e.to_string(),
        })
    }
}

/// A vault record that is missing a required field or has one of the wrong type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed vault #{index} ({}) in farm {farm}: {reason}", .vault.as_deref().unwrap_or("<unnamed>"))]
pub struct MalformedVaultError {
    /// Farm the vault belongs to.
    pub farm: String,
    /// Position of the vault inside `vaults.vaults`.
    pub index: usize,
    /// Vault name, when it could still be read.
    pub vault: Option<String>,
    /// Decoder message, usually naming the offending field.
    pub reason: String,
}
