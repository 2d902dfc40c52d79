//! Property-Based Tests — Translation Invariants
//!
//! Uses `proptest` to check that translation keeps its guarantees
//! across randomly generated portfolios.

use proptest::prelude::*;
use serde_json::{json, Value};

use yieldwatch_exporter::domain::{translate, LabelSchema, PortfolioResult, VaultMetric};

fn vault_json(name: &str, current: f64, deposited: f64, pending: f64, price: f64, reward_price: f64) -> Value {
    json!({
        "name": name,
        "depositToken": "TKN",
        "rewardToken": "RWD",
        "currentTokens": current,
        "depositedTokens": deposited,
        "pendingRewards": pending,
        "priceInUSDDepositToken": price,
        "priceInUSDRewardToken": reward_price,
        "apy": 12.0
    })
}

// ── USD derivation ──────────────────────────────────────────

proptest! {
    /// USD gauges are exactly base quantity × unit price.
    #[test]
    fn usd_values_are_products(
        current in 0.0f64..1e9,
        deposited in 0.0f64..1e9,
        pending in 0.0f64..1e6,
        price in 0.0f64..1e5,
        reward_price in 0.0f64..1e5,
    ) {
        let portfolio = PortfolioResult::from_value(json!({
            "beefy": {"vaults": {"vaults": [vault_json("V", current, deposited, pending, price, reward_price)]}}
        })).unwrap();

        let t = translate(&portfolio, "0xABC", LabelSchema::basic());
        let value = |m: VaultMetric| t.samples.iter().find(|s| s.metric == m).map(|s| s.value);

        prop_assert_eq!(value(VaultMetric::BalanceUsd), Some(current * price));
        prop_assert_eq!(value(VaultMetric::DepositUsd), Some(deposited * price));
        prop_assert_eq!(value(VaultMetric::PendingRewardUsd), Some(pending * reward_price));
    }
}

// ── Vault counting and filtering ────────────────────────────

proptest! {
    /// N eligible farms holding M vaults yield M sample sets; ineligible farms add nothing.
    #[test]
    fn one_sample_set_per_vault(
        farm_sizes in prop::collection::vec(0usize..5, 0..6),
        staking_only in 0usize..4,
    ) {
        let mut farms = serde_json::Map::new();
        for (f, size) in farm_sizes.iter().enumerate() {
            let vaults: Vec<Value> = (0..*size)
                .map(|v| vault_json(&format!("vault-{f}-{v}"), 1.0, 1.0, 0.1, 2.0, 3.0))
                .collect();
            farms.insert(format!("farm{f}"), json!({"vaults": {"vaults": vaults}}));
        }
        for s in 0..staking_only {
            farms.insert(format!("staking{s}"), json!({"staking": {"vaults": []}}));
        }

        let portfolio = PortfolioResult::from_value(Value::Object(farms)).unwrap();
        let t = translate(&portfolio, "0xABC", LabelSchema::basic());
        let total: usize = farm_sizes.iter().sum();

        prop_assert_eq!(t.vaults, total);
        let balances = t.samples.iter().filter(|s| s.metric == VaultMetric::Balance).count();
        prop_assert_eq!(balances, total);
        prop_assert!(t.skipped.is_empty());
    }

    /// Translation has no hidden state: same input, same output.
    #[test]
    fn translate_is_deterministic(
        current in 0.0f64..1e6,
        farm_label in any::<bool>(),
    ) {
        let portfolio = PortfolioResult::from_value(json!({
            "pancake": {"vaults": {"vaults": [vault_json("A", current, 1.0, 1.0, 1.0, 1.0)]}},
            "auto": {"vaults": {"vaults": [vault_json("B", current, 2.0, 2.0, 2.0, 2.0)]}}
        })).unwrap();
        let schema = LabelSchema { include_farm_label: farm_label };

        prop_assert_eq!(
            translate(&portfolio, "0xABC", schema),
            translate(&portfolio, "0xABC", schema)
        );
    }
}
