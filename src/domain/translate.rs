//! Vault → metric sample translation.
//!
//! Flattens the farm/vault tree into labeled gauge samples. Pure: no
//! registry access, no I/O, no state kept between calls. Publishing the
//! result is the metrics adapter's job.

use super::portfolio::{MalformedVaultError, PortfolioResult, VaultRecord};

/// Label layout applied to every vault metric.
///
/// The basic schema labels per-vault series with vault, token and wallet.
/// Enabling the farm label appends `farm` to every series, which keeps
/// same-named vaults on different platforms apart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LabelSchema {
    /// Append the farm (platform) name as an extra label.
    pub include_farm_label: bool,
}

impl LabelSchema {
    /// Schema without the farm label.
    pub const fn basic() -> Self {
        Self {
            include_farm_label: false,
        }
    }

    /// Schema with the farm label.
    pub const fn with_farm() -> Self {
        Self {
            include_farm_label: true,
        }
    }

    /// Label names for `metric`, in the order sample values are emitted.
    pub const fn label_names(self, metric: VaultMetric) -> &'static [&'static str] {
        match (metric.kind(), self.include_farm_label) {
            (LabelKind::Position, false) => &["vault", "token", "wallet"],
            (LabelKind::Position, true) => &["vault", "token", "wallet", "farm"],
            (LabelKind::Yield, false) => &["vault", "wallet"],
            (LabelKind::Yield, true) => &["vault", "wallet", "farm"],
            (LabelKind::Price, false) => &["token"],
            (LabelKind::Price, true) => &["token", "vault", "farm"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LabelKind {
    Position,
    Yield,
    Price,
}

/// Every gauge the exporter publishes per vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VaultMetric {
    Balance,
    BalanceUsd,
    Deposit,
    DepositUsd,
    PendingReward,
    PendingRewardUsd,
    HarvestedReward,
    HarvestedRewardUsd,
    Apy,
    RewardTokenPrice,
    DepositTokenPrice,
}

impl VaultMetric {
    /// Number of vault metrics.
    pub const COUNT: usize = 11;

    /// Every variant, in declaration order (`metric as usize` indexes this).
    pub const ALL: [Self; Self::COUNT] = [
        Self::Balance,
        Self::BalanceUsd,
        Self::Deposit,
        Self::DepositUsd,
        Self::PendingReward,
        Self::PendingRewardUsd,
        Self::HarvestedReward,
        Self::HarvestedRewardUsd,
        Self::Apy,
        Self::RewardTokenPrice,
        Self::DepositTokenPrice,
    ];

    /// Exposition name of the gauge.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Balance => "balance",
            Self::BalanceUsd => "balance_usd",
            Self::Deposit => "deposit",
            Self::DepositUsd => "deposit_usd",
            Self::PendingReward => "pending_reward",
            Self::PendingRewardUsd => "pending_reward_usd",
            Self::HarvestedReward => "harvested_reward",
            Self::HarvestedRewardUsd => "harvested_reward_usd",
            Self::Apy => "apy",
            Self::RewardTokenPrice => "reward_token_price",
            Self::DepositTokenPrice => "deposit_token_price",
        }
    }

    /// HELP text of the gauge.
    pub const fn help(self) -> &'static str {
        match self {
            Self::Balance => "Current balance (tokens)",
            Self::BalanceUsd => "Current balance in USD",
            Self::Deposit => "Current deposit (tokens)",
            Self::DepositUsd => "Current deposit in USD",
            Self::PendingReward => "Pending reward (tokens)",
            Self::PendingRewardUsd => "Pending reward in USD",
            Self::HarvestedReward => "Harvested reward (tokens)",
            Self::HarvestedRewardUsd => "Harvested reward in USD",
            Self::Apy => "Annual percentage yield",
            Self::RewardTokenPrice => "Reward token price in USD",
            Self::DepositTokenPrice => "Deposit token price in USD",
        }
    }

    const fn kind(self) -> LabelKind {
        match self {
            Self::Apy => LabelKind::Yield,
            Self::RewardTokenPrice | Self::DepositTokenPrice => LabelKind::Price,
            _ => LabelKind::Position,
        }
    }
}

/// One labeled value destined for a gauge.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    pub metric: VaultMetric,
    /// `(label name, label value)` pairs in [`LabelSchema::label_names`] order.
    pub labels: Vec<(&'static str, String)>,
    pub value: f64,
}

impl MetricSample {
    /// Value of a label by name.
    pub fn label(&self, name: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Label values only, ready for `GaugeVec::get_metric_with_label_values`.
    pub fn label_values(&self) -> Vec<&str> {
        self.labels.iter().map(|(_, v)| v.as_str()).collect()
    }
}

/// Output of one translation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Translation {
    /// Samples for every well-formed vault.
    pub samples: Vec<MetricSample>,
    /// Vaults that were skipped because they could not be decoded.
    pub skipped: Vec<MalformedVaultError>,
    /// Number of vaults that produced samples.
    pub vaults: usize,
    /// Eligible farms whose `vaults.vaults` was not a list.
    pub invalid_farms: Vec<String>,
}

/// Translate a fetched portfolio into gauge samples for `wallet`.
///
/// Malformed vaults are collected in [`Translation::skipped`] and do not
/// affect the other vaults of the same cycle.
pub fn translate(result: &PortfolioResult, wallet: &str, schema: LabelSchema) -> Translation {
    let mut out = Translation::default();

    for farm in result.vault_farms() {
        let Some(entries) = farm.entries() else {
            out.invalid_farms.push(farm.name.to_string());
            continue;
        };

        for (index, raw) in entries.iter().enumerate() {
            match VaultRecord::decode(farm.name, index, raw) {
                Ok(vault) => {
                    vault_samples(&vault, farm.name, wallet, schema, &mut out.samples);
                    out.vaults += 1;
                }
                Err(e) => out.skipped.push(e),
            }
        }
    }

    out
}

/// Append the samples of a single vault to `out`.
pub fn vault_samples(
    vault: &VaultRecord,
    farm: &str,
    wallet: &str,
    schema: LabelSchema,
    out: &mut Vec<MetricSample>,
) {
    let deposit_price = vault.price_in_usd_deposit_token;
    let reward_price = vault.price_in_usd_reward_token;

    let labels = VaultLabels {
        vault,
        farm,
        wallet,
        schema,
    };

    let mut push = |metric: VaultMetric, value: f64| {
        out.push(MetricSample {
            metric,
            labels: labels.for_metric(metric),
            value,
        });
    };

    push(VaultMetric::Balance, vault.current_tokens);
    push(VaultMetric::BalanceUsd, vault.current_tokens * deposit_price);
    push(VaultMetric::Deposit, vault.deposited_tokens);
    push(VaultMetric::DepositUsd, vault.deposited_tokens * deposit_price);
    push(VaultMetric::PendingReward, vault.pending_rewards);
    push(VaultMetric::PendingRewardUsd, vault.pending_rewards * reward_price);

    if let Some(harvested) = vault.harvested_rewards {
        push(VaultMetric::HarvestedReward, harvested);
        push(VaultMetric::HarvestedRewardUsd, harvested * reward_price);
    }

    push(VaultMetric::Apy, vault.apy);
    push(VaultMetric::RewardTokenPrice, reward_price);
    push(VaultMetric::DepositTokenPrice, deposit_price);
}

struct VaultLabels<'a> {
    vault: &'a VaultRecord,
    farm: &'a str,
    wallet: &'a str,
    schema: LabelSchema,
}

impl VaultLabels<'_> {
    fn for_metric(&self, metric: VaultMetric) -> Vec<(&'static str, String)> {
        self.schema
            .label_names(metric)
            .iter()
            .map(|&name| (name, self.value(metric, name).to_string()))
            .collect()
    }

    fn value(&self, metric: VaultMetric, name: &str) -> &str {
        match name {
            "vault" => self.vault.name.as_str(),
            "wallet" => self.wallet,
            "farm" => self.farm,
            // "token"
            _ => match metric {
                VaultMetric::PendingReward
                | VaultMetric::PendingRewardUsd
                | VaultMetric::HarvestedReward
                | VaultMetric::HarvestedRewardUsd
                | VaultMetric::RewardTokenPrice => self.vault.reward_token.as_str(),
                _ => self.vault.deposit_token.as_str(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn portfolio(value: Value) -> PortfolioResult {
        PortfolioResult::from_value(value).unwrap()
    }

    fn cake_bnb() -> Value {
        json!({
            "name": "CAKE-BNB",
            "depositToken": "CAKE",
            "rewardToken": "CAKE",
            "currentTokens": 10.0,
            "depositedTokens": 9.5,
            "pendingRewards": 0.2,
            "priceInUSDDepositToken": 4.0,
            "priceInUSDRewardToken": 4.0,
            "apy": 55.2
        })
    }

    fn find<'a>(samples: &'a [MetricSample], metric: VaultMetric) -> Option<&'a MetricSample> {
        samples.iter().find(|s| s.metric == metric)
    }

    #[test]
    fn test_single_beefy_vault_scenario() {
        let r = portfolio(json!({"beefy": {"vaults": {"vaults": [cake_bnb()]}}}));
        let t = translate(&r, "0xABC", LabelSchema::basic());

        assert!(t.skipped.is_empty());
        assert_eq!(t.vaults, 1);

        let balance = find(&t.samples, VaultMetric::Balance).unwrap();
        assert_eq!(
            balance.labels,
            vec![
                ("vault", "CAKE-BNB".to_string()),
                ("token", "CAKE".to_string()),
                ("wallet", "0xABC".to_string()),
            ]
        );
        assert_eq!(balance.value, 10.0);

        let expect = [
            (VaultMetric::BalanceUsd, 40.0),
            (VaultMetric::Deposit, 9.5),
            (VaultMetric::DepositUsd, 38.0),
            (VaultMetric::PendingReward, 0.2),
            (VaultMetric::PendingRewardUsd, 0.2 * 4.0),
            (VaultMetric::Apy, 55.2),
        ];
        for (metric, value) in expect {
            let sample = find(&t.samples, metric).unwrap();
            assert_eq!(sample.value, value, "{}", metric.name());
        }

        let apy = find(&t.samples, VaultMetric::Apy).unwrap();
        assert_eq!(apy.label("vault"), Some("CAKE-BNB"));
        assert_eq!(apy.label("wallet"), Some("0xABC"));
        assert_eq!(apy.label("token"), None);

        assert!(find(&t.samples, VaultMetric::HarvestedReward).is_none());
        assert!(find(&t.samples, VaultMetric::HarvestedRewardUsd).is_none());
        assert_eq!(t.samples.len(), 9);
    }

    #[test]
    fn test_usd_values_are_exact_products() {
        let mut vault = cake_bnb();
        vault["currentTokens"] = json!(100.0);
        vault["priceInUSDDepositToken"] = json!(2.5);
        vault["harvestedRewards"] = json!(3.0);
        vault["priceInUSDRewardToken"] = json!(0.5);

        let r = portfolio(json!({"beefy": {"vaults": {"vaults": [vault]}}}));
        let t = translate(&r, "0xABC", LabelSchema::basic());

        assert_eq!(find(&t.samples, VaultMetric::BalanceUsd).unwrap().value, 250.0);
        assert_eq!(find(&t.samples, VaultMetric::HarvestedReward).unwrap().value, 3.0);
        assert_eq!(find(&t.samples, VaultMetric::HarvestedRewardUsd).unwrap().value, 1.5);
        assert_eq!(t.samples.len(), 11);
    }

    #[test]
    fn test_reward_metrics_use_reward_token() {
        let mut vault = cake_bnb();
        vault["name"] = json!("BUSD-BNB LP");
        vault["depositToken"] = json!("BUSD-BNB");
        vault["rewardToken"] = json!("BIFI");
        vault["harvestedRewards"] = json!(1.0);

        let r = portfolio(json!({"beefy": {"vaults": {"vaults": [vault]}}}));
        let t = translate(&r, "0xABC", LabelSchema::basic());

        for sample in &t.samples {
            let expected = match sample.metric {
                VaultMetric::PendingReward
                | VaultMetric::PendingRewardUsd
                | VaultMetric::HarvestedReward
                | VaultMetric::HarvestedRewardUsd
                | VaultMetric::RewardTokenPrice => Some("BIFI"),
                VaultMetric::Apy => None,
                _ => Some("BUSD-BNB"),
            };
            assert_eq!(sample.label("token"), expected, "{}", sample.metric.name());
        }
    }

    #[test]
    fn test_farm_label_schema() {
        let r = portfolio(json!({"beefy": {"vaults": {"vaults": [cake_bnb()]}}}));
        let t = translate(&r, "0xABC", LabelSchema::with_farm());

        for sample in &t.samples {
            assert_eq!(sample.label("farm"), Some("beefy"));
            assert_eq!(
                sample.labels.len(),
                LabelSchema::with_farm().label_names(sample.metric).len()
            );
        }

        let price = find(&t.samples, VaultMetric::DepositTokenPrice).unwrap();
        assert_eq!(price.label_values(), vec!["CAKE", "CAKE-BNB", "beefy"]);
    }

    #[test]
    fn test_basic_price_labels_are_token_only() {
        let r = portfolio(json!({"beefy": {"vaults": {"vaults": [cake_bnb()]}}}));
        let t = translate(&r, "0xABC", LabelSchema::basic());
        let price = find(&t.samples, VaultMetric::RewardTokenPrice).unwrap();
        assert_eq!(price.label_values(), vec!["CAKE"]);
        assert_eq!(price.value, 4.0);
    }

    #[test]
    fn test_malformed_vault_is_skipped_others_kept() {
        let mut broken = cake_bnb();
        broken["name"] = json!("BROKEN");
        broken.as_object_mut().unwrap().remove("pendingRewards");

        let r = portfolio(json!({
            "beefy": {"vaults": {"vaults": [broken, cake_bnb()]}},
            "auto": {"vaults": {"vaults": [cake_bnb()]}}
        }));
        let t = translate(&r, "0xABC", LabelSchema::basic());

        assert_eq!(t.vaults, 2);
        assert_eq!(t.skipped.len(), 1);
        assert_eq!(t.skipped[0].vault.as_deref(), Some("BROKEN"));
        assert!(t.samples.iter().all(|s| s.label("vault") != Some("BROKEN")));
    }

    #[test]
    fn test_non_list_vaults_reported() {
        let r = portfolio(json!({"beefy": {"vaults": {"vaults": "n/a"}}}));
        let t = translate(&r, "0xABC", LabelSchema::basic());
        assert!(t.samples.is_empty());
        assert_eq!(t.invalid_farms, vec!["beefy".to_string()]);
    }

    #[test]
    fn test_translate_is_idempotent() {
        let r = portfolio(json!({
            "beefy": {"vaults": {"vaults": [cake_bnb()]}},
            "pancake": {"vaults": {"vaults": [cake_bnb(), cake_bnb()]}}
        }));
        let first = translate(&r, "0xABC", LabelSchema::with_farm());
        let second = translate(&r, "0xABC", LabelSchema::with_farm());
        assert_eq!(first, second);
    }

    #[test]
    fn test_metric_names_unique() {
        let mut names: Vec<&str> = VaultMetric::ALL.iter().map(|m| m.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), VaultMetric::ALL.len());
    }
}
