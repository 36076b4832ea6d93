//! Strategy configuration document model

use crate::{Complexity, Dex, Network, StrategyFamily, VaultMode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Schema revision written by this version of the engine
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Root configuration for a single yield strategy
///
/// Address and name fields are kept as raw strings so that a malformed value
/// is reported by validation against its own field instead of failing
/// deserialization as a whole. Missing string fields decode as empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyConfig {
    /// Schema revision of this document
    pub config_version: u32,

    /// Display name, also used to derive output paths
    #[serde(default)]
    pub name: String,

    pub network: Network,

    pub strategy_family: StrategyFamily,

    pub dex: Dex,

    /// LP token the strategy deposits
    #[serde(default)]
    pub lp_token_address: String,

    /// Token emitted by the gauge / staking contract
    #[serde(default)]
    pub reward_token: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gauge_address: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staking_address: Option<String>,

    #[serde(default)]
    pub routes: StrategyRoutes,

    pub vault_mode: VaultMode,

    /// Fee and keeper infrastructure
    #[serde(default)]
    pub beefy_core: BeefyCore,

    #[serde(default)]
    pub complexity: Complexity,
}

impl StrategyConfig {
    /// Return a copy stamped with `version`
    pub fn with_version(&self, version: u32) -> Self {
        Self {
            config_version: version,
            ..self.clone()
        }
    }
}

/// A directed token conversion path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRoute {
    #[serde(default)]
    pub from: String,

    #[serde(default)]
    pub to: String,

    /// Ordered hops, starting at `from` and ending at `to`
    #[serde(default)]
    pub path: Vec<String>,
}

impl SwapRoute {
    pub fn new(from: impl Into<String>, to: impl Into<String>, path: Vec<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            path,
        }
    }

    /// Single-hop route `from -> to`
    pub fn direct(from: impl Into<String>, to: impl Into<String>) -> Self {
        let from = from.into();
        let to = to.into();
        Self {
            path: vec![from.clone(), to.clone()],
            from,
            to,
        }
    }
}

/// Identifies one of the three swap legs a strategy harvests through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteLeg {
    RewardToNative,
    RewardToLp0,
    RewardToLp1,
}

impl RouteLeg {
    pub const ALL: [RouteLeg; 3] = [
        RouteLeg::RewardToNative,
        RouteLeg::RewardToLp0,
        RouteLeg::RewardToLp1,
    ];

    /// Key of this leg inside the `routes` object
    pub fn key(&self) -> &'static str {
        match self {
            RouteLeg::RewardToNative => "rewardToNative",
            RouteLeg::RewardToLp0 => "rewardToLp0",
            RouteLeg::RewardToLp1 => "rewardToLp1",
        }
    }
}

impl fmt::Display for RouteLeg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The three swap routes used when harvesting
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyRoutes {
    #[serde(default)]
    pub reward_to_native: SwapRoute,

    #[serde(default)]
    pub reward_to_lp0: SwapRoute,

    #[serde(default)]
    pub reward_to_lp1: SwapRoute,
}

impl StrategyRoutes {
    pub fn get(&self, leg: RouteLeg) -> &SwapRoute {
        match leg {
            RouteLeg::RewardToNative => &self.reward_to_native,
            RouteLeg::RewardToLp0 => &self.reward_to_lp0,
            RouteLeg::RewardToLp1 => &self.reward_to_lp1,
        }
    }

    /// Routes paired with their leg, in harvest order
    pub fn iter(&self) -> impl Iterator<Item = (RouteLeg, &SwapRoute)> {
        RouteLeg::ALL.into_iter().map(move |leg| (leg, self.get(leg)))
    }
}

/// Addresses of the shared keeper and fee contracts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeefyCore {
    #[serde(default)]
    pub keeper: String,

    #[serde(default)]
    pub vault_factory: String,

    #[serde(default)]
    pub fee_config: String,

    #[serde(default)]
    pub fee_recipient: String,
}

impl BeefyCore {
    /// Fields paired with their document key
    pub fn fields(&self) -> [(&'static str, &str); 4] {
        [
            ("keeper", self.keeper.as_str()),
            ("vaultFactory", self.vault_factory.as_str()),
            ("feeConfig", self.fee_config.as_str()),
            ("feeRecipient", self.fee_recipient.as_str()),
        ]
    }
}
