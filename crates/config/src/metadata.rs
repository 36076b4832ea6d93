//! Network, DEX and strategy family metadata consumed by validation

use strategy_forge_types::{Dex, Network, StrategyConfig, StrategyFamily};

/// Top-level address field that a family may require
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigField {
    LpTokenAddress,
    RewardToken,
    GaugeAddress,
    StakingAddress,
}

impl ConfigField {
    /// Document key of this field
    pub fn key(&self) -> &'static str {
        match self {
            ConfigField::LpTokenAddress => "lpTokenAddress",
            ConfigField::RewardToken => "rewardToken",
            ConfigField::GaugeAddress => "gaugeAddress",
            ConfigField::StakingAddress => "stakingAddress",
        }
    }

    /// Value of this field, `None` when absent or empty
    pub fn value<'a>(&self, config: &'a StrategyConfig) -> Option<&'a str> {
        let value = match self {
            ConfigField::LpTokenAddress => Some(config.lp_token_address.as_str()),
            ConfigField::RewardToken => Some(config.reward_token.as_str()),
            ConfigField::GaugeAddress => config.gauge_address.as_deref(),
            ConfigField::StakingAddress => config.staking_address.as_deref(),
        };
        value.filter(|v| !v.is_empty())
    }
}

/// One entry of a family's required-field list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRequirement {
    /// The field must be present
    Present(ConfigField),
    /// At least one of the two fields must be present
    OneOf(ConfigField, ConfigField),
}

const SOLIDLY_LP_REQUIREMENTS: &[FieldRequirement] = &[
    FieldRequirement::Present(ConfigField::LpTokenAddress),
    FieldRequirement::OneOf(ConfigField::GaugeAddress, ConfigField::StakingAddress),
    FieldRequirement::Present(ConfigField::RewardToken),
];

/// Read-only lookup of supported networks, families and DEXes
pub trait MetadataProvider: Send + Sync {
    fn is_supported_network(&self, network: Network) -> bool;

    fn is_supported_strategy_family(&self, family: StrategyFamily) -> bool;

    fn is_supported_dex(&self, dex: Dex) -> bool;

    /// Fields a config of `family` must carry
    fn required_fields(&self, family: StrategyFamily) -> &[FieldRequirement];
}

/// Descriptive data about a supported network
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainMetadata {
    pub network: Network,
    pub chain_id: u64,
    pub display_name: &'static str,
    /// DEXes with a deployment on this network
    pub dexes: &'static [Dex],
}

/// Built-in metadata table
#[derive(Debug, Clone)]
pub struct StaticMetadata {
    networks: Vec<Network>,
    families: Vec<StrategyFamily>,
    dexes: Vec<Dex>,
}

impl StaticMetadata {
    /// Restrict support to the given members
    pub fn restricted(networks: Vec<Network>, families: Vec<StrategyFamily>, dexes: Vec<Dex>) -> Self {
        Self {
            networks,
            families,
            dexes,
        }
    }

    /// Chain metadata for `network`
    pub fn chain(&self, network: Network) -> ChainMetadata {
        let (display_name, dexes): (&'static str, &'static [Dex]) = match network {
            Network::Mainnet => ("Ethereum", &[]),
            Network::Optimism => ("Optimism", &[Dex::Velodrome]),
            Network::Arbitrum => ("Arbitrum One", &[]),
            Network::Base => ("Base", &[Dex::Aerodrome]),
        };

        ChainMetadata {
            network,
            chain_id: network.chain_id(),
            display_name,
            dexes,
        }
    }

    /// Supported networks the given DEX is deployed on
    pub fn networks_for_dex(&self, dex: Dex) -> Vec<Network> {
        self.networks
            .iter()
            .copied()
            .filter(|network| self.chain(*network).dexes.contains(&dex))
            .collect()
    }
}

impl Default for StaticMetadata {
    fn default() -> Self {
        Self {
            networks: Network::ALL.to_vec(),
            families: StrategyFamily::ALL.to_vec(),
            dexes: Dex::ALL.to_vec(),
        }
    }
}

impl MetadataProvider for StaticMetadata {
    fn is_supported_network(&self, network: Network) -> bool {
        self.networks.contains(&network)
    }

    fn is_supported_strategy_family(&self, family: StrategyFamily) -> bool {
        self.families.contains(&family)
    }

    fn is_supported_dex(&self, dex: Dex) -> bool {
        self.dexes.contains(&dex)
    }

    fn required_fields(&self, family: StrategyFamily) -> &[FieldRequirement] {
        match family {
            StrategyFamily::SolidlyLp => SOLIDLY_LP_REQUIREMENTS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_supports_everything() {
        let metadata = StaticMetadata::default();
        assert!(Network::ALL.iter().all(|n| metadata.is_supported_network(*n)));
        assert!(Dex::ALL.iter().all(|d| metadata.is_supported_dex(*d)));
        assert!(metadata.is_supported_strategy_family(StrategyFamily::SolidlyLp));
    }

    #[test]
    fn test_restricted_support() {
        let metadata = StaticMetadata::restricted(
            vec![Network::Base],
            vec![StrategyFamily::SolidlyLp],
            vec![Dex::Aerodrome],
        );
        assert!(!metadata.is_supported_network(Network::Mainnet));
        assert!(!metadata.is_supported_dex(Dex::Velodrome));
        assert_eq!(metadata.networks_for_dex(Dex::Aerodrome), vec![Network::Base]);
        assert!(metadata.networks_for_dex(Dex::Velodrome).is_empty());
    }

    #[test]
    fn test_solidly_requirements() {
        let metadata = StaticMetadata::default();
        let required = metadata.required_fields(StrategyFamily::SolidlyLp);
        assert!(required.contains(&FieldRequirement::OneOf(
            ConfigField::GaugeAddress,
            ConfigField::StakingAddress
        )));
        assert_eq!(metadata.chain(Network::Optimism).chain_id, 10);
        assert_eq!(metadata.chain(Network::Optimism).dexes, &[Dex::Velodrome]);
    }
}
