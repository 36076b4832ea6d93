//! Closed enumerations used by strategy configs
//!
//! Each enum serializes as its lowercase wire code and parses back from the
//! same code via [`FromStr`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Returned when a wire code is not a member of an enumeration
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{code}', expected one of: {expected}")]
pub struct ParseCodeError {
    pub kind: &'static str,
    pub code: String,
    pub expected: String,
}

macro_rules! wire_codes {
    ($ty:ident, $kind:literal, { $($variant:ident => $code:literal),+ $(,)? }) => {
        impl $ty {
            /// Every member, in declaration order
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            /// Wire code as it appears in config documents
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $code),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = ParseCodeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($code => Ok($ty::$variant),)+
                    _ => Err(ParseCodeError {
                        kind: $kind,
                        code: s.to_string(),
                        expected: [$($code),+].join(", "),
                    }),
                }
            }
        }
    };
}

/// Target network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    Optimism,
    Arbitrum,
    Base,
}

wire_codes!(Network, "network", {
    Mainnet => "mainnet",
    Optimism => "optimism",
    Arbitrum => "arbitrum",
    Base => "base",
});

impl Network {
    /// EVM chain id
    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Mainnet => 1,
            Network::Optimism => 10,
            Network::Arbitrum => 42161,
            Network::Base => 8453,
        }
    }
}

/// Category of yield strategy, each with its own required-field set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StrategyFamily {
    #[serde(rename = "solidly_lp")]
    SolidlyLp,
}

wire_codes!(StrategyFamily, "strategy family", {
    SolidlyLp => "solidly_lp",
});

/// DEX the strategy farms on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dex {
    Velodrome,
    Aerodrome,
}

wire_codes!(Dex, "dex", {
    Velodrome => "velodrome",
    Aerodrome => "aerodrome",
});

/// Whether generation targets a strategy alone or a strategy plus a new vault
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VaultMode {
    #[default]
    StrategyOnly,
    VaultAndStrategy,
}

wire_codes!(VaultMode, "vault mode", {
    StrategyOnly => "strategy-only",
    VaultAndStrategy => "vault-and-strategy",
});

/// Informational complexity label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    #[default]
    Basic,
    Intermediate,
    Advanced,
}

wire_codes!(Complexity, "complexity", {
    Basic => "basic",
    Intermediate => "intermediate",
    Advanced => "advanced",
});
