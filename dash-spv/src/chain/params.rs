//! Per-network difficulty retargeting parameters.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pow::{CompactTarget, Target};
use crate::types::Network;

/// Proof-of-work ceiling shared by mainnet and testnet.
pub const MAX_TARGET_BITS: u32 = 0x1e0fffff;
/// Seconds between blocks.
pub const TARGET_SPACING: u32 = 150;
/// Seconds covered by one DarkGravityWave window.
pub const TARGET_TIMESPAN: u32 = 3600;
pub const MAINNET_DGW_ACTIVATION_HEIGHT: u32 = 68589;
pub const TESTNET_DGW_ACTIVATION_HEIGHT: u32 = 4002;

/// Difficulty parameters for one network.
///
/// `height_interval` is always `target_timespan / target_spacing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDifficultyParams")]
pub struct DifficultyParams {
    height_interval: u32,
    target_timespan: u32,
    target_spacing: u32,
    max_target_bits: CompactTarget,
    activation_height: u32,
}

#[derive(Deserialize)]
struct RawDifficultyParams {
    height_interval: u32,
    target_timespan: u32,
    target_spacing: u32,
    max_target_bits: CompactTarget,
    activation_height: u32,
}

impl TryFrom<RawDifficultyParams> for DifficultyParams {
    type Error = ConfigError;

    fn try_from(raw: RawDifficultyParams) -> Result<Self, Self::Error> {
        DifficultyParams::new(
            raw.height_interval,
            raw.target_timespan,
            raw.target_spacing,
            raw.max_target_bits,
            raw.activation_height,
        )
    }
}

impl DifficultyParams {
    pub fn new(
        height_interval: u32,
        target_timespan: u32,
        target_spacing: u32,
        max_target_bits: CompactTarget,
        activation_height: u32,
    ) -> Result<Self, ConfigError> {
        if target_spacing == 0 || target_timespan == 0 {
            return Err(ConfigError::InvalidDifficultyParams(
                "target spacing and timespan must be non-zero".to_string(),
            ));
        }
        if height_interval == 0 || height_interval != target_timespan / target_spacing {
            return Err(ConfigError::InvalidDifficultyParams(format!(
                "height interval {} must equal timespan {} / spacing {}",
                height_interval, target_timespan, target_spacing
            )));
        }
        if Target::from_compact(max_target_bits).is_err() {
            return Err(ConfigError::InvalidDifficultyParams(format!(
                "max target bits {} is not a valid compact target",
                max_target_bits
            )));
        }
        Ok(Self {
            height_interval,
            target_timespan,
            target_spacing,
            max_target_bits,
            activation_height,
        })
    }

    pub fn mainnet() -> Self {
        Self {
            height_interval: TARGET_TIMESPAN / TARGET_SPACING,
            target_timespan: TARGET_TIMESPAN,
            target_spacing: TARGET_SPACING,
            max_target_bits: CompactTarget::from_consensus(MAX_TARGET_BITS),
            activation_height: MAINNET_DGW_ACTIVATION_HEIGHT,
        }
    }

    pub fn testnet() -> Self {
        Self {
            activation_height: TESTNET_DGW_ACTIVATION_HEIGHT,
            ..Self::mainnet()
        }
    }

    pub fn for_network(network: Network) -> Self {
        match network {
            Network::Dash => Self::mainnet(),
            Network::Testnet => Self::testnet(),
        }
    }

    pub fn height_interval(&self) -> u32 {
        self.height_interval
    }

    pub fn target_timespan(&self) -> u32 {
        self.target_timespan
    }

    pub fn target_spacing(&self) -> u32 {
        self.target_spacing
    }

    pub fn max_target_bits(&self) -> CompactTarget {
        self.max_target_bits
    }

    pub fn activation_height(&self) -> u32 {
        self.activation_height
    }

    /// The network ceiling as a target. Validated on construction.
    pub fn max_target(&self) -> Target {
        Target::from_compact(self.max_target_bits).unwrap_or(Target::ZERO)
    }
}
