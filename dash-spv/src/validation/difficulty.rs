//! Header difficulty validation: proof of work and DarkGravityWave retargeting.
//!
//! A chain is assembled once per network. Proof of work is always checked
//! first. From the DGW activation height on, the first retarget rule that
//! applies to the candidate decides the required bits and the remaining rules
//! are skipped.

use primitive_types::U256;

use crate::chain::DifficultyParams;
use crate::error::{ValidationError, ValidationResult};
use crate::pow::{CompactTarget, Target};
use crate::storage::{HeaderKey, HeaderLookup};
use crate::types::{BlockHeader, Network};

/// A single header rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockValidator {
    /// Hash meets the target claimed by `bits`, which may not exceed the network ceiling.
    ProofOfWork,
    /// Testnet minimum difficulty: after a gap of more than two spacings the
    /// candidate must carry the ceiling bits.
    DarkGravityWaveTestnet,
    /// Dash Core's DarkGravityWave v3 retarget.
    DarkGravityWave,
}

impl BlockValidator {
    fn is_retarget_rule(&self) -> bool {
        !matches!(self, BlockValidator::ProofOfWork)
    }

    fn applies(&self, candidate: &BlockHeader, previous: &BlockHeader, params: &DifficultyParams) -> bool {
        match self {
            BlockValidator::ProofOfWork => true,
            BlockValidator::DarkGravityWaveTestnet => {
                candidate.timestamp as u64 > previous.timestamp as u64 + 2 * params.target_spacing() as u64
            }
            BlockValidator::DarkGravityWave => candidate.height >= params.activation_height(),
        }
    }

    /// Bits this rule requires of `candidate`.
    fn required_bits(
        &self,
        candidate: &BlockHeader,
        previous: &BlockHeader,
        history: &dyn HeaderLookup,
        params: &DifficultyParams,
    ) -> ValidationResult<CompactTarget> {
        match self {
            BlockValidator::ProofOfWork => Ok(candidate.bits),
            BlockValidator::DarkGravityWaveTestnet => Ok(params.max_target_bits()),
            BlockValidator::DarkGravityWave => dark_gravity_wave(previous, history, params),
        }
    }
}

fn decode(bits: CompactTarget) -> ValidationResult<Target> {
    Target::from_compact(bits).map_err(|_| ValidationError::InvalidCompactTarget(bits))
}

fn check_proof_of_work(candidate: &BlockHeader, params: &DifficultyParams) -> ValidationResult<()> {
    let target = decode(candidate.bits)?;
    if target.is_zero() || target > params.max_target() || !target.is_met_by(candidate.hash) {
        return Err(ValidationError::BadProofOfWork(candidate.hash));
    }
    Ok(())
}

fn dark_gravity_wave(
    previous: &BlockHeader,
    history: &dyn HeaderLookup,
    params: &DifficultyParams,
) -> ValidationResult<CompactTarget> {
    let interval = params.height_interval();
    let max_target = params.max_target().as_u256();

    // Not enough history for a full window.
    if previous.height < interval {
        return Ok(params.max_target_bits());
    }

    let mut block = *previous;
    let mut average = U256::zero();
    for count in 1..=interval {
        let target = decode(block.bits)?.as_u256();
        average = if count == 1 {
            target
        } else {
            average.saturating_mul(U256::from(count)).saturating_add(target) / U256::from(count + 1)
        };

        if count != interval {
            block = history.ancestor(HeaderKey::Hash(block.prev_hash)).ok_or_else(|| {
                ValidationError::MissingAncestor(format!(
                    "{} (parent of height {})",
                    block.prev_hash, block.height
                ))
            })?;
        }
    }

    let timespan = params.target_timespan() as i64;
    let actual = (previous.timestamp as i64 - block.timestamp as i64).clamp(timespan / 3, timespan * 3);

    let new_target = match average.checked_mul(U256::from(actual as u64)) {
        Some(scaled) => (scaled / U256::from(timespan as u64)).min(max_target),
        None => max_target,
    };
    Ok(Target::from_u256(new_target).to_compact())
}

/// Validates candidate headers for one network.
#[derive(Debug, Clone)]
pub struct DifficultyValidatorChain {
    params: DifficultyParams,
    validators: Vec<BlockValidator>,
}

impl DifficultyValidatorChain {
    /// Build a chain from `validators`, checked in order.
    pub fn new(params: DifficultyParams, validators: Vec<BlockValidator>) -> Self {
        Self {
            params,
            validators,
        }
    }

    pub fn mainnet() -> Self {
        Self::new(
            DifficultyParams::mainnet(),
            vec![BlockValidator::ProofOfWork, BlockValidator::DarkGravityWave],
        )
    }

    pub fn testnet() -> Self {
        Self::new(
            DifficultyParams::testnet(),
            vec![
                BlockValidator::ProofOfWork,
                BlockValidator::DarkGravityWaveTestnet,
                BlockValidator::DarkGravityWave,
            ],
        )
    }

    pub fn for_network(network: Network) -> Self {
        match network {
            Network::Dash => Self::mainnet(),
            Network::Testnet => Self::testnet(),
        }
    }

    /// The network's rules with replaced parameters.
    pub fn with_params(mut self, params: DifficultyParams) -> Self {
        self.params = params;
        self
    }

    pub fn params(&self) -> &DifficultyParams {
        &self.params
    }

    pub fn validators(&self) -> &[BlockValidator] {
        &self.validators
    }

    /// Validate `candidate` against its ancestors in `history`.
    pub fn validate(&self, candidate: &BlockHeader, history: &impl HeaderLookup) -> ValidationResult<()> {
        if self.validators.contains(&BlockValidator::ProofOfWork) {
            check_proof_of_work(candidate, &self.params)?;
        }

        let Some(required) = self.required_bits(candidate, history)? else {
            return Ok(());
        };
        if required != candidate.bits {
            return Err(ValidationError::BadDifficultyBits {
                height: candidate.height,
                expected: required,
                found: candidate.bits,
            });
        }

        tracing::trace!("Header {} at height {} passed difficulty checks", candidate.hash, candidate.height);
        Ok(())
    }

    /// Bits the first applicable retarget rule requires of `candidate`, `None`
    /// below the activation height.
    pub fn required_bits(
        &self,
        candidate: &BlockHeader,
        history: &impl HeaderLookup,
    ) -> ValidationResult<Option<CompactTarget>> {
        if candidate.height < self.params.activation_height() {
            return Ok(None);
        }

        let previous = history.ancestor(HeaderKey::Hash(candidate.prev_hash)).ok_or_else(|| {
            ValidationError::MissingAncestor(format!(
                "{} (parent of height {})",
                candidate.prev_hash, candidate.height
            ))
        })?;
        if previous.height.checked_add(1) != Some(candidate.height) {
            return Err(ValidationError::InvalidHeaderChain(format!(
                "header {} at height {} follows height {}",
                candidate.hash, candidate.height, previous.height
            )));
        }

        for rule in self.validators.iter().filter(|v| v.is_retarget_rule()) {
            if rule.applies(candidate, &previous, &self.params) {
                return rule.required_bits(candidate, &previous, history, &self.params).map(Some);
            }
        }
        Ok(None)
    }

    /// Validate a contiguous batch, each header using the earlier ones as history.
    pub fn validate_batch(&self, headers: &[BlockHeader], history: &impl HeaderLookup) -> ValidationResult<()> {
        for pair in headers.windows(2) {
            if pair[1].prev_hash != pair[0].hash || pair[0].height.checked_add(1) != Some(pair[1].height) {
                return Err(ValidationError::InvalidHeaderChain(format!(
                    "Header {} does not connect to {}",
                    pair[1].hash, pair[0].hash
                )));
            }
        }

        for (i, header) in headers.iter().enumerate() {
            let overlay = BatchLookup {
                accepted: &headers[..i],
                history,
            };
            self.validate(header, &overlay)?;
        }

        tracing::debug!("Validated batch of {} headers", headers.len());
        Ok(())
    }
}

/// Earlier batch members layered over the external history.
struct BatchLookup<'a, H: ?Sized> {
    accepted: &'a [BlockHeader],
    history: &'a H,
}

impl<H: HeaderLookup + ?Sized> HeaderLookup for BatchLookup<'_, H> {
    fn ancestor(&self, key: HeaderKey) -> Option<BlockHeader> {
        let found = self.accepted.iter().rev().find(|header| match key {
            HeaderKey::Height(height) => header.height == height,
            HeaderKey::Hash(hash) => header.hash == hash,
        });
        found.copied().or_else(|| self.history.ancestor(key))
    }
}
