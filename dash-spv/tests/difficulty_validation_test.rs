//! Header difficulty validation through the public API.
//!
//! Covers the DarkGravityWave retarget with its timespan clamping, the testnet
//! minimum difficulty rule and batch validation through the client facade.

mod common;

use assert_matches::assert_matches;
use dash_spv_finality::chain::params::{MAX_TARGET_BITS, TARGET_SPACING, TARGET_TIMESPAN};
use dash_spv_finality::chain::DifficultyParams;
use dash_spv_finality::pow::CompactTarget;
use dash_spv_finality::storage::MemoryHeaderStore;
use dash_spv_finality::test_utils::HeaderChainBuilder;
use dash_spv_finality::validation::{BlockValidator, DifficultyValidatorChain};
use dash_spv_finality::{BlockHeader, Config, SpvError, ValidationError};

const HISTORY_BITS: u32 = 0x1b0404cb;

fn active_from_genesis() -> DifficultyParams {
    DifficultyParams::new(
        TARGET_TIMESPAN / TARGET_SPACING,
        TARGET_TIMESPAN,
        TARGET_SPACING,
        CompactTarget::from_consensus(MAX_TARGET_BITS),
        0,
    )
    .unwrap()
}

/// Twenty-four headers at constant `spacing` and constant bits.
fn window(spacing: u32) -> (MemoryHeaderStore, BlockHeader) {
    let headers = HeaderChainBuilder::new(500).bits(HISTORY_BITS).spacing(spacing).build(24);
    let store = MemoryHeaderStore::new();
    store.extend(headers.iter().copied());
    (store, headers[23])
}

fn expected_bits(spacing: u32) -> u32 {
    let chain = DifficultyValidatorChain::mainnet().with_params(active_from_genesis());
    let (store, tip) = window(spacing);
    let candidate = HeaderChainBuilder::after(&tip).spacing(spacing).build(1)[0];
    chain.required_bits(&candidate, &store).unwrap().unwrap().to_consensus()
}

#[test]
fn test_dgw_known_vectors() {
    // On schedule: 23 intervals of 150 s against a 3600 s timespan.
    assert_eq!(expected_bits(150), 0x1b03d9ed);
    // Far too fast: clamped to a third of the timespan.
    assert_eq!(expected_bits(1), 0x1b0156ee);
    // Far too slow: clamped to three times the timespan.
    assert_eq!(expected_bits(1000), 0x1b0c0e61);
}

#[test]
fn test_dgw_accepts_exact_bits_only() {
    let chain = DifficultyValidatorChain::mainnet().with_params(active_from_genesis());
    let (store, tip) = window(150);

    let good = HeaderChainBuilder::after(&tip).bits(0x1b03d9ed).build(1)[0];
    assert!(chain.validate(&good, &store).is_ok());

    let off_by_one = HeaderChainBuilder::after(&tip).bits(0x1b03d9ee).build(1)[0];
    assert_matches!(
        chain.validate(&off_by_one, &store),
        Err(ValidationError::BadDifficultyBits { expected, .. }) if expected.to_consensus() == 0x1b03d9ed
    );
}

#[test]
fn test_network_chains() {
    assert_eq!(
        DifficultyValidatorChain::mainnet().validators(),
        &[BlockValidator::ProofOfWork, BlockValidator::DarkGravityWave]
    );
    assert_eq!(
        DifficultyValidatorChain::testnet().validators(),
        &[BlockValidator::ProofOfWork, BlockValidator::DarkGravityWaveTestnet, BlockValidator::DarkGravityWave]
    );
    assert_eq!(DifficultyValidatorChain::mainnet().params().activation_height(), 68589);
    assert_eq!(DifficultyValidatorChain::testnet().params().activation_height(), 4002);
}

#[test]
fn test_testnet_gap_requires_ceiling_bits() {
    let chain = DifficultyValidatorChain::testnet().with_params(active_from_genesis());
    let (store, tip) = window(150);

    let relaxed = HeaderChainBuilder::after(&tip).spacing(2 * TARGET_SPACING + 1).bits(MAX_TARGET_BITS).build(1)[0];
    assert!(chain.validate(&relaxed, &store).is_ok());

    let not_relaxed = HeaderChainBuilder::after(&tip).spacing(2 * TARGET_SPACING + 1).bits(HISTORY_BITS).build(1)[0];
    assert_matches!(
        chain.validate(&not_relaxed, &store),
        Err(ValidationError::BadDifficultyBits { expected, .. }) if expected.to_consensus() == MAX_TARGET_BITS
    );
}

#[test]
fn test_pow_ceiling_is_enforced_before_retargeting() {
    let chain = DifficultyValidatorChain::mainnet();
    let mut header = HeaderChainBuilder::new(10).build(1)[0];
    header.bits = CompactTarget::from_consensus(0x207fffff);
    assert_matches!(chain.validate(&header, &MemoryHeaderStore::new()), Err(ValidationError::BadProofOfWork(_)));
}

#[test]
fn test_client_validates_headers_against_its_store() {
    let config = Config::testnet().with_difficulty_params(active_from_genesis());
    let fixture = common::test_client(config, None);
    let history = HeaderChainBuilder::new(500).bits(HISTORY_BITS).build(24);
    fixture.headers.extend(history.iter().copied());

    let batch = HeaderChainBuilder::after(&history[23]).bits(0x1b03d9ed).build(1);
    assert!(fixture.client.validate_headers(&batch).is_ok());
    fixture.headers.extend(batch.iter().copied());

    // The window now holds one header with different bits.
    let next = HeaderChainBuilder::after(&batch[0]).bits(HISTORY_BITS).build(1)[0];
    assert_matches!(
        fixture.client.validate_header(&next),
        Err(SpvError::Validation(ValidationError::BadDifficultyBits { .. }))
    );

    let orphan = HeaderChainBuilder::new(900).bits(HISTORY_BITS).build(1)[0];
    assert_matches!(
        fixture.client.validate_header(&orphan),
        Err(SpvError::Validation(ValidationError::MissingAncestor(_)))
    );
}
