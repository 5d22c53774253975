//! Chain parameters and checkpoints.

pub mod checkpoints;
pub mod params;

pub use checkpoints::Checkpoint;
pub use params::DifficultyParams;
