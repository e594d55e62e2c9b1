//! State backend capability contract.
//!
//! The engine drives any quantum state representation (state-vector,
//! stabilizer tableau, density matrix, ...) through this fixed interface
//! and nothing else. How a gate is applied numerically, and what
//! measurement collapse means, is owned by the backend.

use crate::error::Result;
use crate::instructions::{SingleQubitOp, TwoQubitOp};

/// Capability set required of any concrete quantum state backend.
///
/// Indices are dense zero-based register indices produced by the handle
/// resolver, never raw handle values. After `allocate(i)` the backend has a
/// defined state for qubit `i`. `measure` collapses (or destroys) per the
/// backend's own semantics and returns the sampled bit.
pub trait StateBackend {
    fn allocate(&mut self, index: usize) -> Result<()>;

    fn apply_single(&mut self, op: SingleQubitOp, params: &[f64], index: usize) -> Result<()>;

    fn apply_two(
        &mut self,
        op: TwoQubitOp,
        params: &[f64],
        index_a: usize,
        index_b: usize,
    ) -> Result<()>;

    fn measure(&mut self, index: usize) -> Result<u8>;

    /// Return the backend to its initial state. Called at the start of
    /// every shot, so recycled instances still give fresh-state semantics.
    fn reset(&mut self) -> Result<()>;
}

/// Per-shot identity handed to the backend factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShotSeed {
    /// Shot index within the run, `0..shot_count`.
    pub shot: usize,
    /// Engine-derived sub-seed for this shot; `None` when the run is
    /// unseeded. Backends that sample randomness should consume it so runs
    /// reproduce under a fixed master seed.
    pub seed: Option<u64>,
}

/// Constructs one backend instance per shot.
///
/// The instance is exclusively owned by that shot's executor and dropped
/// when the shot completes or aborts; no instance is shared across shots.
pub trait BackendFactory: Send + Sync {
    type Backend: StateBackend;

    fn create(&self, shot: ShotSeed) -> Result<Self::Backend>;
}

// closures double as factories, which keeps test and bench setup short
impl<B, F> BackendFactory for F
where
    B: StateBackend,
    F: Fn(ShotSeed) -> Result<B> + Send + Sync,
{
    type Backend = B;

    fn create(&self, shot: ShotSeed) -> Result<B> {
        self(shot)
    }
}
