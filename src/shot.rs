// single shot execution: one full pass over the instruction sequence
// against one exclusively-owned backend instance.

use crate::backend::StateBackend;
use crate::dispatch::{dispatch, ShotScratch};
use crate::error::Result;
use crate::instructions::Program;
use crate::record::ShotRecord;
use log::debug;

// Fresh -> Running -> Completed; there is no failed terminal state here.
// an error aborts the shot and propagates to the aggregator, which decides
// what it means for the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShotPhase {
    Fresh,
    Running,
    Completed,
}

/// Executes one shot over a backend it exclusively owns.
pub struct ShotExecutor<B: StateBackend> {
    backend: B,
    phase: ShotPhase,
}

impl<B: StateBackend> ShotExecutor<B> {
    pub fn new(backend: B) -> Self {
        ShotExecutor {
            backend,
            phase: ShotPhase::Fresh,
        }
    }

    /// Run the full instruction sequence, sealing and returning the shot's
    /// record on success. Taking `self` by value makes the executor
    /// single-use; the phase only tracks progress within this call.
    pub fn run(mut self, program: &Program) -> Result<ShotRecord> {
        debug_assert_eq!(self.phase, ShotPhase::Fresh);
        self.phase = ShotPhase::Running;

        // reset up front so recycled backend instances still start fresh
        self.backend.reset()?;

        let resolver = program.resolver();
        let mut scratch = ShotScratch::new();
        let mut record = ShotRecord::new();

        for instr in program.instructions() {
            dispatch(instr, &mut self.backend, resolver, &mut scratch, &mut record)?;
        }

        self.phase = ShotPhase::Completed;
        debug!("shot completed with {} recorded output(s)", record.len());
        Ok(record)
    }
}
