// instruction dispatch: pure routing from one instruction to the backend,
// with resolved indices and pass-through parameters. no numeric work
// happens here.

use crate::backend::StateBackend;
use crate::error::{EngineError, Result};
use crate::instructions::{HandleKind, Instruction};
use crate::record::ShotRecord;
use crate::resolve::HandleResolver;
use log::trace;
use std::collections::HashMap;

/// Transient per-shot bits: result index -> measured bit.
///
/// Filled by `Measure`, drained by `RecordOutput`. Dropped with the shot;
/// nothing here leaks across shots.
#[derive(Debug, Default)]
pub struct ShotScratch {
    bits: HashMap<usize, u8>,
}

impl ShotScratch {
    pub fn new() -> Self {
        ShotScratch::default()
    }
}

fn check_arity(op: &'static str, expected: usize, params: &[f64]) -> Result<()> {
    if params.len() == expected {
        Ok(())
    } else {
        Err(EngineError::ParamArityMismatch {
            op: op.to_string(),
            expected,
            found: params.len(),
        })
    }
}

/// Route one instruction to the backend.
///
/// Mutates backend state and the shot's scratch; recorder entries appear in
/// instruction order. Any error aborts the shot (the caller decides what a
/// failed shot means for the run).
pub fn dispatch<B: StateBackend>(
    instr: &Instruction,
    backend: &mut B,
    resolver: &HandleResolver,
    scratch: &mut ShotScratch,
    recorder: &mut ShotRecord,
) -> Result<()> {
    match instr {
        Instruction::Allocate { qubit } => {
            let q = resolver.resolve(*qubit, HandleKind::Qubit)?;
            trace!("allocate q{q}");
            backend.allocate(q)
        }
        Instruction::Gate1 { op, params, qubit } => {
            check_arity(op.name(), op.param_arity(), params)?;
            let q = resolver.resolve(*qubit, HandleKind::Qubit)?;
            trace!("{} {:?} q{q}", op.name(), params);
            backend.apply_single(*op, params, q)
        }
        Instruction::Gate2 { op, params, a, b } => {
            check_arity(op.name(), op.param_arity(), params)?;
            let qa = resolver.resolve(*a, HandleKind::Qubit)?;
            let qb = resolver.resolve(*b, HandleKind::Qubit)?;
            trace!("{} {:?} q{qa} q{qb}", op.name(), params);
            backend.apply_two(*op, params, qa, qb)
        }
        Instruction::Measure { qubit, result } => {
            let q = resolver.resolve(*qubit, HandleKind::Qubit)?;
            let r = resolver.resolve(*result, HandleKind::Result)?;
            let bit = backend.measure(q)?;
            trace!("measure q{q} -> r{r} = {bit}");
            scratch.bits.insert(r, bit);
            Ok(())
        }
        Instruction::RecordOutput { result, label } => {
            let r = resolver.resolve(*result, HandleKind::Result)?;
            let bit = *scratch
                .bits
                .get(&r)
                .ok_or(EngineError::UnrecordedResult {
                    result: *result,
                    index: r,
                })?;
            // original engines key unnamed results as measurement_<idx>
            let label = label
                .clone()
                .unwrap_or_else(|| format!("measurement_{r}"));
            trace!("record r{r} as {label} = {bit}");
            recorder.append(label, bit);
            Ok(())
        }
    }
}
