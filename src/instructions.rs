// all instructions understood by the execution engine.
//
// a module arrives here already parsed and validated; instruction order is
// significant and is preserved exactly as authored. handles are opaque
// tokens (frontends hand us pointer-like integers, reused across
// instructions) and are never usable as register indices directly.

use crate::resolve::HandleResolver;
use serde::{Deserialize, Serialize};

/// Opaque identifier for a qubit or a classical result slot.
///
/// Two handles are equal iff they denote the same logical qubit/result.
/// Values are arbitrary: not contiguous, not zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Handle(u64);

impl Handle {
    pub fn from_raw(raw: u64) -> Self {
        Handle(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

/// Which register file a handle lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    Qubit,
    Result,
}

/// Single-qubit operation ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SingleQubitOp {
    H,
    X,
    Y,
    Z,
    SqrtX,
    Rz,   // theta
    R1xy, // phi, theta
}

impl SingleQubitOp {
    // number of angle parameters the op carries
    pub fn param_arity(self) -> usize {
        match self {
            SingleQubitOp::H
            | SingleQubitOp::X
            | SingleQubitOp::Y
            | SingleQubitOp::Z
            | SingleQubitOp::SqrtX => 0,
            SingleQubitOp::Rz => 1,
            SingleQubitOp::R1xy => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SingleQubitOp::H => "H",
            SingleQubitOp::X => "X",
            SingleQubitOp::Y => "Y",
            SingleQubitOp::Z => "Z",
            SingleQubitOp::SqrtX => "SX",
            SingleQubitOp::Rz => "RZ",
            SingleQubitOp::R1xy => "R1XY",
        }
    }
}

/// Two-qubit operation ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TwoQubitOp {
    Cx,
    Cz,
    Szz,
    Rzz, // theta
}

impl TwoQubitOp {
    pub fn param_arity(self) -> usize {
        match self {
            TwoQubitOp::Cx | TwoQubitOp::Cz | TwoQubitOp::Szz => 0,
            TwoQubitOp::Rzz => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TwoQubitOp::Cx => "CX",
            TwoQubitOp::Cz => "CZ",
            TwoQubitOp::Szz => "SZZ",
            TwoQubitOp::Rzz => "RZZ",
        }
    }
}

/// One instruction of a quantum program module.
///
/// Immutable once loaded into a [`Program`]. Angle parameters are passed
/// through to the backend unchanged; the engine performs no unit
/// conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Instruction {
    Allocate {
        qubit: Handle,
    },
    Gate1 {
        op: SingleQubitOp,
        params: Vec<f64>,
        qubit: Handle,
    },
    Gate2 {
        op: TwoQubitOp,
        params: Vec<f64>,
        a: Handle,
        b: Handle,
    },
    Measure {
        qubit: Handle,
        result: Handle,
    },
    RecordOutput {
        result: Handle,
        label: Option<String>,
    },
}

/// A loaded instruction module: the ordered instruction sequence plus the
/// handle->index mapping built by a pre-scan at load time.
///
/// The pre-scan (rather than lazy first-use population) guarantees every
/// shot observes the identical mapping without any locking, which is what
/// makes parallel shot execution safe.
pub struct Program {
    instructions: Vec<Instruction>,
    resolver: HandleResolver,
}

impl Program {
    /// Load a parsed instruction sequence, assigning dense indices to every
    /// distinct handle in order of first appearance.
    pub fn load(instructions: Vec<Instruction>) -> crate::Result<Self> {
        let mut resolver = HandleResolver::new();
        for instr in &instructions {
            match instr {
                Instruction::Allocate { qubit } => {
                    resolver.assign(*qubit, HandleKind::Qubit)?;
                }
                Instruction::Gate1 { qubit, .. } => {
                    resolver.assign(*qubit, HandleKind::Qubit)?;
                }
                Instruction::Gate2 { a, b, .. } => {
                    resolver.assign(*a, HandleKind::Qubit)?;
                    resolver.assign(*b, HandleKind::Qubit)?;
                }
                Instruction::Measure { qubit, result } => {
                    resolver.assign(*qubit, HandleKind::Qubit)?;
                    resolver.assign(*result, HandleKind::Result)?;
                }
                Instruction::RecordOutput { result, .. } => {
                    resolver.assign(*result, HandleKind::Result)?;
                }
            }
        }
        log::debug!(
            "loaded module: {} instructions, {} qubits, {} results",
            instructions.len(),
            resolver.count(HandleKind::Qubit),
            resolver.count(HandleKind::Result)
        );
        Ok(Program {
            instructions,
            resolver,
        })
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn resolver(&self) -> &HandleResolver {
        &self.resolver
    }

    pub fn qubit_count(&self) -> usize {
        self.resolver.count(HandleKind::Qubit)
    }

    pub fn result_count(&self) -> usize {
        self.resolver.count(HandleKind::Result)
    }
}
