pub mod backend; // state backend capability contract + per-shot factory
pub mod dispatch; // instruction -> backend routing
pub mod error; // error taxonomy
pub mod instructions; // instruction / handle data model
pub mod record; // per-shot records and the run ensemble
pub mod resolve; // opaque handle -> dense index resolver
pub mod run; // run configuration and shot aggregation
pub mod shot; // single shot executor
pub mod stats; // ensemble measurement statistics

pub use backend::{BackendFactory, ShotSeed, StateBackend};
pub use error::{EngineError, ErrorCategory, Result};
pub use instructions::{Handle, HandleKind, Instruction, Program, SingleQubitOp, TwoQubitOp};
pub use record::{Ensemble, ShotRecord, ShotSlot};
pub use resolve::HandleResolver;
pub use run::{CancelToken, RunConfig, Runner};
pub use stats::{BitStats, MeasurementStatistics};
