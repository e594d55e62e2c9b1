// run aggregation: drives N independent shots, sequentially or across a
// rayon worker pool, and collects every outcome into a slot table indexed
// by shot number.

use crate::backend::{BackendFactory, ShotSeed};
use crate::error::{EngineError, Result};
use crate::instructions::Program;
use crate::record::{Ensemble, ShotSlot};
use crate::shot::ShotExecutor;
use log::{debug, info};
use parking_lot::Mutex;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Run options, validated before any backend is constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Number of shots to execute; must be > 0.
    pub shots: usize,
    /// Master seed for reproducible randomness. Each shot receives a
    /// sub-seed derived from it; `None` leaves backends unseeded.
    pub seed: Option<u64>,
    /// Number of concurrent shot workers; must be >= 1. 1 runs shots
    /// inline on the calling thread.
    pub workers: usize,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            shots: 1,
            seed: None,
            workers: 1,
        }
    }
}

impl RunConfig {
    pub fn new(shots: usize) -> Self {
        RunConfig {
            shots,
            ..RunConfig::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// One worker per available core.
    pub fn all_cores(mut self) -> Self {
        self.workers = num_cpus::get().max(1);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.shots == 0 {
            return Err(EngineError::Configuration(
                "shot count must be greater than zero".into(),
            ));
        }
        if self.workers == 0 {
            return Err(EngineError::Configuration(
                "worker count must be at least one".into(),
            ));
        }
        Ok(())
    }
}

/// Clonable cancellation flag for an in-progress run.
///
/// After `cancel()` no new shot is dispatched; shots already started finish
/// or fail on their own. Untouched slots stay `NotRun`, so a cancelled
/// ensemble is distinguishable from a complete one.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Drives a configured number of shots and aggregates their outcomes.
///
/// Per-shot errors never abort the run: they land in the failing shot's
/// slot with their category intact, so a partially failed run stays
/// inspectable shot by shot.
///
/// Cancellation is sticky: the token belongs to the runner, not to one
/// `run` call, so a cancelled runner is spent — later runs on it also
/// dispatch nothing. Build a fresh `Runner` for a fresh run.
#[derive(Debug)]
pub struct Runner {
    config: RunConfig,
    cancel: CancelToken,
}

impl Runner {
    /// Fails fast with a `Configuration` error before any shot starts.
    pub fn new(config: RunConfig) -> Result<Self> {
        config.validate()?;
        Ok(Runner {
            config,
            cancel: CancelToken::default(),
        })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Execute the run. The returned ensemble has one slot per requested
    /// shot, written by shot index regardless of completion order.
    pub fn run<F: BackendFactory>(&self, program: &Program, factory: &F) -> Result<Ensemble> {
        let shots = self.config.shots;
        info!(
            "starting run: {} shot(s), {} worker(s), seed {:?}",
            shots, self.config.workers, self.config.seed
        );

        let seeds = shot_seeds(self.config.seed, shots);

        let slots = if self.config.workers == 1 {
            self.run_sequential(program, factory, &seeds)
        } else {
            self.run_parallel(program, factory, &seeds)?
        };

        let ensemble = Ensemble::from_slots(shots, slots);
        info!(
            "run finished: {} completed, {} failed, complete={}",
            ensemble.completed(),
            ensemble.failed(),
            ensemble.is_complete()
        );
        Ok(ensemble)
    }

    fn run_sequential<F: BackendFactory>(
        &self,
        program: &Program,
        factory: &F,
        seeds: &[Option<u64>],
    ) -> Vec<ShotSlot> {
        let mut slots = vec![ShotSlot::NotRun; seeds.len()];
        for (shot, seed) in seeds.iter().enumerate() {
            if self.cancel.is_cancelled() {
                debug!("run cancelled before shot {shot}");
                break;
            }
            slots[shot] = run_one(program, factory, shot, *seed);
        }
        slots
    }

    fn run_parallel<F: BackendFactory>(
        &self,
        program: &Program,
        factory: &F,
        seeds: &[Option<u64>],
    ) -> Result<Vec<ShotSlot>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.workers)
            .build()
            .map_err(|e| EngineError::Configuration(format!("worker pool: {e}")))?;

        let slots = Mutex::new(vec![ShotSlot::NotRun; seeds.len()]);
        pool.install(|| {
            seeds.par_iter().enumerate().for_each(|(shot, seed)| {
                if self.cancel.is_cancelled() {
                    return; // slot stays NotRun
                }
                let outcome = run_one(program, factory, shot, *seed);
                // each slot is written exactly once, by its own shot
                slots.lock()[shot] = outcome;
            });
        });
        Ok(slots.into_inner())
    }
}

// one shot, fresh backend, error captured rather than propagated
fn run_one<F: BackendFactory>(
    program: &Program,
    factory: &F,
    shot: usize,
    seed: Option<u64>,
) -> ShotSlot {
    debug!("starting shot {shot}");
    let backend = match factory.create(ShotSeed { shot, seed }) {
        Ok(backend) => backend,
        Err(err) => {
            debug!("shot {shot}: backend construction failed: {err}");
            return ShotSlot::Failed(err);
        }
    };
    match ShotExecutor::new(backend).run(program) {
        Ok(record) => ShotSlot::Completed(record),
        Err(err) => {
            debug!("shot {shot} failed: {err}");
            ShotSlot::Failed(err)
        }
    }
}

// per-shot sub-seed stream, derived up front so sequential and parallel
// runs hand every shot the same seed
fn shot_seeds(master: Option<u64>, shots: usize) -> Vec<Option<u64>> {
    match master {
        Some(seed) => {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            (0..shots).map(|_| Some(rng.next_u64())).collect()
        }
        None => vec![None; shots],
    }
}
