//! Versioned engine snapshots for suspend/resume.
//!
//! An [`EngineSnapshot`] is an explicit plain-data record enumerating
//! every piece of adaptive state an engine carries: populations,
//! fitness, best-so-far tracking, counters, full sampler state and
//! every RNG stream. Restoring reattaches the live `Problem` and
//! `Monitor` capabilities (which are not data) and continues the run
//! bit-identically. Wall-clock elapsed time restarts on resume.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::sync::Arc;

use ndarray::{Array1, Array2};
use rand_chacha::ChaCha12Rng;
use serde::{Deserialize, Serialize};

use crate::engine::alternating::AlternatingEngine;
use crate::engine::default::DefaultEngine;
use crate::engine::island::IslandEngine;
use crate::engine::restart::RestartEngine;
use crate::engine::{Engine, EvalConfig};
use crate::error::{Error, Result};
use crate::monitor::{Monitor, StoppingMonitor};
use crate::problem::Problem;
use crate::sampler::{Sampler, SamplerSnapshot};

/// Version written into every snapshot; bumped on layout changes.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Top-level snapshot record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSnapshot {
    /// Snapshot layout version.
    pub version: u32,
    /// The engine state tree.
    pub engine: EngineState,
}

/// State of one engine, one variant per engine kind. Composite engines
/// nest the states of what they compose.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum EngineState {
    /// Plain evaluate/sample loop.
    Default(DefaultEngineState),
    /// Restart policy around a default engine.
    Restart {
        /// The wrapped engine's state.
        inner: DefaultEngineState,
        /// Base stagnation patience.
        threshold: u64,
        /// Iterations since the last improvement.
        stagnation: u64,
        /// Cumulative stagnation.
        total_stagnation: u64,
    },
    /// Alternation policy around a default engine.
    Alternating {
        /// The wrapped engine's state (holding the active sampler).
        inner: DefaultEngineState,
        /// Inactive pool samplers; the active slot is `None`.
        pool: Vec<Option<SamplerSnapshot>>,
        /// Index of the active sampler.
        active: usize,
        /// Stagnation patience.
        threshold: u64,
        /// Iterations since the last improvement.
        stagnation: u64,
    },
    /// Island composition.
    Island {
        /// Engine name.
        name: String,
        /// Best key vector seen across islands.
        best_solution: Vec<f64>,
        /// Best folded fitness seen across islands.
        best_fitness: f64,
        /// Top-level iterations.
        iterations: u64,
        /// Summed island evaluations.
        evaluations: u64,
        /// Migration cadence.
        migration_interval: u64,
        /// Migration RNG stream.
        rng: ChaCha12Rng,
        /// States of the composed islands.
        islands: Vec<EngineState>,
    },
}

/// Complete state of a [`DefaultEngine`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultEngineState {
    /// Engine name.
    pub name: String,
    /// Current population.
    pub population: Array2<f64>,
    /// Fitness of the current population.
    pub fitness: Array1<f64>,
    /// Best key vector seen so far.
    pub best_solution: Vec<f64>,
    /// Best folded fitness seen so far.
    pub best_fitness: f64,
    /// Completed iterations.
    pub iterations: u64,
    /// Objective evaluations so far.
    pub evaluations: u64,
    /// Evaluation batch configuration.
    pub eval: EvalConfig,
    /// Engine RNG stream (arrival slot selection).
    pub rng: ChaCha12Rng,
    /// Full sampler state.
    pub sampler: SamplerSnapshot,
}

/// Writes a versioned snapshot of `engine` to `writer`.
pub fn suspend_to<P: Problem, W: Write>(engine: &dyn Engine<P>, writer: W) -> Result<()> {
    let mut writer = writer;
    serde_json::to_writer(&mut writer, &engine.snapshot())?;
    writer.flush()?;
    Ok(())
}

/// Writes a versioned snapshot of `engine` to a file.
pub fn suspend_to_path<P: Problem>(engine: &dyn Engine<P>, path: impl AsRef<Path>) -> Result<()> {
    let file = File::create(path)?;
    suspend_to(engine, BufWriter::new(file))
}

/// Restores an engine from a snapshot stream, reattaching the live
/// problem and monitor.
///
/// Sub-engines of a restored island engine get silent monitors; only
/// the top-level monitor is consulted during `optimize`.
pub fn resume_from<P: Problem + 'static, R: Read>(
    reader: R,
    problem: Arc<P>,
    monitor: Box<dyn Monitor>,
) -> Result<Box<dyn Engine<P>>> {
    let snapshot: EngineSnapshot = serde_json::from_reader(reader)?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(Error::SnapshotVersion {
            expected: SNAPSHOT_VERSION,
            got: snapshot.version,
        });
    }
    restore_state(snapshot.engine, problem, monitor)
}

/// Restores an engine from a snapshot file.
pub fn resume_from_path<P: Problem + 'static>(
    path: impl AsRef<Path>,
    problem: Arc<P>,
    monitor: Box<dyn Monitor>,
) -> Result<Box<dyn Engine<P>>> {
    let file = File::open(path)?;
    resume_from(BufReader::new(file), problem, monitor)
}

fn restore_state<P: Problem + 'static>(
    state: EngineState,
    problem: Arc<P>,
    monitor: Box<dyn Monitor>,
) -> Result<Box<dyn Engine<P>>> {
    Ok(match state {
        EngineState::Default(inner) => {
            Box::new(DefaultEngine::restore_parts(inner, problem, monitor)?)
        }
        EngineState::Restart {
            inner,
            threshold,
            stagnation,
            total_stagnation,
        } => Box::new(RestartEngine::restore_parts(
            inner,
            threshold,
            stagnation,
            total_stagnation,
            problem,
            monitor,
        )?),
        EngineState::Alternating {
            inner,
            pool,
            active,
            threshold,
            stagnation,
        } => {
            let engine = DefaultEngine::restore_parts(inner, problem, monitor)?;
            let pool: Vec<Option<Box<dyn Sampler>>> = pool
                .into_iter()
                .map(|slot| slot.map(SamplerSnapshot::restore))
                .collect();
            Box::new(AlternatingEngine::restore_parts(
                engine, pool, active, threshold, stagnation,
            ))
        }
        EngineState::Island {
            name,
            best_solution,
            best_fitness,
            iterations,
            evaluations,
            migration_interval,
            rng,
            islands,
        } => {
            let islands = islands
                .into_iter()
                .map(|island| {
                    restore_state(island, problem.clone(), Box::new(StoppingMonitor::new()))
                })
                .collect::<Result<Vec<_>>>()?;
            Box::new(IslandEngine::restore_parts(
                name,
                problem,
                islands,
                monitor,
                migration_interval,
                rng,
                best_solution,
                best_fitness,
                iterations,
                evaluations,
            ))
        }
    })
}
