//! Population-based metaheuristics over normalized key vectors.
//!
//! The crate is organized around three contracts:
//!
//! - [`Problem`]: decodes a key vector (coordinates in `[0, 1)`) into a
//!   domain solution and scores it. The optimization goal is folded into
//!   the score, so everything downstream minimizes.
//! - [`Sampler`]: a stateful population operator producing the next
//!   generation from the current one. Implementations:
//!   [`BiasedGeneticAlgorithm`], [`DifferentialEvolution`],
//!   [`ParticleSwarm`], [`RandomSampler`] and
//!   [`CovarianceMatrixAdaptation`].
//! - [`Engine`]: orchestrates the evaluate/sample loop against one
//!   problem. [`DefaultEngine`] is the plain loop; [`RestartEngine`],
//!   [`AlternatingEngine`] and [`IslandEngine`] layer restart,
//!   sampler-alternation and migration policies on top of it.
//!
//! Stopping is entirely delegated to a [`Monitor`]; [`StoppingMonitor`]
//! covers the usual criteria (iteration/evaluation budgets, fitness
//! target, wall-clock limit, stagnation patience).
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use ndarray::ArrayView1;
//! use metaheur_core::{
//!     sampler::BiasedGeneticAlgorithm, DefaultEngine, Engine, Goal, Problem, StoppingMonitor,
//! };
//!
//! struct Sphere;
//!
//! impl Problem for Sphere {
//!     type Solution = Vec<f64>;
//!     fn dimension(&self) -> usize { 5 }
//!     fn goal(&self) -> Goal { Goal::Minimize }
//!     fn decode(&self, keys: ArrayView1<'_, f64>) -> Vec<f64> {
//!         keys.iter().map(|&k| -5.0 + 10.0 * k).collect()
//!     }
//!     fn objective(&self, x: &Vec<f64>) -> f64 {
//!         x.iter().map(|v| v * v).sum()
//!     }
//! }
//!
//! let sampler = Box::new(BiasedGeneticAlgorithm::new(5, 40, 0).unwrap());
//! let monitor = Box::new(StoppingMonitor::new().max_iterations(500));
//! let mut engine =
//!     DefaultEngine::new("sphere", Arc::new(Sphere), sampler, monitor, 0).unwrap();
//! let best = engine.optimize().unwrap();
//! println!("best point: {best:?}");
//! ```

#![warn(missing_docs)]

pub mod engine;
pub mod error;
pub mod math;
pub mod monitor;
pub mod problem;
pub mod sampler;
pub mod snapshot;

pub use engine::alternating::AlternatingEngine;
pub use engine::default::DefaultEngine;
pub use engine::island::IslandEngine;
pub use engine::restart::RestartEngine;
pub use engine::{Engine, EvalConfig};
pub use error::{Error, Result};
pub use monitor::{EngineView, Monitor, StoppingMonitor};
pub use problem::{Goal, Problem, WORST_FITNESS};
pub use sampler::{
    BiasedGeneticAlgorithm, CovarianceMatrixAdaptation, DifferentialEvolution, ParticleSwarm,
    RandomSampler, Sampler, SamplerConfig,
};
pub use snapshot::{
    resume_from, resume_from_path, suspend_to, suspend_to_path, EngineSnapshot, SNAPSHOT_VERSION,
};
