//! Cross-component contracts: engines driving real samplers
//! end-to-end on small in-crate problems.

use std::sync::Arc;

use metaheur_core::sampler::{
    BiasedGeneticAlgorithm, CovarianceMatrixAdaptation, DifferentialEvolution, ParticleSwarm,
    Sampler,
};
use metaheur_core::{
    AlternatingEngine, DefaultEngine, Engine, Error, Goal, IslandEngine, Problem, RestartEngine,
    StoppingMonitor,
};
use ndarray::ArrayView1;

/// Sphere in key space, optimum at 0.5 in every coordinate.
struct KeySphere {
    d: usize,
}

impl Problem for KeySphere {
    type Solution = Vec<f64>;

    fn dimension(&self) -> usize {
        self.d
    }

    fn goal(&self) -> Goal {
        Goal::Minimize
    }

    fn decode(&self, keys: ArrayView1<'_, f64>) -> Vec<f64> {
        keys.iter().map(|&k| k - 0.5).collect()
    }

    fn objective(&self, x: &Vec<f64>) -> f64 {
        x.iter().map(|v| v * v).sum()
    }
}

struct NanProblem;

impl Problem for NanProblem {
    type Solution = Vec<f64>;

    fn dimension(&self) -> usize {
        2
    }

    fn decode(&self, keys: ArrayView1<'_, f64>) -> Vec<f64> {
        keys.to_vec()
    }

    fn objective(&self, _x: &Vec<f64>) -> f64 {
        f64::NAN
    }
}

#[test]
fn nan_objective_aborts_the_run() {
    let sampler = Box::new(BiasedGeneticAlgorithm::new(2, 10, 0).unwrap());
    let monitor = Box::new(StoppingMonitor::new().max_iterations(10));
    let mut engine = DefaultEngine::new("nan", Arc::new(NanProblem), sampler, monitor, 0).unwrap();
    let result = engine.optimize();
    assert!(matches!(result, Err(Error::NanObjective { .. })));
}

#[test]
fn each_sampler_drives_a_default_engine() {
    let samplers: Vec<(&str, Box<dyn Sampler>)> = vec![
        ("bga", Box::new(BiasedGeneticAlgorithm::new(4, 20, 0).unwrap())),
        ("de", Box::new(DifferentialEvolution::new(4, 20, 0).unwrap())),
        ("pso", Box::new(ParticleSwarm::new(4, 20, 0).unwrap())),
        (
            "cmaes",
            Box::new(CovarianceMatrixAdaptation::new(4, 20, 0).unwrap()),
        ),
    ];
    for (name, sampler) in samplers {
        let monitor = Box::new(StoppingMonitor::new().max_iterations(60));
        let mut engine =
            DefaultEngine::new(name, Arc::new(KeySphere { d: 4 }), sampler, monitor, 0).unwrap();
        let initial = {
            engine.begin();
            engine.update_fitness().unwrap();
            engine.best_fitness()
        };
        engine.optimize().unwrap();
        assert!(
            engine.best_fitness() <= initial,
            "{name}: best fitness regressed"
        );
        assert!(engine.best_fitness() < 0.5, "{name}: no progress made");
    }
}

#[test]
fn restart_engine_survives_cmaes_convergence() {
    let sampler = Box::new(CovarianceMatrixAdaptation::new(3, 12, 0).unwrap());
    let monitor = Box::new(StoppingMonitor::new().max_iterations(80));
    let mut engine = RestartEngine::new(
        "restart-cmaes",
        Arc::new(KeySphere { d: 3 }),
        sampler,
        monitor,
        10,
        0,
    )
    .unwrap();
    engine.optimize().unwrap();
    assert_eq!(engine.iterations(), 80);
    assert!(engine.best_fitness() < 0.5);
}

#[test]
fn alternating_engine_runs_through_its_pool() {
    let samplers: Vec<Box<dyn Sampler>> = vec![
        Box::new(BiasedGeneticAlgorithm::new(4, 16, 0).unwrap()),
        Box::new(DifferentialEvolution::new(4, 16, 1).unwrap()),
        Box::new(ParticleSwarm::new(4, 16, 2).unwrap()),
    ];
    let monitor = Box::new(StoppingMonitor::new().max_iterations(100));
    let mut engine = AlternatingEngine::new(
        "alternating",
        Arc::new(KeySphere { d: 4 }),
        samplers,
        monitor,
        5,
        0,
    )
    .unwrap();
    engine.optimize().unwrap();
    assert_eq!(engine.iterations(), 100);
    assert!(engine.best_fitness() < 0.5);
}

#[test]
fn island_engine_aggregates_its_islands() {
    let problem = Arc::new(KeySphere { d: 4 });
    let samplers: Vec<Box<dyn Sampler>> = vec![
        Box::new(BiasedGeneticAlgorithm::new(4, 12, 0).unwrap()),
        Box::new(DifferentialEvolution::new(4, 12, 1).unwrap()),
        Box::new(ParticleSwarm::new(4, 12, 2).unwrap()),
    ];
    let islands = IslandEngine::islands_of(&problem, samplers, 100).unwrap();
    let monitor = Box::new(StoppingMonitor::new().max_iterations(40));
    let mut engine = IslandEngine::new("islands", problem, islands, monitor, 4, 0).unwrap();
    engine.optimize().unwrap();

    let min_island = (0..engine.island_count())
        .map(|i| engine.island(i).best_fitness())
        .fold(f64::MAX, f64::min);
    assert_eq!(engine.best_fitness(), min_island);
    assert!(engine.best_fitness() < 0.5);
}

#[test]
fn maximize_goal_is_folded_for_samplers() {
    /// Maximizing the negated sphere is the same search as minimizing
    /// the sphere; the engine reports the folded (negated) fitness.
    struct NegatedSphere;

    impl Problem for NegatedSphere {
        type Solution = Vec<f64>;
        fn dimension(&self) -> usize {
            3
        }
        fn goal(&self) -> Goal {
            Goal::Maximize
        }
        fn decode(&self, keys: ArrayView1<'_, f64>) -> Vec<f64> {
            keys.iter().map(|&k| k - 0.5).collect()
        }
        fn objective(&self, x: &Vec<f64>) -> f64 {
            -x.iter().map(|v| v * v).sum::<f64>()
        }
    }

    let sampler = Box::new(BiasedGeneticAlgorithm::new(3, 20, 0).unwrap());
    let monitor = Box::new(StoppingMonitor::new().max_iterations(60));
    let mut engine =
        DefaultEngine::new("max", Arc::new(NegatedSphere), sampler, monitor, 0).unwrap();
    let best = engine.optimize().unwrap();
    // Folded fitness is minimize-scale: near zero from above.
    assert!(engine.best_fitness() >= 0.0);
    assert!(engine.best_fitness() < 0.3);
    assert!(best.iter().all(|v| v.abs() < 0.6));
}
