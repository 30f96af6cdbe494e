use std::sync::Arc;

use metaheur_core::sampler::{BgaConfig, BiasedGeneticAlgorithm};
use metaheur_core::{DefaultEngine, Engine, StoppingMonitor};
use metaheur_test_functions::Rastrigin;

fn main() {
    env_logger::init();

    let problem = Arc::new(Rastrigin::new(10));

    let config = BgaConfig {
        bias: 0.8,
        elites: 0.25,
        mutants: 0.30,
    };
    let sampler =
        Box::new(BiasedGeneticAlgorithm::with_config(10, 100, 0, config).expect("valid config"));

    let monitor = Box::new(
        StoppingMonitor::new()
            .max_iterations(2_000)
            .target_fitness(1e-6)
            .log_every(100),
    );

    let mut engine =
        DefaultEngine::new("rastrigin-bga", problem, sampler, monitor, 0).expect("valid engine");

    let best = engine.optimize().expect("optimization runs");

    println!(
        "best fitness {:.6e} after {} iterations / {} evaluations",
        engine.best_fitness(),
        engine.iterations(),
        engine.evaluations()
    );
    println!("best point: {best:.4?}");
}
