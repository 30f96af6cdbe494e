use std::sync::Arc;

use metaheur_core::sampler::{
    BiasedGeneticAlgorithm, CovarianceMatrixAdaptation, DifferentialEvolution, ParticleSwarm,
    Sampler,
};
use metaheur_core::{Engine, IslandEngine, StoppingMonitor};
use metaheur_test_functions::Rastrigin;

fn main() {
    env_logger::init();

    let dimensions = 20;
    let problem = Arc::new(Rastrigin::new(dimensions));

    // One island per operator family; CMA-ES keeps a closed border.
    let samplers: Vec<Box<dyn Sampler>> = vec![
        Box::new(DifferentialEvolution::new(dimensions, 30, 0).expect("valid sampler")),
        Box::new(BiasedGeneticAlgorithm::new(dimensions, 30, 1).expect("valid sampler")),
        Box::new(ParticleSwarm::new(dimensions, 30, 2).expect("valid sampler")),
        Box::new(CovarianceMatrixAdaptation::new(dimensions, 30, 3).expect("valid sampler")),
    ];

    let islands = IslandEngine::islands_of(&problem, samplers, 100).expect("valid islands");
    let monitor = Box::new(StoppingMonitor::new().max_iterations(1_000).log_every(50));

    let mut engine =
        IslandEngine::new("rastrigin-islands", problem, islands, monitor, 10, 0)
            .expect("valid engine");

    let best = engine.optimize().expect("optimization runs");

    for i in 0..engine.island_count() {
        println!(
            "{}: best fitness {:.6e}",
            engine.island(i).name(),
            engine.island(i).best_fitness()
        );
    }
    println!(
        "global best {:.6e} after {} iterations",
        engine.best_fitness(),
        engine.iterations()
    );
    println!("best point: {best:.4?}");
}
