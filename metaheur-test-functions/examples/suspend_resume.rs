use std::sync::Arc;

use metaheur_core::sampler::DifferentialEvolution;
use metaheur_core::{
    resume_from_path, suspend_to_path, DefaultEngine, Engine, Monitor, StoppingMonitor,
};
use metaheur_test_functions::Schwefel;

fn main() {
    env_logger::init();

    let dimensions = 8;
    let path = std::env::temp_dir().join("metaheur-suspend-demo.json");

    // Phase one: run a fixed budget, then suspend to disk.
    let sampler = Box::new(DifferentialEvolution::new(dimensions, 40, 7).expect("valid sampler"));
    let monitor = Box::new(StoppingMonitor::new().max_iterations(200));
    let mut engine = DefaultEngine::new(
        "schwefel-de",
        Arc::new(Schwefel::new(dimensions)),
        sampler,
        monitor,
        7,
    )
    .expect("valid engine");
    engine.optimize().expect("first phase runs");
    println!(
        "suspending at iteration {} with best {:.6e}",
        engine.iterations(),
        engine.best_fitness()
    );
    suspend_to_path(&engine, &path).expect("snapshot written");
    drop(engine);

    // Phase two: restore with a fresh monitor and keep optimizing. The
    // RNG streams and all sampler state resume exactly where they
    // stopped.
    let monitor =
        Box::new(StoppingMonitor::new().max_iterations(600).log_every(100)) as Box<dyn Monitor>;
    let mut resumed =
        resume_from_path(&path, Arc::new(Schwefel::new(dimensions)), monitor).expect("resume");
    let best = resumed.optimize().expect("second phase runs");

    println!(
        "resumed run finished at iteration {} with best {:.6e}",
        resumed.iterations(),
        resumed.best_fitness()
    );
    println!("best point: {best:.4?}");
}
