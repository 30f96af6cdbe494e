//! Stopping policy and logging, supplied by the caller.

use std::time::Duration;

use ndarray::ArrayView1;

/// Read-only view of an engine's progress, handed to the monitor once
/// per iteration.
#[derive(Debug)]
pub struct EngineView<'a> {
    /// Engine name, for log attribution.
    pub name: &'a str,
    /// Completed iterations.
    pub iterations: u64,
    /// Objective evaluations so far.
    pub evaluations: u64,
    /// Best folded fitness seen so far.
    pub best_fitness: f64,
    /// Key vector of the best solution seen so far.
    pub best_solution: ArrayView1<'a, f64>,
    /// Wall-clock time since `optimize` started.
    pub elapsed: Duration,
}

/// Decides when an engine stops and where its log lines go.
///
/// Engines have no intrinsic stop criterion: the monitor is polled once
/// per iteration and may stop the run at any poll. There is no
/// preemptive cancellation; an evaluation batch always completes once
/// started.
pub trait Monitor: Send {
    /// Returns `true` to terminate the optimization.
    fn stop(&mut self, view: &EngineView<'_>) -> bool;

    /// Log hook; the default forwards to the `log` crate facade.
    fn log(&self, level: log::Level, engine: &str, message: &str) {
        log::log!(level, "[{engine}] {message}");
    }
}

/// Monitor combining the usual stopping criteria.
///
/// All criteria default to off; any that are set stop the run as soon
/// as they fire. With none set the engine runs forever (useful for
/// island sub-engines, whose monitors are never polled).
#[derive(Debug, Clone)]
pub struct StoppingMonitor {
    max_iterations: Option<u64>,
    max_evaluations: Option<u64>,
    target_fitness: Option<f64>,
    max_duration: Option<Duration>,
    stagnation_patience: Option<u64>,
    log_every: Option<u64>,
    last_best: f64,
    stagnation: u64,
}

impl Default for StoppingMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl StoppingMonitor {
    /// Creates a monitor with every criterion disabled.
    pub fn new() -> Self {
        Self {
            max_iterations: None,
            max_evaluations: None,
            target_fitness: None,
            max_duration: None,
            stagnation_patience: None,
            log_every: None,
            last_best: f64::MAX,
            stagnation: 0,
        }
    }

    /// Stops after `n` iterations.
    pub fn max_iterations(mut self, n: u64) -> Self {
        self.max_iterations = Some(n);
        self
    }

    /// Stops after `n` objective evaluations.
    pub fn max_evaluations(mut self, n: u64) -> Self {
        self.max_evaluations = Some(n);
        self
    }

    /// Stops once the best folded fitness reaches `target` or below.
    pub fn target_fitness(mut self, target: f64) -> Self {
        self.target_fitness = Some(target);
        self
    }

    /// Stops once the run has lasted `limit` of wall-clock time.
    pub fn max_duration(mut self, limit: Duration) -> Self {
        self.max_duration = Some(limit);
        self
    }

    /// Stops after `n` consecutive iterations without strict
    /// improvement of the best fitness.
    pub fn stagnation_patience(mut self, n: u64) -> Self {
        self.stagnation_patience = Some(n);
        self
    }

    /// Reports progress at info level every `n` iterations.
    pub fn log_every(mut self, n: u64) -> Self {
        self.log_every = Some(n);
        self
    }
}

impl Monitor for StoppingMonitor {
    fn stop(&mut self, view: &EngineView<'_>) -> bool {
        if view.best_fitness < self.last_best {
            self.last_best = view.best_fitness;
            self.stagnation = 0;
        } else {
            self.stagnation += 1;
        }

        if let Some(every) = self.log_every {
            if every > 0 && view.iterations % every == 0 {
                self.log(
                    log::Level::Info,
                    view.name,
                    &format!(
                        "iteration [{}] best fitness [{:.6e}] evaluations [{}]",
                        view.iterations, view.best_fitness, view.evaluations
                    ),
                );
            }
        }

        self.max_iterations.is_some_and(|n| view.iterations >= n)
            || self.max_evaluations.is_some_and(|n| view.evaluations >= n)
            || self.target_fitness.is_some_and(|t| view.best_fitness <= t)
            || self.max_duration.is_some_and(|d| view.elapsed >= d)
            || self.stagnation_patience.is_some_and(|n| self.stagnation >= n)
    }
}
