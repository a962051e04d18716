use gasweep::engines::evaluation::Objective;
use gasweep::engines::experiment::ExperimentRunner;
use gasweep::engines::generation::{GeneticAlgorithm, Optimizer, OptimizerOutcome};
use gasweep::engines::sweep::{CancellationToken, ParameterGrid, SweepDriver, SweepRunner};
use gasweep::error::{Result, SweepError};
use gasweep::types::{
    ExperimentParameterSet, GenotypeSpace, OptimizationGoal, UserInputs,
};
use rand::rngs::StdRng;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

fn small_grid() -> ParameterGrid {
    ParameterGrid::new(vec![10, 20], vec![0.6], vec![0.01, 0.1], vec![50]).unwrap()
}

fn default_inputs(objective: Objective) -> UserInputs {
    UserInputs {
        space: GenotypeSpace::from_decimal_places(3, -4.0, 12.0).unwrap(),
        population_size: 10,
        generations: 50,
        crossover_probability: 0.6,
        mutation_probability: 0.01,
        elitism: true,
        objective,
        goal: OptimizationGoal::Max,
    }
}

fn driver_with(optimizer: Arc<dyn Optimizer>, grid: ParameterGrid, repetitions: usize) -> SweepDriver {
    let runner = ExperimentRunner::new(optimizer).with_repetitions(repetitions);
    SweepDriver::new(grid, default_inputs(Objective::parse("x").unwrap()), runner)
}

/// Sleeps inside every run and records how many runs overlap
struct SlowOptimizer {
    active: AtomicUsize,
    max_active: AtomicUsize,
    delay: Duration,
}

impl SlowOptimizer {
    fn new(delay: Duration) -> Self {
        Self {
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            delay,
        }
    }
}

impl Optimizer for SlowOptimizer {
    fn run(&self, inputs: &UserInputs, rng: &mut StdRng) -> Result<OptimizerOutcome> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        thread::sleep(self.delay);
        let outcome = GeneticAlgorithm::new().run(inputs, rng);
        self.active.fetch_sub(1, Ordering::SeqCst);
        outcome
    }
}

/// Fails for one population size and panics for another
struct FaultyOptimizer;

impl Optimizer for FaultyOptimizer {
    fn run(&self, inputs: &UserInputs, rng: &mut StdRng) -> Result<OptimizerOutcome> {
        match inputs.population_size {
            20 => Err(SweepError::Optimizer("objective raised".to_string())),
            30 => panic!("optimizer blew up"),
            _ => GeneticAlgorithm::new().run(inputs, rng),
        }
    }
}

fn collect_progress() -> (
    Arc<Mutex<Vec<(ExperimentParameterSet, f64)>>>,
    impl Fn(ExperimentParameterSet, f64) + Send + Sync + 'static,
) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink_events = Arc::clone(&events);
    (events, move |set, value| {
        sink_events.lock().unwrap().push((set, value));
    })
}

#[test]
fn test_enumeration_is_complete_and_unique() {
    let driver = driver_with(Arc::new(GeneticAlgorithm::new()), small_grid(), 1);
    assert_eq!(driver.total_combinations(), 4);

    let sets: Vec<_> = driver.get_all_parameter_sets(0).collect();
    assert_eq!(sets.len(), 4);

    let keys: HashSet<String> = sets.iter().map(|s| s.to_string()).collect();
    assert_eq!(keys.len(), 4);
    for n in [10, 20] {
        for pm in [0.01, 0.1] {
            assert!(sets.contains(&ExperimentParameterSet::new(n, 0.6, pm, 50)));
        }
    }
}

#[test]
fn test_enumeration_resumes_from_skip() {
    let driver = driver_with(Arc::new(GeneticAlgorithm::new()), small_grid(), 1);
    let all: Vec<_> = driver.get_all_parameter_sets(0).collect();
    let resumed: Vec<_> = driver.get_all_parameter_sets(2).collect();
    assert_eq!(resumed, all[2..].to_vec());
}

#[test]
fn test_user_input_keeps_defaults() {
    let driver = driver_with(Arc::new(GeneticAlgorithm::new()), small_grid(), 1);
    let set = ExperimentParameterSet::new(77, 0.33, 0.044, 12);
    let inputs = driver.user_input_from_parameter_set(&set);

    assert_eq!(inputs.parameter_set(), set);
    assert_eq!(inputs.space, driver.defaults().space);
    assert_eq!(inputs.goal, OptimizationGoal::Max);
    assert!(inputs.elitism);
    assert_eq!(inputs.objective.label(), "x");
}

#[test]
fn test_sweep_reports_every_grid_point_and_completes_once() {
    let driver = driver_with(Arc::new(GeneticAlgorithm::new()), small_grid(), 3).with_parallelism(2);
    let (events, sink) = collect_progress();
    let completions = Arc::new(AtomicUsize::new(0));
    let completions_clone = Arc::clone(&completions);

    let handle = driver
        .run(sink, move || {
            completions_clone.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    let summary = handle.join().unwrap();

    assert_eq!(completions.load(Ordering::SeqCst), 1);
    assert!(summary.is_success());
    assert_eq!(summary.completed, 4);

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 4);
    let reported: Vec<_> = events.iter().map(|(set, _)| *set).collect();
    for set in driver.get_all_parameter_sets(0) {
        assert!(reported.contains(&set));
    }
    for (_, value) in events.iter() {
        assert!(*value >= -4.0 && *value <= 12.0);
    }
}

#[test]
fn test_parallelism_bound_is_never_exceeded() {
    let grid = ParameterGrid::new(vec![4, 5, 6, 7], vec![0.5, 0.7], vec![0.01], vec![2]).unwrap();
    let optimizer = Arc::new(SlowOptimizer::new(Duration::from_millis(15)));
    let driver = driver_with(optimizer.clone(), grid, 2).with_parallelism(3);

    let summary = driver.run(|_, _| {}, || {}).unwrap().join().unwrap();

    assert_eq!(summary.completed, 8);
    assert!(summary.peak_in_flight <= 3, "peak {}", summary.peak_in_flight);
    assert!(optimizer.max_active.load(Ordering::SeqCst) <= 3);
    assert_eq!(optimizer.active.load(Ordering::SeqCst), 0);
}

#[test]
fn test_failures_are_isolated_and_reported_at_the_end() {
    let grid = ParameterGrid::new(vec![10, 20, 30, 40], vec![0.6], vec![0.01], vec![5]).unwrap();
    let driver = driver_with(Arc::new(FaultyOptimizer), grid, 2).with_parallelism(2);
    let (events, sink) = collect_progress();
    let completions = Arc::new(AtomicUsize::new(0));
    let completions_clone = Arc::clone(&completions);

    let summary = driver
        .run(sink, move || {
            completions_clone.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap()
        .join()
        .unwrap();

    assert_eq!(completions.load(Ordering::SeqCst), 1);
    assert_eq!(summary.dispatched, 4);
    assert_eq!(summary.completed, 2);
    assert!(!summary.is_success());

    let mut failed: Vec<usize> = summary
        .failures
        .iter()
        .map(|f| f.parameter_set.population_size)
        .collect();
    failed.sort_unstable();
    assert_eq!(failed, vec![20, 30]);
    assert!(summary
        .failures
        .iter()
        .any(|f| f.message.contains("optimizer blew up")));

    let reported: Vec<usize> = events
        .lock()
        .unwrap()
        .iter()
        .map(|(set, _)| set.population_size)
        .collect();
    assert_eq!(reported.len(), 2);
    assert!(reported.contains(&10) && reported.contains(&40));
}

#[test]
fn test_cancellation_stops_dispatch_but_still_completes() {
    let grid = ParameterGrid::new(vec![4, 5, 6, 7, 8, 9], vec![0.6], vec![0.01], vec![2]).unwrap();
    let driver = driver_with(Arc::new(GeneticAlgorithm::new()), grid, 1).with_parallelism(1);
    let token = CancellationToken::new();
    let sink_token = token.clone();
    let completions = Arc::new(AtomicUsize::new(0));
    let completions_clone = Arc::clone(&completions);

    let summary = driver
        .run_cancellable(
            0,
            token,
            move |_, _| sink_token.cancel(),
            move || {
                completions_clone.fetch_add(1, Ordering::SeqCst);
            },
        )
        .unwrap()
        .join()
        .unwrap();

    assert_eq!(completions.load(Ordering::SeqCst), 1);
    assert!(summary.cancelled);
    assert_eq!(summary.dispatched, 1);
    assert_eq!(summary.completed, 1);
    assert_eq!(summary.total, 6);
}

#[test]
fn test_constant_objective_averages_to_constant() {
    for repetitions in [1, 7, 25] {
        let runner = ExperimentRunner::new(Arc::new(GeneticAlgorithm::new())).with_repetitions(repetitions);
        let inputs = default_inputs(Objective::parse("2.71828").unwrap());
        assert_eq!(runner.run(&inputs).unwrap(), 2.718);
    }
}

#[test]
fn test_run_from_skip_only_processes_tail() {
    let driver = driver_with(Arc::new(GeneticAlgorithm::new()), small_grid(), 1).with_parallelism(2);
    let (events, sink) = collect_progress();

    let summary = driver.run_from(2, sink, || {}).unwrap().join().unwrap();

    assert_eq!(summary.total, 2);
    assert_eq!(summary.completed, 2);
    let mut reported: Vec<_> = events.lock().unwrap().iter().map(|(s, _)| *s).collect();
    let expected: Vec<_> = driver.get_all_parameter_sets(2).collect();
    reported.sort_by(|a, b| a.to_string().cmp(&b.to_string()));
    let mut expected_sorted = expected.clone();
    expected_sorted.sort_by(|a, b| a.to_string().cmp(&b.to_string()));
    assert_eq!(reported, expected_sorted);
}

#[test]
fn test_runner_polls_progress_until_done() {
    let driver = driver_with(Arc::new(GeneticAlgorithm::new()), small_grid(), 2).with_parallelism(2);
    let mut runner = SweepRunner::start(&driver, 0).unwrap();
    assert_eq!(runner.total(), 4);

    let deadline = Instant::now() + Duration::from_secs(60);
    let mut updates = Vec::new();
    let summary = loop {
        updates.extend(runner.drain_progress());
        if let Some(result) = runner.try_get_results() {
            break result.unwrap();
        }
        assert!(Instant::now() < deadline, "sweep did not finish in time");
        thread::sleep(Duration::from_millis(5));
    };
    updates.extend(runner.drain_progress());

    assert!(runner.is_complete());
    assert_eq!(summary.completed, 4);
    assert_eq!(updates.len(), 4);
}
