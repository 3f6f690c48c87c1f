//! Bootstrap consensus of minimum spanning trees
//!
//! Every iteration resamples the observation rows with replacement, rebuilds
//! the tree and counts its edges. Iterations run as independent rayon tasks;
//! each worker folds into its own tally and the tallies are merged once all
//! tasks are done.

use crate::network::correlation::correlation_matrix;
use crate::network::distance::distance_matrix;
use crate::network::mst::build_mst;
use crate::structs::{
    BootstrapOutcome, BootstrapReport, FeatureMatrix, IterationFailure, NetError, Network, Result,
    SpanningTree, WeightedGraph,
};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

/// Default share of degenerate iterations tolerated before giving up
pub const DEFAULT_MAX_FAILURE_RATE: f64 = 0.5;

/// Configuration for a bootstrap run
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub iterations: usize,
    pub seed: u64,
    /// Worker threads, 0 = rayon default
    pub threads: usize,
    pub max_failure_rate: f64,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            iterations: 100,
            seed: 0,
            threads: 0,
            max_failure_rate: DEFAULT_MAX_FAILURE_RATE,
        }
    }
}

impl BootstrapConfig {
    /// Check the configuration against the observation table
    ///
    /// # Errors
    /// Returns `InvalidConfig` for zero iterations, fewer than two rows, no
    /// variables or a failure rate outside [0, 1]
    pub fn validate(&self, observations: &FeatureMatrix) -> Result<()> {
        if self.iterations == 0 {
            return Err(NetError::InvalidConfig(
                "bootstrap iterations must be at least 1".into(),
            ));
        }
        if observations.n_samples() < 2 {
            return Err(NetError::InvalidConfig(format!(
                "bootstrap needs at least 2 observation rows, got {}",
                observations.n_samples()
            )));
        }
        if observations.n_features() == 0 {
            return Err(NetError::InvalidConfig("observations have no variables".into()));
        }
        if !(0.0..=1.0).contains(&self.max_failure_rate) {
            return Err(NetError::InvalidConfig(format!(
                "max failure rate must be within [0, 1], got {}",
                self.max_failure_rate
            )));
        }
        Ok(())
    }
}

/// Per-worker accumulation, merged after all iterations finish
#[derive(Default)]
struct Tally {
    counts: BTreeMap<(usize, usize), usize>,
    completed: usize,
    cancelled: usize,
    failures: Vec<IterationFailure>,
}

impl Tally {
    fn record_tree(&mut self, tree: &SpanningTree) {
        for (s, t) in tree.edge_list() {
            *self.counts.entry((s.min(t), s.max(t))).or_insert(0) += 1;
        }
        self.completed += 1;
    }

    fn merge(mut self, other: Self) -> Self {
        for (edge, count) in other.counts {
            *self.counts.entry(edge).or_insert(0) += count;
        }
        self.completed += other.completed;
        self.cancelled += other.cancelled;
        self.failures.extend(other.failures);
        self
    }
}

/// Random stream of one iteration, independent of scheduling
fn iteration_rng(seed: u64, iteration: usize) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed.wrapping_add(iteration as u64))
}

/// Draw `n_rows` row indices uniformly with replacement
fn resample_rows<R: Rng>(rng: &mut R, n_rows: usize) -> Vec<usize> {
    (0..n_rows).map(|_| rng.gen_range(0..n_rows)).collect()
}

/// Resample, correlate, transform and build the tree of one iteration
fn run_iteration(observations: &FeatureMatrix, seed: u64, iteration: usize) -> Result<SpanningTree> {
    let mut rng = iteration_rng(seed, iteration);
    let rows = resample_rows(&mut rng, observations.n_samples());
    let sample = observations.resample(&rows);
    let corr = correlation_matrix(&sample)?;
    let distance = distance_matrix(&corr)?;
    build_mst(&distance, None)
}

/// Aggregate `config.iterations` bootstrap spanning trees into a weighted graph
///
/// Iterations whose resample cannot produce a tree are skipped and listed in
/// the report. `cancel` is checked before each iteration starts; iterations
/// that never start are counted as cancelled.
///
/// # Errors
/// Returns `InvalidConfig` before any work if the configuration is invalid,
/// `Config` if the worker pool cannot be built, and
/// `TooManyDegenerateResamples` if the share of skipped iterations exceeds
/// `config.max_failure_rate`
#[allow(clippy::cast_precision_loss)]
pub fn aggregate(
    observations: &FeatureMatrix,
    config: &BootstrapConfig,
    cancel: Option<&AtomicBool>,
) -> Result<BootstrapOutcome> {
    config.validate(observations)?;

    info!(
        iterations = config.iterations,
        seed = config.seed,
        rows = observations.n_samples(),
        variables = observations.n_features(),
        "starting bootstrap"
    );

    let run = || {
        (0..config.iterations)
            .into_par_iter()
            .fold(Tally::default, |mut tally, iteration| {
                if cancel.is_some_and(|flag| flag.load(Ordering::SeqCst)) {
                    tally.cancelled += 1;
                    return tally;
                }
                match run_iteration(observations, config.seed, iteration) {
                    Ok(tree) => tally.record_tree(&tree),
                    Err(e) => {
                        warn!(iteration, error = %e, "skipping degenerate resample");
                        tally.failures.push(IterationFailure {
                            iteration,
                            reason: e.to_string(),
                        });
                    }
                }
                tally
            })
            .reduce(Tally::default, Tally::merge)
    };

    let mut tally = if config.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.threads)
            .build()
            .map_err(|e| NetError::Config(format!("Failed to build worker pool: {e}")))?
            .install(run)
    } else {
        run()
    };
    tally.failures.sort_by_key(|f| f.iteration);

    let failed = tally.failures.len();
    let attempted = tally.completed + failed;
    if attempted > 0 && failed as f64 / attempted as f64 > config.max_failure_rate {
        return Err(NetError::TooManyDegenerateResamples { failed, attempted });
    }

    let graph = WeightedGraph::from_counts(tally.counts, Some(observations.names.clone()));
    let report = BootstrapReport {
        seed: config.seed,
        requested: config.iterations,
        completed: tally.completed,
        cancelled: tally.cancelled,
        failures: tally.failures,
    };

    info!(
        completed = report.completed,
        skipped = report.skipped(),
        cancelled = report.cancelled,
        edges = graph.edge_count(),
        "bootstrap finished"
    );

    Ok(BootstrapOutcome { graph, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::filter::filter_by_tolerance;

    /// `x0` and `x1` nearly identical, `x2` and `x3` each tied to `x0` more
    /// strongly than to each other
    fn strong_and_weak_pairs(rows: usize) -> FeatureMatrix {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let data = (0..rows)
            .map(|_| {
                let a: f64 = rng.gen_range(-1.0..1.0);
                let b: f64 = rng.gen_range(-1.0..1.0);
                let c: f64 = rng.gen_range(-1.0..1.0);
                let e: f64 = rng.gen_range(-1.0..1.0);
                vec![a, a + 0.05 * e, a + b, a + c]
            })
            .collect();
        let names = ["x0", "x1", "x2", "x3"].map(String::from).to_vec();
        FeatureMatrix::from_rows(names, data).expect("rows")
    }

    fn config(iterations: usize, seed: u64) -> BootstrapConfig {
        BootstrapConfig {
            iterations,
            seed,
            ..BootstrapConfig::default()
        }
    }

    #[test]
    fn test_single_iteration_matches_its_tree() {
        let observations = strong_and_weak_pairs(60);

        let outcome = aggregate(&observations, &config(1, 11), None).expect("aggregate");
        let tree = run_iteration(&observations, 11, 0).expect("tree");

        assert_eq!(outcome.graph.vertex_count(), 4);
        assert_eq!(outcome.graph.edge_count(), 3);
        assert_eq!(outcome.graph.edge_list(), {
            let mut edges = tree.edge_list();
            edges.sort_unstable();
            edges
        });
        assert!(outcome.graph.weighted_edges().iter().all(|&(_, _, w)| w == 1));
        assert_eq!(outcome.report.completed, 1);
    }

    #[test]
    fn test_strong_pair_dominates() {
        let observations = strong_and_weak_pairs(200);

        let outcome = aggregate(&observations, &config(100, 3), None).expect("aggregate");
        let graph = &outcome.graph;

        assert_eq!(outcome.report.completed, 100);
        assert_eq!(outcome.report.skipped(), 0);
        assert_eq!(graph.weight(0, 1), Some(100));
        assert!(graph.weight(2, 3).unwrap_or(0) < 50);

        let total: usize = graph.weighted_edges().iter().map(|&(_, _, w)| w).sum();
        assert_eq!(total, 300);
        assert_eq!(graph.label(2), Some("x2"));

        let filtered = filter_by_tolerance(graph, 50);
        assert!(filtered.edge_list().contains(&(0, 1)));
        assert_eq!(filtered.weight(2, 3), None);
    }

    #[test]
    fn test_same_seed_any_thread_count() {
        let observations = strong_and_weak_pairs(50);

        let single = BootstrapConfig {
            threads: 1,
            ..config(40, 99)
        };
        let many = BootstrapConfig {
            threads: 4,
            ..config(40, 99)
        };

        let a = aggregate(&observations, &single, None).expect("aggregate");
        let b = aggregate(&observations, &many, None).expect("aggregate");

        assert_eq!(a.graph, b.graph);
    }

    #[test]
    fn test_degenerate_resamples_are_skipped() {
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        // Column "spike" is zero except in the last row, so resamples that
        // miss that row have zero variance there
        let data = (0..10)
            .map(|i| {
                let spike = if i == 9 { 1.0 } else { 0.0 };
                vec![rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0), spike]
            })
            .collect();
        let observations = FeatureMatrix::from_rows(
            vec!["p".into(), "q".into(), "spike".into()],
            data,
        )
        .expect("rows");

        let cfg = BootstrapConfig {
            max_failure_rate: 1.0,
            ..config(40, 5)
        };
        let outcome = aggregate(&observations, &cfg, None).expect("aggregate");
        let report = &outcome.report;

        assert!(report.skipped() > 0);
        assert!(report.completed > 0);
        assert_eq!(report.completed + report.skipped(), 40);
        assert!(report
            .failures
            .windows(2)
            .all(|w| w[0].iteration < w[1].iteration));
        assert!(report.failures[0].reason.contains("disconnected"));
    }

    #[test]
    fn test_constant_column_exceeds_failure_rate() {
        let data = (0..8_i32)
            .map(|i| vec![f64::from(i), f64::from(i * i), 3.0])
            .collect();
        let observations =
            FeatureMatrix::from_rows(vec!["a".into(), "b".into(), "flat".into()], data)
                .expect("rows");

        let err = aggregate(&observations, &config(20, 1), None).unwrap_err();

        assert!(matches!(
            err,
            NetError::TooManyDegenerateResamples {
                failed: 20,
                attempted: 20
            }
        ));
    }

    #[test]
    fn test_cancelled_before_start() {
        let observations = strong_and_weak_pairs(20);
        let cancel = AtomicBool::new(true);

        let outcome = aggregate(&observations, &config(10, 0), Some(&cancel)).expect("aggregate");

        assert_eq!(outcome.report.cancelled, 10);
        assert_eq!(outcome.report.completed, 0);
        assert_eq!(outcome.graph.edge_count(), 0);
        assert_eq!(outcome.graph.vertex_count(), 0);
    }

    #[test]
    fn test_invalid_configuration() {
        let observations = strong_and_weak_pairs(20);

        assert!(matches!(
            aggregate(&observations, &config(0, 0), None),
            Err(NetError::InvalidConfig(_))
        ));

        let bad_rate = BootstrapConfig {
            max_failure_rate: 1.5,
            ..config(5, 0)
        };
        assert!(matches!(
            aggregate(&observations, &bad_rate, None),
            Err(NetError::InvalidConfig(_))
        ));

        let one_row = observations.resample(&[0]);
        assert!(matches!(
            aggregate(&one_row, &config(5, 0), None),
            Err(NetError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_resample_rows_in_range() {
        let mut rng = iteration_rng(42, 3);
        let rows = resample_rows(&mut rng, 25);

        assert_eq!(rows.len(), 25);
        assert!(rows.iter().all(|&r| r < 25));
        assert_eq!(rows, resample_rows(&mut iteration_rng(42, 3), 25));
    }
}
