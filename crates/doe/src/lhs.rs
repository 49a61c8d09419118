use crate::errors::{DoeError, Result};
use crate::metrics::{centered_discrepancy, min_pairwise_distance};
use crate::rng::RandomSource;
use crate::space::SearchSpace;
use crate::traits::{Design, SamplingMethod};
use log::{debug, info};
use ndarray::{Array1, Array2, ArrayView1, Zip};
use ndarray_stats::QuantileExt;
use web_time::{Duration, Instant};

#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Default budget of swap evaluations of the [`LhsOptimizer::RandomCd`] local search
pub const LHS_DEFAULT_MAX_ITERATIONS: usize = 10_000;

/// Minimal decrease of the centered discrepancy for a swap to be accepted
const CD_IMPROVEMENT_TOL: f64 = 1e-12;

/// Kinds of Latin Hypercube Design
#[derive(Clone, Debug, Default, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum LhsKind {
    /// sample is chosen randomly within its latin hypercube intervals
    #[default]
    Classic,
    /// sample is the middle of its latin hypercube intervals
    Centered,
}

/// Placement of the only sample of a one-point design
#[derive(Clone, Debug, Default, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum SinglePoint {
    /// center of the unit hypercube
    Center,
    /// uniform random draw
    #[default]
    Random,
}

/// Space-filling improvement of a latin hypercube design
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum LhsOptimizer {
    /// Local search on one design: rows are swapped column-wise and a swap is kept only
    /// when it strictly decreases the centered discrepancy.
    /// Candidates are visited column by column then row pairs `(i, j)` with `i < j`
    /// (first improvement) until a full pass brings no improvement
    /// or the iteration/time budget is spent.
    RandomCd,
    /// Best of the given number of independent designs w.r.t. the centered discrepancy
    Restarts(usize),
    /// Best of the given number of independent designs w.r.t. the minimum pairwise distance
    Maximin(usize),
}

impl LhsOptimizer {
    /// Name of the optimizer as recorded in population metadata
    pub fn name(&self) -> &'static str {
        match self {
            LhsOptimizer::RandomCd => "random-cd",
            LhsOptimizer::Restarts(_) => "restarts",
            LhsOptimizer::Maximin(_) => "maximin",
        }
    }
}

/// Reason why the [`LhsOptimizer::RandomCd`] local search stopped
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum Termination {
    /// A full pass over all swaps found no improvement
    LocalOptimum,
    /// The swap evaluation budget is spent
    IterationBudget,
    /// The wall-clock budget elapsed
    TimeBudget,
}

impl Termination {
    /// Name as recorded in population metadata
    pub fn name(&self) -> &'static str {
        match self {
            Termination::LocalOptimum => "local_optimum",
            Termination::IterationBudget => "iteration_budget",
            Termination::TimeBudget => "time_budget",
        }
    }
}

/// Result of the column swap local search
#[derive(Clone, Debug)]
pub struct SwapSearchOutcome {
    /// Best design found
    pub design: Array2<f64>,
    /// Its centered discrepancy
    pub discrepancy: f64,
    /// Number of evaluated swaps
    pub iterations: usize,
    /// Number of applied swaps
    pub accepted: usize,
    /// Stop reason
    pub termination: Termination,
}

/// Column swap local search minimizing the centered discrepancy.
///
/// Swapping two values within a column keeps every latin hypercube property.
#[derive(Clone, Debug)]
pub struct CdSwapSearch {
    max_iterations: usize,
    max_duration: Option<Duration>,
}

impl CdSwapSearch {
    /// Constructor given a budget of swap evaluations and an optional time budget
    pub fn new(max_iterations: usize, max_duration: Option<Duration>) -> Self {
        CdSwapSearch {
            max_iterations,
            max_duration,
        }
    }

    /// Runs the local search starting from `design`
    pub fn run(&self, design: Array2<f64>) -> SwapSearchOutcome {
        let start = Instant::now();
        let (ns, nx) = design.dim();
        let mut best = design;
        let mut iterations = 0;
        let mut accepted = 0;

        let termination = 'search: loop {
            let mut improved = false;
            for (k, i, j) in swap_candidates(ns, nx) {
                if iterations >= self.max_iterations {
                    break 'search Termination::IterationBudget;
                }
                if self.max_duration.is_some_and(|d| start.elapsed() >= d) {
                    break 'search Termination::TimeBudget;
                }
                iterations += 1;
                if swap_delta(&mut best, k, i, j) < -CD_IMPROVEMENT_TOL {
                    best.swap([i, k], [j, k]);
                    accepted += 1;
                    improved = true;
                }
            }
            if !improved {
                break Termination::LocalOptimum;
            }
        };

        let discrepancy = centered_discrepancy(&best);
        debug!(
            "CD swap search stopped ({}) after {iterations} iterations, {accepted} swaps, cd = {discrepancy}",
            termination.name()
        );
        SwapSearchOutcome {
            design: best,
            discrepancy,
            iterations,
            accepted,
            termination,
        }
    }
}

/// Single column swaps `(column, row i, row j)` in scan order
fn swap_candidates(ns: usize, nx: usize) -> impl Iterator<Item = (usize, usize, usize)> {
    (0..nx).flat_map(move |k| {
        (0..ns).flat_map(move |i| ((i + 1)..ns).map(move |j| (k, i, j)))
    })
}

/// Π_k (1 + |z_ik|/2 - z_ik²/2) term of the centered discrepancy
fn cd_point_term(x: &Array2<f64>, i: usize) -> f64 {
    x.row(i).fold(1., |acc, &v| {
        let z = (v - 0.5).abs();
        acc * (1. + 0.5 * z - 0.5 * z * z)
    })
}

/// Π_k (1 + |z_ik|/2 + |z_jk|/2 - |x_ik - x_jk|/2) term of the centered discrepancy
fn cd_pair_term(x: &Array2<f64>, i: usize, j: usize) -> f64 {
    Zip::from(x.row(i))
        .and(x.row(j))
        .fold(1., |acc, &a, &b| {
            acc * (1. + 0.5 * ((a - 0.5).abs() + (b - 0.5).abs() - (a - b).abs()))
        })
}

/// Part of the centered discrepancy depending on rows `i1` or `i2`
fn cd_rows_contribution(x: &Array2<f64>, i1: usize, i2: usize) -> f64 {
    let ns = x.nrows() as f64;
    let cross = (0..x.nrows())
        .filter(|&j| j != i1 && j != i2)
        .fold(0., |acc, j| acc + cd_pair_term(x, i1, j) + cd_pair_term(x, i2, j));
    let pairs = 2. * cross
        + cd_pair_term(x, i1, i1)
        + cd_pair_term(x, i2, i2)
        + 2. * cd_pair_term(x, i1, i2);
    -2. / ns * (cd_point_term(x, i1) + cd_point_term(x, i2)) + pairs / (ns * ns)
}

/// Change of the centered discrepancy when swapping rows `i1` and `i2` in column `k`,
/// `x` is left unchanged.
fn swap_delta(x: &mut Array2<f64>, k: usize, i1: usize, i2: usize) -> f64 {
    let before = cd_rows_contribution(x, i1, i2);
    x.swap([i1, k], [i2, k]);
    let after = cd_rows_contribution(x, i1, i2);
    x.swap([i1, k], [i2, k]);
    after - before
}

fn is_prime(p: usize) -> bool {
    p >= 2 && (2..).take_while(|d| d * d <= p).all(|d| p % d != 0)
}

/// Checks the preconditions of a latin hypercube of given strength
/// and returns the orthogonal array base `p` when strength is 2.
pub(crate) fn check_strength(strength: usize, ns: usize, nx: usize) -> Result<Option<usize>> {
    match strength {
        1 => Ok(None),
        2 => {
            let p = (ns as f64).sqrt().round() as usize;
            if p * p != ns || !is_prime(p) {
                return Err(DoeError::validation(format!(
                    "latin hypercube of strength 2 requires a number of samples p² with p prime, got {ns}"
                )));
            }
            if nx > p + 1 {
                return Err(DoeError::validation(format!(
                    "latin hypercube of strength 2 with {ns} samples supports at most {} dimensions, got {nx}",
                    p + 1
                )));
            }
            Ok(Some(p))
        }
        _ => Err(DoeError::validation(format!(
            "latin hypercube strength should be 1 or 2, got {strength}"
        ))),
    }
}

/// The LHS design is built as follows: each dimension space is divided into ns sections
/// where ns is the number of sampling points, and one point in selected in each section.
/// The placement within sections ([`LhsKind`]), the strength and the optional
/// optimization ([`LhsOptimizer`]) give different kinds of LHS.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct Lhs {
    kind: LhsKind,
    strength: usize,
    optimizer: Option<LhsOptimizer>,
    single_point: SinglePoint,
    max_iterations: usize,
    max_duration: Option<Duration>,
}

impl Default for Lhs {
    fn default() -> Self {
        Lhs {
            kind: LhsKind::default(),
            strength: 1,
            optimizer: None,
            single_point: SinglePoint::default(),
            max_iterations: LHS_DEFAULT_MAX_ITERATIONS,
            max_duration: None,
        }
    }
}

impl Lhs {
    /// Constructor of a classic, non optimized LHS
    ///
    /// ```
    /// use optiseed_doe::{build_search_space, Dimension, Lhs, LhsOptimizer, RandomSource, SamplingMethod};
    ///
    /// let space = build_search_space(&[
    ///     Dimension::continuous("x", 0., 1.),
    ///     Dimension::continuous("y", 5., 10.),
    /// ]).unwrap();
    /// let pop = Lhs::new()
    ///     .optimizer(Some(LhsOptimizer::RandomCd))
    ///     .sample(&space, 10, &mut RandomSource::new(42))
    ///     .unwrap();
    /// assert_eq!(pop.len(), 10);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the kind of LHS
    pub fn kind(mut self, kind: LhsKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the strength (1 or 2) of the LHS
    pub fn strength(mut self, strength: usize) -> Self {
        self.strength = strength;
        self
    }

    /// Sets the optimization of the design
    pub fn optimizer(mut self, optimizer: Option<LhsOptimizer>) -> Self {
        self.optimizer = optimizer;
        self
    }

    /// Sets the placement rule of a one-point design
    pub fn single_point(mut self, single_point: SinglePoint) -> Self {
        self.single_point = single_point;
        self
    }

    /// Sets the budget of swap evaluations of [`LhsOptimizer::RandomCd`]
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the wall-clock budget of [`LhsOptimizer::RandomCd`]
    pub fn max_duration(mut self, max_duration: Option<Duration>) -> Self {
        self.max_duration = max_duration;
        self
    }

    /// Offsets of samples inside their sections
    fn offsets(&self, ns: usize, nx: usize, rng: &mut RandomSource) -> Array2<f64> {
        match self.kind {
            LhsKind::Classic => rng.uniform(ns, nx),
            LhsKind::Centered => Array2::from_elem((ns, nx), 0.5),
        }
    }

    /// Base latin hypercube: section indices are permuted independently in each dimension
    fn base_lhs(&self, ns: usize, nx: usize, rng: &mut RandomSource) -> Array2<f64> {
        let offsets = self.offsets(ns, nx, rng);
        let mut lhs = Array2::zeros((ns, nx));
        for j in 0..nx {
            let perm = rng.permutation(ns);
            Zip::from(lhs.column_mut(j))
                .and(&ArrayView1::from(&perm[..]))
                .and(offsets.column(j))
                .for_each(|x, &section, &u| *x = (section as f64 + u) / ns as f64);
        }
        lhs
    }

    /// Latin hypercube of strength 2 based on the Bose orthogonal array OA(p², p + 1, p, 2):
    /// row `(a, b)` has levels `a`, `b` and `(b + a·m) mod p` for `m` in `1..p`.
    /// Each level is then refined in `p` sections of the `p²` sections of the LHS.
    fn oa_lhs(&self, p: usize, nx: usize, rng: &mut RandomSource) -> Array2<f64> {
        let ns = p * p;
        let offsets = self.offsets(ns, nx, rng);
        let columns = rng.permutation(p + 1);
        let mut lhs = Array2::zeros((ns, nx));
        for (j, &c) in columns.iter().take(nx).enumerate() {
            let relabel = rng.permutation(p);
            let refinements: Vec<Vec<usize>> = (0..p).map(|_| rng.permutation(p)).collect();
            let mut used = vec![0; p];
            for r in 0..ns {
                let (a, b) = (r / p, r % p);
                let level = match c {
                    0 => a,
                    1 => b,
                    m => (b + a * (m - 1)) % p,
                };
                let level = relabel[level];
                let section = level * p + refinements[level][used[level]];
                used[level] += 1;
                lhs[[r, j]] = (section as f64 + offsets[[r, j]]) / ns as f64;
            }
        }
        lhs
    }

    fn draw(
        &self,
        oa_base: Option<usize>,
        ns: usize,
        nx: usize,
        rng: &mut RandomSource,
    ) -> Array2<f64> {
        match oa_base {
            Some(p) => self.oa_lhs(p, nx, rng),
            None => self.base_lhs(ns, nx, rng),
        }
    }

    /// Best of `n_designs` designs w.r.t. `score` (lower is better), the first design is `base`
    fn best_of(
        &self,
        base: Array2<f64>,
        n_designs: usize,
        oa_base: Option<usize>,
        rng: &mut RandomSource,
        score: impl Fn(&Array2<f64>) -> f64,
    ) -> Array2<f64> {
        let (ns, nx) = base.dim();
        let mut designs = vec![base];
        for _ in 1..n_designs {
            designs.push(self.draw(oa_base, ns, nx, rng));
        }
        let scores: Array1<f64> = designs.iter().map(score).collect();
        let best = scores.argmin().unwrap_or(0);
        designs.swap_remove(best)
    }
}

impl SamplingMethod for Lhs {
    fn name(&self) -> &'static str {
        "latin_hypercube"
    }

    fn normalized_sample(
        &self,
        space: &SearchSpace,
        ns: usize,
        rng: &mut RandomSource,
    ) -> Result<Design> {
        let nx = space.ndim();
        if ns == 0 {
            return Ok(Design::new(Array2::zeros((0, nx))));
        }
        let oa_base = check_strength(self.strength, ns, nx)?;
        if oa_base.is_some() && self.optimizer.is_some() {
            return Err(DoeError::configuration(
                "latin hypercube of strength 2 cannot be optimized",
            ));
        }
        if ns == 1 {
            let unit = match self.single_point {
                SinglePoint::Center => Array2::from_elem((1, nx), 0.5),
                SinglePoint::Random => rng.uniform(1, nx),
            };
            return Ok(Design::new(unit).with("strength", self.strength));
        }

        let base = self.draw(oa_base, ns, nx, rng);
        let design = Design::new(Array2::zeros((0, nx))).with("strength", self.strength);
        let design = match self.optimizer {
            None => Design { unit: base, ..design },
            Some(optimizer) => {
                let base_cd = centered_discrepancy(&base);
                let design = design
                    .with("optimizer", optimizer.name())
                    .with("base_discrepancy", base_cd);
                match optimizer {
                    LhsOptimizer::RandomCd => {
                        let outcome =
                            CdSwapSearch::new(self.max_iterations, self.max_duration).run(base);
                        info!(
                            "LHS random-cd optimization: cd {base_cd} -> {} ({})",
                            outcome.discrepancy,
                            outcome.termination.name()
                        );
                        Design {
                            unit: outcome.design,
                            ..design
                        }
                        .with("iterations", outcome.iterations)
                        .with("accepted_swaps", outcome.accepted)
                        .with("termination", outcome.termination.name())
                    }
                    LhsOptimizer::Restarts(n_designs) => {
                        let unit = self.best_of(base, n_designs, oa_base, rng, |x| {
                            centered_discrepancy(x)
                        });
                        Design { unit, ..design }.with("restarts", n_designs)
                    }
                    LhsOptimizer::Maximin(n_designs) => {
                        let unit = self.best_of(base, n_designs, oa_base, rng, |x| {
                            -min_pairwise_distance(x)
                        });
                        Design { unit, ..design }.with("restarts", n_designs)
                    }
                }
            }
        };
        Ok(design)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::{build_search_space, Dimension};
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};

    fn unit_space(nx: usize) -> SearchSpace {
        let dims: Vec<Dimension> = (0..nx)
            .map(|i| Dimension::continuous(format!("x{i}"), 0., 1.))
            .collect();
        build_search_space(&dims).unwrap()
    }

    /// One sample per section in each dimension
    fn assert_latin(x: &Array2<f64>) {
        let ns = x.nrows();
        for col in x.columns() {
            let mut sections: Vec<usize> = col
                .iter()
                .map(|&v| {
                    assert!((0. ..1.).contains(&v));
                    (v * ns as f64).floor() as usize
                })
                .collect();
            sections.sort_unstable();
            assert_eq!(sections, (0..ns).collect::<Vec<_>>());
        }
    }

    #[test]
    fn test_classic_lhs() {
        let space = build_search_space(&[
            Dimension::continuous("x", 5., 10.),
            Dimension::continuous("y", 0., 1.),
        ])
        .unwrap();
        let pop = Lhs::new()
            .sample(&space, 5, &mut RandomSource::new(42))
            .unwrap();
        assert_eq!(pop.len(), 5);
        assert_latin(pop.unit_points());
        assert!(pop.points().column(0).iter().all(|&x| (5. ..10.).contains(&x)));
        assert!(!pop.metadata().contains_key("optimizer"));
    }

    #[test]
    fn test_centered_lhs() {
        let space = unit_space(3);
        let pop = Lhs::new()
            .kind(LhsKind::Centered)
            .sample(&space, 5, &mut RandomSource::new(0))
            .unwrap();
        assert_latin(pop.unit_points());
        for col in pop.unit_points().columns() {
            let mut values = col.to_vec();
            values.sort_by(f64::total_cmp);
            assert_abs_diff_eq!(
                Array1::from(values),
                array![0.1, 0.3, 0.5, 0.7, 0.9],
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_lhs_4x4_reproducible() {
        let space = unit_space(2);
        let first = Lhs::new()
            .sample(&space, 4, &mut RandomSource::new(42))
            .unwrap();
        let second = Lhs::new()
            .sample(&space, 4, &mut RandomSource::new(42))
            .unwrap();
        assert_latin(first.unit_points());
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_duplicate() {
        let space = unit_space(2);
        let lhs = Lhs::new();
        let mut rng = RandomSource::new(42);
        let sample1 = lhs.sample(&space, 5, &mut rng).unwrap();
        let sample2 = lhs.sample(&space, 5, &mut rng).unwrap();
        assert_ne!(sample1.unit_points(), sample2.unit_points());
    }

    #[test]
    fn test_empty_and_single() {
        let space = unit_space(3);
        let pop = Lhs::new()
            .sample(&space, 0, &mut RandomSource::new(1))
            .unwrap();
        assert!(pop.is_empty());
        assert_eq!(pop.quality_score(), None);

        let pop = Lhs::new()
            .single_point(SinglePoint::Center)
            .sample(&space, 1, &mut RandomSource::new(1))
            .unwrap();
        assert_abs_diff_eq!(pop.unit_points(), &array![[0.5, 0.5, 0.5]]);

        let pop = Lhs::new()
            .sample(&space, 1, &mut RandomSource::new(1))
            .unwrap();
        assert_eq!(pop.len(), 1);
        assert_latin(pop.unit_points());
    }

    #[test]
    fn test_random_cd_improves() {
        let space = unit_space(3);
        for seed in [0, 7, 42] {
            let base = Lhs::new()
                .sample(&space, 12, &mut RandomSource::new(seed))
                .unwrap();
            let optimized = Lhs::new()
                .optimizer(Some(LhsOptimizer::RandomCd))
                .max_iterations(2000)
                .sample(&space, 12, &mut RandomSource::new(seed))
                .unwrap();
            assert_latin(optimized.unit_points());
            let base_cd = centered_discrepancy(base.unit_points());
            let opt_cd = centered_discrepancy(optimized.unit_points());
            assert!(opt_cd <= base_cd, "{opt_cd} > {base_cd}");
            assert_eq!(
                optimized.metadata()["base_discrepancy"],
                crate::MetaValue::Float(base_cd)
            );
            assert_eq!(optimized.quality_score(), Some(opt_cd));
        }
    }

    #[test]
    fn test_swap_delta_matches_recomputation() {
        let mut x = Lhs::new().base_lhs(8, 3, &mut RandomSource::new(3));
        let cd = centered_discrepancy(&x);
        let delta = swap_delta(&mut x, 1, 2, 5);
        let before = x.clone();
        x.swap([2, 1], [5, 1]);
        assert_abs_diff_eq!(centered_discrepancy(&x) - cd, delta, epsilon = 1e-12);
        x.swap([2, 1], [5, 1]);
        assert_eq!(x, before);
    }

    #[test]
    fn test_swap_search_budget_and_optimum() {
        let base = Lhs::new().base_lhs(10, 2, &mut RandomSource::new(5));
        let outcome = CdSwapSearch::new(7, None).run(base.clone());
        assert_eq!(outcome.iterations, 7);
        assert_eq!(outcome.termination, Termination::IterationBudget);

        let outcome = CdSwapSearch::new(usize::MAX, None).run(base.clone());
        assert_eq!(outcome.termination, Termination::LocalOptimum);
        assert_latin(&outcome.design);
        assert!(outcome.discrepancy <= centered_discrepancy(&base));
        // a local optimum cannot be improved by any single swap
        let mut x = outcome.design.clone();
        for (k, i, j) in swap_candidates(10, 2) {
            assert!(swap_delta(&mut x, k, i, j) >= -CD_IMPROVEMENT_TOL);
        }

        let outcome = CdSwapSearch::new(usize::MAX, Some(Duration::ZERO)).run(base);
        assert_eq!(outcome.termination, Termination::TimeBudget);
        assert_eq!(outcome.iterations, 0);
    }

    #[test]
    fn test_restarts_and_maximin() {
        let space = unit_space(2);
        let base = Lhs::new()
            .sample(&space, 8, &mut RandomSource::new(11))
            .unwrap();
        let restarts = Lhs::new()
            .optimizer(Some(LhsOptimizer::Restarts(10)))
            .sample(&space, 8, &mut RandomSource::new(11))
            .unwrap();
        assert_latin(restarts.unit_points());
        assert!(
            centered_discrepancy(restarts.unit_points()) <= centered_discrepancy(base.unit_points())
        );
        let maximin = Lhs::new()
            .optimizer(Some(LhsOptimizer::Maximin(10)))
            .sample(&space, 8, &mut RandomSource::new(11))
            .unwrap();
        assert_latin(maximin.unit_points());
        assert!(
            min_pairwise_distance(maximin.unit_points())
                >= min_pairwise_distance(base.unit_points())
        );
    }

    #[test]
    fn test_strength_2() {
        let space = unit_space(4);
        let pop = Lhs::new()
            .strength(2)
            .sample(&space, 9, &mut RandomSource::new(3))
            .unwrap();
        let x = pop.unit_points();
        assert_latin(x);
        // every pair of columns covers the 3x3 coarse grid exactly once
        for c1 in 0..4 {
            for c2 in (c1 + 1)..4 {
                let mut cells: Vec<(usize, usize)> = x
                    .rows()
                    .into_iter()
                    .map(|r| ((r[c1] * 3.).floor() as usize, (r[c2] * 3.).floor() as usize))
                    .collect();
                cells.sort_unstable();
                cells.dedup();
                assert_eq!(cells.len(), 9);
            }
        }
    }

    #[test]
    fn test_strength_2_preconditions() {
        let lhs = Lhs::new().strength(2);
        let mut rng = RandomSource::new(0);
        assert!(matches!(
            lhs.sample(&unit_space(2), 8, &mut rng),
            Err(DoeError::ValidationError(_))
        ));
        assert!(matches!(
            lhs.sample(&unit_space(2), 16, &mut rng),
            Err(DoeError::ValidationError(_))
        ));
        assert!(matches!(
            lhs.sample(&unit_space(5), 9, &mut rng),
            Err(DoeError::ValidationError(_))
        ));
        assert!(matches!(
            Lhs::new().strength(3).sample(&unit_space(2), 9, &mut rng),
            Err(DoeError::ValidationError(_))
        ));
        assert!(matches!(
            lhs.optimizer(Some(LhsOptimizer::RandomCd))
                .sample(&unit_space(2), 9, &mut rng),
            Err(DoeError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_mixed_space_keeps_stratification() {
        let space = build_search_space(&[
            Dimension::integer("n", 0, 3),
            Dimension::categorical("c", ["a", "b", "c", "d"]),
        ])
        .unwrap();
        let pop = Lhs::new()
            .sample(&space, 4, &mut RandomSource::new(9))
            .unwrap();
        for col in pop.points().columns() {
            let mut values = col.to_vec();
            values.sort_by(f64::total_cmp);
            assert_eq!(values, vec![0., 1., 2., 3.]);
        }
    }
}
