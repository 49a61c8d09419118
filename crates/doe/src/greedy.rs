use crate::errors::{DoeError, Result};
use crate::metrics::QualityMetric;
use crate::population::EXHAUSTED_KEY;
use crate::rng::RandomSource;
use crate::sobol::{check_sobol, sobol_points, Scramble};
use crate::space::SearchSpace;
use crate::traits::{Design, SamplingMethod};
use crate::utils::sq_dist;
use log::{debug, warn};
use ndarray::{s, Array1, Array2, ArrayView1, Axis, Zip};
use ndarray_stats::QuantileExt;

#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Default ratio between the candidate pool size and the number of samples
pub const GREEDY_DEFAULT_MULTIPLIER: usize = 50;

/// Squared distances closer than this are considered equal when ranking candidates
const TIE_TOL: f64 = 1e-12;

/// Source of the candidates of the greedy selection
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum CandidatePool {
    /// Sobol points with the given scrambling
    Sobol(Scramble),
    /// Uniform random points
    Random,
}

impl Default for CandidatePool {
    fn default() -> Self {
        CandidatePool::Sobol(Scramble::LinearMatrix)
    }
}

impl CandidatePool {
    /// Name as recorded in population metadata
    pub fn name(&self) -> &'static str {
        match self {
            CandidatePool::Sobol(_) => "sobol",
            CandidatePool::Random => "random",
        }
    }
}

/// Choice of the first selected point
#[derive(Clone, Debug, Default, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum GreedyStart {
    /// First feasible candidate of the pool
    #[default]
    FirstCandidate,
    /// Center of the unit hypercube if feasible, nearest feasible candidate otherwise
    Center,
    /// Feasible candidate drawn at random
    Random,
}

impl GreedyStart {
    /// Name as recorded in population metadata
    pub fn name(&self) -> &'static str {
        match self {
            GreedyStart::FirstCandidate => "first_candidate",
            GreedyStart::Center => "center",
            GreedyStart::Random => "random",
        }
    }
}

/// Max-min selection: indices of the selected candidates and their distance
/// to the previously selected points at selection time
#[derive(Clone, Debug, Default)]
pub(crate) struct Selection {
    pub indices: Vec<usize>,
    pub min_dists: Vec<f64>,
}

/// Selects up to `n_select` candidates one by one, each maximizing its distance
/// to the nearest already selected point (`first` and previous picks).
/// The candidate `excluded` is never selected. Ties go to the lowest index.
pub(crate) fn select_farthest(
    candidates: &Array2<f64>,
    first: &ArrayView1<f64>,
    excluded: Option<usize>,
    n_select: usize,
) -> Selection {
    let mut nearest = Array1::zeros(candidates.nrows());
    Zip::from(&mut nearest)
        .and(candidates.rows())
        .par_for_each(|d, row| *d = sq_dist(&row, first));
    if let Some(i) = excluded {
        nearest[i] = f64::NEG_INFINITY;
    }

    let mut selection = Selection::default();
    while selection.indices.len() < n_select {
        let max = nearest
            .iter()
            .filter(|d| d.is_finite())
            .fold(f64::NEG_INFINITY, |m, &d| m.max(d));
        if !max.is_finite() {
            break;
        }
        let Some(i) = nearest
            .iter()
            .position(|&d| d.is_finite() && d >= max - TIE_TOL)
        else {
            break;
        };
        let d = nearest[i];
        selection.indices.push(i);
        selection.min_dists.push(d.sqrt());
        nearest[i] = f64::NEG_INFINITY;
        let picked = candidates.row(i);
        Zip::from(&mut nearest)
            .and(candidates.rows())
            .par_for_each(|d, row| {
                if d.is_finite() {
                    *d = d.min(sq_dist(&row, &picked));
                }
            });
    }
    selection
}

/// The greedy farthest point design picks points one at a time from a large pool
/// of feasible candidates, each new point maximizing its distance to the nearest
/// already picked point (max-min criterion).
///
/// It is the only strategy which enforces the constraints of the search space:
/// fewer points than requested are returned when feasible candidates run out.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct GreedyFarthest {
    candidate_multiplier: Option<usize>,
    candidate_pool: CandidatePool,
    start: GreedyStart,
}

impl GreedyFarthest {
    /// Constructor with a Sobol candidate pool 50 times larger than the sample
    ///
    /// ```
    /// use optiseed_doe::{build_search_space, Dimension, GreedyFarthest, GreedyStart, RandomSource, SamplingMethod};
    ///
    /// let space = build_search_space(&[
    ///     Dimension::continuous("x", -1., 1.),
    ///     Dimension::continuous("y", -1., 1.),
    /// ])
    /// .unwrap()
    /// .with_constraint("disk", |x| x[0] * x[0] + x[1] * x[1] <= 1.);
    /// let pop = GreedyFarthest::new()
    ///     .start(GreedyStart::Center)
    ///     .sample(&space, 8, &mut RandomSource::new(42))
    ///     .unwrap();
    /// assert_eq!(pop.len(), 8);
    /// assert_eq!(pop.points().row(0).to_vec(), vec![0., 0.]);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the ratio between the candidate pool size and the number of samples
    pub fn candidate_multiplier(mut self, multiplier: usize) -> Self {
        self.candidate_multiplier = Some(multiplier);
        self
    }

    /// Sets the source of candidates
    pub fn candidate_pool(mut self, pool: CandidatePool) -> Self {
        self.candidate_pool = pool;
        self
    }

    /// Sets the choice of the first point
    pub fn start(mut self, start: GreedyStart) -> Self {
        self.start = start;
        self
    }

    /// Size of the candidate pool for `ns` samples
    pub(crate) fn n_candidates(&self, ns: usize) -> Result<usize> {
        let multiplier = self
            .candidate_multiplier
            .unwrap_or(GREEDY_DEFAULT_MULTIPLIER);
        if multiplier == 0 {
            return Err(DoeError::validation(
                "greedy farthest point candidate multiplier should be positive",
            ));
        }
        Ok(ns.saturating_mul(multiplier).max(ns + 1))
    }

    fn candidates(&self, n: usize, nx: usize, rng: &mut RandomSource) -> Result<Array2<f64>> {
        match self.candidate_pool {
            CandidatePool::Sobol(scramble) => sobol_points(n, nx, 0, scramble, rng),
            CandidatePool::Random => Ok(rng.uniform(n, nx)),
        }
    }
}

impl SamplingMethod for GreedyFarthest {
    fn name(&self) -> &'static str {
        "greedy_farthest"
    }

    fn quality_metric(&self) -> QualityMetric {
        QualityMetric::MinPairwiseDistance
    }

    fn normalized_sample(
        &self,
        space: &SearchSpace,
        ns: usize,
        rng: &mut RandomSource,
    ) -> Result<Design> {
        let nx = space.ndim();
        let n_candidates = self.n_candidates(ns)?;
        if let CandidatePool::Sobol(_) = self.candidate_pool {
            check_sobol(nx, n_candidates, 0)?;
        }
        let design = Design::new(Array2::zeros((0, nx)))
            .with("requested", ns)
            .with("candidate_pool", self.candidate_pool.name())
            .with("start", self.start.name());
        if ns == 0 {
            return Ok(design.with(EXHAUSTED_KEY, false));
        }

        let candidates = self.candidates(n_candidates, nx, rng)?;
        let feasible: Vec<usize> = space
            .feasibility(&space.unit_to_native(&candidates))
            .iter()
            .enumerate()
            .filter_map(|(i, &ok)| ok.then_some(i))
            .collect();
        let candidates = candidates.select(Axis(0), &feasible);
        let n_feasible = candidates.nrows();
        debug!("Greedy farthest point: {n_feasible}/{n_candidates} feasible candidates");

        let center = Array1::from_elem(nx, 0.5);
        let center_native = space.unit_to_native(&center.view().insert_axis(Axis(0)));
        let center_is_feasible = space.is_feasible(&center_native.row(0));
        let (first, excluded) = match self.start {
            GreedyStart::Center if center_is_feasible => (Some(center), None),
            _ if n_feasible == 0 => (None, None),
            GreedyStart::FirstCandidate => (Some(candidates.row(0).to_owned()), Some(0)),
            GreedyStart::Center => {
                let dists = candidates.map_axis(Axis(1), |row| sq_dist(&row, &center.view()));
                let i = dists.argmin().unwrap_or(0);
                (Some(candidates.row(i).to_owned()), Some(i))
            }
            GreedyStart::Random => {
                let i = rng.randint(0, n_feasible as i64)? as usize;
                (Some(candidates.row(i).to_owned()), Some(i))
            }
        };

        let unit = match first {
            None => Array2::zeros((0, nx)),
            Some(first) => {
                let selection = select_farthest(&candidates, &first.view(), excluded, ns - 1);
                let mut unit = Array2::zeros((selection.indices.len() + 1, nx));
                unit.row_mut(0).assign(&first);
                unit.slice_mut(s![1.., ..])
                    .assign(&candidates.select(Axis(0), &selection.indices));
                unit
            }
        };

        let exhausted = unit.nrows() < ns;
        if exhausted {
            warn!(
                "Greedy farthest point: only {} feasible points out of {ns} requested",
                unit.nrows()
            );
        }
        Ok(Design { unit, ..design }
            .with("n_candidates", n_candidates)
            .with("n_feasible", n_feasible)
            .with(EXHAUSTED_KEY, exhausted))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::min_pairwise_distance;
    use crate::space::{build_search_space, Dimension};
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn unit_space(nx: usize) -> SearchSpace {
        let dims: Vec<Dimension> = (0..nx)
            .map(|i| Dimension::continuous(format!("x{i}"), 0., 1.))
            .collect();
        build_search_space(&dims).unwrap()
    }

    #[test]
    fn test_select_farthest_max_min() {
        let candidates = RandomSource::new(0).uniform(200, 2);
        let selection = select_farthest(&candidates, &candidates.row(0), Some(0), 10);
        assert_eq!(selection.indices.len(), 10);
        let mut chosen = vec![0];
        for (&i, &d) in selection.indices.iter().zip(&selection.min_dists) {
            let dist_to_chosen = |k: usize| {
                chosen
                    .iter()
                    .map(|&c| sq_dist(&candidates.row(k), &candidates.row(c)).sqrt())
                    .fold(f64::INFINITY, f64::min)
            };
            assert_abs_diff_eq!(dist_to_chosen(i), d, epsilon = 1e-12);
            for k in (0..200).filter(|k| !chosen.contains(k)) {
                assert!(dist_to_chosen(k) <= d + 1e-9);
            }
            chosen.push(i);
        }
        // max-min distances of successive picks never increase
        assert!(selection.min_dists.windows(2).all(|w| w[1] <= w[0] + 1e-12));
    }

    #[test]
    fn test_select_farthest_ties() {
        let candidates = array![[0.5, 0.5], [0., 0.], [1., 1.], [0., 1.], [1., 0.]];
        let selection = select_farthest(&candidates, &candidates.row(0), Some(0), 4);
        assert_eq!(selection.indices, vec![1, 2, 3, 4]);
        let selection = select_farthest(&candidates, &candidates.row(0), Some(0), 10);
        assert_eq!(selection.indices.len(), 4);
    }

    #[test]
    fn test_select_farthest_near_tie_chain() {
        // squared distances to the origin: 1, 1 + 0.9e-12, 1 + 1.05e-12
        let candidates = array![
            [0., 0.],
            [1., 0.],
            [(1. + 0.9e-12_f64).sqrt(), 0.],
            [(1. + 1.05e-12_f64).sqrt(), 0.]
        ];
        let selection = select_farthest(&candidates, &candidates.row(0), Some(0), 1);
        assert_eq!(selection.indices, vec![2]);
    }

    #[test]
    fn test_greedy_farthest() {
        let space = unit_space(2);
        let pop = GreedyFarthest::new()
            .sample(&space, 10, &mut RandomSource::new(42))
            .unwrap();
        assert_eq!(pop.len(), 10);
        assert!(!pop.is_exhausted());
        assert_eq!(pop.metadata()["n_candidates"], crate::MetaValue::Int(500));
        assert_eq!(
            pop.quality_score(),
            Some(min_pairwise_distance(pop.unit_points()))
        );
        let random = RandomSource::new(42).uniform(10, 2);
        assert!(min_pairwise_distance(pop.unit_points()) > min_pairwise_distance(&random));
    }

    #[test]
    fn test_greedy_reproducible() {
        let space = unit_space(3);
        for start in [GreedyStart::FirstCandidate, GreedyStart::Center, GreedyStart::Random] {
            let greedy = GreedyFarthest::new()
                .candidate_pool(CandidatePool::Random)
                .start(start);
            let pop1 = greedy.sample(&space, 6, &mut RandomSource::new(5)).unwrap();
            let pop2 = greedy.sample(&space, 6, &mut RandomSource::new(5)).unwrap();
            assert_eq!(pop1, pop2);
        }
    }

    #[test]
    fn test_greedy_start() {
        let space = unit_space(2);
        let pop = GreedyFarthest::new()
            .start(GreedyStart::Center)
            .sample(&space, 3, &mut RandomSource::new(1))
            .unwrap();
        let center = array![0.5, 0.5];
        assert_abs_diff_eq!(pop.unit_points().row(0), center.view());

        // center is infeasible: nearest feasible candidate
        let space = unit_space(2).with_constraint("corner", |x| x[0] < 0.4);
        let pop = GreedyFarthest::new()
            .start(GreedyStart::Center)
            .sample(&space, 3, &mut RandomSource::new(1))
            .unwrap();
        assert!(pop.points().rows().into_iter().all(|r| r[0] < 0.4));
    }

    #[test]
    fn test_greedy_constraints_exhaustion() {
        let space = unit_space(2).with_constraint("small", |x| x[0] < 0.05 && x[1] < 0.05);
        let pop = GreedyFarthest::new()
            .candidate_multiplier(2)
            .candidate_pool(CandidatePool::Sobol(Scramble::None))
            .sample(&space, 32, &mut RandomSource::new(0))
            .unwrap();
        // only index 0 of the 64 first Sobol points lies in [0, 0.05)^2
        assert!(pop.len() < 32);
        assert!(pop.is_exhausted());
        assert_eq!(pop.metadata()["n_feasible"], crate::MetaValue::Int(pop.len() as i64));
        assert_eq!(pop.metadata()["n_infeasible"], crate::MetaValue::Int(0));

        let space = unit_space(2).with_constraint("none", |_| false);
        let pop = GreedyFarthest::new()
            .sample(&space, 4, &mut RandomSource::new(0))
            .unwrap();
        assert!(pop.is_empty());
        assert!(pop.is_exhausted());
    }

    #[test]
    fn test_greedy_invalid() {
        let mut rng = RandomSource::new(0);
        assert!(matches!(
            GreedyFarthest::new()
                .candidate_multiplier(0)
                .sample(&unit_space(2), 4, &mut rng),
            Err(DoeError::ValidationError(_))
        ));
        assert!(matches!(
            GreedyFarthest::new().sample(&unit_space(65), 4, &mut rng),
            Err(DoeError::ValidationError(_))
        ));
        let pop = GreedyFarthest::new()
            .sample(&unit_space(2), 0, &mut rng)
            .unwrap();
        assert!(pop.is_empty());
        assert!(!pop.is_exhausted());
    }
}
