//! Space-filling quality metrics.
//!
//! All metrics are pure functions of a point set given as a (ns, nx) matrix
//! whose rows are points of the unit hypercube. They do not depend on how the
//! set was generated and parallel evaluation is reduced in a fixed order, so
//! identical inputs give bit-identical outputs.
use crate::traits::UnitPoints;
use crate::utils::{pdist, sq_dist};
use linfa::Float;
use ndarray::{Array1, Array2, ArrayBase, Data, Ix2, Zip};
use rayon::prelude::*;
use std::collections::BTreeMap;

#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Max number of probe points used by [`coverage_ratio`]
pub const COVERAGE_MAX_PROBES: usize = 4096;

/// Sum in index order of a per-point quantity computed in parallel
fn ordered_sum<F: Float>(n: usize, f: impl Fn(usize) -> F + Sync + Send) -> F {
    let terms: Vec<F> = (0..n).into_par_iter().map(f).collect();
    terms.into_iter().fold(F::zero(), |acc, v| acc + v)
}

/// Centered L2-discrepancy (squared) of a point set of the unit hypercube.
///
/// Hickernell's closed form:
/// `CD² = (13/12)^d - 2/n Σ_i Π_k (1 + |z_ik|/2 - z_ik²/2)
///        + 1/n² Σ_i Σ_j Π_k (1 + |z_ik|/2 + |z_jk|/2 - |x_ik - x_jk|/2)`
/// with `z = x - 1/2`. Lower is better. An empty set gives `(13/12)^d`.
pub fn centered_discrepancy<F: Float>(x: &ArrayBase<impl Data<Elem = F> + Sync, Ix2>) -> F {
    let (n, nx) = x.dim();
    let half = F::cast(0.5);
    let c0 = F::cast(13. / 12.).powi(nx as i32);
    if n == 0 {
        return c0;
    }
    let z = x.mapv(|v| (v - half).abs());

    let sum1 = ordered_sum(n, |i| {
        z.row(i)
            .fold(F::one(), |acc, &zk| acc * (F::one() + half * zk - half * zk * zk))
    });
    let sum2 = ordered_sum(n, |i| {
        let (xi, zi) = (x.row(i), z.row(i));
        (0..n).fold(F::zero(), |acc, j| {
            let (xj, zj) = (x.row(j), z.row(j));
            let mut prod = F::one();
            for k in 0..nx {
                prod *= F::one() + half * (zi[k] + zj[k] - (xi[k] - xj[k]).abs());
            }
            acc + prod
        })
    });

    let nf = F::cast(n);
    c0 - F::cast(2.) / nf * sum1 + sum2 / (nf * nf)
}

/// Wrap-around L2-discrepancy (squared) of a point set of the unit hypercube.
///
/// `WD² = -(4/3)^d + 1/n² Σ_i Σ_j Π_k (3/2 - |x_ik - x_jk| (1 - |x_ik - x_jk|))`.
/// Lower is better. An empty set gives `(4/3)^d`.
pub fn wrap_around_discrepancy<F: Float>(x: &ArrayBase<impl Data<Elem = F> + Sync, Ix2>) -> F {
    let (n, nx) = x.dim();
    let c0 = F::cast(4. / 3.).powi(nx as i32);
    if n == 0 {
        return c0;
    }
    let three_half = F::cast(1.5);
    let sum = ordered_sum(n, |i| {
        let xi = x.row(i);
        (0..n).fold(F::zero(), |acc, j| {
            let xj = x.row(j);
            let mut prod = F::one();
            for k in 0..nx {
                let d = (xi[k] - xj[k]).abs();
                prod *= three_half - d * (F::one() - d);
            }
            acc + prod
        })
    });
    let nf = F::cast(n);
    sum / (nf * nf) - c0
}

/// Minimum euclidean distance over all unordered pairs of points.
///
/// A set of less than two points has no pair: `+inf` is returned.
pub fn min_pairwise_distance<F: Float>(x: &ArrayBase<impl Data<Elem = F> + Sync, Ix2>) -> F {
    pdist(x).fold(F::infinity(), |acc, &d| acc.min(d))
}

/// Default distance threshold used by [`evaluate`] for a set of `n` points in dimension `nx`:
/// half the diagonal of a cube of volume `1/n`.
pub fn default_coverage_threshold(n: usize, nx: usize) -> f64 {
    if n == 0 || nx == 0 {
        return f64::INFINITY;
    }
    0.5 * (nx as f64).sqrt() * (n as f64).powf(-1. / nx as f64)
}

/// Fixed probe set used to measure coverage in dimension `nx`.
///
/// A regular grid of `m^nx` cell centers with the largest `m >= 2` such that
/// `m^nx <= COVERAGE_MAX_PROBES`. When even `2^nx` is too large, the first
/// `COVERAGE_MAX_PROBES` points of the Kronecker (R_d) lattice are used.
pub fn probe_points<F: Float>(nx: usize) -> Array2<F> {
    if nx == 0 {
        return Array2::zeros((1, 0));
    }
    let fits = |m: usize| {
        m.checked_pow(nx as u32)
            .is_some_and(|total| total <= COVERAGE_MAX_PROBES)
    };
    let mut m = 1;
    while fits(m + 1) {
        m += 1;
    }

    if m >= 2 {
        let total = m.pow(nx as u32);
        Array2::from_shape_fn((total, nx), |(r, k)| {
            let level = (r / m.pow(k as u32)) % m;
            F::cast((level as f64 + 0.5) / m as f64)
        })
    } else {
        // generalized golden ratio: unique positive root of x^(d+1) = x + 1
        let mut phi = 2.0f64;
        for _ in 0..30 {
            phi = (1. + phi).powf(1. / (nx as f64 + 1.));
        }
        let alpha: Vec<f64> = (0..nx).map(|k| (1. / phi).powi(k as i32 + 1) % 1.).collect();
        Array2::from_shape_fn((COVERAGE_MAX_PROBES, nx), |(i, k)| {
            F::cast((0.5 + alpha[k] * (i as f64 + 1.)) % 1.)
        })
    }
}

/// Fraction of the default probe set (see [`probe_points`]) lying within
/// `threshold` (euclidean distance) of some point of `x`.
pub fn coverage_ratio<F: Float>(x: &ArrayBase<impl Data<Elem = F> + Sync, Ix2>, threshold: F) -> F {
    coverage_ratio_with_probes(x, &probe_points::<F>(x.ncols()), threshold)
}

/// Fraction of the given `probes` lying within `threshold` of some point of `x`.
///
/// **Panics** if `x` and `probes` do not have the same number of columns.
pub fn coverage_ratio_with_probes<F: Float>(
    x: &ArrayBase<impl Data<Elem = F> + Sync, Ix2>,
    probes: &ArrayBase<impl Data<Elem = F> + Sync, Ix2>,
    threshold: F,
) -> F {
    if x.ncols() != probes.ncols() {
        panic!(
            "coverage_ratio: points and probes should have same nb of columns. Found {} and {}",
            x.ncols(),
            probes.ncols()
        );
    }
    if x.nrows() == 0 || probes.nrows() == 0 {
        return F::zero();
    }
    let threshold2 = threshold * threshold;
    let mut covered = Array1::from_elem(probes.nrows(), false);
    Zip::from(&mut covered)
        .and(probes.rows())
        .par_for_each(|hit, probe| {
            *hit = x.rows().into_iter().any(|p| sq_dist(&p, &probe) <= threshold2);
        });
    let count = covered.iter().filter(|&&hit| hit).count();
    F::cast(count) / F::cast(probes.nrows())
}

/// Quality index used as the objective of a strategy
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum QualityMetric {
    /// See [`centered_discrepancy`]
    CenteredDiscrepancy,
    /// See [`wrap_around_discrepancy`]
    WrapAroundDiscrepancy,
    /// See [`min_pairwise_distance`]
    MinPairwiseDistance,
}

impl QualityMetric {
    /// Metric name as used in [`Quality::as_map`]
    pub fn name(&self) -> &'static str {
        match self {
            QualityMetric::CenteredDiscrepancy => "centered_discrepancy",
            QualityMetric::WrapAroundDiscrepancy => "wrap_around_discrepancy",
            QualityMetric::MinPairwiseDistance => "min_pairwise_distance",
        }
    }

    /// Score of the unit hypercube point set `x`
    pub fn compute(&self, x: &ArrayBase<impl Data<Elem = f64> + Sync, Ix2>) -> f64 {
        match self {
            QualityMetric::CenteredDiscrepancy => centered_discrepancy(x),
            QualityMetric::WrapAroundDiscrepancy => wrap_around_discrepancy(x),
            QualityMetric::MinPairwiseDistance => min_pairwise_distance(x),
        }
    }
}

/// Space-filling quality indices of a point set
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct Quality {
    /// Centered L2-discrepancy (squared), lower is better
    pub centered_discrepancy: f64,
    /// Wrap-around L2-discrepancy (squared), lower is better
    pub wrap_around_discrepancy: f64,
    /// Minimum pairwise distance, higher is better
    pub min_pairwise_distance: f64,
    /// Ratio of covered probes with the default threshold, higher is better
    pub coverage_ratio: f64,
}

impl Quality {
    /// Metric name to score mapping
    pub fn as_map(&self) -> BTreeMap<&'static str, f64> {
        BTreeMap::from([
            (
                QualityMetric::CenteredDiscrepancy.name(),
                self.centered_discrepancy,
            ),
            (
                QualityMetric::WrapAroundDiscrepancy.name(),
                self.wrap_around_discrepancy,
            ),
            (
                QualityMetric::MinPairwiseDistance.name(),
                self.min_pairwise_distance,
            ),
            ("coverage_ratio", self.coverage_ratio),
        ])
    }
}

/// Standalone quality assessment of a population or of any unit hypercube point set.
///
/// ```
/// use optiseed_doe::{evaluate, generate, build_search_space, Dimension, SeedOptions};
///
/// let space = build_search_space(&[Dimension::continuous("x", 0., 1.)]).unwrap();
/// let pop = generate(&space, "sobol", 8, 0, &SeedOptions::default()).unwrap();
/// let scores = evaluate(&pop).as_map();
/// assert!(scores["centered_discrepancy"] < 0.01);
/// ```
pub fn evaluate(points: &impl UnitPoints) -> Quality {
    let x = points.unit_points();
    let threshold = default_coverage_threshold(x.nrows(), x.ncols());
    Quality {
        centered_discrepancy: centered_discrepancy(&x),
        wrap_around_discrepancy: wrap_around_discrepancy(&x),
        min_pairwise_distance: min_pairwise_distance(&x),
        coverage_ratio: coverage_ratio(&x, threshold),
    }
}
