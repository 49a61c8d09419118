use crate::errors::Result;
use crate::metrics::QualityMetric;
use crate::population::{Metadata, MetaValue, Population};
use crate::rng::RandomSource;
use crate::space::SearchSpace;
use ndarray::{Array2, ArrayBase, ArrayView2, Data, Ix2};

/// A design generated in the unit hypercube, before mapping to native coordinates
#[derive(Clone, Debug, Default)]
pub struct Design {
    /// (ns, nx) matrix of samples in `[0, 1)^nx`
    pub unit: Array2<f64>,
    /// Strategy specific information about the generation
    pub metadata: Metadata,
}

impl Design {
    /// Constructor from unit samples without metadata
    pub fn new(unit: Array2<f64>) -> Self {
        Design {
            unit,
            metadata: Metadata::new(),
        }
    }

    /// Adds a metadata entry
    pub fn with(mut self, key: &str, value: impl Into<MetaValue>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}

/// Sampling method allowing to generate a set of seeds in a given search space.
///
/// A sampling method works in the unit hypercube `[0, 1)^nx` where `nx` is the
/// dimension of the search space, the points are then mapped to native coordinates
/// by the [`SearchSpace`].
pub trait SamplingMethod {
    /// Name of the method, recorded as provenance of generated populations
    fn name(&self) -> &'static str;

    /// Quality index used as the population score
    fn quality_metric(&self) -> QualityMetric {
        QualityMetric::CenteredDiscrepancy
    }

    /// Generates a design of `ns` samples belonging to `[0, 1)^nx`
    ///
    /// # Parameters
    ///
    /// * `space`: the search space (dimension, feasibility)
    /// * `ns`: number of samples
    /// * `rng`: random source owned by this generation
    fn normalized_sample(
        &self,
        space: &SearchSpace,
        ns: usize,
        rng: &mut RandomSource,
    ) -> Result<Design>;

    /// Generates a population of `ns` points in native coordinates of `space`.
    ///
    /// Points violating the space constraints are kept (stratification would be lost otherwise)
    /// and counted under the `n_infeasible` metadata key.
    fn sample(&self, space: &SearchSpace, ns: usize, rng: &mut RandomSource) -> Result<Population> {
        let seed = rng.seed();
        let Design { unit, mut metadata } = self.normalized_sample(space, ns, rng)?;
        let points = space.unit_to_native(&unit);

        let n_infeasible = space.feasibility(&points).iter().filter(|ok| !**ok).count();
        metadata.insert("n_infeasible".to_string(), n_infeasible.into());

        let metric = self.quality_metric();
        metadata.insert("quality_metric".to_string(), metric.name().into());
        let score = Some(metric.compute(&unit)).filter(|s| unit.nrows() > 0 && s.is_finite());

        Ok(Population::new(
            points,
            unit,
            self.name(),
            seed,
            score,
            metadata,
        ))
    }
}

/// A point set of the unit hypercube that can be scored by [`evaluate`](crate::evaluate)
pub trait UnitPoints {
    /// (ns, nx) view of points belonging to `[0, 1)^nx`
    fn unit_points(&self) -> ArrayView2<'_, f64>;
}

impl<S: Data<Elem = f64>> UnitPoints for ArrayBase<S, Ix2> {
    fn unit_points(&self) -> ArrayView2<'_, f64> {
        self.view()
    }
}
