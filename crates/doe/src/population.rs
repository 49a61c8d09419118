use crate::metrics::{evaluate, Quality};
use crate::traits::UnitPoints;
use ndarray::{Array2, ArrayView2};
use std::collections::BTreeMap;
use std::fmt;

#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Value of a population metadata entry
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serializable", serde(untagged))]
pub enum MetaValue {
    /// A flag
    Bool(bool),
    /// A count or an integer setting
    Int(i64),
    /// A score or a real setting
    Float(f64),
    /// A name
    Text(String),
}

impl fmt::Display for MetaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetaValue::Bool(v) => write!(f, "{v}"),
            MetaValue::Int(v) => write!(f, "{v}"),
            MetaValue::Float(v) => write!(f, "{v}"),
            MetaValue::Text(v) => write!(f, "{v}"),
        }
    }
}

impl From<bool> for MetaValue {
    fn from(v: bool) -> Self {
        MetaValue::Bool(v)
    }
}

impl From<i64> for MetaValue {
    fn from(v: i64) -> Self {
        MetaValue::Int(v)
    }
}

impl From<usize> for MetaValue {
    fn from(v: usize) -> Self {
        MetaValue::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<f64> for MetaValue {
    fn from(v: f64) -> Self {
        MetaValue::Float(v)
    }
}

impl From<&str> for MetaValue {
    fn from(v: &str) -> Self {
        MetaValue::Text(v.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(v: String) -> Self {
        MetaValue::Text(v)
    }
}

/// Open key-value map attached to a population
pub type Metadata = BTreeMap<String, MetaValue>;

/// Metadata key flagging a greedy selection that ran out of feasible candidates
pub const EXHAUSTED_KEY: &str = "exhausted";

/// The set of seeds produced by one generation call.
///
/// Rows of `points` are in native coordinates of the search space (categorical
/// components valued by choice index) and rows of `unit_points` are the same
/// points in the unit hypercube. A population is immutable once returned.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct Population {
    points: Array2<f64>,
    unit_points: Array2<f64>,
    strategy: String,
    seed: u64,
    quality_score: Option<f64>,
    metadata: Metadata,
}

impl Population {
    pub(crate) fn new(
        points: Array2<f64>,
        unit_points: Array2<f64>,
        strategy: &str,
        seed: u64,
        quality_score: Option<f64>,
        metadata: Metadata,
    ) -> Self {
        Population {
            points,
            unit_points,
            strategy: strategy.to_string(),
            seed,
            quality_score,
            metadata,
        }
    }

    /// (ns, nx) matrix of points in native coordinates
    pub fn points(&self) -> &Array2<f64> {
        &self.points
    }

    /// (ns, nx) matrix of the same points in the unit hypercube
    pub fn unit_points(&self) -> &Array2<f64> {
        &self.unit_points
    }

    /// Name of the strategy which generated the population
    pub fn strategy(&self) -> &str {
        &self.strategy
    }

    /// Seed of the random source used for the generation
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Score of the strategy objective (see `quality_metric` metadata),
    /// `None` when undefined (e.g. empty population)
    pub fn quality_score(&self) -> Option<f64> {
        self.quality_score
    }

    /// Strategy specific generation information
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Number of points
    pub fn len(&self) -> usize {
        self.points.nrows()
    }

    /// Whether the population has no point
    pub fn is_empty(&self) -> bool {
        self.points.nrows() == 0
    }

    /// Dimension of the points
    pub fn ndim(&self) -> usize {
        self.points.ncols()
    }

    /// Whether fewer points than requested were produced because feasible
    /// candidates ran out
    pub fn is_exhausted(&self) -> bool {
        matches!(self.metadata.get(EXHAUSTED_KEY), Some(MetaValue::Bool(true)))
    }

    /// Quality indices of the population
    pub fn evaluate(&self) -> Quality {
        evaluate(self)
    }
}

impl UnitPoints for Population {
    fn unit_points(&self) -> ArrayView2<'_, f64> {
        self.unit_points.view()
    }
}
