//! Search space definition
//!
//! A [`SearchSpace`] is an ordered list of typed [`Dimension`]s plus optional
//! inequality [`Constraint`]s. Strategies work in the unit hypercube `[0, 1)^nx`
//! and the space maps unit samples to native coordinates.
//!
//! Native points are stored as `f64` rows. As for mixed-integer handling in
//! surrogate-based optimization, a categorical component is valued by the index
//! of the choice in its label list (see [`SearchSpace::label`]).
use crate::errors::{DoeError, Result};
use ndarray::{Array1, Array2, ArrayBase, ArrayView1, Data, Ix2, Zip};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Type of a search space component
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum XType {
    /// Continuous variable in [lower bound, upper bound]
    Float(f64, f64),
    /// Integer variable in lower bound ..= upper bound
    Int(i64, i64),
    /// An ordered variable in { float_1, float_2, ..., float_n }
    Ord(Vec<f64>),
    /// A categorical variable valued by one of the given labels
    Enum(Vec<String>),
}

/// A named component of the search space
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct Dimension {
    name: String,
    xtype: XType,
}

/// Index of the level hit by `u` when [0, 1) is cut in `k` equal slices.
fn level_index(u: f64, k: usize) -> usize {
    ((u * k as f64).floor() as usize).min(k - 1)
}

/// Find index of the closest value to `val` in given slice `v`.
fn closest_index(v: &[f64], val: f64) -> usize {
    v.iter()
        .enumerate()
        .fold((0, f64::INFINITY), |(best, dist), (i, &level)| {
            let d = (val - level).abs();
            if d < dist {
                (i, d)
            } else {
                (best, dist)
            }
        })
        .0
}

impl Dimension {
    /// Constructor of a dimension of given name and type, validation happens
    /// when the dimension is added to a [`SearchSpace`].
    pub fn new(name: impl Into<String>, xtype: XType) -> Self {
        Dimension {
            name: name.into(),
            xtype,
        }
    }

    /// Continuous dimension in `[lower, upper]`
    pub fn continuous(name: impl Into<String>, lower: f64, upper: f64) -> Self {
        Self::new(name, XType::Float(lower, upper))
    }

    /// Integer dimension in `lower..=upper`
    pub fn integer(name: impl Into<String>, lower: i64, upper: i64) -> Self {
        Self::new(name, XType::Int(lower, upper))
    }

    /// Ordinal dimension taking one of the given numeric levels
    pub fn ordinal(name: impl Into<String>, levels: Vec<f64>) -> Self {
        Self::new(name, XType::Ord(levels))
    }

    /// Categorical dimension taking one of the given labels
    pub fn categorical<S: Into<String>>(
        name: impl Into<String>,
        choices: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::new(name, XType::Enum(choices.into_iter().map(Into::into).collect()))
    }

    /// Name of the dimension
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Type of the dimension
    pub fn xtype(&self) -> &XType {
        &self.xtype
    }

    /// Native interval `[min value, max value]` of the dimension.
    ///
    /// Categorical dimensions span their index range.
    pub fn bounds(&self) -> (f64, f64) {
        match &self.xtype {
            XType::Float(lb, ub) => (*lb, *ub),
            XType::Int(lb, ub) => (*lb as f64, *ub as f64),
            XType::Ord(levels) => (levels[0], levels[levels.len() - 1]),
            XType::Enum(choices) => (0., (choices.len() - 1) as f64),
        }
    }

    /// Map a unit value in [0, 1) to its native value.
    ///
    /// The mapping is monotonic (non decreasing) so that a stratification of
    /// the unit interval is preserved in native space. Discrete types cut the
    /// unit interval in as many equal slices as they have values.
    pub fn to_native(&self, u: f64) -> f64 {
        match &self.xtype {
            XType::Float(lb, ub) => lb + u * (ub - lb),
            XType::Int(lb, ub) => {
                let span = (*ub as f64 - *lb as f64 + 1.) as usize;
                *lb as f64 + level_index(u, span) as f64
            }
            XType::Ord(levels) => levels[level_index(u, levels.len())],
            XType::Enum(choices) => level_index(u, choices.len()) as f64,
        }
    }

    /// Map a native value to the unit interval, discrete values land at
    /// the middle of their slice.
    pub fn to_unit(&self, x: f64) -> f64 {
        match &self.xtype {
            XType::Float(lb, ub) => (x - lb) / (ub - lb),
            XType::Int(lb, ub) => {
                let span = *ub as f64 - *lb as f64 + 1.;
                (x.round() - *lb as f64 + 0.5) / span
            }
            XType::Ord(levels) => (closest_index(levels, x) as f64 + 0.5) / levels.len() as f64,
            XType::Enum(choices) => {
                let k = choices.len();
                let idx = x.round().clamp(0., (k - 1) as f64);
                (idx + 0.5) / k as f64
            }
        }
    }

    fn validate(&mut self) -> Result<()> {
        if self.name.is_empty() {
            return Err(DoeError::validation("dimension name cannot be empty"));
        }
        let name = &self.name;
        match &mut self.xtype {
            XType::Float(lb, ub) => {
                if !lb.is_finite() || !ub.is_finite() {
                    return Err(DoeError::validation(format!(
                        "dimension `{name}`: bounds must be finite, got [{lb}, {ub}]"
                    )));
                }
                if lb >= ub {
                    return Err(DoeError::validation(format!(
                        "dimension `{name}`: lower bound {lb} should be less than upper bound {ub}"
                    )));
                }
                if !(*ub - *lb).is_finite() {
                    return Err(DoeError::validation(format!(
                        "dimension `{name}`: range [{lb}, {ub}] is too wide to be represented"
                    )));
                }
            }
            XType::Int(lb, ub) => {
                if lb >= ub {
                    return Err(DoeError::validation(format!(
                        "dimension `{name}`: lower bound {lb} should be less than upper bound {ub}"
                    )));
                }
            }
            XType::Ord(levels) => {
                if levels.is_empty() {
                    return Err(DoeError::validation(format!(
                        "dimension `{name}`: ordinal levels cannot be empty"
                    )));
                }
                if levels.iter().any(|v| !v.is_finite()) {
                    return Err(DoeError::validation(format!(
                        "dimension `{name}`: ordinal levels must be finite"
                    )));
                }
                levels.sort_by(f64::total_cmp);
                if levels.windows(2).any(|w| w[0] == w[1]) {
                    return Err(DoeError::validation(format!(
                        "dimension `{name}`: ordinal levels must be distinct"
                    )));
                }
            }
            XType::Enum(choices) => {
                if choices.is_empty() {
                    return Err(DoeError::validation(format!(
                        "dimension `{name}`: categorical choices cannot be empty"
                    )));
                }
                let unique: HashSet<&String> = choices.iter().collect();
                if unique.len() != choices.len() {
                    return Err(DoeError::validation(format!(
                        "dimension `{name}`: categorical choices must be distinct"
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Predicate over a native point
pub type ConstraintFn = dyn Fn(&ArrayView1<f64>) -> bool + Send + Sync;

/// A named inequality constraint: a point is accepted when the predicate holds.
#[derive(Clone)]
pub struct Constraint {
    name: String,
    predicate: Arc<ConstraintFn>,
}

impl Constraint {
    /// Constructor given a name and a predicate over native points
    pub fn new(
        name: impl Into<String>,
        predicate: impl Fn(&ArrayView1<f64>) -> bool + Send + Sync + 'static,
    ) -> Self {
        Constraint {
            name: name.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// Name of the constraint
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the native point `x` satisfies the constraint
    pub fn is_satisfied(&self, x: &ArrayView1<f64>) -> bool {
        (self.predicate)(x)
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constraint")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// The space where seeds are generated.
///
/// Dimension order is fixed at construction and defines the component
/// order of every generated point. The space is immutable once built and
/// can be shared read-only between concurrent generations.
#[derive(Clone, Debug)]
pub struct SearchSpace {
    dims: Vec<Dimension>,
    constraints: Vec<Constraint>,
}

impl SearchSpace {
    /// Constructor validating the given dimensions
    ///
    /// ```
    /// use optiseed_doe::{Dimension, SearchSpace};
    ///
    /// let space = SearchSpace::new(vec![
    ///     Dimension::continuous("x", 0., 1.),
    ///     Dimension::integer("n", 1, 10),
    ///     Dimension::categorical("color", ["red", "green", "blue"]),
    /// ]).expect("valid space");
    /// assert_eq!(space.ndim(), 3);
    /// ```
    pub fn new(dims: Vec<Dimension>) -> Result<Self> {
        if dims.is_empty() {
            return Err(DoeError::validation(
                "search space should have at least one dimension",
            ));
        }
        let mut dims = dims;
        let mut names = HashSet::new();
        for dim in dims.iter_mut() {
            dim.validate()?;
            if !names.insert(dim.name.clone()) {
                return Err(DoeError::validation(format!(
                    "dimension name `{}` is used more than once",
                    dim.name
                )));
            }
        }
        Ok(SearchSpace {
            dims,
            constraints: vec![],
        })
    }

    /// Registers a constraint, points are feasible when all constraints hold.
    pub fn with_constraint(
        mut self,
        name: impl Into<String>,
        predicate: impl Fn(&ArrayView1<f64>) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.constraints.push(Constraint::new(name, predicate));
        self
    }

    /// Dimension of the space
    pub fn ndim(&self) -> usize {
        self.dims.len()
    }

    /// Components of the space
    pub fn dims(&self) -> &[Dimension] {
        &self.dims
    }

    /// Registered constraints
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Continuous relaxation of the space as a (nx, 2) matrix
    /// where the ith row is [lower bound, upper bound] of the ith component.
    pub fn xlimits(&self) -> Array2<f64> {
        let mut xlimits = Array2::zeros((self.ndim(), 2));
        Zip::from(xlimits.rows_mut())
            .and(&ArrayView1::from(&self.dims[..]))
            .for_each(|mut row, dim| {
                let (lb, ub) = dim.bounds();
                row[0] = lb;
                row[1] = ub;
            });
        xlimits
    }

    /// Map a (ns, nx) matrix of unit samples to native coordinates.
    ///
    /// **Panics** if the number of columns is different from [`SearchSpace::ndim`].
    pub fn unit_to_native(&self, u: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> Array2<f64> {
        let mut x = Array2::zeros(u.raw_dim());
        Zip::from(x.columns_mut())
            .and(u.columns())
            .and(&ArrayView1::from(&self.dims[..]))
            .for_each(|mut xcol, ucol, dim| {
                Zip::from(&mut xcol).and(&ucol).for_each(|x, &u| *x = dim.to_native(u));
            });
        x
    }

    /// Map a (ns, nx) matrix of native points to the unit hypercube.
    ///
    /// **Panics** if the number of columns is different from [`SearchSpace::ndim`].
    pub fn native_to_unit(&self, x: &ArrayBase<impl Data<Elem = f64>, Ix2>) -> Array2<f64> {
        let mut u = Array2::zeros(x.raw_dim());
        Zip::from(u.columns_mut())
            .and(x.columns())
            .and(&ArrayView1::from(&self.dims[..]))
            .for_each(|mut ucol, xcol, dim| {
                Zip::from(&mut ucol).and(&xcol).for_each(|u, &x| *u = dim.to_unit(x));
            });
        u
    }

    /// Whether the native point `x` satisfies every registered constraint
    pub fn is_feasible(&self, x: &ArrayView1<f64>) -> bool {
        self.constraints.iter().all(|c| c.is_satisfied(x))
    }

    /// Feasibility of each row of a (ns, nx) matrix of native points
    pub fn feasibility(&self, x: &ArrayBase<impl Data<Elem = f64> + Sync, Ix2>) -> Array1<bool> {
        let mut mask = Array1::from_elem(x.nrows(), true);
        if !self.constraints.is_empty() {
            Zip::from(&mut mask)
                .and(x.rows())
                .par_for_each(|ok, row| *ok = self.is_feasible(&row));
        }
        mask
    }

    /// Label of a categorical value of the `dim`-th component,
    /// `None` when the component is not categorical or the index is out of range.
    pub fn label(&self, dim: usize, value: f64) -> Option<&str> {
        match self.dims.get(dim).map(|d| &d.xtype) {
            Some(XType::Enum(choices)) if value >= 0. => {
                choices.get(value.round() as usize).map(|s| s.as_str())
            }
            _ => None,
        }
    }
}

/// Build and validate a search space from dimension specifications.
///
/// Fails with [`DoeError::ValidationError`] on malformed specifications.
pub fn build_search_space(dimension_specs: &[Dimension]) -> Result<SearchSpace> {
    SearchSpace::new(dimension_specs.to_vec())
}
