use crate::errors::{DoeError, Result};
use crate::params::{GenerateParams, SeedOptions};
use crate::population::Population;
use crate::space::SearchSpace;
use linfa::ParamGuard;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Available generation strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serializable", serde(rename_all = "snake_case"))]
pub enum StrategyKind {
    /// Uniform random sampling, see [`Random`](crate::Random)
    Random,
    /// Latin hypercube sampling, see [`Lhs`](crate::Lhs)
    LatinHypercube,
    /// Sobol low-discrepancy sequence, see [`Sobol`](crate::Sobol)
    Sobol,
    /// Greedy max-min selection, see [`GreedyFarthest`](crate::GreedyFarthest)
    GreedyFarthest,
}

impl StrategyKind {
    /// All strategies
    pub const ALL: [StrategyKind; 4] = [
        StrategyKind::Random,
        StrategyKind::LatinHypercube,
        StrategyKind::Sobol,
        StrategyKind::GreedyFarthest,
    ];

    /// Canonical name of the strategy
    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::Random => "random",
            StrategyKind::LatinHypercube => "latin_hypercube",
            StrategyKind::Sobol => "sobol",
            StrategyKind::GreedyFarthest => "greedy_farthest",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for StrategyKind {
    type Err = DoeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "random" | "uniform_random" => Ok(StrategyKind::Random),
            "latin_hypercube" | "lhs" => Ok(StrategyKind::LatinHypercube),
            "sobol" | "low_discrepancy" => Ok(StrategyKind::Sobol),
            "greedy_farthest" | "greedy_farthest_point" | "gfp" => {
                Ok(StrategyKind::GreedyFarthest)
            }
            _ => Err(DoeError::configuration(format!(
                "unknown strategy `{s}`, expected one of: {}",
                StrategyKind::ALL.map(|k| k.name()).join(", ")
            ))),
        }
    }
}

/// Generates `count` seeds in `space` with the strategy named `strategy_name`.
///
/// The strategy name, the options and the counts are checked before any random draw:
/// unknown strategies and unsupported option combinations give a
/// [`DoeError::ConfigurationError`], out of range values a [`DoeError::ValidationError`].
/// Same arguments give the same population.
///
/// ```
/// use optiseed_doe::{build_search_space, generate, Dimension, SeedOptions};
///
/// let space = build_search_space(&[
///     Dimension::continuous("x", 0., 1.),
///     Dimension::continuous("y", 0., 1.),
/// ]).unwrap();
/// let pop = generate(&space, "latin_hypercube", 4, 42, &SeedOptions::default()).unwrap();
/// assert_eq!(pop.len(), 4);
/// assert_eq!(pop.strategy(), "latin_hypercube");
/// ```
pub fn generate(
    space: &SearchSpace,
    strategy_name: &str,
    count: usize,
    seed: u64,
    options: &SeedOptions,
) -> Result<Population> {
    let strategy: StrategyKind = strategy_name.parse()?;
    GenerateParams::new(space, strategy, count, seed)
        .options(options.clone())
        .check()?
        .generate(space)
}
