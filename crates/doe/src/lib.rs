/*!
This library generates space-filling initial point sets (seeds) for optimization algorithms
within a bounded, possibly mixed continuous/integer/ordinal/categorical search space.

A [`SearchSpace`] is an ordered list of [`Dimension`]s, optionally restricted by constraints.
Points are generated in the unit hypercube `[0, 1)^nx` by a sampling method then mapped to
native coordinates (categorical components are valued by their choice index).

Example:
```
use optiseed_doe::{build_search_space, evaluate, generate, Dimension, SeedOptions};

let space = build_search_space(&[
    Dimension::continuous("x", 5., 10.),
    Dimension::integer("n", 1, 4),
    Dimension::categorical("solver", ["lbfgs", "cobyla"]),
]).unwrap();

// Five samples with an optimized latin hypercube, reproducible with the seed 42
let options = SeedOptions::new().optimize(true);
let pop = generate(&space, "latin_hypercube", 5, 42, &options).unwrap();
assert_eq!(pop.points().dim(), (5, 3));

// or else with a scrambled Sobol sequence
let pop = generate(&space, "sobol", 8, 42, &SeedOptions::new().scramble(true)).unwrap();

let quality = evaluate(&pop);
assert!(quality.min_pairwise_distance > 0.);
```

This library contains four sampling methods:
* [Uniform random sampling](crate::random::Random),
* [Latin Hypercube Sampling](crate::lhs::Lhs) with optional centered discrepancy optimization
  or strength 2 orthogonal array construction,
* [Sobol low-discrepancy sequence](crate::sobol::Sobol) with optional scrambling,
* [Greedy farthest point selection](crate::greedy::GreedyFarthest) enforcing constraints,

and the space-filling quality [metrics](crate::metrics) used to optimize and assess point sets.

The library logs through the `log` facade and never installs a logger,
applications may use `env_logger` with the [`OPTISEED_LOG`] variable.
*/
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
mod errors;
mod generate;
mod greedy;
mod lhs;
pub mod metrics;
mod params;
mod population;
mod random;
mod rng;
mod sobol;
mod sobol_tables;
mod space;
mod traits;
mod utils;

pub use errors::*;
pub use generate::*;
pub use greedy::*;
pub use lhs::*;
pub use metrics::{evaluate, Quality, QualityMetric};
pub use params::*;
pub use population::*;
pub use random::*;
pub use rng::*;
pub use sobol::*;
pub use space::*;
pub use traits::*;
pub use utils::pdist;

/// Environment variable controlling the log level of applications using this library
pub const OPTISEED_LOG: &str = "OPTISEED_LOG";
