use crate::errors::Result;
use crate::rng::RandomSource;
use crate::space::SearchSpace;
use crate::traits::{Design, SamplingMethod};

#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// The Random design consists in drawing samples uniformly and independently.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct Random;

impl Random {
    /// Constructor
    ///
    /// ```
    /// use optiseed_doe::{build_search_space, Dimension, Random, RandomSource, SamplingMethod};
    ///
    /// let space = build_search_space(&[Dimension::continuous("x", 5., 10.)]).unwrap();
    /// let pop = Random::new().sample(&space, 4, &mut RandomSource::new(42)).unwrap();
    /// assert_eq!(pop.len(), 4);
    /// ```
    pub fn new() -> Self {
        Random
    }
}

impl SamplingMethod for Random {
    fn name(&self) -> &'static str {
        "random"
    }

    fn normalized_sample(
        &self,
        space: &SearchSpace,
        ns: usize,
        rng: &mut RandomSource,
    ) -> Result<Design> {
        Ok(Design::new(rng.uniform(ns, space.ndim())))
    }
}
