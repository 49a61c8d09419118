use crate::errors::{DoeError, Result};
use crate::generate::StrategyKind;
use crate::greedy::{CandidatePool, GreedyFarthest, GreedyStart};
use crate::lhs::{check_strength, Lhs, LhsKind, LhsOptimizer, SinglePoint};
use crate::population::Population;
use crate::random::Random;
use crate::rng::RandomSource;
use crate::sobol::{check_sobol, Scramble, Sobol};
use crate::space::SearchSpace;
use crate::traits::SamplingMethod;
use linfa::ParamGuard;
use log::info;
use web_time::Duration;

#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Strategy specific generation options.
///
/// Every option is unset by default. Setting an option the selected strategy
/// does not recognize is a [`DoeError::ConfigurationError`]:
///
/// | strategy          | options                                                                      |
/// |-------------------|------------------------------------------------------------------------------|
/// | `random`          |                                                                              |
/// | `latin_hypercube` | `optimize`, `optimizer`, `max_iterations`, `max_duration`, `kind`, `single_point`, `strength` |
/// | `sobol`           | `scramble`, `skip`                                                           |
/// | `greedy_farthest` | `candidate_multiplier`, `candidate_pool`, `greedy_start`                     |
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct SeedOptions {
    optimize: Option<bool>,
    optimizer: Option<LhsOptimizer>,
    max_iterations: Option<usize>,
    max_duration: Option<Duration>,
    kind: Option<LhsKind>,
    single_point: Option<SinglePoint>,
    strength: Option<usize>,
    scramble: Option<Scramble>,
    skip: Option<u64>,
    candidate_multiplier: Option<usize>,
    candidate_pool: Option<CandidatePool>,
    greedy_start: Option<GreedyStart>,
}

impl SeedOptions {
    /// Options with nothing set
    pub fn new() -> Self {
        Self::default()
    }

    /// Latin hypercube: whether to optimize the design with the centered discrepancy
    /// local search ([`LhsOptimizer::RandomCd`])
    pub fn optimize(mut self, optimize: bool) -> Self {
        self.optimize = Some(optimize);
        self
    }

    /// Latin hypercube: optimization of the design
    pub fn optimizer(mut self, optimizer: LhsOptimizer) -> Self {
        self.optimizer = Some(optimizer);
        self
    }

    /// Latin hypercube: budget of swap evaluations of the local search
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    /// Latin hypercube: wall-clock budget of the local search
    pub fn max_duration(mut self, max_duration: Duration) -> Self {
        self.max_duration = Some(max_duration);
        self
    }

    /// Latin hypercube: placement of samples within their sections
    pub fn kind(mut self, kind: LhsKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Latin hypercube: placement of the sample of a one-point design
    pub fn single_point(mut self, single_point: SinglePoint) -> Self {
        self.single_point = Some(single_point);
        self
    }

    /// Latin hypercube: strength 1 or 2
    pub fn strength(mut self, strength: usize) -> Self {
        self.strength = Some(strength);
        self
    }

    /// Sobol: scrambling, `true` stands for [`Scramble::LinearMatrix`]
    pub fn scramble(mut self, scramble: impl Into<Scramble>) -> Self {
        self.scramble = Some(scramble.into());
        self
    }

    /// Sobol: index of the first point
    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Greedy farthest point: ratio between the candidate pool size and the number of samples
    pub fn candidate_multiplier(mut self, multiplier: usize) -> Self {
        self.candidate_multiplier = Some(multiplier);
        self
    }

    /// Greedy farthest point: source of candidates
    pub fn candidate_pool(mut self, pool: CandidatePool) -> Self {
        self.candidate_pool = Some(pool);
        self
    }

    /// Greedy farthest point: choice of the first point
    pub fn greedy_start(mut self, start: GreedyStart) -> Self {
        self.greedy_start = Some(start);
        self
    }

    /// Names of the options which are set
    fn set_options(&self) -> Vec<&'static str> {
        [
            ("optimize", self.optimize.is_some()),
            ("optimizer", self.optimizer.is_some()),
            ("max_iterations", self.max_iterations.is_some()),
            ("max_duration", self.max_duration.is_some()),
            ("kind", self.kind.is_some()),
            ("single_point", self.single_point.is_some()),
            ("strength", self.strength.is_some()),
            ("scramble", self.scramble.is_some()),
            ("skip", self.skip.is_some()),
            ("candidate_multiplier", self.candidate_multiplier.is_some()),
            ("candidate_pool", self.candidate_pool.is_some()),
            ("greedy_start", self.greedy_start.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
    }

    /// Resolved latin hypercube optimizer
    fn lhs_optimizer(&self) -> Result<Option<LhsOptimizer>> {
        match (self.optimize, self.optimizer) {
            (Some(false), Some(_)) => Err(DoeError::configuration(
                "`optimizer` is set while `optimize` is false",
            )),
            (_, Some(optimizer)) => Ok(Some(optimizer)),
            (Some(true), None) => Ok(Some(LhsOptimizer::RandomCd)),
            _ => Ok(None),
        }
    }
}

/// Options recognized by each strategy
fn recognized_options(strategy: StrategyKind) -> &'static [&'static str] {
    match strategy {
        StrategyKind::Random => &[],
        StrategyKind::LatinHypercube => &[
            "optimize",
            "optimizer",
            "max_iterations",
            "max_duration",
            "kind",
            "single_point",
            "strength",
        ],
        StrategyKind::Sobol => &["scramble", "skip"],
        StrategyKind::GreedyFarthest => &["candidate_multiplier", "candidate_pool", "greedy_start"],
    }
}

/// A set of validated generation parameters
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct GenerateValidParams {
    strategy: StrategyKind,
    count: usize,
    seed: u64,
    nx: usize,
    options: SeedOptions,
}

impl GenerateValidParams {
    /// Selected strategy
    pub fn strategy(&self) -> StrategyKind {
        self.strategy
    }

    /// Number of requested points
    pub fn count(&self) -> usize {
        self.count
    }

    /// Seed of the random source
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Strategy specific options
    pub fn options(&self) -> &SeedOptions {
        &self.options
    }

    /// The configured sampling method
    pub fn sampler(&self) -> Result<Box<dyn SamplingMethod>> {
        let opts = &self.options;
        let sampler: Box<dyn SamplingMethod> = match self.strategy {
            StrategyKind::Random => Box::new(Random::new()),
            StrategyKind::LatinHypercube => {
                let mut lhs = Lhs::new()
                    .kind(opts.kind.unwrap_or_default())
                    .single_point(opts.single_point.unwrap_or_default())
                    .strength(opts.strength.unwrap_or(1))
                    .optimizer(opts.lhs_optimizer()?)
                    .max_duration(opts.max_duration);
                if let Some(max_iterations) = opts.max_iterations {
                    lhs = lhs.max_iterations(max_iterations);
                }
                Box::new(lhs)
            }
            StrategyKind::Sobol => Box::new(
                Sobol::new()
                    .scramble(opts.scramble.unwrap_or_default())
                    .skip(opts.skip.unwrap_or(0)),
            ),
            StrategyKind::GreedyFarthest => {
                let mut greedy = GreedyFarthest::new()
                    .candidate_pool(opts.candidate_pool.unwrap_or_default())
                    .start(opts.greedy_start.unwrap_or_default());
                if let Some(multiplier) = opts.candidate_multiplier {
                    greedy = greedy.candidate_multiplier(multiplier);
                }
                Box::new(greedy)
            }
        };
        Ok(sampler)
    }

    /// Generates the population in `space` with a random source seeded by `seed`
    pub fn generate(&self, space: &SearchSpace) -> Result<Population> {
        if space.ndim() != self.nx {
            return Err(DoeError::validation(format!(
                "parameters were checked for {} dimensions, search space has {}",
                self.nx,
                space.ndim()
            )));
        }
        let sampler = self.sampler()?;
        info!(
            "Generating {} seeds in dimension {} with {} (seed {})",
            self.count,
            self.nx,
            sampler.name(),
            self.seed
        );
        sampler.sample(space, self.count, &mut RandomSource::new(self.seed))
    }
}

/// Generation parameters to be checked before any random draw
#[derive(Clone, Debug, PartialEq)]
pub struct GenerateParams(GenerateValidParams);

impl GenerateParams {
    /// Parameters to generate `count` points in `space` with `strategy`
    pub fn new(space: &SearchSpace, strategy: StrategyKind, count: usize, seed: u64) -> Self {
        GenerateParams(GenerateValidParams {
            strategy,
            count,
            seed,
            nx: space.ndim(),
            options: SeedOptions::default(),
        })
    }

    /// Sets the strategy specific options
    pub fn options(mut self, options: SeedOptions) -> Self {
        self.0.options = options;
        self
    }
}

impl ParamGuard for GenerateParams {
    type Checked = GenerateValidParams;
    type Error = DoeError;

    fn check_ref(&self) -> Result<&Self::Checked> {
        let params = &self.0;
        let opts = &params.options;
        let recognized = recognized_options(params.strategy);
        if let Some(unknown) = opts
            .set_options()
            .into_iter()
            .find(|name| !recognized.contains(name))
        {
            return Err(DoeError::configuration(format!(
                "option `{unknown}` is not supported by the {} strategy",
                params.strategy
            )));
        }

        match params.strategy {
            StrategyKind::Random => (),
            StrategyKind::LatinHypercube => {
                let optimizer = opts.lhs_optimizer()?;
                match optimizer {
                    Some(LhsOptimizer::Restarts(0)) | Some(LhsOptimizer::Maximin(0)) => {
                        return Err(DoeError::validation(
                            "latin hypercube optimizer should use at least one design",
                        ));
                    }
                    Some(LhsOptimizer::RandomCd) => (),
                    _ if opts.max_iterations.is_some() || opts.max_duration.is_some() => {
                        return Err(DoeError::configuration(
                            "`max_iterations` and `max_duration` require the random-cd optimizer",
                        ));
                    }
                    _ => (),
                }
                let strength = opts.strength.unwrap_or(1);
                if params.count > 0 {
                    check_strength(strength, params.count, params.nx)?;
                } else if !(1..=2).contains(&strength) {
                    check_strength(strength, 1, params.nx)?;
                }
                if strength == 2 && optimizer.is_some() {
                    return Err(DoeError::configuration(
                        "latin hypercube of strength 2 cannot be optimized",
                    ));
                }
            }
            StrategyKind::Sobol => {
                check_sobol(params.nx, params.count, opts.skip.unwrap_or(0))?;
            }
            StrategyKind::GreedyFarthest => {
                let mut greedy = GreedyFarthest::new();
                if let Some(multiplier) = opts.candidate_multiplier {
                    greedy = greedy.candidate_multiplier(multiplier);
                }
                let n_candidates = greedy.n_candidates(params.count)?;
                if let CandidatePool::Sobol(_) = opts.candidate_pool.unwrap_or_default() {
                    check_sobol(params.nx, n_candidates, 0)?;
                }
            }
        }
        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked> {
        self.check_ref()?;
        Ok(self.0)
    }
}
