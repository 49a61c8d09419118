use crate::errors::{DoeError, Result};
use crate::rng::RandomSource;
use crate::sobol_tables::SOBOL_TABLE;
use crate::space::SearchSpace;
use crate::traits::{Design, SamplingMethod};
use log::warn;
use ndarray::{Array2, Zip};
use std::sync::OnceLock;

#[cfg(feature = "serializable")]
use serde::{Deserialize, Serialize};

/// Maximum dimension supported by the Sobol direction numbers
pub const SOBOL_MAX_DIM: usize = SOBOL_TABLE.len() + 1;

const SOBOL_BITS: usize = 32;
const SOBOL_SCALE: f64 = 4_294_967_296.; // 2^32

type Directions = [u32; SOBOL_BITS];

/// Randomization of the Sobol digital net
#[derive(Clone, Debug, Default, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub enum Scramble {
    /// Plain sequence, independent of the random source
    None,
    /// Random lower triangular binary matrix applied to the generator matrices
    /// followed by a random digital shift
    #[default]
    LinearMatrix,
    /// XOR of every coordinate with a random 32-bit word per dimension
    DigitalShift,
    /// Hash-based nested uniform scrambling
    Owen,
}

impl Scramble {
    /// Name as recorded in population metadata
    pub fn name(&self) -> &'static str {
        match self {
            Scramble::None => "none",
            Scramble::LinearMatrix => "linear_matrix",
            Scramble::DigitalShift => "digital_shift",
            Scramble::Owen => "owen",
        }
    }
}

impl From<bool> for Scramble {
    fn from(scramble: bool) -> Self {
        if scramble {
            Scramble::LinearMatrix
        } else {
            Scramble::None
        }
    }
}

/// Direction numbers `V_1..V_32` of every supported dimension
fn directions() -> &'static [Directions] {
    static DIRECTIONS: OnceLock<Vec<Directions>> = OnceLock::new();
    DIRECTIONS.get_or_init(|| {
        let mut dirs = Vec::with_capacity(SOBOL_MAX_DIM);
        dirs.push(std::array::from_fn(|k| 1 << (SOBOL_BITS - 1 - k)));
        dirs.extend(
            SOBOL_TABLE
                .iter()
                .map(|&(s, a, m)| expand_directions(s as usize, a, m)),
        );
        dirs
    })
}

/// Recurrence `V_k = V_{k-s} ^ (V_{k-s} >> s) ^ a_1 V_{k-1} ^ ... ^ a_{s-1} V_{k-s+1}`
fn expand_directions(s: usize, a: u32, m: &[u32]) -> Directions {
    let mut v = [0u32; SOBOL_BITS];
    for (k, &mk) in m.iter().enumerate() {
        v[k] = mk << (SOBOL_BITS - 1 - k);
    }
    for k in s..SOBOL_BITS {
        let mut vk = v[k - s] ^ (v[k - s] >> s);
        for l in 1..s {
            if (a >> (s - 1 - l)) & 1 == 1 {
                vk ^= v[k - l];
            }
        }
        v[k] = vk;
    }
    v
}

/// Applies the lower triangular matrix given by its row masks to the digits of `v`,
/// digit `r` being bit `31 - r`
fn apply_lower_triangular(masks: &[u32; SOBOL_BITS], v: u32) -> u32 {
    masks.iter().enumerate().fold(0, |acc, (r, &mask)| {
        acc | (((mask & v).count_ones() & 1) << (SOBOL_BITS - 1 - r))
    })
}

fn laine_karras_permutation(mut x: u32, seed: u32) -> u32 {
    x = x.wrapping_add(seed);
    x ^= x.wrapping_mul(0x6c50b47c);
    x ^= x.wrapping_mul(0xb82f1e52);
    x ^= x.wrapping_mul(0xc7afe638);
    x ^= x.wrapping_mul(0x8d22f6e6);
    x
}

fn nested_uniform_scramble(x: u32, seed: u32) -> u32 {
    laine_karras_permutation(x.reverse_bits(), seed).reverse_bits()
}

/// Generator of the (possibly scrambled) digital net in a given dimension
struct DigitalNet {
    dirs: Vec<Directions>,
    shifts: Vec<u32>,
    owen_seeds: Option<Vec<u32>>,
}

impl DigitalNet {
    fn new(nx: usize, scramble: Scramble, rng: &mut RandomSource) -> Self {
        let mut dirs = directions()[..nx].to_vec();
        let mut shifts = vec![0; nx];
        let mut owen_seeds = None;
        match scramble {
            Scramble::None => (),
            Scramble::LinearMatrix => {
                for (v, shift) in dirs.iter_mut().zip(shifts.iter_mut()) {
                    let masks: [u32; SOBOL_BITS] = std::array::from_fn(|r| {
                        let above = if r == 0 { 0 } else { u32::MAX << (SOBOL_BITS - r) };
                        (1 << (SOBOL_BITS - 1 - r)) | (rng.next_u32() & above)
                    });
                    v.iter_mut()
                        .for_each(|vk| *vk = apply_lower_triangular(&masks, *vk));
                    *shift = rng.next_u32();
                }
            }
            Scramble::DigitalShift => shifts.iter_mut().for_each(|s| *s = rng.next_u32()),
            Scramble::Owen => owen_seeds = Some((0..nx).map(|_| rng.next_u32()).collect()),
        }
        DigitalNet {
            dirs,
            shifts,
            owen_seeds,
        }
    }

    /// Digits of the `j`-th coordinate of the `n`-th point
    fn coordinate(&self, j: usize, n: u32) -> u32 {
        let x = self.dirs[j]
            .iter()
            .enumerate()
            .filter(|(b, _)| (n >> b) & 1 == 1)
            .fold(self.shifts[j], |acc, (_, &vk)| acc ^ vk);
        match &self.owen_seeds {
            Some(seeds) => nested_uniform_scramble(x, seeds[j]),
            None => x,
        }
    }
}

/// Checks the dimension and index range of a Sobol draw
pub(crate) fn check_sobol(nx: usize, ns: usize, skip: u64) -> Result<()> {
    if nx > SOBOL_MAX_DIM {
        return Err(DoeError::validation(format!(
            "Sobol sequence supports at most {SOBOL_MAX_DIM} dimensions, got {nx}"
        )));
    }
    if skip.saturating_add(ns as u64) > 1 << SOBOL_BITS {
        return Err(DoeError::validation(format!(
            "Sobol sequence is limited to 2^32 points, got skip {skip} + {ns} samples"
        )));
    }
    Ok(())
}

/// Points `skip..skip + ns` of the Sobol sequence in dimension `nx`.
/// The random source is only drawn from when scrambling.
pub(crate) fn sobol_points(
    ns: usize,
    nx: usize,
    skip: u64,
    scramble: Scramble,
    rng: &mut RandomSource,
) -> Result<Array2<f64>> {
    check_sobol(nx, ns, skip)?;
    let net = DigitalNet::new(nx, scramble, rng);
    let mut x = Array2::zeros((ns, nx));
    Zip::indexed(&mut x).par_for_each(|(i, j), xij| {
        // index fits: skip + ns <= 2^32
        let n = (skip + i as u64) as u32;
        *xij = net.coordinate(j, n) as f64 / SOBOL_SCALE;
    });
    Ok(x)
}

/// The Sobol design is the digital net built from the Joe & Kuo direction numbers,
/// optionally scrambled. Balance properties hold for a number of samples
/// which is a power of 2.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serializable", derive(Serialize, Deserialize))]
pub struct Sobol {
    scramble: Scramble,
    skip: u64,
}

impl Sobol {
    /// Constructor of a linear matrix scrambled Sobol sequence
    ///
    /// ```
    /// use optiseed_doe::{build_search_space, Dimension, RandomSource, SamplingMethod, Scramble, Sobol};
    ///
    /// let space = build_search_space(&[Dimension::continuous("x", 0., 2.)]).unwrap();
    /// let pop = Sobol::new()
    ///     .scramble(Scramble::None)
    ///     .sample(&space, 4, &mut RandomSource::new(0))
    ///     .unwrap();
    /// assert_eq!(pop.points().column(0).to_vec(), vec![0., 1., 0.5, 1.5]);
    /// ```
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the scrambling
    pub fn scramble(mut self, scramble: impl Into<Scramble>) -> Self {
        self.scramble = scramble.into();
        self
    }

    /// Sets the index of the first generated point
    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }
}

impl SamplingMethod for Sobol {
    fn name(&self) -> &'static str {
        "sobol"
    }

    fn normalized_sample(
        &self,
        space: &SearchSpace,
        ns: usize,
        rng: &mut RandomSource,
    ) -> Result<Design> {
        let nx = space.ndim();
        check_sobol(nx, ns, self.skip)?;
        if ns > 0 && !ns.is_power_of_two() {
            warn!("Sobol sequence balance properties require a power of 2 samples, got {ns}");
        }
        let unit = sobol_points(ns, nx, self.skip, self.scramble, rng)?;
        Ok(Design::new(unit)
            .with("scramble", self.scramble.name())
            .with("skip", self.skip as usize))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::centered_discrepancy;
    use crate::space::{build_search_space, Dimension};
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn unit_space(nx: usize) -> SearchSpace {
        let dims: Vec<Dimension> = (0..nx)
            .map(|i| Dimension::continuous(format!("x{i}"), 0., 1.))
            .collect();
        build_search_space(&dims).unwrap()
    }

    const ALL_SCRAMBLES: [Scramble; 4] = [
        Scramble::None,
        Scramble::LinearMatrix,
        Scramble::DigitalShift,
        Scramble::Owen,
    ];

    #[test]
    fn test_direction_table() {
        assert_eq!(SOBOL_MAX_DIM, 64);
        for (d, &(s, a, m)) in SOBOL_TABLE.iter().enumerate() {
            assert_eq!(m.len(), s as usize, "dimension {}", d + 2);
            assert!(a < 1 << (s - 1).max(1));
            for (k, &mk) in m.iter().enumerate() {
                assert_eq!(mk % 2, 1);
                assert!(mk < 1 << (k + 1));
            }
        }
        assert!(directions().iter().all(|v| v[0] == 1 << 31));
    }

    #[test]
    fn test_plain_sobol() {
        let x = sobol_points(8, 3, 0, Scramble::None, &mut RandomSource::new(0)).unwrap();
        let expected = array![
            [0., 0., 0.],
            [0.5, 0.5, 0.5],
            [0.25, 0.75, 0.75],
            [0.75, 0.25, 0.25],
            [0.125, 0.625, 0.375],
            [0.625, 0.125, 0.875],
            [0.375, 0.375, 0.625],
            [0.875, 0.875, 0.125],
        ];
        assert_abs_diff_eq!(x, expected);
    }

    #[test]
    fn test_plain_ignores_seed() {
        let space = unit_space(5);
        let sobol = Sobol::new().scramble(false);
        let pop1 = sobol.sample(&space, 16, &mut RandomSource::new(1)).unwrap();
        let pop2 = sobol.sample(&space, 16, &mut RandomSource::new(2)).unwrap();
        assert_eq!(pop1.unit_points(), pop2.unit_points());
        assert_eq!(pop1.metadata()["scramble"], crate::MetaValue::from("none"));
    }

    #[test]
    fn test_scrambled_depends_on_seed() {
        let space = unit_space(3);
        for scramble in &ALL_SCRAMBLES[1..] {
            let sobol = Sobol::new().scramble(*scramble);
            let pop1 = sobol.sample(&space, 16, &mut RandomSource::new(1)).unwrap();
            let pop1b = sobol.sample(&space, 16, &mut RandomSource::new(1)).unwrap();
            let pop2 = sobol.sample(&space, 16, &mut RandomSource::new(2)).unwrap();
            assert_eq!(pop1, pop1b);
            assert_ne!(pop1.unit_points(), pop2.unit_points());
        }
    }

    #[test]
    fn test_stratification_preserved() {
        for scramble in ALL_SCRAMBLES {
            let x = sobol_points(16, 8, 0, scramble, &mut RandomSource::new(7)).unwrap();
            for col in x.columns() {
                let mut cells: Vec<usize> = col
                    .iter()
                    .map(|&v| {
                        assert!((0. ..1.).contains(&v));
                        (v * 16.).floor() as usize
                    })
                    .collect();
                cells.sort_unstable();
                assert_eq!(cells, (0..16).collect::<Vec<_>>(), "{scramble:?}");
            }
            // first two dimensions form a (0, 4, 2)-net
            let mut cells: Vec<(usize, usize)> = x
                .rows()
                .into_iter()
                .map(|r| ((r[0] * 4.).floor() as usize, (r[1] * 4.).floor() as usize))
                .collect();
            cells.sort_unstable();
            cells.dedup();
            assert_eq!(cells.len(), 16, "{scramble:?}");
        }
    }

    #[test]
    fn test_skip_continues_sequence() {
        let mut rng = RandomSource::new(0);
        let full = sobol_points(12, 4, 0, Scramble::None, &mut rng).unwrap();
        let tail = sobol_points(4, 4, 8, Scramble::None, &mut rng).unwrap();
        assert_eq!(full.slice(ndarray::s![8.., ..]), tail);
    }

    #[test]
    fn test_sobol_limits() {
        let mut rng = RandomSource::new(0);
        assert!(matches!(
            Sobol::new().sample(&unit_space(65), 4, &mut rng),
            Err(DoeError::ValidationError(_))
        ));
        assert!(Sobol::new().sample(&unit_space(64), 4, &mut rng).is_ok());
        assert!(matches!(
            Sobol::new().skip(u32::MAX as u64).sample(&unit_space(1), 2, &mut rng),
            Err(DoeError::ValidationError(_))
        ));
        let pop = Sobol::new().sample(&unit_space(2), 0, &mut rng).unwrap();
        assert!(pop.is_empty());
    }

    #[test]
    fn test_sobol_beats_random() {
        let space = unit_space(4);
        let sobol = Sobol::new()
            .sample(&space, 64, &mut RandomSource::new(3))
            .unwrap();
        let random = RandomSource::new(3).uniform(64, 4);
        assert!(centered_discrepancy(sobol.unit_points()) < centered_discrepancy(&random));
    }
}
