use linfa::Float;
use ndarray::{Array, Array1, ArrayBase, ArrayView1, Data, Ix2, Zip};
use rayon::prelude::*;

/// Squared euclidean distance between two points
pub(crate) fn sq_dist<F: Float>(a: &ArrayView1<F>, b: &ArrayView1<F>) -> F {
    Zip::from(a).and(b).fold(F::zero(), |acc, &x, &y| {
        let d = x - y;
        acc + d * d
    })
}

/// Computes the pairwise distances between rows of a 2D-array using parallel processing.
///
/// Distances are returned in the condensed order (0, 1), (0, 2), ..., (1, 2), ...
/// whatever the scheduling of the parallel execution.
pub fn pdist<F: Float>(x: &ArrayBase<impl Data<Elem = F> + Sync, Ix2>) -> Array1<F> {
    let nrows = x.nrows();
    let pairs: Vec<_> = (0..nrows)
        .flat_map(|i| ((i + 1)..nrows).map(move |j| (i, j)))
        .collect();

    let distances: Vec<F> = pairs
        .par_iter()
        .map(|&(i, j)| sq_dist(&x.row(i), &x.row(j)).sqrt())
        .collect();

    Array::from_vec(distances)
}
