use crate::engine::{
    centroid::compute_centroid,
    distance::euclidean_distance,
    types::{EngineError, KMeansOutput},
};

/// Partition `points` into `k` clusters with Lloyd's algorithm.
///
/// Seeding is farthest-first: a seeded RNG picks the first centroid, every
/// following centroid is the point farthest from all centroids chosen so far.
/// Identical points, k, and seed therefore reproduce the same centroids and
/// labels bit for bit. Ties on assignment resolve to the lowest-indexed
/// centroid; a centroid that loses all its members keeps its position.
pub fn kmeans(
    points: &[Vec<f64>],
    k: usize,
    max_iters: usize,
    seed: u64,
) -> Result<KMeansOutput, EngineError> {
    let n = points.len();
    if n == 0 {
        return Err(EngineError::InvalidInput("no input vectors".into()));
    }
    if k < 1 || k > n {
        return Err(EngineError::InvalidInput(format!(
            "cluster count {} out of range for {} points",
            k, n
        )));
    }
    let dim = points[0].len();
    if dim == 0 {
        return Err(EngineError::InvalidInput(
            "zero-dimensional input vectors".into(),
        ));
    }
    if points.iter().any(|p| p.len() != dim) {
        return Err(EngineError::InvalidInput(format!(
            "mismatched vector dimensionality (expected {})",
            dim
        )));
    }

    let mut centroids = initial_centroids(points, k, seed);
    // Sentinel forces a full recompute pass even when the seeded centroids
    // already match the final assignment
    let mut labels = vec![usize::MAX; n];
    let mut iterations = 0;

    for _ in 0..max_iters.max(1) {
        iterations += 1;

        // Assign each vector to its nearest centroid
        let mut changed = false;
        for (i, point) in points.iter().enumerate() {
            let best = nearest_centroid(point, &centroids);
            if labels[i] != best {
                changed = true;
                labels[i] = best;
            }
        }

        if !changed {
            break; // converged
        }

        // Recompute centroids as the mean of their members
        for c in 0..k {
            let members: Vec<&[f64]> = points
                .iter()
                .zip(labels.iter())
                .filter(|&(_, l)| *l == c)
                .map(|(p, _)| p.as_slice())
                .collect();

            if !members.is_empty() {
                centroids[c] = compute_centroid(&members);
            }
        }
    }

    let distances = points
        .iter()
        .zip(labels.iter())
        .map(|(p, &l)| euclidean_distance(p, &centroids[l]))
        .collect();

    Ok(KMeansOutput {
        centroids,
        labels,
        distances,
        iterations,
    })
}

fn nearest_centroid(point: &[f64], centroids: &[Vec<f64>]) -> usize {
    let mut best = 0;
    let mut best_dist = euclidean_distance(point, &centroids[0]);
    for (c, center) in centroids.iter().enumerate().skip(1) {
        let d = euclidean_distance(point, center);
        if d < best_dist {
            best = c;
            best_dist = d;
        }
    }
    best
}

fn initial_centroids(points: &[Vec<f64>], k: usize, seed: u64) -> Vec<Vec<f64>> {
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let first = rng.gen_range(0..points.len());
    let mut centroids = vec![points[first].clone()];

    while centroids.len() < k {
        // Farthest point from the centroids chosen so far, ties to the
        // lowest index
        let mut best_idx = 0;
        let mut best_score = f64::NEG_INFINITY;
        for (i, p) in points.iter().enumerate() {
            let nearest = centroids
                .iter()
                .map(|c| euclidean_distance(p, c))
                .fold(f64::INFINITY, f64::min);
            if nearest > best_score {
                best_score = nearest;
                best_idx = i;
            }
        }
        centroids.push(points[best_idx].clone());
    }

    centroids
}
