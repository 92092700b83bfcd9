use kiddo::immutable::float::kdtree::ImmutableKdTree;

use crate::error::GeometryError;

type KdTree = ImmutableKdTree<f32, u32, 3, 32>;

/// Mean squared distance from every point of `source` to its nearest neighbour in `target`.
fn mean_nearest_sq_distance(source: &[[f32; 3]], target: &KdTree) -> f32 {
    let total = source
        .iter()
        .map(|p| target.nearest_one::<kiddo::SquaredEuclidean>(p).distance)
        .sum::<f32>();
    total / source.len() as f32
}

/// Compute the symmetric chamfer distance between two point sets.
///
/// The distance is the mean squared nearest-neighbour distance from `a` to `b` plus the same
/// quantity from `b` to `a`.
///
/// # Errors
///
/// Returns [`GeometryError::EmptyPointCloud`] if either set is empty.
///
/// Example:
///
/// ```
/// use diffpose_3d::chamfer::chamfer_distance;
///
/// let a = vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0]];
/// let distance = chamfer_distance(&a, &a).unwrap();
/// assert_eq!(distance, 0.0);
/// ```
pub fn chamfer_distance(a: &[[f32; 3]], b: &[[f32; 3]]) -> Result<f32, GeometryError> {
    if a.is_empty() || b.is_empty() {
        return Err(GeometryError::EmptyPointCloud);
    }

    // build kdtrees for both sets to speed up the nearest neighbor search
    let tree_a: KdTree = ImmutableKdTree::new_from_slice(a);
    let tree_b: KdTree = ImmutableKdTree::new_from_slice(b);

    Ok(mean_nearest_sq_distance(a, &tree_b) + mean_nearest_sq_distance(b, &tree_a))
}
