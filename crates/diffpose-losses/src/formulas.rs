//! Every formula returns the scalar loss of the batch together with one value per sample.
//!
//! Image formulas compare ground-truth and predicted batches of the same shape; `diff` is the
//! element-wise absolute difference `|gt - pred|`. Divisions by an empty mask or a zero sum
//! yield `0`.

use diffpose_3d::{
    chamfer::chamfer_distance, pointcloud::PointCloud, rotation::mat_theta,
    rotation::rotation_from_ortho6d, rotation::rotation_to_row_major,
};
use diffpose_render::ImageBatch;
use glam::Mat3;

use crate::{
    error::LossError,
    surrogate::{vsd_ratio, ThresholdStep},
};

/// Clamp value of the depth term of the combined losses.
pub const DEPTH_CLAMP: f32 = 20.0;

/// Scalar and per-sample values of a loss.
#[derive(Debug, Clone, PartialEq)]
pub struct Reduction {
    /// the loss of the whole batch.
    pub loss: f32,
    /// the loss of every sample.
    pub per_sample: Vec<f32>,
}

impl Reduction {
    fn mean_of(per_sample: Vec<f32>) -> Self {
        Self {
            loss: mean(&per_sample),
            per_sample,
        }
    }

    fn sum_of(per_sample: Vec<f32>) -> Self {
        Self {
            loss: per_sample.iter().sum(),
            per_sample,
        }
    }

    /// `w · self + (1 - w) · other`, per sample and for the scalar.
    pub fn weighted_sum(&self, other: &Reduction, w: f32) -> Reduction {
        Reduction {
            loss: w * self.loss + (1.0 - w) * other.loss,
            per_sample: self
                .per_sample
                .iter()
                .zip(other.per_sample.iter())
                .map(|(a, b)| w * a + (1.0 - w) * b)
                .collect(),
        }
    }

    /// `self · other`, per sample and for the scalar.
    pub fn product(&self, other: &Reduction) -> Reduction {
        Reduction {
            loss: self.loss * other.loss,
            per_sample: self
                .per_sample
                .iter()
                .zip(other.per_sample.iter())
                .map(|(a, b)| a * b)
                .collect(),
        }
    }
}

fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

fn safe_div(num: f32, den: f32) -> f32 {
    if den != 0.0 {
        num / den
    } else {
        0.0
    }
}

fn check_batches(gt: &ImageBatch, pred: &ImageBatch) -> Result<(), LossError> {
    if gt.batch_size() != pred.batch_size() {
        return Err(LossError::MismatchedSamples(
            gt.batch_size(),
            pred.batch_size(),
        ));
    }
    if gt.as_slice().len() != pred.as_slice().len() {
        return Err(LossError::MismatchedSamples(
            gt.as_slice().len(),
            pred.as_slice().len(),
        ));
    }
    Ok(())
}

fn check_rotations(gt: &[Mat3], pred: &[Mat3]) -> Result<(), LossError> {
    if gt.len() != pred.len() {
        return Err(LossError::MismatchedSamples(gt.len(), pred.len()));
    }
    Ok(())
}

/// Apply `f` to the pairs of flattened gt and predicted samples.
fn per_sample<F>(gt: &ImageBatch, pred: &ImageBatch, f: F) -> Result<Vec<f32>, LossError>
where
    F: Fn(&[f32], &[f32]) -> f32,
{
    check_batches(gt, pred)?;
    Ok(gt.samples().zip(pred.samples()).map(|(g, p)| f(g, p)).collect())
}

fn abs_diff<'a>(gt: &'a [f32], pred: &'a [f32]) -> impl Iterator<Item = f32> + 'a {
    gt.iter().zip(pred.iter()).map(|(g, p)| (g - p).abs())
}

/// Numerically stable binary cross entropy of a logit `x` against a target `y`.
///
/// `max(x, 0) - x·y + ln(1 + e^-|x|)`
#[inline]
pub fn bce_with_logits(x: f32, y: f32) -> f32 {
    x.max(0.0) - x * y + (-x.abs()).exp().ln_1p()
}

/// Softmax of the values, stable for large inputs.
pub fn softmax(values: &[f32]) -> Vec<f32> {
    let max = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps = values.iter().map(|v| (v - max).exp()).collect::<Vec<_>>();
    let sum = exps.iter().sum::<f32>();
    exps.iter().map(|e| safe_div(*e, sum)).collect()
}

/// Binary cross entropy of the predicted render as logits against the ground-truth render.
///
/// The per-sample value is the mean over the pixels, or the sum when `sum` is set. The scalar
/// follows the same reduction over the samples.
pub fn bce(gt: &ImageBatch, pred: &ImageBatch, sum: bool) -> Result<Reduction, LossError> {
    let values = per_sample(gt, pred, |g, p| {
        let total = p
            .iter()
            .zip(g.iter())
            .map(|(&x, &y)| bce_with_logits(x, y))
            .sum::<f32>();
        if sum {
            total
        } else {
            safe_div(total, g.len() as f32)
        }
    })?;

    Ok(if sum {
        Reduction::sum_of(values)
    } else {
        Reduction::mean_of(values)
    })
}

/// Mean absolute difference.
pub fn l1(gt: &ImageBatch, pred: &ImageBatch) -> Result<Reduction, LossError> {
    let values = per_sample(gt, pred, |g, p| {
        safe_div(abs_diff(g, p).sum(), g.len() as f32)
    })?;
    Ok(Reduction::mean_of(values))
}

/// Mean squared difference.
pub fn l2(gt: &ImageBatch, pred: &ImageBatch) -> Result<Reduction, LossError> {
    let values = per_sample(gt, pred, |g, p| {
        let sq = g.iter().zip(p.iter()).map(|(a, b)| (a - b).powi(2)).sum::<f32>();
        safe_div(sq, g.len() as f32)
    })?;
    Ok(Reduction::mean_of(values))
}

/// Mean of `clamp(diff, 0, max) / max`.
pub fn l1_clamped(gt: &ImageBatch, pred: &ImageBatch, max: f32) -> Result<Reduction, LossError> {
    if max.is_nan() || max <= 0.0 {
        return Err(LossError::InvalidWeight(max));
    }
    let values = per_sample(gt, pred, |g, p| {
        let clamped = abs_diff(g, p).map(|d| d.clamp(0.0, max) / max).sum::<f32>();
        safe_div(clamped, g.len() as f32)
    })?;
    Ok(Reduction::mean_of(values))
}

struct MaskedStats {
    masked_diff: f32,
    mask: f32,
    jaccard: f32,
}

fn masked_stats(gt: &[f32], pred: &[f32]) -> MaskedStats {
    let mut stats = MaskedStats {
        masked_diff: 0.0,
        mask: 0.0,
        jaccard: 1.0,
    };
    let mut union = 0.0;
    for (&g, &p) in gt.iter().zip(pred.iter()) {
        let (in_gt, in_pred) = (g > 0.0, p > 0.0);
        if in_gt && in_pred {
            stats.masked_diff += (g - p).abs();
            stats.mask += 1.0;
        }
        if in_gt || in_pred {
            union += 1.0;
        }
    }
    // two empty masks agree
    if union > 0.0 {
        stats.jaccard = stats.mask / union;
    }
    stats
}

/// Absolute difference inside the common foreground scaled by the Jaccard distance.
///
/// The mask `M` is `gt > 0 ∧ pred > 0` and `J` the Jaccard index of the two foregrounds.
/// Per sample: `Σ(diff·M) / ΣM · (1 - J)`. The scalar pools the masked sums over the batch and
/// multiplies by the mean Jaccard distance.
pub fn depth_masked(gt: &ImageBatch, pred: &ImageBatch) -> Result<Reduction, LossError> {
    check_batches(gt, pred)?;
    let stats = gt
        .samples()
        .zip(pred.samples())
        .map(|(g, p)| masked_stats(g, p))
        .collect::<Vec<_>>();

    let per_sample = stats
        .iter()
        .map(|s| safe_div(s.masked_diff, s.mask) * (1.0 - s.jaccard))
        .collect();

    let masked_diff = stats.iter().map(|s| s.masked_diff).sum::<f32>();
    let mask = stats.iter().map(|s| s.mask).sum::<f32>();
    let distances = stats.iter().map(|s| 1.0 - s.jaccard).collect::<Vec<_>>();

    Ok(Reduction {
        loss: safe_div(masked_diff, mask) * mean(&distances),
        per_sample,
    })
}

/// Ratio of pixels differing by more than `tau` over the pixels that differ at all.
///
/// The scalar pools the counts over the batch.
pub fn vsd(
    gt: &ImageBatch,
    pred: &ImageBatch,
    outlier: &ThresholdStep,
) -> Result<Reduction, LossError> {
    check_batches(gt, pred)?;
    let diff = abs_diff(gt.as_slice(), pred.as_slice()).collect::<Vec<_>>();

    let sample_len = gt.sample_len().max(1);
    let per_sample = diff
        .chunks(sample_len)
        .map(|d| vsd_ratio(d, outlier))
        .collect();

    Ok(Reduction {
        loss: vsd_ratio(&diff, outlier),
        per_sample,
    })
}

/// Sum of absolute differences over the sum of the ground truth.
///
/// The scalar pools both sums over the batch.
pub fn sil_ratio(gt: &ImageBatch, pred: &ImageBatch) -> Result<Reduction, LossError> {
    let per_sample = per_sample(gt, pred, |g, p| {
        safe_div(abs_diff(g, p).sum(), g.iter().sum())
    })?;
    let total_diff = abs_diff(gt.as_slice(), pred.as_slice()).sum::<f32>();
    let total_gt = gt.as_slice().iter().sum::<f32>();

    Ok(Reduction {
        loss: safe_div(total_diff, total_gt),
        per_sample,
    })
}

fn rotation_formula<F>(gt: &[Mat3], pred: &[Mat3], f: F) -> Result<Vec<f32>, LossError>
where
    F: Fn(&Mat3, &Mat3) -> f32,
{
    check_rotations(gt, pred)?;
    Ok(gt.iter().zip(pred.iter()).map(|(g, p)| f(g, p)).collect())
}

fn entry_diffs<'a>(gt: &'a Mat3, pred: &'a Mat3) -> impl Iterator<Item = f32> + 'a {
    gt.to_cols_array()
        .into_iter()
        .zip(pred.to_cols_array())
        .map(|(g, p)| p - g)
}

/// Squared difference of the rotation matrices divided by 6.
///
/// The scalar is the sum over the batch.
pub fn l2_pose(gt: &[Mat3], pred: &[Mat3]) -> Result<Reduction, LossError> {
    let values = rotation_formula(gt, pred, |g, p| {
        entry_diffs(g, p).map(|d| d * d).sum::<f32>() / 6.0
    })?;
    Ok(Reduction::sum_of(values))
}

/// `(1 - z_p · z_g) / 2` where `z` is the third row of the rotation.
///
/// The third row is the model direction that maps onto the optical axis.
pub fn z_diff(gt: &[Mat3], pred: &[Mat3]) -> Result<Reduction, LossError> {
    let values = rotation_formula(gt, pred, |g, p| (1.0 - g.row(2).dot(p.row(2))) / 2.0)?;
    Ok(Reduction::mean_of(values))
}

/// Geodesic angle between the rotations.
pub fn mat_theta_loss(gt: &[Mat3], pred: &[Mat3]) -> Result<Reduction, LossError> {
    let values = rotation_formula(gt, pred, mat_theta)?;
    Ok(Reduction::mean_of(values))
}

/// Half the mean absolute difference of the rotation entries.
pub fn pose_l1(gt: &[Mat3], pred: &[Mat3]) -> Result<Reduction, LossError> {
    let values = rotation_formula(gt, pred, |g, p| {
        entry_diffs(g, p).map(f32::abs).sum::<f32>() / 9.0 / 2.0
    })?;
    Ok(Reduction::mean_of(values))
}

/// Split a row `[conf × num_conf, 6d × num_rot]` into confidences and rotations.
pub fn parse_hypotheses(
    row: &[f32],
    num_conf: usize,
    num_rot: usize,
) -> Result<(Vec<f32>, Vec<Mat3>), LossError> {
    let expected = num_conf + 6 * num_rot;
    if row.len() != expected {
        return Err(LossError::InvalidRowLength(expected, row.len()));
    }

    let (confidences, poses) = row.split_at(num_conf);
    let rotations = poses
        .chunks_exact(6)
        .map(rotation_from_ortho6d)
        .collect::<Result<Vec<_>, _>>()?;

    Ok((confidences.to_vec(), rotations))
}

/// One hypothesis per view weighted by softmaxed confidences, plus a diversity term.
///
/// `gt` and `pred` hold one channel per view, channel `v` of `pred` showing hypothesis `v`.
/// The depth term of a sample is the mean over all its `V·H·W` pixels of
/// `softmax(conf)_v · clamp(diff, 0, 20) / 20`, which is
/// `Σ_v softmax(conf)_v · mean(clamp(diff_v, 0, 20) / 20) / V`. The pose term is
/// `mean(1 - |P - flip(P)|)` over the hypotheses `P` stacked in view order.
pub fn predictive_multiview(
    gt: &ImageBatch,
    pred: &ImageBatch,
    confidences: &[Vec<f32>],
    hypotheses: &[Vec<Mat3>],
    w: f32,
) -> Result<Reduction, LossError> {
    check_batches(gt, pred)?;
    if confidences.len() != gt.batch_size() {
        return Err(LossError::MismatchedSamples(
            gt.batch_size(),
            confidences.len(),
        ));
    }
    if hypotheses.len() != gt.batch_size() {
        return Err(LossError::MismatchedSamples(gt.batch_size(), hypotheses.len()));
    }

    let area = gt.size().area().max(1);
    let mut depth = Vec::with_capacity(gt.batch_size());
    for ((g, p), conf) in gt.samples().zip(pred.samples()).zip(confidences) {
        let weights = softmax(conf);
        if weights.len() != gt.channels() {
            return Err(LossError::InvalidRowLength(gt.channels(), weights.len()));
        }
        let term = g
            .chunks(area)
            .zip(p.chunks(area))
            .zip(weights.iter())
            .map(|((gv, pv), wv)| {
                let clamped = abs_diff(gv, pv)
                    .map(|d| d.clamp(0.0, DEPTH_CLAMP) / DEPTH_CLAMP)
                    .sum::<f32>();
                wv * safe_div(clamped, gv.len() as f32)
            })
            .sum::<f32>();
        depth.push(term / weights.len().max(1) as f32);
    }

    let pose = hypotheses
        .iter()
        .map(|hyps| {
            let flat = hyps.iter().map(rotation_to_row_major).collect::<Vec<_>>();
            let count = (flat.len() * 9) as f32;
            let total = flat
                .iter()
                .zip(flat.iter().rev())
                .flat_map(|(a, b)| a.iter().zip(b.iter()).map(|(x, y)| 1.0 - (x - y).abs()))
                .sum::<f32>();
            safe_div(total, count)
        })
        .collect::<Vec<_>>();

    Ok(Reduction::mean_of(pose).weighted_sum(&Reduction::mean_of(depth), w))
}

/// Per hypothesis `softmax(conf)_k · chamfer(R_gt · points, R_k · points)`.
///
/// The confidences are softmaxed rather than used raw, so the weights of a sample sum to one.
pub fn weighted_chamfer_terms(
    gt: &Mat3,
    hypotheses: &[Mat3],
    confidences: &[f32],
    points: &PointCloud,
) -> Result<Vec<f32>, LossError> {
    if hypotheses.len() != confidences.len() {
        return Err(LossError::InvalidRowLength(
            hypotheses.len(),
            confidences.len(),
        ));
    }

    let target = points.rotated(gt)?;
    softmax(confidences)
        .iter()
        .zip(hypotheses)
        .map(|(weight, rotation)| -> Result<f32, LossError> {
            let source = points.rotated(rotation)?;
            Ok(weight * chamfer_distance(target.points(), source.points())?)
        })
        .collect()
}

/// Mean over the hypotheses of the confidence-weighted chamfer distances.
pub fn chamfer(
    gt: &[Mat3],
    hypotheses: &[Vec<Mat3>],
    confidences: &[Vec<f32>],
    points: &PointCloud,
) -> Result<Reduction, LossError> {
    let values = chamfer_terms(gt, hypotheses, confidences, points)?
        .iter()
        .map(|terms| mean(terms))
        .collect();
    Ok(Reduction::mean_of(values))
}

/// Sum over the hypotheses of the confidence-weighted chamfer distances.
///
/// With two hypotheses the scalar equals `mean(v1) + mean(v2)`.
pub fn chamfer_sum(
    gt: &[Mat3],
    hypotheses: &[Vec<Mat3>],
    confidences: &[Vec<f32>],
    points: &PointCloud,
) -> Result<Reduction, LossError> {
    let values = chamfer_terms(gt, hypotheses, confidences, points)?
        .iter()
        .map(|terms| terms.iter().sum::<f32>())
        .collect();
    Ok(Reduction::mean_of(values))
}

fn chamfer_terms(
    gt: &[Mat3],
    hypotheses: &[Vec<Mat3>],
    confidences: &[Vec<f32>],
    points: &PointCloud,
) -> Result<Vec<Vec<f32>>, LossError> {
    if gt.len() != hypotheses.len() {
        return Err(LossError::MismatchedSamples(gt.len(), hypotheses.len()));
    }
    if gt.len() != confidences.len() {
        return Err(LossError::MismatchedSamples(gt.len(), confidences.len()));
    }

    gt.iter()
        .zip(hypotheses)
        .zip(confidences)
        .map(|((g, hyps), conf)| weighted_chamfer_terms(g, hyps, conf, points))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use diffpose_image::ImageSize;

    fn batch(batch: usize, data: Vec<f32>) -> Result<ImageBatch, LossError> {
        let size = ImageSize {
            width: data.len() / batch,
            height: 1,
        };
        Ok(ImageBatch::new(batch, 1, size, data)?)
    }

    #[test]
    fn bce_with_logits_matches_definition() {
        for (x, y) in [(0.0, 1.0), (2.0, 0.0), (-3.0, 1.0), (0.5, 0.5)] {
            let p = 1.0 / (1.0 + (-x as f32).exp());
            let expected = -(y * p.ln() + (1.0 - y) * (1.0 - p).ln());
            assert_relative_eq!(bce_with_logits(x, y), expected, epsilon = 1e-5);
        }
        // large logits stay finite
        assert!(bce_with_logits(1e4, 0.0).is_finite());
        assert!(bce_with_logits(-1e4, 1.0).is_finite());
    }

    #[test]
    fn bce_mean_and_sum() -> Result<(), LossError> {
        let gt = batch(2, vec![1.0, 0.0, 1.0, 1.0])?;
        let pred = batch(2, vec![0.0, 0.0, 0.0, 0.0])?;
        let ln2 = std::f32::consts::LN_2;

        let mean = bce(&gt, &pred, false)?;
        assert_relative_eq!(mean.loss, ln2, epsilon = 1e-6);

        let sum = bce(&gt, &pred, true)?;
        assert_relative_eq!(sum.loss, 4.0 * ln2, epsilon = 1e-5);
        assert_relative_eq!(sum.per_sample[0], 2.0 * ln2, epsilon = 1e-5);
        Ok(())
    }

    #[test]
    fn l1_and_l2() -> Result<(), LossError> {
        let gt = batch(2, vec![1.0, 2.0, 3.0, 4.0])?;
        let pred = batch(2, vec![1.0, 0.0, 3.0, 1.0])?;

        let l1 = l1(&gt, &pred)?;
        assert_eq!(l1.per_sample, vec![1.0, 1.5]);
        assert_relative_eq!(l1.loss, 1.25);

        let l2 = l2(&gt, &pred)?;
        assert_eq!(l2.per_sample, vec![2.0, 4.5]);
        assert_relative_eq!(l2.loss, 3.25);

        let other = batch(1, vec![0.0, 0.0])?;
        assert!(super::l1(&gt, &other).is_err());
        Ok(())
    }

    #[test]
    fn clamped_l1() -> Result<(), LossError> {
        let gt = batch(1, vec![0.0, 0.0])?;
        let pred = batch(1, vec![0.25, 3.0])?;
        let loss = l1_clamped(&gt, &pred, 0.5)?;
        assert_relative_eq!(loss.loss, 0.75);
        assert_eq!(l1_clamped(&gt, &pred, 0.0), Err(LossError::InvalidWeight(0.0)));
        Ok(())
    }

    #[test]
    fn depth_masked_uses_common_foreground() -> Result<(), LossError> {
        let gt = batch(1, vec![2.0, 2.0, 0.0, 1.0])?;
        let pred = batch(1, vec![1.0, 2.0, 1.0, 0.0])?;
        // M covers the first two pixels, union is 4 pixels
        let loss = depth_masked(&gt, &pred)?;
        assert_relative_eq!(loss.per_sample[0], 0.5 * 0.5);
        assert_relative_eq!(loss.loss, 0.25);

        let empty = batch(1, vec![0.0; 4])?;
        assert_eq!(depth_masked(&empty, &empty)?.loss, 0.0);
        Ok(())
    }

    #[test]
    fn vsd_counts() -> Result<(), LossError> {
        let gt = batch(2, vec![0.0, 0.0, 0.0, 0.0])?;
        let pred = batch(2, vec![30.0, 1.0, 0.0, 0.0])?;
        let loss = vsd(&gt, &pred, &ThresholdStep::default())?;
        assert_eq!(loss.per_sample, vec![0.5, 0.0]);
        assert_relative_eq!(loss.loss, 0.5);
        Ok(())
    }

    #[test]
    fn silhouette_ratio() -> Result<(), LossError> {
        let gt = batch(2, vec![1.0, 1.0, 0.0, 0.0])?;
        let pred = batch(2, vec![1.0, 0.0, 1.0, 0.0])?;
        let loss = sil_ratio(&gt, &pred)?;
        assert_eq!(loss.per_sample, vec![0.5, 0.0]);
        assert_relative_eq!(loss.loss, 1.0);
        Ok(())
    }

    #[test]
    fn rotation_losses_vanish_on_identical_rotations() -> Result<(), LossError> {
        let rotations = [Mat3::from_rotation_x(0.3), Mat3::from_rotation_z(-1.0)];
        assert_relative_eq!(l2_pose(&rotations, &rotations)?.loss, 0.0);
        assert_relative_eq!(z_diff(&rotations, &rotations)?.loss, 0.0, epsilon = 1e-6);
        assert!(mat_theta_loss(&rotations, &rotations)?.loss < 2e-3);
        assert_relative_eq!(pose_l1(&rotations, &rotations)?.loss, 0.0);
        Ok(())
    }

    #[test]
    fn rotation_losses_known_values() -> Result<(), LossError> {
        let gt = [Mat3::IDENTITY];
        // a half turn about x flips the z axis
        let pred = [Mat3::from_rotation_x(std::f32::consts::PI)];

        assert_relative_eq!(z_diff(&gt, &pred)?.loss, 1.0, epsilon = 1e-5);
        assert_relative_eq!(l2_pose(&gt, &pred)?.loss, 8.0 / 6.0, epsilon = 1e-5);
        assert_relative_eq!(
            mat_theta_loss(&gt, &pred)?.loss,
            std::f32::consts::PI,
            epsilon = 1e-3
        );
        assert_relative_eq!(pose_l1(&gt, &pred)?.loss, 4.0 / 18.0, epsilon = 1e-5);
        Ok(())
    }

    #[test]
    fn combinations() {
        let a = Reduction {
            loss: 1.0,
            per_sample: vec![1.0, 1.0],
        };
        let b = Reduction {
            loss: 3.0,
            per_sample: vec![2.0, 4.0],
        };
        assert_eq!(a.weighted_sum(&b, 0.5).per_sample, vec![1.5, 2.5]);
        assert_eq!(a.weighted_sum(&b, 0.5).loss, 2.0);
        assert_eq!(a.product(&b).per_sample, vec![2.0, 4.0]);
    }

    #[test]
    fn softmax_sums_to_one() {
        let probs = softmax(&[1000.0, 1000.0, -5.0]);
        assert_relative_eq!(probs.iter().sum::<f32>(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(probs[0], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn hypotheses_layout() -> Result<(), LossError> {
        let row = [0.1, 0.9, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0];
        let (conf, rotations) = parse_hypotheses(&row, 2, 2)?;
        assert_eq!(conf, vec![0.1, 0.9]);
        assert_eq!(rotations[0], Mat3::IDENTITY);
        assert_eq!(rotations.len(), 2);
        assert_eq!(
            parse_hypotheses(&row[..10], 2, 2),
            Err(LossError::InvalidRowLength(14, 10))
        );
        Ok(())
    }

    #[test]
    fn chamfer_of_the_right_hypothesis_is_zero() -> Result<(), LossError> {
        let points = PointCloud::new(vec![
            [1.0, 0.0, 0.0],
            [0.0, 2.0, 0.0],
            [0.0, 0.0, 3.0],
            [1.0, 1.0, 1.0],
        ]);
        let gt = [Mat3::from_rotation_y(0.4)];
        let hypotheses = vec![vec![gt[0], gt[0]]];
        let confidences = vec![vec![0.0, 0.0]];

        assert_relative_eq!(chamfer(&gt, &hypotheses, &confidences, &points)?.loss, 0.0);

        let wrong = vec![vec![gt[0], Mat3::from_rotation_x(2.0)]];
        let mean = chamfer(&gt, &wrong, &confidences, &points)?;
        let sum = chamfer_sum(&gt, &wrong, &confidences, &points)?;
        assert!(mean.loss > 0.0);
        assert_relative_eq!(sum.loss, 2.0 * mean.loss, epsilon = 1e-6);
        Ok(())
    }

    #[test]
    fn predictive_multiview_terms() -> Result<(), LossError> {
        let gt = ImageBatch::new(
            1,
            2,
            ImageSize {
                width: 2,
                height: 1,
            },
            vec![0.0, 0.0, 0.0, 0.0],
        )?;
        let pred = ImageBatch::new(1, 2, gt.size(), vec![20.0, 20.0, 0.0, 0.0])?;
        let confidences = vec![vec![0.0, 0.0]];
        let hypotheses = vec![vec![Mat3::IDENTITY, Mat3::IDENTITY]];

        // half of the 4 pixels differ by the clamp value, each weighted by 0.5
        let depth_only = predictive_multiview(&gt, &pred, &confidences, &hypotheses, 0.0)?;
        assert_relative_eq!(depth_only.loss, 0.25, epsilon = 1e-6);
        assert_relative_eq!(depth_only.per_sample[0], 0.25, epsilon = 1e-6);

        // a confident first view carries the whole difference, averaged over both views
        let confident = vec![vec![100.0, 0.0]];
        let depth_only = predictive_multiview(&gt, &pred, &confident, &hypotheses, 0.0)?;
        assert_relative_eq!(depth_only.loss, 0.5, epsilon = 1e-5);
        let pose_only = predictive_multiview(&gt, &pred, &confidences, &hypotheses, 1.0)?;
        assert_relative_eq!(pose_only.loss, 1.0, epsilon = 1e-6);
        Ok(())
    }
}
