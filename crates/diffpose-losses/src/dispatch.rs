use std::f32::consts::PI;

use diffpose_3d::{pointcloud::PointCloud, rotation::rotation_from_row_major, sampling::sample_sphere_view};
use diffpose_render::{ImageBatch, Renderer};
use glam::{Mat3, Vec3};
use rand::Rng;

use crate::{
    error::LossError,
    formulas::{self, Reduction, DEPTH_CLAMP},
    method::{LossMethod, MethodSpec},
    render::{render_multi, render_norm_cat, render_repeated},
    representation::PoseRepresentation,
    surrogate::ThresholdStep,
};

/// Number of hypotheses in a `chamfer` row.
const CHAMFER_HYPOTHESES: usize = 4;

/// Normalization of the renders and weight of the combined losses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LossOptions {
    /// subtracted from every rendered pixel.
    pub mean: f32,
    /// divides every rendered pixel after the mean is subtracted.
    pub std: f32,
    /// weight of the first term of the combined losses, clamp value of `l1-clamped`.
    pub weight: f32,
}

impl Default for LossOptions {
    fn default() -> Self {
        Self {
            mean: 0.0,
            std: 1.0,
            weight: 0.5,
        }
    }
}

/// The poses of one batch.
#[derive(Debug, Clone, Copy)]
pub struct PoseBatch<'a> {
    /// one predicted row per sample, laid out as the method and representation expect.
    pub predicted: &'a [Vec<f32>],
    /// ground-truth rotations.
    pub gt_rotations: &'a [Mat3],
    /// translations shared by the ground truth and the prediction.
    pub translations: &'a [Vec3],
    /// ground-truth renders to use instead of rendering `gt_rotations`.
    ///
    /// When set, predicted rows are read as row-major rotation matrices.
    pub fixed_gt_images: Option<&'a ImageBatch>,
}

/// Result of a loss evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct LossOutput {
    /// the loss of the batch, `-1` when the evaluation was rejected.
    pub loss: f32,
    /// the loss of every sample.
    pub per_sample: Option<Vec<f32>>,
    /// normalized ground-truth renders.
    pub gt_images: Option<ImageBatch>,
    /// normalized predicted renders.
    pub pred_images: Option<ImageBatch>,
}

impl LossOutput {
    /// The result returned for unknown method or representation names.
    pub fn invalid() -> Self {
        Self {
            loss: -1.0,
            per_sample: None,
            gt_images: None,
            pred_images: None,
        }
    }

    /// Whether the output holds a loss.
    pub fn is_valid(&self) -> bool {
        self.per_sample.is_some()
    }

    fn new(reduction: Reduction, gt_images: ImageBatch, pred_images: ImageBatch) -> Self {
        Self {
            loss: reduction.loss,
            per_sample: Some(reduction.per_sample),
            gt_images: Some(gt_images),
            pred_images: Some(pred_images),
        }
    }
}

fn check_batch(batch: &PoseBatch<'_>, views: &[Mat3]) -> Result<(), LossError> {
    let num_samples = batch.predicted.len();
    if num_samples == 0 {
        return Err(LossError::EmptyBatch);
    }
    if batch.gt_rotations.len() != num_samples {
        return Err(LossError::MismatchedSamples(
            num_samples,
            batch.gt_rotations.len(),
        ));
    }
    if batch.translations.len() != num_samples {
        return Err(LossError::MismatchedSamples(
            num_samples,
            batch.translations.len(),
        ));
    }
    if let Some(images) = batch.fixed_gt_images {
        if images.batch_size() != num_samples {
            return Err(LossError::MismatchedSamples(
                num_samples,
                images.batch_size(),
            ));
        }
    }
    if views.is_empty() {
        return Err(LossError::NoViews);
    }
    Ok(())
}

/// Compute a loss between predicted and ground-truth poses.
///
/// The ground truth and the prediction are rendered from every view, normalized with
/// `options.mean` and `options.std`, and compared with the formula of `spec.method`. When
/// `spec.random_multiview` is set, every view but the first is replaced in place by a random
/// view drawn from `rng`.
///
/// Methods reading hypotheses ignore `representation`:
///
/// - `predictive-multiview`: `[conf × V, 6d × V]` with `V = views.len()`; hypothesis `v` and
///   the ground truth are rendered without the view rotation and without normalization, so
///   the views only set `V`,
/// - `chamfer`: `[conf × 4, 6d × 4]`,
/// - `chamfer-old`: `[conf × 2, 6d]`, the second hypothesis being the first turned half a turn
///   about its `x` axis.
///
/// # Errors
///
/// Fails when the batch is inconsistent, a row cannot be converted, or rendering fails.
pub fn compute_loss<R, G>(
    batch: &PoseBatch<'_>,
    renderer: &R,
    spec: MethodSpec,
    representation: PoseRepresentation,
    views: &mut [Mat3],
    options: &LossOptions,
    rng: &mut G,
) -> Result<LossOutput, LossError>
where
    R: Renderer + ?Sized,
    G: Rng + ?Sized,
{
    check_batch(batch, views)?;

    if spec.random_multiview {
        for view in views.iter_mut().skip(1) {
            *view = sample_sphere_view(rng)?;
        }
    }
    let views = &*views;

    let LossOptions { mean, std, weight } = *options;

    let output = match spec.method {
        LossMethod::PredictiveMultiview => {
            let num_views = views.len();
            let (confidences, hypotheses) =
                read_hypotheses(batch.predicted, num_views, num_views)?;
            let gt_images = match batch.fixed_gt_images {
                Some(images) => images.clone(),
                None => render_repeated(
                    renderer,
                    batch.gt_rotations,
                    batch.translations,
                    num_views,
                )?,
            };
            let pred_images = render_multi(renderer, &hypotheses, batch.translations)?;
            let reduction = formulas::predictive_multiview(
                &gt_images,
                &pred_images,
                &confidences,
                &hypotheses,
                weight,
            )?;
            LossOutput::new(reduction, gt_images, pred_images)
        }
        LossMethod::Chamfer => {
            let gt_images = viewed_gt_images(batch, renderer, views, options)?;
            let (confidences, hypotheses) =
                read_hypotheses(batch.predicted, CHAMFER_HYPOTHESES, CHAMFER_HYPOTHESES)?;
            let points = PointCloud::new(renderer.points().to_vec());
            let reduction =
                formulas::chamfer(batch.gt_rotations, &hypotheses, &confidences, &points)?;
            let pred_images = render_most_confident(
                renderer,
                &hypotheses,
                &confidences,
                batch.translations,
                views,
                options,
            )?;
            LossOutput::new(reduction, gt_images, pred_images)
        }
        LossMethod::ChamferOld => {
            let gt_images = viewed_gt_images(batch, renderer, views, options)?;
            let (confidences, rotations) = read_hypotheses(batch.predicted, 2, 1)?;
            let flip = Mat3::from_rotation_x(PI);
            let hypotheses = rotations
                .iter()
                .map(|r| r.iter().flat_map(|r| [*r, *r * flip]).collect())
                .collect::<Vec<Vec<_>>>();
            let points = PointCloud::new(renderer.points().to_vec());
            let reduction =
                formulas::chamfer_sum(batch.gt_rotations, &hypotheses, &confidences, &points)?;
            let pred_images = render_most_confident(
                renderer,
                &hypotheses,
                &confidences,
                batch.translations,
                views,
                options,
            )?;
            LossOutput::new(reduction, gt_images, pred_images)
        }
        method => {
            let gt_images = viewed_gt_images(batch, renderer, views, options)?;
            let pred_rotations = match batch.fixed_gt_images {
                Some(_) => batch
                    .predicted
                    .iter()
                    .map(|row| rotation_from_row_major(row))
                    .collect::<Result<Vec<_>, _>>()?,
                None => representation.to_rotations(batch.predicted)?,
            };
            let pred_images = render_norm_cat(
                renderer,
                &pred_rotations,
                batch.translations,
                views,
                mean,
                std,
            )?;
            let reduction = pose_formula(
                method,
                batch.gt_rotations,
                &pred_rotations,
                &gt_images,
                &pred_images,
                weight,
            )?;
            LossOutput::new(reduction, gt_images, pred_images)
        }
    };

    log::debug!("{spec} loss: {}", output.loss);

    Ok(output)
}

/// Formulas over single predicted rotations and their renders.
fn pose_formula(
    method: LossMethod,
    gt_rotations: &[Mat3],
    pred_rotations: &[Mat3],
    gt: &ImageBatch,
    pred: &ImageBatch,
    weight: f32,
) -> Result<Reduction, LossError> {
    let reduction = match method {
        LossMethod::BceLoss => formulas::bce(gt, pred, false)?,
        LossMethod::BceLossSum => formulas::bce(gt, pred, true)?,
        LossMethod::L1Depth | LossMethod::Multiview => formulas::l1(gt, pred)?,
        LossMethod::MultiviewL2 => formulas::l2(gt, pred)?,
        LossMethod::L1Clamped => formulas::l1_clamped(gt, pred, weight)?,
        LossMethod::DepthMasked => formulas::depth_masked(gt, pred)?,
        LossMethod::Vsd => formulas::vsd(gt, pred, &ThresholdStep::default())?,
        LossMethod::L2Pose => formulas::l2_pose(gt_rotations, pred_rotations)?,
        LossMethod::ZDiff => formulas::z_diff(gt_rotations, pred_rotations)?,
        LossMethod::MatTheta => formulas::mat_theta_loss(gt_rotations, pred_rotations)?,
        LossMethod::PosePlusDepth => {
            let pose = formulas::pose_l1(gt_rotations, pred_rotations)?;
            let depth = formulas::l1_clamped(gt, pred, DEPTH_CLAMP)?;
            pose.weighted_sum(&depth, weight)
        }
        LossMethod::PoseMulDepth => {
            let pose = formulas::pose_l1(gt_rotations, pred_rotations)?;
            let depth = formulas::l1_clamped(gt, pred, DEPTH_CLAMP)?;
            pose.product(&depth)
        }
        LossMethod::SilRatio => formulas::sil_ratio(gt, pred)?,
        LossMethod::SilRatioPlusZDiff => {
            let z = formulas::z_diff(gt_rotations, pred_rotations)?;
            let ratio = formulas::sil_ratio(gt, pred)?;
            z.weighted_sum(&ratio, weight)
        }
        LossMethod::SilRatioMulZDiff => {
            let z = formulas::z_diff(gt_rotations, pred_rotations)?;
            let ratio = formulas::sil_ratio(gt, pred)?;
            z.product(&ratio)
        }
        LossMethod::PredictiveMultiview | LossMethod::Chamfer | LossMethod::ChamferOld => {
            return Err(LossError::HypothesisMethod(method.to_string()))
        }
    };
    Ok(reduction)
}

/// Ground-truth images rendered from every view and normalized, unless fixed by the batch.
fn viewed_gt_images<R: Renderer + ?Sized>(
    batch: &PoseBatch<'_>,
    renderer: &R,
    views: &[Mat3],
    options: &LossOptions,
) -> Result<ImageBatch, LossError> {
    match batch.fixed_gt_images {
        Some(images) => Ok(images.clone()),
        None => render_norm_cat(
            renderer,
            batch.gt_rotations,
            batch.translations,
            views,
            options.mean,
            options.std,
        ),
    }
}

fn read_hypotheses(
    rows: &[Vec<f32>],
    num_conf: usize,
    num_rot: usize,
) -> Result<(Vec<Vec<f32>>, Vec<Vec<Mat3>>), LossError> {
    let parsed = rows
        .iter()
        .map(|row| formulas::parse_hypotheses(row, num_conf, num_rot))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(parsed.into_iter().unzip())
}

fn render_most_confident<R: Renderer + ?Sized>(
    renderer: &R,
    hypotheses: &[Vec<Mat3>],
    confidences: &[Vec<f32>],
    translations: &[Vec3],
    views: &[Mat3],
    options: &LossOptions,
) -> Result<ImageBatch, LossError> {
    let best = hypotheses
        .iter()
        .zip(confidences)
        .map(|(hyps, conf)| {
            let index = conf
                .iter()
                .enumerate()
                .fold((0, f32::NEG_INFINITY), |best, (i, &c)| {
                    if c > best.1 {
                        (i, c)
                    } else {
                        best
                    }
                })
                .0;
            hyps.get(index)
                .copied()
                .ok_or(LossError::InvalidRowLength(conf.len(), hyps.len()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    render_norm_cat(
        renderer,
        &best,
        translations,
        views,
        options.mean,
        options.std,
    )
}

/// Compute a loss from method and representation names.
///
/// Unknown names are not an error: a warning is logged and [`LossOutput::invalid`] is returned.
/// Random views are drawn from the thread-local generator.
pub fn compute_loss_by_name<R: Renderer + ?Sized>(
    batch: &PoseBatch<'_>,
    renderer: &R,
    method: &str,
    representation: &str,
    views: &mut [Mat3],
    options: &LossOptions,
) -> Result<LossOutput, LossError> {
    let spec = match method.parse::<MethodSpec>() {
        Ok(spec) => spec,
        Err(err) => {
            log::warn!("{err}");
            return Ok(LossOutput::invalid());
        }
    };

    // hypothesis layouts do not read the representation
    let representation = match representation.parse::<PoseRepresentation>() {
        Ok(representation) => representation,
        Err(_) if spec.method.reads_hypotheses() => PoseRepresentation::Ortho6d,
        Err(err) => {
            log::warn!("{err}");
            return Ok(LossOutput::invalid());
        }
    };

    compute_loss(
        batch,
        renderer,
        spec,
        representation,
        views,
        options,
        &mut rand::rng(),
    )
}
