use diffpose_render::{ImageBatch, Renderer};
use glam::{Mat3, Vec3};

use crate::error::LossError;

/// Render every pose from every view, normalize, and stack the views along the channels.
///
/// View `v` of sample `i` is rendered at `rotations[i] · views[v]` and `translations[i]`,
/// then mapped to `(x - mean) / std`. The result has one channel per view.
pub fn render_norm_cat<R: Renderer + ?Sized>(
    renderer: &R,
    rotations: &[Mat3],
    translations: &[Vec3],
    views: &[Mat3],
    mean: f32,
    std: f32,
) -> Result<ImageBatch, LossError> {
    if rotations.len() != translations.len() {
        return Err(LossError::MismatchedSamples(
            rotations.len(),
            translations.len(),
        ));
    }
    if views.is_empty() {
        return Err(LossError::NoViews);
    }

    let batches = views
        .iter()
        .map(|view| {
            let viewed = rotations.iter().map(|r| *r * *view).collect::<Vec<_>>();
            Ok(renderer
                .render_batch(&viewed, translations)?
                .normalized(mean, std))
        })
        .collect::<Result<Vec<_>, LossError>>()?;

    Ok(ImageBatch::concat_channels(&batches)?)
}

/// Render one channel per hypothesis.
///
/// Channel `v` of sample `i` shows `hypotheses[i][v]`, rendered as it is and without
/// normalization. Every sample needs the same number of hypotheses.
pub fn render_multi<R: Renderer + ?Sized>(
    renderer: &R,
    hypotheses: &[Vec<Mat3>],
    translations: &[Vec3],
) -> Result<ImageBatch, LossError> {
    if hypotheses.len() != translations.len() {
        return Err(LossError::MismatchedSamples(
            hypotheses.len(),
            translations.len(),
        ));
    }
    let num_hypotheses = hypotheses.first().map_or(0, Vec::len);
    if num_hypotheses == 0 {
        return Err(LossError::NoViews);
    }

    let batches = (0..num_hypotheses)
        .map(|v| {
            let rotations = hypotheses
                .iter()
                .map(|hyps| {
                    if hyps.len() != num_hypotheses {
                        return Err(LossError::InvalidRowLength(num_hypotheses, hyps.len()));
                    }
                    Ok(hyps[v])
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(renderer.render_batch(&rotations, translations)?)
        })
        .collect::<Result<Vec<_>, LossError>>()?;

    Ok(ImageBatch::concat_channels(&batches)?)
}

/// Render every pose once and repeat the render over `copies` channels, without normalization.
pub fn render_repeated<R: Renderer + ?Sized>(
    renderer: &R,
    rotations: &[Mat3],
    translations: &[Vec3],
    copies: usize,
) -> Result<ImageBatch, LossError> {
    if copies == 0 {
        return Err(LossError::NoViews);
    }
    let batch = renderer.render_batch(rotations, translations)?;
    Ok(ImageBatch::concat_channels(&vec![batch; copies])?)
}
