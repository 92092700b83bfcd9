use diffpose_3d::rotation::rotation_from_quaternion_vector;
use diffpose_image::Image;
use diffpose_imgproc::metrics::sse;
use diffpose_render::Renderer;
use glam::{Mat3, Vec3};

use crate::{
    adam::{Adam, AdamConfig},
    error::OptimError,
    gradient::central_difference,
};

/// Structure to define the refinement parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefineConfig {
    /// Adam step size.
    pub learning_rate: f32,
    /// Maximum number of iterations to perform.
    pub max_iterations: usize,
    /// The refinement stops once the loss drops below this value.
    pub loss_threshold: f32,
    /// Step of the central finite differences.
    pub fd_step: f32,
}

impl Default for RefineConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            max_iterations: 1000,
            loss_threshold: 100.0,
            fd_step: 1e-3,
        }
    }
}

/// Result of the orientation refinement.
#[derive(Debug, Clone)]
pub struct RefineResult {
    /// Vector part of the estimated orientation quaternion `(1, v)`.
    pub parameters: Vec3,
    /// Estimated rotation.
    pub rotation: Mat3,
    /// The total number of iterations performed.
    pub num_iterations: usize,
    /// Loss of the last evaluated estimate.
    pub loss: f32,
    /// The loss of every iteration.
    pub losses: Vec<f32>,
    /// Whether the loss dropped below the threshold.
    pub converged: bool,
}

/// Refine a camera orientation so that the render matches a target image.
///
/// The orientation is the normalized quaternion `(1, v.x, v.y, v.z)`; the translation is fixed.
/// The objective is the sum of squared pixel differences between the render and `target`, its
/// gradient is taken with central finite differences through the renderer, and `v` is updated
/// with Adam.
///
/// Every iteration evaluates the current estimate and takes one step. If the evaluated loss is
/// below `config.loss_threshold` the loop stops; otherwise the updated estimate is rendered and
/// handed to `on_frame`.
///
/// # Arguments
///
/// * `renderer` - Renders the object for a rotation and a translation.
/// * `target` - The image to match, same size as the renders.
/// * `initial` - Initial vector part of the orientation quaternion.
/// * `translation` - Fixed translation of the object in the camera frame.
/// * `config` - Refinement parameters.
/// * `on_frame` - Receives the iteration index and the render of the updated estimate.
pub fn refine_orientation<R, F>(
    renderer: &R,
    target: &Image<f32, 1>,
    initial: Vec3,
    translation: Vec3,
    config: &RefineConfig,
    mut on_frame: F,
) -> Result<RefineResult, OptimError>
where
    R: Renderer + ?Sized,
    F: FnMut(usize, &Image<f32, 1>) -> Result<(), Box<dyn std::error::Error + Send + Sync>>,
{
    let objective = |v: &[f32]| -> Result<f32, OptimError> {
        let rotation = rotation_from_quaternion_vector(Vec3::new(v[0], v[1], v[2]));
        let image = renderer.render(&rotation, translation)?;
        Ok(sse(&image, target)?)
    };

    let mut adam = Adam::new(
        3,
        AdamConfig {
            learning_rate: config.learning_rate,
            ..Default::default()
        },
    );

    let mut params = initial.to_array();
    let mut result = RefineResult {
        parameters: initial,
        rotation: rotation_from_quaternion_vector(initial),
        num_iterations: 0,
        loss: f32::INFINITY,
        losses: Vec::new(),
        converged: false,
    };

    for i in 0..config.max_iterations {
        let loss = objective(params.as_slice())?;
        let grad = central_difference(objective, &params, config.fd_step)?;
        adam.step(&mut params, &grad)?;

        log::debug!("Step: {i} - loss: {loss}");

        result.num_iterations += 1;
        result.loss = loss;
        result.losses.push(loss);

        if loss < config.loss_threshold {
            log::debug!("converged in {} iterations with loss {}", i + 1, loss);
            result.converged = true;
            break;
        }

        let rotation = rotation_from_quaternion_vector(Vec3::from_array(params));
        let frame = renderer.render(&rotation, translation)?;
        on_frame(i, &frame).map_err(OptimError::FrameSink)?;
    }

    result.parameters = Vec3::from_array(params);
    result.rotation = rotation_from_quaternion_vector(result.parameters);

    Ok(result)
}
