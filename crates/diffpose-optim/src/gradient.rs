use crate::error::OptimError;

/// Central finite difference gradient of `f` at `x`.
///
/// `∂f/∂x_i ≈ (f(x + h·e_i) - f(x - h·e_i)) / 2h`, which takes `2·n` evaluations of `f`.
pub fn central_difference<F, E>(mut f: F, x: &[f32], step: f32) -> Result<Vec<f32>, E>
where
    F: FnMut(&[f32]) -> Result<f32, E>,
    E: From<OptimError>,
{
    if !(step.is_finite() && step > 0.0) {
        return Err(OptimError::InvalidStep(step).into());
    }

    let mut shifted = x.to_vec();
    let mut grad = Vec::with_capacity(x.len());
    for i in 0..x.len() {
        shifted[i] = x[i] + step;
        let forward = f(&shifted)?;
        shifted[i] = x[i] - step;
        let backward = f(&shifted)?;
        shifted[i] = x[i];
        grad.push((forward - backward) / (2.0 * step));
    }

    Ok(grad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn gradient_of_a_polynomial() -> Result<(), OptimError> {
        let f = |x: &[f32]| -> Result<f32, OptimError> { Ok(x[0] * x[0] + 3.0 * x[1]) };
        let grad = central_difference(f, &[2.0, -1.0], 1e-2)?;
        assert_relative_eq!(grad[0], 4.0, epsilon = 1e-3);
        assert_relative_eq!(grad[1], 3.0, epsilon = 1e-3);
        Ok(())
    }

    #[test]
    fn invalid_step() {
        let f = |_: &[f32]| -> Result<f32, OptimError> { Ok(0.0) };
        assert!(matches!(
            central_difference(f, &[0.0], 0.0),
            Err(OptimError::InvalidStep(_))
        ));
    }
}
