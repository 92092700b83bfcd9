use crate::error::OptimError;

/// Adam hyper-parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdamConfig {
    /// step size.
    pub learning_rate: f32,
    /// decay of the first moment estimate.
    pub beta1: f32,
    /// decay of the second moment estimate.
    pub beta2: f32,
    /// added to the denominator for numerical stability.
    pub eps: f32,
}

impl Default for AdamConfig {
    fn default() -> Self {
        Self {
            learning_rate: 1e-3,
            beta1: 0.9,
            beta2: 0.999,
            eps: 1e-8,
        }
    }
}

/// The Adam optimizer.
///
/// See: Kingma and Ba, "Adam: A Method for Stochastic Optimization", 2015.
#[derive(Debug, Clone)]
pub struct Adam {
    config: AdamConfig,
    m: Vec<f32>,
    v: Vec<f32>,
    t: i32,
}

impl Adam {
    /// Create an optimizer for `num_params` parameters.
    pub fn new(num_params: usize, config: AdamConfig) -> Self {
        Self {
            config,
            m: vec![0.0; num_params],
            v: vec![0.0; num_params],
            t: 0,
        }
    }

    /// Number of steps taken.
    pub fn num_steps(&self) -> usize {
        self.t as usize
    }

    /// Update `params` in place with the gradient `grads`.
    pub fn step(&mut self, params: &mut [f32], grads: &[f32]) -> Result<(), OptimError> {
        if params.len() != self.m.len() {
            return Err(OptimError::MismatchedGradient(self.m.len(), params.len()));
        }
        if grads.len() != params.len() {
            return Err(OptimError::MismatchedGradient(grads.len(), params.len()));
        }

        let AdamConfig {
            learning_rate,
            beta1,
            beta2,
            eps,
        } = self.config;

        self.t += 1;
        let bias1 = 1.0 - beta1.powi(self.t);
        let bias2 = 1.0 - beta2.powi(self.t);

        for (((p, &g), m), v) in params
            .iter_mut()
            .zip(grads)
            .zip(self.m.iter_mut())
            .zip(self.v.iter_mut())
        {
            *m = beta1 * *m + (1.0 - beta1) * g;
            *v = beta2 * *v + (1.0 - beta2) * g * g;
            let m_hat = *m / bias1;
            let v_hat = *v / bias2;
            *p -= learning_rate * m_hat / (v_hat.sqrt() + eps);
        }

        Ok(())
    }
}
