/// An element-wise operator whose backward pass does not follow its forward pass.
///
/// Step functions have a zero derivative almost everywhere. A surrogate operator keeps the
/// step in the forward pass and substitutes a usable gradient in the backward pass.
pub trait SurrogateOp {
    /// Evaluate the operator.
    fn forward(&self, x: f32) -> f32;

    /// Gradient with respect to `x` given the gradient of the output.
    ///
    /// The default is the straight-through estimator, which passes `upstream` unchanged.
    fn backward(&self, _x: f32, upstream: f32) -> f32 {
        upstream
    }

    /// Evaluate the operator on every value and sum the results.
    fn forward_sum(&self, xs: &[f32]) -> f32 {
        xs.iter().map(|&x| self.forward(x)).sum()
    }
}

/// `1` where `x > tau`, `0` elsewhere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdStep {
    /// the threshold.
    pub tau: f32,
}

impl Default for ThresholdStep {
    fn default() -> Self {
        Self { tau: 20.0 }
    }
}

impl SurrogateOp for ThresholdStep {
    fn forward(&self, x: f32) -> f32 {
        if x > self.tau {
            1.0
        } else {
            0.0
        }
    }
}

/// `1` where `x != 0`, `0` elsewhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NonZeroStep;

impl SurrogateOp for NonZeroStep {
    fn forward(&self, x: f32) -> f32 {
        if x != 0.0 {
            1.0
        } else {
            0.0
        }
    }
}

/// Outlier ratio of one sample, `Σ[d > tau] / Σ[d != 0]`, or `0` if nothing differs.
pub fn vsd_ratio(diff: &[f32], outlier: &ThresholdStep) -> f32 {
    let outliers = outlier.forward_sum(diff);
    let support = NonZeroStep.forward_sum(diff);
    if support > 0.0 {
        outliers / support
    } else {
        0.0
    }
}

/// Gradient of [`vsd_ratio`] with respect to every value of `diff`.
///
/// With `A = Σ[d > tau]` and `B = Σ[d != 0]`, both steps pass the gradient through, so
/// `∂(A/B)/∂d_j = (backward_A(d_j) · B − A · backward_B(d_j)) / B²`.
pub fn vsd_backward(diff: &[f32], outlier: &ThresholdStep) -> Vec<f32> {
    let outliers = outlier.forward_sum(diff);
    let support = NonZeroStep.forward_sum(diff);
    if support <= 0.0 {
        return vec![0.0; diff.len()];
    }

    let support2 = support * support;
    diff.iter()
        .map(|&d| {
            let da = outlier.backward(d, 1.0);
            let db = NonZeroStep.backward(d, 1.0);
            (da * support - outliers * db) / support2
        })
        .collect()
}
