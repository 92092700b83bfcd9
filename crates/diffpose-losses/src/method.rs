use std::{fmt, str::FromStr};

use crate::error::LossError;

const RANDOM_MULTIVIEW_SUFFIX: &str = "-random-multiview";

/// The loss formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LossMethod {
    /// Mean binary cross entropy with logits between the renders.
    BceLoss,
    /// Summed binary cross entropy with logits between the renders.
    BceLossSum,
    /// Mean absolute difference of single-view renders.
    L1Depth,
    /// Mean absolute difference over all the views.
    Multiview,
    /// Mean squared difference over all the views.
    MultiviewL2,
    /// Absolute difference clamped to the weight and rescaled to `[0, 1]`.
    L1Clamped,
    /// Absolute difference inside the common foreground, scaled by the Jaccard distance.
    DepthMasked,
    /// Ratio of outlier pixels over differing pixels.
    Vsd,
    /// Squared difference of the rotation matrices.
    L2Pose,
    /// Cosine distance of the rotated `z` axes.
    ZDiff,
    /// Geodesic angle between the rotations.
    MatTheta,
    /// Weighted sum of a pose term and a clamped depth term.
    PosePlusDepth,
    /// Product of a pose term and a clamped depth term.
    PoseMulDepth,
    /// Absolute difference normalized by the ground-truth mass.
    SilRatio,
    /// Weighted sum of `z-diff` and `sil-ratio`.
    SilRatioPlusZDiff,
    /// Product of `z-diff` and `sil-ratio`.
    SilRatioMulZDiff,
    /// One confidence-weighted hypothesis per view.
    PredictiveMultiview,
    /// Confidence-weighted chamfer distance of four hypotheses.
    Chamfer,
    /// Confidence-weighted chamfer distance of a hypothesis and its flipped twin.
    ChamferOld,
}

impl LossMethod {
    /// All the methods.
    pub const ALL: [LossMethod; 19] = [
        LossMethod::BceLoss,
        LossMethod::BceLossSum,
        LossMethod::L1Depth,
        LossMethod::Multiview,
        LossMethod::MultiviewL2,
        LossMethod::L1Clamped,
        LossMethod::DepthMasked,
        LossMethod::Vsd,
        LossMethod::L2Pose,
        LossMethod::ZDiff,
        LossMethod::MatTheta,
        LossMethod::PosePlusDepth,
        LossMethod::PoseMulDepth,
        LossMethod::SilRatio,
        LossMethod::SilRatioPlusZDiff,
        LossMethod::SilRatioMulZDiff,
        LossMethod::PredictiveMultiview,
        LossMethod::Chamfer,
        LossMethod::ChamferOld,
    ];

    /// The method identifier.
    pub fn as_str(&self) -> &'static str {
        match self {
            LossMethod::BceLoss => "bce-loss",
            LossMethod::BceLossSum => "bce-loss-sum",
            LossMethod::L1Depth => "l1-depth",
            LossMethod::Multiview => "multiview",
            LossMethod::MultiviewL2 => "multiview-l2",
            LossMethod::L1Clamped => "l1-clamped",
            LossMethod::DepthMasked => "depth-masked",
            LossMethod::Vsd => "vsd",
            LossMethod::L2Pose => "l2-pose",
            LossMethod::ZDiff => "z-diff",
            LossMethod::MatTheta => "mat-theta",
            LossMethod::PosePlusDepth => "pose-plus-depth",
            LossMethod::PoseMulDepth => "pose-mul-depth",
            LossMethod::SilRatio => "sil-ratio",
            LossMethod::SilRatioPlusZDiff => "sil-ratio-plus-zdiff",
            LossMethod::SilRatioMulZDiff => "sil-ratio-mul-zdiff",
            LossMethod::PredictiveMultiview => "predictive-multiview",
            LossMethod::Chamfer => "chamfer",
            LossMethod::ChamferOld => "chamfer-old",
        }
    }

    /// Whether the predicted rows hold confidences and several `6d-pose` hypotheses.
    ///
    /// Such rows are not converted with the pose representation.
    pub fn reads_hypotheses(&self) -> bool {
        matches!(
            self,
            LossMethod::PredictiveMultiview | LossMethod::Chamfer | LossMethod::ChamferOld
        )
    }
}

impl fmt::Display for LossMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LossMethod {
    type Err = LossError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| LossError::UnknownMethod(s.to_string()))
    }
}

/// A loss method with its view sampling policy.
///
/// Parsed from identifiers such as `multiview` or `multiview-random-multiview`; the suffix
/// replaces every view but the first with a random view on the sphere before rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodSpec {
    /// The formula.
    pub method: LossMethod,
    /// Resample every view but the first.
    pub random_multiview: bool,
}

impl From<LossMethod> for MethodSpec {
    fn from(method: LossMethod) -> Self {
        Self {
            method,
            random_multiview: false,
        }
    }
}

impl fmt::Display for MethodSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.random_multiview {
            write!(f, "{}{RANDOM_MULTIVIEW_SUFFIX}", self.method)
        } else {
            write!(f, "{}", self.method)
        }
    }
}

impl FromStr for MethodSpec {
    type Err = LossError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, random_multiview) = match s.strip_suffix(RANDOM_MULTIVIEW_SUFFIX) {
            Some(name) => (name, true),
            None => (s, false),
        };

        let method = name
            .parse::<LossMethod>()
            .map_err(|_| LossError::UnknownMethod(s.to_string()))?;

        Ok(Self {
            method,
            random_multiview,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_every_method() -> Result<(), LossError> {
        for method in LossMethod::ALL {
            assert_eq!(method.as_str().parse::<LossMethod>()?, method);
        }
        Ok(())
    }

    #[test]
    fn parse_random_multiview_suffix() -> Result<(), LossError> {
        let spec = "multiview-l2-random-multiview".parse::<MethodSpec>()?;
        assert_eq!(spec.method, LossMethod::MultiviewL2);
        assert!(spec.random_multiview);
        assert_eq!(spec.to_string(), "multiview-l2-random-multiview");

        let spec = "l1-depth".parse::<MethodSpec>()?;
        assert_eq!(spec, MethodSpec::from(LossMethod::L1Depth));
        Ok(())
    }

    #[test]
    fn reject_unknown_methods() {
        assert_eq!(
            "l3-depth".parse::<MethodSpec>(),
            Err(LossError::UnknownMethod("l3-depth".into()))
        );
        assert!("-random-multiview".parse::<MethodSpec>().is_err());
    }
}
