/// An error type for the 3d module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum GeometryError {
    /// The input does not contain the number of values the encoding expects.
    #[error("Expected {0} values, got {1}")]
    InvalidLength(usize, usize),

    /// The input cannot be turned into a rotation, e.g. a zero quaternion.
    #[error("Cannot compute a rotation from a degenerate input: {0}")]
    DegenerateRotation(&'static str),

    /// Source and destination buffers differ in length.
    #[error("Point buffers differ in length ({0} != {1})")]
    MismatchedPoints(usize, usize),

    /// An operation needs at least one point.
    #[error("Point cloud is empty")]
    EmptyPointCloud,
}
