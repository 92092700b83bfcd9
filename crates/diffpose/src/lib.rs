//! 6D object pose estimation via differentiable rendering.
//!
//! Re-exports the workspace crates under short names.

#[doc(inline)]
pub use diffpose_image as image;

#[doc(inline)]
pub use diffpose_imgproc as imgproc;

#[doc(inline)]
pub use diffpose_io as io;

#[doc(inline)]
pub use diffpose_3d as k3d;

#[doc(inline)]
pub use diffpose_render as render;

#[doc(inline)]
pub use diffpose_losses as losses;

#[doc(inline)]
pub use diffpose_optim as optim;

#[doc(inline)]
pub use diffpose_bop as bop;
