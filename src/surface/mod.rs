pub mod nurbs_surface;
pub mod surface_evaluator;
pub use nurbs_surface::*;
pub use surface_evaluator::*;

/// Parametric direction of a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceDirection {
    U,
    V,
}
