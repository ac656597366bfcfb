pub mod brep_curve_on_surface;
pub mod composed_derivatives;
pub mod curve_on_surface;
pub mod geometry_role;
pub mod quadrature_point;
pub use brep_curve_on_surface::*;
pub use composed_derivatives::*;
pub use curve_on_surface::*;
pub use geometry_role::*;
pub use quadrature_point::*;
