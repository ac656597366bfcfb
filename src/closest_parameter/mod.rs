pub mod closest_parameter_newton;
pub mod curve_on_surface_projection_problem;
pub mod projection;
pub mod projection_options;
pub use closest_parameter_newton::*;
pub use curve_on_surface_projection_problem::*;
pub use projection::*;
pub use projection_options::*;
