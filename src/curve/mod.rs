pub mod curve_evaluator;
pub mod curve_shape_function;
pub mod nurbs_curve;
pub use curve_evaluator::*;
pub use curve_shape_function::*;
pub use nurbs_curve::*;

#[cfg(test)]
mod tests;
