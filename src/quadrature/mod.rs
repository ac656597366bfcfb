pub mod integration_options;
pub mod integration_point;
pub mod quadrature_rule;
pub use integration_options::*;
pub use integration_point::*;
pub use quadrature_rule::*;
