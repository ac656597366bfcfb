pub mod binomial;
pub mod floating_point;
pub mod segment;

pub use binomial::*;
pub use floating_point::*;
pub use segment::*;
