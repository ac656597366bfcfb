pub mod parametric_interval;
pub use parametric_interval::*;
