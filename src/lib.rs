#![allow(clippy::needless_range_loop)]

mod closest_parameter;
mod curve;
mod curve_on_surface;
mod interval;
mod knot;
mod misc;
mod quadrature;
mod surface;

pub mod prelude {
    pub use crate::closest_parameter::*;
    pub use crate::curve::*;
    pub use crate::curve_on_surface::*;
    pub use crate::interval::*;
    pub use crate::knot::*;
    pub use crate::misc::*;
    pub use crate::quadrature::*;
    pub use crate::surface::*;
}
