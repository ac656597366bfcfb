use std::{fmt, sync::Arc};

use crate::misc::FloatingPoint;

use super::CurveOnSurface;

/// Role under which a brep geometry exposes one of its constituent geometries
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GeometryRole {
    /// The underlying full surface
    Background,
    /// The 2D curve embedded in the surface's parameter domain
    EmbeddedCurve,
    /// The full untrimmed composed curve on surface
    CurveOnSurface,
}

impl fmt::Display for GeometryRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GeometryRole::Background => "background",
            GeometryRole::EmbeddedCurve => "embedded curve",
            GeometryRole::CurveOnSurface => "curve on surface",
        };
        f.write_str(name)
    }
}

/// A geometry addressed by role
#[derive(Debug)]
pub enum GeometryPart<T: FloatingPoint, C, S> {
    Surface(Arc<S>),
    Curve(Arc<C>),
    CurveOnSurface(Arc<CurveOnSurface<T, C, S>>),
}

impl<T: FloatingPoint, C, S> Clone for GeometryPart<T, C, S> {
    fn clone(&self) -> Self {
        match self {
            GeometryPart::Surface(s) => GeometryPart::Surface(Arc::clone(s)),
            GeometryPart::Curve(c) => GeometryPart::Curve(Arc::clone(c)),
            GeometryPart::CurveOnSurface(m) => GeometryPart::CurveOnSurface(Arc::clone(m)),
        }
    }
}

impl<T: FloatingPoint, C, S> GeometryPart<T, C, S> {
    pub fn surface(&self) -> Option<&Arc<S>> {
        match self {
            GeometryPart::Surface(s) => Some(s),
            _ => None,
        }
    }

    pub fn curve(&self) -> Option<&Arc<C>> {
        match self {
            GeometryPart::Curve(c) => Some(c),
            _ => None,
        }
    }

    pub fn curve_on_surface(&self) -> Option<&Arc<CurveOnSurface<T, C, S>>> {
        match self {
            GeometryPart::CurveOnSurface(m) => Some(m),
            _ => None,
        }
    }
}

/// Access to the constituent geometries of a brep geometry by role.
/// Each geometry kind declares the roles it supports, any other role is an error.
pub trait GeometryParts<T: FloatingPoint, C, S> {
    /// Roles supported by this geometry
    fn geometry_roles(&self) -> &'static [GeometryRole];

    /// # Failures
    /// - if the role is not supported by this geometry
    fn geometry_part(&self, role: GeometryRole) -> anyhow::Result<GeometryPart<T, C, S>>;

    fn has_geometry_part(&self, role: GeometryRole) -> bool {
        self.geometry_roles().contains(&role)
    }
}
