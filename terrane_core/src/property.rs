// Copyright 2026 the Terrane Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Uniform property values and addressing.
//!
//! Scene properties are addressed by a [`PropertyRef`] — an actor handle plus
//! a [`PropertyIndex`]. The built-in geometry properties ([`POSITION`],
//! [`SIZE`]) live in dedicated store columns; custom properties registered via
//! [`ActorStore::register_property`](crate::actor::ActorStore::register_property)
//! are assigned indices starting at [`CUSTOM_BASE`].
//!
//! [`PropertyValue`] is the single generic value type flowing through the
//! constraint pipeline. A property's type is fixed at creation: writing a
//! value of a different variant is a contract violation, not a conversion.

use core::fmt;

use kurbo::{Point, Size};

use crate::actor::ActorId;

/// Index of a property on an actor.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PropertyIndex(pub u32);

impl fmt::Debug for PropertyIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PropertyIndex({})", self.0)
    }
}

/// The built-in position property (a [`PropertyValue::Point`]).
pub const POSITION: PropertyIndex = PropertyIndex(0);

/// The built-in size property (a [`PropertyValue::Size`]).
pub const SIZE: PropertyIndex = PropertyIndex(1);

/// First index handed out for custom registered properties.
///
/// Indices between [`SIZE`] and this value are reserved for future built-ins.
pub const CUSTOM_BASE: u32 = 16;

/// Addresses one property on one actor.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct PropertyRef {
    /// The actor owning the property.
    pub actor: ActorId,
    /// Which property on that actor.
    pub property: PropertyIndex,
}

/// A value held by a scene property.
///
/// Constraint functions receive and produce these; the variant is the
/// property's type and never changes after creation.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum PropertyValue {
    /// A boolean flag.
    Bool(bool),
    /// A scalar.
    Float(f64),
    /// A 2-D point (position-like).
    Point(Point),
    /// A 2-D extent (size-like).
    Size(Size),
}

impl PropertyValue {
    /// Returns whether `other` holds the same variant as `self`.
    #[inline]
    #[must_use]
    pub const fn same_type(&self, other: &Self) -> bool {
        matches!(
            (self, other),
            (Self::Bool(_), Self::Bool(_))
                | (Self::Float(_), Self::Float(_))
                | (Self::Point(_), Self::Point(_))
                | (Self::Size(_), Self::Size(_))
        )
    }

    /// Component-wise linear interpolation between `self` and `to`.
    ///
    /// `t` is clamped to `[0, 1]`. Booleans step at the midpoint.
    ///
    /// # Panics
    ///
    /// Panics if the two values hold different variants.
    #[must_use]
    pub fn interpolate(&self, to: &Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        match (self, to) {
            (Self::Bool(a), Self::Bool(b)) => Self::Bool(if t < 0.5 { *a } else { *b }),
            (Self::Float(a), Self::Float(b)) => Self::Float(a + (b - a) * t),
            (Self::Point(a), Self::Point(b)) => Self::Point(Point::new(
                a.x + (b.x - a.x) * t,
                a.y + (b.y - a.y) * t,
            )),
            (Self::Size(a), Self::Size(b)) => Self::Size(Size::new(
                a.width + (b.width - a.width) * t,
                a.height + (b.height - a.height) * t,
            )),
            _ => panic!("cannot interpolate between differently-typed property values"),
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<Point> for PropertyValue {
    fn from(v: Point) -> Self {
        Self::Point(v)
    }
}

impl From<Size> for PropertyValue {
    fn from(v: Size) -> Self {
        Self::Size(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolate_float_midpoint() {
        let a = PropertyValue::Float(0.0);
        let b = PropertyValue::Float(10.0);
        assert_eq!(a.interpolate(&b, 0.5), PropertyValue::Float(5.0));
    }

    #[test]
    fn interpolate_clamps_t() {
        let a = PropertyValue::Float(0.0);
        let b = PropertyValue::Float(10.0);
        assert_eq!(a.interpolate(&b, -1.0), a);
        assert_eq!(a.interpolate(&b, 2.0), b);
    }

    #[test]
    fn interpolate_point_and_size() {
        let a = PropertyValue::Point(Point::new(0.0, 0.0));
        let b = PropertyValue::Point(Point::new(4.0, 8.0));
        assert_eq!(
            a.interpolate(&b, 0.25),
            PropertyValue::Point(Point::new(1.0, 2.0))
        );

        let a = PropertyValue::Size(Size::new(100.0, 50.0));
        let b = PropertyValue::Size(Size::new(200.0, 150.0));
        assert_eq!(
            a.interpolate(&b, 0.5),
            PropertyValue::Size(Size::new(150.0, 100.0))
        );
    }

    #[test]
    fn interpolate_bool_steps_at_midpoint() {
        let a = PropertyValue::Bool(false);
        let b = PropertyValue::Bool(true);
        assert_eq!(a.interpolate(&b, 0.4), PropertyValue::Bool(false));
        assert_eq!(a.interpolate(&b, 0.6), PropertyValue::Bool(true));
    }

    #[test]
    #[should_panic(expected = "differently-typed")]
    fn interpolate_mismatched_types_panics() {
        let a = PropertyValue::Float(1.0);
        let b = PropertyValue::Bool(true);
        let _ = a.interpolate(&b, 0.5);
    }

    #[test]
    fn same_type_checks_variant_only() {
        assert!(PropertyValue::Float(1.0).same_type(&PropertyValue::Float(2.0)));
        assert!(!PropertyValue::Float(1.0).same_type(&PropertyValue::Bool(true)));
    }
}
