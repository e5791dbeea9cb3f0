/*
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */
#![allow(unused)]

use std::{fmt, marker::PhantomData, cmp};

#[inline]
pub fn normalize_90 (d: f64) -> f64 {
    let x = d % 360.0;
    if x < -90.0 { -180.0 - x } else if x > 90.0 { 180.0 - x } else { x }
}

#[inline]
pub fn normalize_180 (d: f64) -> f64 {
    let x = d % 360.0;
    if x < -180.0 { 360.0 + x } else if x > 180.0 { x - 360.0 } else { x }
}

pub trait AngleKind {
    fn normalize (v: f64) -> f64;
    fn label() -> &'static str;
}

#[derive(Debug, Clone, Copy)]
pub struct LatitudeKind {}
impl AngleKind for LatitudeKind {
    fn normalize (v: f64) -> f64 { normalize_90(v) }
    fn label() -> &'static str { "Latitude" }
}

#[derive(Debug, Clone, Copy)]
pub struct LongitudeKind {}
impl AngleKind for LongitudeKind {
    fn normalize (v: f64) -> f64 { normalize_180(v) }
    fn label() -> &'static str { "Longitude" }
}

#[derive(Copy, Clone)]
pub struct NormalizedAngle<K> where K: AngleKind {
    value: f64,
    kind: PhantomData<K>,
}

impl<K> NormalizedAngle<K> where K: AngleKind {
    #[inline]
    pub fn from_degrees (deg: f64) -> Self {
        NormalizedAngle { value: K::normalize(deg), kind: PhantomData }
    }

    #[inline] pub fn degrees (&self) -> f64 { self.value }
    #[inline] pub fn radians (&self) -> f64 { self.value.to_radians() }
}

impl<K> From<NormalizedAngle<K>> for f64 where K: AngleKind {
    fn from (a: NormalizedAngle<K>) -> Self { a.value }
}

impl<K> fmt::Display for NormalizedAngle<K> where K: AngleKind {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}deg", self.value) }
}

impl<K> fmt::Debug for NormalizedAngle<K> where K: AngleKind {
    fn fmt (&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}({})", K::label(), self.value) }
}

impl<K> cmp::PartialEq for NormalizedAngle<K> where K: AngleKind {
    fn eq (&self, other: &Self) -> bool { self.value == other.value }
}
impl<K> cmp::PartialOrd for NormalizedAngle<K> where K: AngleKind {
    fn partial_cmp (&self, other: &Self) -> Option<cmp::Ordering> { self.value.partial_cmp(&other.value) }
}

pub type Latitude = NormalizedAngle<LatitudeKind>;
pub type Longitude = NormalizedAngle<LongitudeKind>;

use serde::de::{self, Deserialize, Deserializer, Visitor};
use serde::ser::{Serialize, Serializer};

macro_rules! define_angle_deserializer {
    ($angle_type:ident, $min:literal, $max:literal) => {
        impl<'de> Deserialize<'de> for $angle_type {
            fn deserialize<D> (deserializer: D) -> Result<$angle_type, D::Error> where D: Deserializer<'de> {
                struct AngleVisitor;
                impl<'de> Visitor<'de> for AngleVisitor {
                    type Value = $angle_type;
                    fn expecting (&self, f: &mut fmt::Formatter) -> fmt::Result {
                        write!(f, "floating point degrees between [{}..{}]", $min, $max)
                    }
                    fn visit_f64<E> (self, value: f64) -> Result<Self::Value, E> where E: de::Error {
                        if value >= $min && value <= $max {
                            Ok($angle_type::from_degrees(value))
                        } else {
                            Err(E::custom(format!("degrees out of range: {}", value)))
                        }
                    }
                }
                deserializer.deserialize_f64(AngleVisitor)
            }
        }
    };
}
define_angle_deserializer!{ Latitude, -90.0, 90.0 }
define_angle_deserializer!{ Longitude, -180.0, 180.0 }

impl<K> Serialize for NormalizedAngle<K> where K: AngleKind {
    fn serialize<S> (&self, serializer: S) -> Result<S::Ok, S::Error> where S: Serializer {
        serializer.serialize_f64(self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latitude_clamps_at_poles() {
        assert_eq!(Latitude::from_degrees(95.0).degrees(), 85.0);
        assert_eq!(Latitude::from_degrees(-95.0).degrees(), -85.0);
    }

    #[test]
    fn longitude_wraps_dateline() {
        assert_eq!(Longitude::from_degrees(190.0).degrees(), -170.0);
    }
}
