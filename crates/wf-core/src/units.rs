//! SI quantities at the configuration boundary.
//!
//! Arrays hold plain `f64` in meters and kg/m3; typed quantities are used
//! where lengths and densities enter from a turbine or case definition.

use uom::si::f64::{Length as UomLength, MassDensity as UomMassDensity};
use uom::si::length::meter;
use uom::si::mass_density::kilogram_per_cubic_meter;

pub type Length = UomLength;
pub type Density = UomMassDensity;

#[inline]
pub fn m(v: f64) -> Length {
    Length::new::<meter>(v)
}

#[inline]
pub fn kgpm3(v: f64) -> Density {
    Density::new::<kilogram_per_cubic_meter>(v)
}

/// Value of a length in meters (the convention of every `D`/`H` array).
#[inline]
pub fn in_m(l: Length) -> f64 {
    l.get::<meter>()
}

/// Value of a density in kg/m3 (the convention of every `RHO` array).
#[inline]
pub fn in_kgpm3(d: Density) -> f64 {
    d.get::<kilogram_per_cubic_meter>()
}

pub mod constants {
    /// Standard air density at sea level (kg/m3).
    pub const RHO_STD_KGPM3: f64 = 1.225;
}
