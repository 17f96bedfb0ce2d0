// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Ray-traced aperture-plane illumination code for Cassegrain radio telescopes.

Given a per-band antenna geometry (dish surface profile, feed position,
subreflector height, strut layout, feed taper), this crate traces geometric
rays feed → subreflector → dish → aperture plane for every pixel of an
oversampled grid and accumulates a complex, 4-correlation-plane aperture
illumination image. The image is what an FFT-based beam-forming stage
consumes; that stage is not part of this crate.

All lengths are in metres, frequencies in GHz and angles in radians unless a
name says otherwise.
 */

pub mod aperture;
pub mod catalog;
mod constants;
pub mod optics;
pub(crate) mod types;

pub use aperture::{
    calculate_aperture, calculate_aperture_into, ApertureCalcParams, ApertureError, CorrProduct,
    PolBasis, PolPlan,
};
pub use catalog::{BandGeometry, CatalogError, DishProfile, GeometryCatalog};
pub use optics::{Antenna, Pathology, Ray, SurfacePoint};

// Re-exports.
pub use marlu;
pub use ndarray;
pub use num_complex;
