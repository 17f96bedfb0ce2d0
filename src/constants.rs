// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.
 */

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

/// Hard cap on the number of rows in a dish surface profile.
pub(crate) const MAX_GEOM_SAMPLES: usize = 2000;

/// Exponent scale of the Gaussian feed taper. Empirically tuned; keep
/// verbatim.
pub(crate) const FEED_TAPER_EXP: f64 = -0.083;

/// Angle scale relating the feed taper to the subreflector half-angle.
/// Empirically tuned; keep verbatim.
pub(crate) const FEED_TAPER_ANGLE: f64 = 0.1874;

/// Feed-leg azimuths for "+"-shaped struts \[radians\].
pub(crate) const STRUT_AZIMUTHS_PLUS: [f64; 4] = [0.0, FRAC_PI_2, PI, 3.0 * FRAC_PI_2];

/// Feed-leg azimuths for "×"-shaped struts \[radians\].
pub(crate) const STRUT_AZIMUTHS_CROSS: [f64; 4] =
    [FRAC_PI_4, 3.0 * FRAC_PI_4, 5.0 * FRAC_PI_4, 7.0 * FRAC_PI_4];

/// Feed-leg azimuths for VLBA antennas \[radians\]. Empirically tuned; keep
/// verbatim.
pub(crate) const STRUT_AZIMUTHS_VLBA: [f64; 4] = [0.816817, 2.3247756, 3.9584096, 5.466368];

/// Direction cosines of the VLBA strut footprint in the aperture plane.
/// Empirically tuned; keep verbatim.
pub(crate) const VLBA_FOOTPRINT_SIN: f64 = 1.457937;
pub(crate) const VLBA_FOOTPRINT_COS: f64 = 1.369094;

/// A strut is only tested for shadowing when the dish point lies within
/// ~45 degrees of the strut's azimuth.
pub(crate) const STRUT_AZIMUTH_CUT: f64 = 0.7;
