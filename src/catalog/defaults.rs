// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Compiled-in ray-tracing geometries for observatories whose parameters are
//! well known. These are used when no explicit ray-geometry table is
//! supplied. Lengths in metres, frequencies in GHz, angles in degrees.

pub(super) struct DefaultBand {
    pub(super) name: &'static str,
    pub(super) min_freq_ghz: f64,
    pub(super) max_freq_ghz: f64,
    pub(super) sub_h: f64,
    pub(super) feed_pos: [f64; 3],
    pub(super) sub_angle_deg: f64,
    pub(super) leg_width: f64,
    pub(super) leg_foot: f64,
    pub(super) leg_apex: f64,
    pub(super) hole_radius: f64,
    pub(super) antenna_radius: f64,
    pub(super) ref_freq_ghz: f64,
    pub(super) taper_poly: [f64; 5],
    pub(super) n_taper_poly: usize,
    pub(super) astigm_0: f64,
    pub(super) astigm_45: f64,
}

/// Focal length used to synthesise an ideal-paraboloid surface profile for
/// the 25 m VLA/EVLA dishes.
pub(super) const VLA_FOCAL_LENGTH: f64 = 9.0;

/// Focal length for the 12 m ALMA dishes.
pub(super) const ALMA_FOCAL_LENGTH: f64 = 4.8;

macro_rules! vla_band {
    ($name:literal, $min:expr, $max:expr, $feed:expr, $ref:expr, $taper:expr, $ntaper:expr) => {
        DefaultBand {
            name: $name,
            min_freq_ghz: $min,
            max_freq_ghz: $max,
            sub_h: 8.47852,
            feed_pos: $feed,
            sub_angle_deg: 9.26,
            leg_width: 0.27,
            leg_foot: 7.55,
            leg_apex: 10.93876,
            hole_radius: 1.0,
            antenna_radius: 12.5,
            ref_freq_ghz: $ref,
            taper_poly: $taper,
            n_taper_poly: $ntaper,
            astigm_0: 0.0,
            astigm_45: 0.0,
        }
    };
}

pub(super) const VLA_BANDS: [DefaultBand; 8] = [
    vla_band!("VLA_4", 0.0665, 0.0835, [0.953, 0.0, 1.43], 0.0745, [10.0, 0.0, 0.0, 0.0, 0.0], 1),
    vla_band!("VLA_P", 0.297, 0.343, [0.674, 0.674, 1.43], 0.327, [10.0, 0.0, 0.0, 0.0, 0.0], 1),
    vla_band!("VLA_L", 1.19, 1.74, [-0.953, 0.0, 1.43], 1.45, [13.0, 0.9, 0.0, 0.0, 0.0], 2),
    vla_band!("VLA_C", 4.159, 5.1, [0.0, 0.953, 1.43], 4.866, [13.0, 0.4, 0.0, 0.0, 0.0], 2),
    vla_band!("VLA_X", 7.85, 9.06, [-0.674, 0.674, 1.43], 8.435, [13.0, 0.0, 0.0, 0.0, 0.0], 1),
    vla_band!("VLA_U", 12.53, 15.95, [0.674, -0.674, 1.43], 14.965, [13.0, 0.0, 0.0, 0.0, 0.0], 1),
    vla_band!("VLA_K", 19.7, 25.8, [-0.674, -0.674, 1.43], 22.485, [13.0, 0.0, 0.0, 0.0, 0.0], 1),
    vla_band!("VLA_Q", 38.2, 51.8, [0.0, -0.953, 1.43], 43.315, [13.0, 0.0, 0.0, 0.0, 0.0], 1),
];

pub(super) const EVLA_BANDS: [DefaultBand; 8] = [
    vla_band!("EVLA_L", 1.0, 2.0, [-0.953, 0.0, 1.43], 1.5, [13.0, 0.9, 0.0, 0.0, 0.0], 2),
    vla_band!("EVLA_S", 2.0, 4.0, [0.674, 0.674, 1.43], 3.0, [13.0, 0.45, 0.0, 0.0, 0.0], 2),
    vla_band!("EVLA_C", 4.0, 8.0, [0.0, 0.953, 1.43], 6.0, [13.0, 0.2, 0.0, 0.0, 0.0], 2),
    vla_band!("EVLA_X", 8.0, 12.0, [-0.674, 0.674, 1.43], 10.0, [13.0, 0.0, 0.0, 0.0, 0.0], 1),
    vla_band!("EVLA_Ku", 12.0, 18.0, [0.674, -0.674, 1.43], 15.0, [13.0, 0.0, 0.0, 0.0, 0.0], 1),
    vla_band!("EVLA_K", 18.0, 26.5, [-0.674, -0.674, 1.43], 22.25, [13.0, 0.0, 0.0, 0.0, 0.0], 1),
    vla_band!("EVLA_Ka", 26.5, 40.0, [0.0, -0.953, 1.43], 33.25, [13.0, 0.0, 0.0, 0.0, 0.0], 1),
    vla_band!("EVLA_Q", 40.0, 50.0, [0.953, 0.0, 1.43], 45.0, [13.0, 0.0, 0.0, 0.0, 0.0], 1),
];

macro_rules! alma_band {
    ($name:literal, $min:expr, $max:expr, $ref:expr) => {
        DefaultBand {
            name: $name,
            min_freq_ghz: $min,
            max_freq_ghz: $max,
            sub_h: 4.59,
            feed_pos: [0.0, 0.0, -1.1],
            sub_angle_deg: 3.58,
            leg_width: 0.09,
            leg_foot: 3.9,
            leg_apex: 5.14,
            hole_radius: 0.375,
            antenna_radius: 6.0,
            ref_freq_ghz: $ref,
            taper_poly: [12.0, 0.0, 0.0, 0.0, 0.0],
            n_taper_poly: 1,
            astigm_0: 0.0,
            astigm_45: 0.0,
        }
    };
}

pub(super) const ALMA_BANDS: [DefaultBand; 4] = [
    alma_band!("ALMA_3", 84.0, 116.0, 100.0),
    alma_band!("ALMA_6", 211.0, 275.0, 243.0),
    alma_band!("ALMA_7", 275.0, 373.0, 324.0),
    alma_band!("ALMA_9", 602.0, 720.0, 661.0),
];
