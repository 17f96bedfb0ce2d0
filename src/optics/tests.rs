// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::{assert_abs_diff_eq, assert_relative_eq};

use super::*;

/// A symmetric 25 m class antenna: on-axis feed, no struts, no
/// astigmatism. The profile is an ideal paraboloid with F = 9 m, so the
/// interpolated surface can be checked in closed form.
fn symmetric_geometry() -> BandGeometry {
    BandGeometry {
        name: "TEST_SYM".to_string(),
        min_freq_ghz: 1.0,
        max_freq_ghz: 2.0,
        sub_h: 8.47852,
        feed_pos: [0.0, 0.0, 1.43],
        sub_angle_deg: 9.26,
        leg_width: 0.0,
        leg_foot: 7.55,
        leg_apex: 10.93876,
        hole_radius: 1.0,
        antenna_radius: 12.5,
        ref_freq_ghz: 1.5,
        taper_poly: [13.0, 0.0, 0.0, 0.0, 0.0],
        n_taper_poly: 1,
        astigm_0: 0.0,
        astigm_45: 0.0,
    }
}

const FOCAL_LENGTH: f64 = 9.0;

fn profile() -> DishProfile {
    DishProfile::paraboloid(12.5, FOCAL_LENGTH, 129).unwrap()
}

fn symmetric_antenna() -> Antenna {
    Antenna::new(&symmetric_geometry(), profile(), 1.5)
}

fn antenna_with(f: impl FnOnce(&mut BandGeometry)) -> Antenna {
    let mut geometry = symmetric_geometry();
    f(&mut geometry);
    Antenna::new(&geometry, profile(), 1.5)
}

#[test]
fn derived_quantities() {
    let antenna = symmetric_antenna();
    // λ = c / 1.5 GHz
    assert_relative_eq!(antenna.lambda(), 0.299792458 / 1.5, max_relative = 1e-12);
    // Axial feed below the subreflector: the axial path constant is
    // sub_h + |feed → subreflector vertex|.
    let d = 8.47852 - 1.43;
    assert_relative_eq!(antenna.k_path, 8.47852 + d, max_relative = 1e-12);
    assert_abs_diff_eq!(antenna.feed_dir[0], 0.0);
    assert_abs_diff_eq!(antenna.feed_dir[1], 0.0);
    assert_abs_diff_eq!(antenna.feed_dir[2], 1.0);
    assert_relative_eq!(
        antenna.z_edge(),
        12.5 * 12.5 / (4.0 * FOCAL_LENGTH),
        max_relative = 1e-12
    );
}

#[test]
fn dish_value_reproduces_the_paraboloid() {
    let antenna = symmetric_antenna();
    for r in [0.05, 0.3, 1.0, 2.5, 6.125, 9.8, 12.3] {
        let (z, m) = antenna.dish_value(r);
        assert_relative_eq!(z, r * r / (4.0 * FOCAL_LENGTH), max_relative = 1e-10);
        assert_relative_eq!(m, r / (2.0 * FOCAL_LENGTH), max_relative = 1e-10);
    }
    // Signed radius: z is even, m is odd.
    let (zp, mp) = antenna.dish_value(3.7);
    let (zn, mn) = antenna.dish_value(-3.7);
    assert_abs_diff_eq!(zp, -zn);
    assert_abs_diff_eq!(mp, -mn);
    // The vertex.
    let (z0, m0) = antenna.dish_value(0.0);
    assert_abs_diff_eq!(z0, 0.0);
    assert_abs_diff_eq!(m0, 0.0);
}

#[test]
fn zero_astigmatism_is_exactly_the_plain_surface() {
    let antenna = symmetric_antenna();
    for &(x, y) in &[
        (0.7, 0.0),
        (0.0, 4.4),
        (-3.3, 2.1),
        (5.0, -5.0),
        (-8.8, -1.2),
        (0.0, 0.0),
    ] {
        let r = f64::hypot(x, y);
        let plain = antenna.dish_value(r);
        let astig = antenna.astig_dish_value(x, y);
        // Bit-identical, not merely close.
        assert_eq!(plain, astig);
    }
}

#[test]
fn astigmatism_perturbs_the_surface() {
    let antenna = antenna_with(|g| g.astigm_0 = 0.01);
    let r: f64 = 6.0;
    // Z6 peaks on the x axis and has the opposite sign on the y axis.
    let (z_plain, _) = antenna.dish_value(r);
    let (z_x, _) = antenna.astig_dish_value(r, 0.0);
    let (z_y, _) = antenna.astig_dish_value(0.0, r);
    assert!(z_x > z_plain);
    assert!(z_y < z_plain);
    assert_relative_eq!(z_x - z_plain, z_plain - z_y, max_relative = 1e-9);
}

#[test]
fn sub_from_dish_conserves_path_length() {
    let antenna = symmetric_antenna();
    for &(x, y) in &[(2.0, 0.0), (0.0, -7.5), (4.1, 4.1), (-9.9, 1.3), (11.0, -5.0)] {
        let sub = antenna.sub_from_dish(x, y);
        let (z, _) = antenna.astig_dish_value(x, y);
        let d1 = distance(antenna.feed, sub.pos);
        let d2 = distance(sub.pos, [x, y, z]);
        // Feed → subreflector → dish has the constant path K + z(dish).
        assert_relative_eq!(d1 + d2, antenna.k_path + z, max_relative = 1e-10);
        // The normal bisects the two directions.
        let sf = unit_towards(antenna.feed, sub.pos);
        let sd = unit_towards([x, y, z], sub.pos);
        assert_abs_diff_eq!(
            dot(sub.normal, sf),
            dot(sub.normal, sd),
            epsilon = 1e-10
        );
    }
}

#[test]
fn sub_from_dish_on_axis() {
    let antenna = symmetric_antenna();
    let sub = antenna.sub_from_dish(0.0, 0.0);
    assert_abs_diff_eq!(sub.pos[0], 0.0);
    assert_abs_diff_eq!(sub.pos[1], 0.0);
    assert_abs_diff_eq!(sub.pos[2], antenna.sub_h);
    assert_abs_diff_eq!(sub.normal[2], -1.0, epsilon = 1e-12);
}

#[test]
fn dish_from_sub_round_trips() {
    let antenna = symmetric_antenna();
    let mut attempted = 0;
    let mut good = 0;
    // An annulus sample away from the central hole and the rim.
    for i in 0..6 {
        let r = 2.5 + 1.5 * i as f64;
        for k in 0..6 {
            let theta = std::f64::consts::TAU * k as f64 / 6.0;
            let (x, y) = (r * theta.cos(), r * theta.sin());
            attempted += 1;
            let sub = antenna.sub_from_dish(x, y);
            if let Some([x1, y1]) = antenna.dish_from_sub(sub.pos[0], sub.pos[1]) {
                if f64::hypot(x1 - x, y1 - y) < 1e-3 {
                    good += 1;
                }
            }
        }
    }
    assert!(
        good * 100 >= attempted * 95,
        "only {good}/{attempted} round trips converged"
    );
}

#[test]
fn dish_from_sub_rejects_unreachable_points() {
    let antenna = symmetric_antenna();
    // The subreflector footprint is ~1 m across; nothing on the dish maps
    // to a subreflector point 5 m off axis.
    assert!(antenna.dish_from_sub(5.0, 0.0).is_none());
}

#[test]
fn traced_ray_lands_on_its_aperture_point() {
    let antenna = symmetric_antenna();
    let pathology = Pathology::default();
    for &(x, y) in &[(3.0, 0.0), (-2.2, 6.6), (0.0, -10.0)] {
        let ray = antenna.trace(x, y, &pathology).unwrap();
        // An ideal paraboloid reflects into a vertical ray, so the
        // aperture footprint equals the dish footprint.
        assert_abs_diff_eq!(ray.aper.pos[0], x, epsilon = 1e-8);
        assert_abs_diff_eq!(ray.aper.pos[1], y, epsilon = 1e-8);
        assert_abs_diff_eq!(ray.aper.pos[2], antenna.z_edge(), epsilon = 1e-12);
        assert_abs_diff_eq!(ray.dish.pos[0], x, epsilon = 1e-8);
        assert_abs_diff_eq!(ray.dish.pos[1], y, epsilon = 1e-8);
    }
}

#[test]
fn path_length_matches_explicit_sum() {
    let antenna = symmetric_antenna();
    let pathology = Pathology::default();
    for &(x, y) in &[(1.5, 1.5), (-7.0, 0.4), (5.5, -8.5)] {
        let ray = antenna.trace(x, y, &pathology).unwrap();
        let segment = |a: [f64; 3], b: [f64; 3]| {
            ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)).sqrt()
        };
        let explicit = segment(ray.feed, ray.sub.pos)
            + segment(ray.sub.pos, ray.dish.pos)
            + segment(ray.dish.pos, ray.aper.pos);
        assert_relative_eq!(ray.path_length(), explicit, max_relative = 1e-9);
    }
}

#[test]
fn all_valid_rays_share_the_boresight_path_length() {
    // Equal path length over the aperture is what makes a focused dish a
    // dish; it also pins the phase computation to ~zero everywhere.
    let antenna = symmetric_antenna();
    let pathology = Pathology::default();
    let l0 = antenna.trace(0.0, 1e-5, &pathology).unwrap().path_length();
    for &(x, y) in &[(2.0, 0.0), (0.0, 9.0), (-6.0, 6.0)] {
        let ray = antenna.trace(x, y, &pathology).unwrap();
        assert_relative_eq!(ray.path_length(), l0, max_relative = 1e-9);
    }
}

#[test]
fn feed_taper_matches_its_decibel_value() {
    let antenna = symmetric_antenna();
    assert_relative_eq!(antenna.feed_func(0.0), 1.0, max_relative = 1e-12);
    // The taper polynomial value is the edge taper in dB at the
    // subreflector half-angle.
    let edge = antenna.feed_func(9.26_f64.to_radians());
    assert_relative_eq!(edge, 10.0_f64.powf(-1.3), max_relative = 1e-2);
}

#[test]
fn feed_gain_decreases_off_axis() {
    let antenna = symmetric_antenna();
    let pathology = Pathology::default();
    let inner = antenna.trace(1.5, 0.0, &pathology).unwrap();
    let outer = antenna.trace(12.0, 0.0, &pathology).unwrap();
    assert!(antenna.feed_gain(&inner) > antenna.feed_gain(&outer));
    assert!(antenna.feed_gain(&outer) > 0.0);
}

#[test]
fn trace_pol_preserves_field_power() {
    let antenna = symmetric_antenna();
    let pathology = Pathology::default();
    let e0 = antenna.e_field([
        c64::new(std::f64::consts::FRAC_1_SQRT_2, 0.0),
        c64::new(0.0, std::f64::consts::FRAC_1_SQRT_2),
    ]);
    let power = |e: &[c64; 3]| e.iter().map(|c| c.norm_sqr()).sum::<f64>();
    for &(x, y) in &[(3.0, 1.0), (-8.0, 4.0)] {
        let ray = antenna.trace(x, y, &pathology).unwrap();
        let e1 = trace_pol(&e0, &ray);
        assert_relative_eq!(power(&e1), power(&e0), max_relative = 1e-10);
    }
}

#[test]
fn no_struts_block_nothing() {
    let antenna = symmetric_antenna();
    let pathology = Pathology::default();
    for &(x, y) in &[(2.0, 0.01), (8.0, 0.01), (12.0, 0.01)] {
        let ray = antenna.trace(x, y, &pathology).unwrap();
        assert!(!antenna.leg_plane_wave_block(&ray));
        assert!(!antenna.leg_spherical_wave_block(&ray));
        assert!(!antenna.leg_plane_wave_block_xy(x, y));
    }
}

#[test]
fn plus_struts_shadow_the_axes() {
    let antenna = antenna_with(|g| g.leg_width = 0.5);
    let pathology = Pathology::default();

    // Outside the leg foot, the shadow is along dish → subreflector.
    let near_strut = antenna.trace(8.0, 0.05, &pathology).unwrap();
    assert!(antenna.leg_spherical_wave_block(&near_strut));
    assert!(!antenna.leg_plane_wave_block(&near_strut));

    let between_struts = antenna.trace(5.8, 5.8, &pathology).unwrap();
    assert!(!antenna.leg_spherical_wave_block(&between_struts));

    // Inside the leg foot, the shadow is along dish → aperture.
    let under_strut = antenna.trace(3.0, 0.02, &pathology).unwrap();
    assert!(antenna.leg_plane_wave_block(&under_strut));
    assert!(!antenna.leg_spherical_wave_block(&under_strut));

    let clear = antenna.trace(3.0, 1.0, &pathology).unwrap();
    assert!(!antenna.leg_plane_wave_block(&clear));

    // The footprint variant agrees inside the foot radius.
    assert!(antenna.leg_plane_wave_block_xy(3.0, 0.02));
    assert!(!antenna.leg_plane_wave_block_xy(3.0, 1.0));
}

#[test]
fn cross_struts_shadow_the_diagonals() {
    let antenna = antenna_with(|g| g.leg_width = -0.5);
    let pathology = Pathology::default();

    let on_diagonal = antenna.trace(5.8, 5.83, &pathology).unwrap();
    assert!(antenna.leg_spherical_wave_block(&on_diagonal));

    let on_axis = antenna.trace(8.0, 0.05, &pathology).unwrap();
    assert!(!antenna.leg_spherical_wave_block(&on_axis));

    assert!(antenna.leg_plane_wave_block_xy(2.0, 2.02));
    assert!(!antenna.leg_plane_wave_block_xy(2.0, 0.0));
}

#[test]
fn vlba_strut_pattern_is_selected_by_name() {
    let antenna = antenna_with(|g| {
        g.name = "VLBA".to_string();
        g.leg_width = -0.5;
    });
    // The VLBA azimuths are neither the "+" nor the "×" ones: an azimuth
    // well between two VLBA struts is clear.
    let pathology = Pathology::default();
    let (s, c) = (0.3_f64.sin(), 0.3_f64.cos());
    let between = antenna.trace(8.0 * c, 8.0 * s, &pathology).unwrap();
    assert!(!antenna.leg_spherical_wave_block(&between));

    // First VLBA strut azimuth, 0.816817 rad.
    let (s, c) = (0.816817_f64.sin(), 0.816817_f64.cos());
    let on_strut = antenna.trace(8.0 * c, 8.0 * s, &pathology).unwrap();
    assert!(antenna.leg_spherical_wave_block(&on_strut));
}

#[test]
fn subreflector_rotation_rejects_rays() {
    // Rotate the subreflector by 90° about y: the rotated normal's z
    // component turns positive and the ray dies.
    let antenna = symmetric_antenna();
    let pathology = Pathology {
        sub_rot: [[0.0, 0.0, -1.0], [0.0, 1.0, 0.0], [1.0, 0.0, 0.0]],
        ..Default::default()
    };
    assert!(antenna.trace(5.0, 0.1, &pathology).is_none());
}

#[test]
fn focus_pathology_becomes_a_feed_shift() {
    let mut antenna = symmetric_antenna();
    let mut pathology = Pathology {
        focus: 0.01,
        ..Default::default()
    };
    antenna.apply_pathology(&mut pathology);
    assert_abs_diff_eq!(pathology.focus, 0.0);
    // The axial feed moves straight up towards the subreflector.
    assert_abs_diff_eq!(pathology.feed_shift[0], 0.0);
    assert_abs_diff_eq!(pathology.feed_shift[1], 0.0);
    assert_abs_diff_eq!(pathology.feed_shift[2], 0.01, epsilon = 1e-12);
}

#[test]
fn feed_shift_changes_the_path_length() {
    let antenna = symmetric_antenna();
    let nominal = antenna.trace(5.0, 0.0, &Pathology::default()).unwrap();
    let shifted = antenna
        .trace(
            5.0,
            0.0,
            &Pathology {
                feed_shift: [0.0, 0.0, 0.02],
                ..Default::default()
            },
        )
        .unwrap();
    assert_abs_diff_eq!(
        shifted.feed[2] - nominal.feed[2],
        0.02,
        epsilon = 1e-12
    );
    assert!((shifted.path_length() - nominal.path_length()).abs() > 1e-4);
}
