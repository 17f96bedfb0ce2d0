// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::{assert_abs_diff_eq, assert_relative_eq};

use super::*;

const SAMPLE_TABLE: &str = "\
# name minfreq maxfreq sub_h feedpos(3) subangle legwidth legfoot legapex \
rhole rant reffreq taperpoly(5) ntaperpoly astigm_0 astigm_45
TEST_L  1.0  2.0  8.47852  -1.0 0.0 1.43  9.26  0.27  7.55  10.93876  1.0  12.5  1.5  13.0 0.9 0.0 0.0 0.0  2  0.0  0.0

TEST_S  2.0  4.0  8.47852   0.0 1.0 1.43  9.26  0.27  7.55  10.93876  1.0  12.5  3.0  13.0 0.0 0.0 0.0 0.0  1  0.01 -0.02
";

#[test]
fn parses_a_ray_table() {
    let catalog =
        GeometryCatalog::from_table_reader(SAMPLE_TABLE.as_bytes(), "sample").unwrap();
    assert_eq!(catalog.num_bands(), 2);

    let band = catalog.band(0).unwrap();
    assert_eq!(band.name, "TEST_L");
    assert_abs_diff_eq!(band.min_freq_ghz, 1.0);
    assert_abs_diff_eq!(band.max_freq_ghz, 2.0);
    assert_abs_diff_eq!(band.feed_pos[0], -1.0);
    assert_abs_diff_eq!(band.feed_pos[2], 1.43);
    assert_abs_diff_eq!(band.leg_width, 0.27);
    assert_abs_diff_eq!(band.ref_freq_ghz, 1.5);
    assert_eq!(band.n_taper_poly, 2);

    let band = catalog.band(1).unwrap();
    assert_abs_diff_eq!(band.astigm_0, 0.01);
    assert_abs_diff_eq!(band.astigm_45, -0.02);
}

#[test]
fn table_with_short_row_is_rejected() {
    let text = "TEST 1.0 2.0 8.5\n";
    let result = GeometryCatalog::from_table_reader(text.as_bytes(), "short");
    assert!(matches!(
        result,
        Err(CatalogError::MissingColumns {
            line_num: 1,
            got: 4,
            ..
        })
    ));
}

#[test]
fn table_with_bad_number_is_rejected() {
    let text = SAMPLE_TABLE.replace("8.47852", "eight");
    let result = GeometryCatalog::from_table_reader(text.as_bytes(), "bad");
    assert!(matches!(result, Err(CatalogError::ParseField { .. })));
}

#[test]
fn empty_table_is_rejected() {
    let text = "# only a comment\n\n";
    let result = GeometryCatalog::from_table_reader(text.as_bytes(), "empty");
    assert!(matches!(result, Err(CatalogError::EmptyTable)));
}

#[test]
fn taper_polynomial_is_expanded_about_the_reference() {
    let catalog =
        GeometryCatalog::from_table_reader(SAMPLE_TABLE.as_bytes(), "sample").unwrap();
    let band = catalog.band(0).unwrap();
    assert_relative_eq!(band.taper_at(1.5), 13.0, max_relative = 1e-12);
    assert_relative_eq!(band.taper_at(2.0), 13.0 + 0.9 * 0.5, max_relative = 1e-12);
    // Only n_taper_poly terms count.
    let band = catalog.band(1).unwrap();
    assert_relative_eq!(band.taper_at(4.0), 13.0, max_relative = 1e-12);
}

#[test]
fn band_lookup_scans_in_order() {
    let catalog =
        GeometryCatalog::from_table_reader(SAMPLE_TABLE.as_bytes(), "sample").unwrap();
    assert_eq!(catalog.band_for_freq(1.4).unwrap(), 0);
    assert_eq!(catalog.band_for_freq(3.0).unwrap(), 1);
    // A frequency exactly on the shared boundary belongs to the lower
    // band: the linear scan stops at the first match.
    assert_eq!(catalog.band_for_freq(2.0).unwrap(), 0);
    // Exactly on the outer edges.
    assert_eq!(catalog.band_for_freq(1.0).unwrap(), 0);
    assert_eq!(catalog.band_for_freq(4.0).unwrap(), 1);
}

#[test]
fn out_of_band_frequency_is_an_error() {
    let catalog =
        GeometryCatalog::from_table_reader(SAMPLE_TABLE.as_bytes(), "sample").unwrap();
    let err = catalog.band_for_freq(97.3).unwrap_err();
    assert!(matches!(err, CatalogError::NoMatchingBand { .. }));
    // The frequency is echoed in the message.
    assert!(err.to_string().contains("97.3"));
}

#[test]
fn internal_catalogs_resolve() {
    let vla = GeometryCatalog::internal("VLA", "STANDARD").unwrap();
    assert_eq!(vla.num_bands(), 8);
    let evla = GeometryCatalog::internal("EVLA", "STANDARD").unwrap();
    assert_eq!(evla.num_bands(), 8);
    let alma = GeometryCatalog::internal("ALMA", "DV").unwrap();
    assert_eq!(alma.num_bands(), 4);

    // EVLA receiver bands touch; the lower band wins on a boundary.
    assert_eq!(evla.band_for_freq(4.0).unwrap(), 1);
}

#[test]
fn unknown_observatory_is_fatal() {
    assert!(matches!(
        GeometryCatalog::internal("GMRT", "STANDARD"),
        Err(CatalogError::UnknownObservatory { .. })
    ));
    assert!(matches!(
        GeometryCatalog::internal("ALMA", "STANDARD"),
        Err(CatalogError::UnknownObservatory { .. })
    ));
    assert!(matches!(
        GeometryCatalog::select("GBT", "STANDARD", None),
        Err(CatalogError::UnknownObservatory { .. })
    ));
}

#[test]
fn alma_da_antennas_get_crossed_struts() {
    let dv = GeometryCatalog::internal("ALMA", "DV").unwrap();
    let da = GeometryCatalog::internal("ALMA", "DA").unwrap();
    for (b_dv, b_da) in dv.bands().iter().zip(da.bands().iter()) {
        assert!(b_dv.leg_width > 0.0);
        assert_abs_diff_eq!(b_da.leg_width, -b_dv.leg_width);
    }
}

#[test]
fn natural_basis_follows_the_observatory() {
    use crate::aperture::PolBasis;
    let evla = GeometryCatalog::internal("EVLA", "STANDARD").unwrap();
    assert_eq!(evla.natural_basis(), PolBasis::Circular);
    let alma = GeometryCatalog::internal("ALMA", "PM").unwrap();
    assert_eq!(alma.natural_basis(), PolBasis::Linear);
}

#[test]
fn internal_catalogs_synthesise_profiles() {
    let evla = GeometryCatalog::internal("EVLA", "STANDARD").unwrap();
    let profile = evla.profile_for_band(0).unwrap();
    assert_abs_diff_eq!(profile.radius(), 12.5);
    assert!(profile.num_samples() >= 3);
    // The rim height of a paraboloid with the VLA focal length.
    assert_relative_eq!(
        profile.z_edge(),
        12.5 * 12.5 / (4.0 * 9.0),
        max_relative = 1e-12
    );

    let bad = evla.profile_for_band(99).unwrap_err();
    assert!(matches!(bad, CatalogError::BandOutOfRange { .. }));
}

#[test]
fn profile_from_reader() {
    let text = "\
# r z m
0.0  0.0    0.0
1.0  0.025  0.05
2.0  0.1    0.1
3.0  0.225  0.15
";
    let profile = DishProfile::from_reader(text.as_bytes(), "test").unwrap();
    assert_eq!(profile.num_samples(), 4);
    assert_abs_diff_eq!(profile.radius(), 3.0);
    assert_abs_diff_eq!(profile.delta_r(), 1.0);
    assert_abs_diff_eq!(profile.z_edge(), 0.225);
}

#[test]
fn truncated_profile_is_fatal_at_load_time() {
    let text = "0.0 0.0 0.0\n1.0 0.1 0.2\n";
    let result = DishProfile::from_reader(text.as_bytes(), "short");
    assert!(matches!(
        result,
        Err(CatalogError::TruncatedProfile { got: 2, .. })
    ));
}

#[test]
fn malformed_profile_rows_are_fatal() {
    let two_columns = "0.0 0.0\n1.0 0.1\n2.0 0.2\n";
    assert!(matches!(
        DishProfile::from_reader(two_columns.as_bytes(), "cols"),
        Err(CatalogError::BadProfileRow { got: 2, .. })
    ));

    let not_a_number = "0.0 0.0 0.0\n1.0 zero 0.2\n2.0 0.2 0.2\n";
    assert!(matches!(
        DishProfile::from_reader(not_a_number.as_bytes(), "nan"),
        Err(CatalogError::BadProfileField { line_num: 2, .. })
    ));
}

#[test]
fn paraboloid_profile_bounds() {
    assert!(matches!(
        DishProfile::paraboloid(12.5, 9.0, 2),
        Err(CatalogError::TruncatedProfile { .. })
    ));
    assert!(matches!(
        DishProfile::paraboloid(-1.0, 9.0, 100),
        Err(CatalogError::BadParaboloid)
    ));
    let profile = DishProfile::paraboloid(6.0, 4.8, 65).unwrap();
    assert_eq!(profile.num_samples(), 65);
    assert_relative_eq!(profile.z_edge(), 36.0 / (4.0 * 4.8), max_relative = 1e-12);
}

#[test]
fn missing_table_file_is_an_io_error() {
    let result = GeometryCatalog::from_ray_table("/nonexistent/rays.tab");
    assert!(matches!(result, Err(CatalogError::Io { .. })));
}
