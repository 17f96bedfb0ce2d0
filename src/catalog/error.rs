// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with geometry catalogs and dish surface profiles.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("No antenna ray-tracing geometry available for observatory '{observatory}', antenna type '{antenna_type}'")]
    UnknownObservatory {
        observatory: String,
        antenna_type: String,
    },

    #[error("{freq_ghz} GHz does not fall in any band of the loaded geometries")]
    NoMatchingBand { freq_ghz: f64 },

    #[error("Band index {band} is out of range; the catalog has {num_bands} bands")]
    BandOutOfRange { band: usize, num_bands: usize },

    #[error("Ray-geometry table contained no rows")]
    EmptyTable,

    #[error("Ray-geometry table line {line_num}: expected {expected} columns, got {got}")]
    MissingColumns {
        line_num: usize,
        expected: usize,
        got: usize,
    },

    #[error("Ray-geometry table line {line_num}: couldn't parse '{text}' as a number")]
    ParseField { line_num: usize, text: String },

    #[error("Surface profile '{path}' has only {got} samples; at least 3 are needed")]
    TruncatedProfile { path: String, got: usize },

    #[error("Surface profile '{path}' has more than {max} samples")]
    TooManySamples { path: String, max: usize },

    #[error("Surface profile line {line_num}: expected 3 columns (r z m), got {got}")]
    BadProfileRow { line_num: usize, got: usize },

    #[error("Surface profile line {line_num}: couldn't parse '{text}' as a number")]
    BadProfileField { line_num: usize, text: String },

    #[error("No dish surface profile is available for band '{band_name}': the catalog was built from a table without an accompanying surface directory")]
    NoProfileSource { band_name: String },

    #[error("Paraboloid profiles need a positive radius and focal length")]
    BadParaboloid,

    /// IO error when reading a table or profile.
    #[error("{path}: {err}")]
    Io {
        path: String,
        err: std::io::Error,
    },
}
