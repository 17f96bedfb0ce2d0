// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with aperture computations.

use thiserror::Error;

use crate::catalog::CatalogError;

#[derive(Error, Debug)]
pub enum ApertureError {
    #[error("The requested grid has a zero-sized axis ({nx} x {ny})")]
    ZeroSizedGrid { nx: usize, ny: usize },

    #[error("The oversampling factor must be at least 1")]
    ZeroOversample,

    #[error("The output buffer has shape {got:?}, but the request needs (ny, nx, pol) = {expected:?}")]
    BadBufferShape {
        expected: (usize, usize, usize),
        got: Vec<usize>,
    },

    #[error("The boresight reference ray failed to trace; the geometry is inconsistent")]
    BoresightTraceFailed,

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
