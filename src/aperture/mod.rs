// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
The aperture pixel accumulator: runs the ray tracer for every pixel of an
oversampled grid and accumulates a complex, 4-correlation-plane aperture
illumination image.

The output image is addressed `[row, col, plane]` with planes 0..4 holding
RR, RL, LR, LL (circular basis) or XX, XY, YX, YY (linear basis). All four
planes are always allocated; a reduced polarization plan just writes fewer
of them.
 */

mod error;

pub use error::ApertureError;

use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2, TAU};

use marlu::Jones;
use ndarray::{parallel::prelude::*, prelude::*};

use num_complex::Complex64 as c64;

use crate::{
    catalog::{BandGeometry, DishProfile},
    optics::{trace_pol, Antenna, Pathology},
};

/// The polarization basis the two feed states are launched in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolBasis {
    /// Right/left circular feed states, compensated for the feed's
    /// orientation on the feed circle. The VLA family is described this
    /// way.
    Circular,
    /// Plain linear feed states.
    Linear,
}

/// One correlation product of the aperture image. The circular and linear
/// names address the same four planes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrProduct {
    RR,
    RL,
    LR,
    LL,
    XX,
    XY,
    YX,
    YY,
}

impl CorrProduct {
    /// The image plane this product lives in.
    pub fn plane(self) -> usize {
        match self {
            CorrProduct::RR | CorrProduct::XX => 0,
            CorrProduct::RL | CorrProduct::XY => 1,
            CorrProduct::LR | CorrProduct::YX => 2,
            CorrProduct::LL | CorrProduct::YY => 3,
        }
    }
}

/// Which feed states to propagate and which output planes to write. One
/// plan, one shared per-pixel routine; the reduced plans differ only in the
/// feed states and the planes written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolPlan {
    /// All four correlation planes.
    Full(PolBasis),
    /// A single correlation plane, with the arithmetic of the full plan.
    Single(PolBasis, CorrProduct),
    /// A single linear-basis plane computed directly, without the circular
    /// combination; the cross planes of this plan are identically zero.
    LinPol(CorrProduct),
}

/// Everything one aperture computation needs besides the antenna itself.
/// Lengths in metres, frequency in GHz, parallactic angle in radians.
#[derive(Debug, Clone, PartialEq)]
pub struct ApertureCalcParams {
    pub freq_ghz: f64,
    /// Parallactic angle the grid is rotated by.
    pub pa_rad: f64,
    /// Output grid size, columns.
    pub nx: usize,
    /// Output grid size, rows.
    pub ny: usize,
    /// Rays traced per output pixel axis; contributions bin down into the
    /// output pixel.
    pub oversamp: usize,
    /// Output pixel pitch.
    pub dx: f64,
    pub dy: f64,
    /// Grid centre offset.
    pub x0: f64,
    pub y0: f64,
    pub plan: PolPlan,
}

/// Why a pixel contributed nothing. Expected outcomes, not errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SkipReason {
    OutsideAnnulus,
    NoIntersection,
    Blocked,
}

/// The outcome of tracing one oversampled pixel.
enum PixelSample {
    Contribution(Jones<f64>),
    Skipped(#[allow(dead_code)] SkipReason),
}

/// Oversampled-grid quantities shared by every pixel of one computation.
struct Grid {
    os: usize,
    nx_os: usize,
    dx: f64,
    dy: f64,
    x0: f64,
    y0: f64,
    /// Cosine/sine of the parallactic rotation.
    pac: f64,
    pas: f64,
    /// Quarter-pixel offset for the Jacobian neighbour rays.
    eps: f64,
    rant: f64,
    r2: f64,
    h2: f64,
}

impl Grid {
    fn new(antenna: &Antenna, params: &ApertureCalcParams) -> Grid {
        let os = params.oversamp;
        let dx = params.dx / os as f64;
        let dy = params.dy / os as f64;
        let rant = antenna.radius();
        let rhole = antenna.hole_radius();
        Grid {
            os,
            nx_os: params.nx * os,
            dx,
            dy,
            x0: params.x0 - params.dx / 2.0 + dx / 2.0,
            y0: params.y0 - params.dy / 2.0 + dy / 2.0,
            pac: (params.pa_rad + FRAC_PI_2).cos(),
            pas: (params.pa_rad + FRAC_PI_2).sin(),
            eps: dx / 4.0,
            rant,
            r2: rant * rant,
            h2: rhole * rhole,
        }
    }
}

/// The two feed E fields a plan propagates, and how their traced
/// components combine into planes.
struct PlanVectors {
    e1: [c64; 3],
    e2: [c64; 3],
    linear_diagonal: bool,
}

impl PlanVectors {
    fn new(antenna: &Antenna, plan: PolPlan) -> PlanVectors {
        let iota = c64::new(0.0, 1.0);
        match plan {
            PolPlan::Full(basis) | PolPlan::Single(basis, _) => {
                let (p1, p2) = match basis {
                    PolBasis::Circular => {
                        let mut pr = [c64::new(FRAC_1_SQRT_2, 0.0), iota * FRAC_1_SQRT_2];
                        let mut pl = [c64::new(FRAC_1_SQRT_2, 0.0), -iota * FRAC_1_SQRT_2];

                        // Compensate for the feed's orientation.
                        let feed_basis = antenna.feed_basis();
                        let phase = feed_basis[0][1].atan2(feed_basis[0][0]);
                        let (sp, cp) = phase.sin_cos();
                        for p in [&mut pr, &mut pl] {
                            let q = *p;
                            p[0] = cp * q[0] + sp * q[1];
                            p[1] = -sp * q[0] + cp * q[1];
                        }
                        (pr, pl)
                    }
                    PolBasis::Linear => (
                        [c64::new(1.0, 0.0), c64::new(0.0, 0.0)],
                        [c64::new(0.0, 0.0), c64::new(1.0, 0.0)],
                    ),
                };
                PlanVectors {
                    e1: antenna.e_field(p1),
                    e2: antenna.e_field(p2),
                    linear_diagonal: false,
                }
            }
            PolPlan::LinPol(_) => {
                let px = [c64::new(0.0, 0.0), c64::new(1.0, 0.0)];
                let py = [c64::new(1.0, 0.0), c64::new(0.0, 0.0)];
                PlanVectors {
                    e1: antenna.e_field(px),
                    e2: antenna.e_field(py),
                    linear_diagonal: true,
                }
            }
        }
    }
}

/// Compute the aperture illumination image for one band geometry, dish
/// profile and pathology. Allocates the `(ny, nx, 4)` output.
pub fn calculate_aperture(
    geometry: &BandGeometry,
    profile: &DishProfile,
    pathology: &Pathology,
    params: &ApertureCalcParams,
) -> Result<Array3<c64>, ApertureError> {
    let mut aperture = Array3::zeros((params.ny, params.nx, 4));
    calculate_aperture_into(geometry, profile, pathology, params, &mut aperture)?;
    Ok(aperture)
}

/// As [`calculate_aperture`], but accumulating into a caller-supplied
/// buffer of shape `(ny, nx, 4)`. A `Full` or `Single` plan clears the
/// whole buffer first; a `LinPol` plan clears only its own plane, so
/// successive `LinPol` calls can fill one image plane by plane.
pub fn calculate_aperture_into(
    geometry: &BandGeometry,
    profile: &DishProfile,
    pathology: &Pathology,
    params: &ApertureCalcParams,
    aperture: &mut Array3<c64>,
) -> Result<(), ApertureError> {
    if params.oversamp == 0 {
        return Err(ApertureError::ZeroOversample);
    }
    if params.nx == 0 || params.ny == 0 {
        return Err(ApertureError::ZeroSizedGrid {
            nx: params.nx,
            ny: params.ny,
        });
    }
    let expected = (params.ny, params.nx, 4);
    if aperture.dim() != expected {
        return Err(ApertureError::BadBufferShape {
            expected,
            got: aperture.shape().to_vec(),
        });
    }

    let mut antenna = Antenna::new(geometry, profile.clone(), params.freq_ghz);
    let mut pathology = pathology.clone();
    antenna.apply_pathology(&mut pathology);

    // Reference path length of the boresight ray.
    let l0 = antenna
        .trace(0.0, 1e-5, &pathology)
        .ok_or(ApertureError::BoresightTraceFailed)?
        .path_length();

    let vectors = PlanVectors::new(&antenna, params.plan);
    let write_planes: [bool; 4] = match params.plan {
        PolPlan::Full(_) => [true; 4],
        PolPlan::Single(_, product) | PolPlan::LinPol(product) => {
            let mut mask = [false; 4];
            mask[product.plane()] = true;
            mask
        }
    };

    match params.plan {
        PolPlan::Full(_) | PolPlan::Single(..) => aperture.fill(c64::new(0.0, 0.0)),
        PolPlan::LinPol(product) => aperture
            .slice_mut(s![.., .., product.plane()])
            .fill(c64::new(0.0, 0.0)),
    }

    let grid = Grid::new(&antenna, params);

    // Each worker owns one output row and the `os` oversampled sub-rows
    // that bin into it, so no two workers ever write the same cell.
    aperture
        .axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each(|(j_out, mut row)| {
            for sub_j in 0..grid.os {
                let j = j_out * grid.os + sub_j;
                for i in 0..grid.nx_os {
                    match compute_pixel(&antenna, &pathology, &grid, l0, &vectors, i, j) {
                        PixelSample::Contribution(planes) => {
                            let i_out = i / grid.os;
                            for (plane, write) in write_planes.iter().enumerate() {
                                if *write {
                                    row[[i_out, plane]] += planes[plane];
                                }
                            }
                        }
                        PixelSample::Skipped(_) => (),
                    }
                }
            }
        });

    Ok(())
}

/// Trace one oversampled pixel: refine the dish footprint until the ray
/// lands on the pixel, test blockage, estimate the local solid-angle
/// Jacobian from two neighbour rays, and combine the propagated feed
/// states into the four correlation planes.
fn compute_pixel(
    antenna: &Antenna,
    pathology: &Pathology,
    grid: &Grid,
    l0: f64,
    vectors: &PlanVectors,
    i: usize,
    j: usize,
) -> PixelSample {
    const NITER: usize = 6;

    let gx = grid.x0 + i as f64 * grid.dx;
    let gy = grid.y0 + j as f64 * grid.dy;
    let mut x = grid.pac * gx - grid.pas * gy;
    let y = grid.pas * gx + grid.pac * gy;
    x = -x;

    if x.abs() > grid.rant || y.abs() > grid.rant {
        return PixelSample::Skipped(SkipReason::OutsideAnnulus);
    }
    let r2 = x * x + y * y;
    if r2 > grid.r2 || r2 < grid.h2 {
        return PixelSample::Skipped(SkipReason::OutsideAnnulus);
    }

    // Walk the dish footprint until the traced ray lands on this aperture
    // pixel.
    let mut x1 = x;
    let mut y1 = y;
    for _ in 0..NITER {
        let ray = match antenna.trace(x1, y1, pathology) {
            Some(ray) => ray,
            None => return PixelSample::Skipped(SkipReason::NoIntersection),
        };
        x1 += x - ray.aper.pos[0];
        y1 += y - ray.aper.pos[1];
    }

    let ray = match antenna.trace(x1, y1, pathology) {
        Some(ray) => ray,
        None => return PixelSample::Skipped(SkipReason::NoIntersection),
    };

    if antenna.leg_plane_wave_block(&ray) || antenna.leg_spherical_wave_block(&ray) {
        return PixelSample::Skipped(SkipReason::Blocked);
    }

    // Neighbour rays a quarter-pixel towards the optical axis.
    let ray_y = antenna.trace(
        x1,
        if y < 0.0 { y1 + grid.eps } else { y1 - grid.eps },
        pathology,
    );
    let ray_x = antenna.trace(
        if x < 0.0 { x1 + grid.eps } else { x1 - grid.eps },
        y1,
        pathology,
    );
    let (ray_x, ray_y) = match (ray_x, ray_y) {
        (Some(rx), Some(ry)) => (rx, ry),
        _ => return PixelSample::Skipped(SkipReason::NoIntersection),
    };

    // Solid angle subtended at the feed per unit aperture area.
    let dx1 = ray_x.aper.pos[0] - ray.aper.pos[0];
    let dy1 = ray_x.aper.pos[1] - ray.aper.pos[1];
    let dx2 = ray_y.aper.pos[0] - ray.aper.pos[0];
    let dy2 = ray_y.aper.pos[1] - ray.aper.pos[1];

    let da = 0.5 * (dx1 * dy2 - dx2 * dy1).abs();
    let d_omega = antenna.d_omega(&ray_x, &ray_y, &ray, pathology) / da * grid.dx * grid.dx;
    let dp = d_omega * antenna.feed_gain(&ray);
    let amp = dp.sqrt();

    // Phase retard the wave relative to the boresight ray.
    let phase = TAU * (ray.path_length() - l0) / antenna.lambda();
    let (sp, cp) = phase.sin_cos();
    let fp = c64::new(cp, sp);

    let e1 = trace_pol(&vectors.e1, &ray);
    let e2 = trace_pol(&vectors.e2, &ray);

    let planes = if vectors.linear_diagonal {
        let xx = fp * amp * e1[0];
        let yy = fp * amp * e2[1];
        Jones::from([xx, c64::new(0.0, 0.0), c64::new(0.0, 0.0), yy])
    } else {
        let iota = c64::new(0.0, 1.0);
        let ex1 = fp * amp * e1[0];
        let ey1 = fp * amp * e1[1];
        let ex2 = fp * amp * e2[0];
        let ey2 = fp * amp * e2[1];
        Jones::from([
            ex1 - iota * ey1,
            ex1 + iota * ey1,
            ex2 - iota * ey2,
            ex2 + iota * ey2,
        ])
    };
    PixelSample::Contribution(planes)
}
