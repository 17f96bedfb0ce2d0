// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
The geometric-optics model of a Cassegrain antenna: dish surface
interpolation, subreflector mapping, ray tracing, polarization propagation
and strut blockage.

Everything here is value types and `&self` methods; an [`Antenna`] is built
once per aperture computation and only ever read afterwards, so traced rays
can fan out over threads freely.
 */

#[cfg(test)]
mod tests;

use log::warn;
use marlu::constants::VEL_C;
use num_complex::Complex64 as c64;

use crate::{
    catalog::{BandGeometry, DishProfile},
    constants::*,
    types::*,
};

use std::f64::consts::{SQRT_2, TAU};

/// A position on a reflecting surface together with its unit normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePoint {
    pub pos: [f64; 3],
    pub normal: [f64; 3],
}

/// One traced ray: the feed launch point and the three surface points it
/// visits. Created fresh per traced ray and never mutated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub feed: [f64; 3],
    pub sub: SurfacePoint,
    pub dish: SurfacePoint,
    pub aper: SurfacePoint,
}

impl Ray {
    /// The optical path length: feed → subreflector → dish → aperture.
    pub fn path_length(&self) -> f64 {
        distance(self.feed, self.sub.pos)
            + distance(self.sub.pos, self.dish.pos)
            + distance(self.dish.pos, self.aper.pos)
    }
}

/// An as-built mechanical error model: rotations and shifts of the
/// subreflector and the feed. The default is the identity (a perfectly
/// built antenna); mutate fields before a calculation, never during one.
#[derive(Debug, Clone, PartialEq)]
pub struct Pathology {
    pub feed_rot: [[f64; 3]; 3],
    pub sub_rot: [[f64; 3]; 3],
    /// The point the subreflector rotation is taken about, relative to the
    /// subreflector vertex.
    pub sub_rot_point: [f64; 3],
    pub sub_shift: [f64; 3],
    pub feed_shift: [f64; 3],
    pub az_offset: f64,
    pub el_offset: f64,
    pub phase_offset: f64,
    /// Axial defocus; folded into `feed_shift` when the pathology is
    /// applied to an antenna.
    pub focus: f64,
}

impl Default for Pathology {
    fn default() -> Pathology {
        const IDENTITY: [[f64; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
        Pathology {
            feed_rot: IDENTITY,
            sub_rot: IDENTITY,
            sub_rot_point: [0.0; 3],
            sub_shift: [0.0; 3],
            feed_shift: [0.0; 3],
            az_offset: 0.0,
            el_offset: 0.0,
            phase_offset: 0.0,
            focus: 0.0,
        }
    }
}

fn mat_vec(m: [[f64; 3]; 3], v: [f64; 3]) -> [f64; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

impl Pathology {
    /// Rotate a subreflector point about `sub_rot_point` and shift it.
    /// Only the y and z components of the normal pick up the rotation; the
    /// trace inspects the normal's z component.
    pub(crate) fn transform_sub(&self, point: SurfacePoint) -> SurfacePoint {
        let p = [
            point.pos[0] - self.sub_rot_point[0],
            point.pos[1] - self.sub_rot_point[1],
            point.pos[2] - self.sub_rot_point[2],
        ];
        let rp = mat_vec(self.sub_rot, p);
        let rn = mat_vec(self.sub_rot, point.normal);
        SurfacePoint {
            pos: [
                rp[0] + self.sub_rot_point[0] + self.sub_shift[0],
                rp[1] + self.sub_rot_point[1] + self.sub_shift[1],
                rp[2] + self.sub_rot_point[2] + self.sub_shift[2],
            ],
            normal: [point.normal[0], rn[1], rn[2]],
        }
    }
}

/// Which angular strut layout shadows the dish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StrutPattern {
    Plus,
    Cross,
    Vlba,
}

/// A per-computation antenna: a [`BandGeometry`] record plus the
/// frequency-dependent derived quantities. Owned exclusively by one
/// aperture computation.
#[derive(Debug, Clone)]
pub struct Antenna {
    name: String,
    profile: DishProfile,
    z_edge: f64,
    /// Seeds the dish-intersection root find with an ideal paraboloid of
    /// the same rim height.
    best_parabola: f64,
    sub_h: f64,
    feed: [f64; 3],
    feed_dir: [f64; 3],
    /// Feed boresight after a pathology's feed rotation.
    p_feed_dir: [f64; 3],
    /// Constant total path length of the axial ray, feed → subreflector →
    /// dish vertex.
    k_path: f64,
    freq_ghz: f64,
    lambda: f64,
    taper: f64,
    fa2pi: f64,
    leg_width: f64,
    leg_foot: f64,
    leg_foot_z: f64,
    leg_apex: f64,
    hole_radius: f64,
    astigm_0: f64,
    astigm_45: f64,
    strut_pattern: StrutPattern,
}

impl Antenna {
    /// Derive an antenna from a band geometry and a dish surface profile at
    /// the given frequency. A non-positive frequency falls back to the
    /// band's reference frequency.
    pub fn new(geometry: &BandGeometry, profile: DishProfile, freq_ghz: f64) -> Antenna {
        let freq = if freq_ghz > 0.0 {
            freq_ghz
        } else {
            geometry.ref_freq_ghz
        };
        let taper = geometry.taper_at(freq);

        // The table's feed x coordinate is left-handed.
        let feed = [-geometry.feed_pos[0], geometry.feed_pos[1], geometry.feed_pos[2]];
        let z = geometry.sub_h - feed[2];
        let d = (feed[0] * feed[0] + feed[1] * feed[1] + z * z).sqrt();
        let k_path = if z > 0.0 {
            geometry.sub_h + d
        } else {
            magnitude(feed)
        };
        let feed_dir = [-feed[0] / d, -feed[1] / d, z / d];

        let lambda = VEL_C * 1e-9 / freq;
        let fa2pi = TAU * taper.abs().sqrt() * FEED_TAPER_ANGLE
            / geometry.sub_angle_deg.to_radians().sin();

        let strut_pattern = if geometry.name == "VLBA" {
            StrutPattern::Vlba
        } else if geometry.leg_width < 0.0 {
            StrutPattern::Cross
        } else {
            StrutPattern::Plus
        };

        let z_edge = profile.z_edge();
        let best_parabola = z_edge / (profile.radius() * profile.radius());

        let mut antenna = Antenna {
            name: geometry.name.clone(),
            profile,
            z_edge,
            best_parabola,
            sub_h: geometry.sub_h,
            feed,
            feed_dir,
            p_feed_dir: feed_dir,
            k_path,
            freq_ghz: freq,
            lambda,
            taper: taper.abs(),
            fa2pi,
            leg_width: geometry.leg_width,
            leg_foot: geometry.leg_foot,
            leg_foot_z: 0.0,
            leg_apex: geometry.leg_apex,
            hole_radius: geometry.hole_radius,
            astigm_0: geometry.astigm_0,
            astigm_45: geometry.astigm_45,
            strut_pattern,
        };
        antenna.leg_foot_z = antenna.dish_value(antenna.leg_foot).0;
        antenna
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn freq_ghz(&self) -> f64 {
        self.freq_ghz
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    pub fn radius(&self) -> f64 {
        self.profile.radius()
    }

    pub fn hole_radius(&self) -> f64 {
        self.hole_radius
    }

    pub fn z_edge(&self) -> f64 {
        self.z_edge
    }

    pub fn taper(&self) -> f64 {
        self.taper
    }

    /// Fold a pathology into this antenna: axial defocus becomes a feed
    /// shift, and the feed boresight picks up the feed rotation. Call once
    /// before tracing with a non-identity pathology.
    pub fn apply_pathology(&mut self, pathology: &mut Pathology) {
        if pathology.focus != 0.0 {
            let dx = normalized([-self.feed[0], -self.feed[1], self.sub_h - self.feed[2]]);
            for i in 0..3 {
                pathology.feed_shift[i] += pathology.focus * dx[i];
            }
            pathology.focus = 0.0;
        }
        self.p_feed_dir = mat_vec(pathology.feed_rot, self.feed_dir);
    }

    /// Point the feed boresight at the pathology-displaced subreflector
    /// vertex.
    pub fn align_feed(&mut self, pathology: &Pathology) {
        let f = [
            self.feed[0] + pathology.feed_shift[0],
            self.feed[1] + pathology.feed_shift[1],
            self.feed[2] + pathology.feed_shift[2],
        ];
        let mut s0 = [
            -pathology.sub_rot_point[0],
            -pathology.sub_rot_point[1],
            -pathology.sub_rot_point[2],
        ];
        s0[2] += self.sub_h;
        let r = mat_vec(pathology.sub_rot, s0);
        let s = [
            r[0] + pathology.sub_rot_point[0] + pathology.sub_shift[0],
            r[1] + pathology.sub_rot_point[1] + pathology.sub_shift[1],
            r[2] + pathology.sub_rot_point[2] + pathology.sub_shift[2],
        ];
        self.feed_dir = unit_towards(s, f);
    }

    /// Sagitta and slope of the dish at a (signed) radius, by a
    /// piecewise-quadratic fit of the slope through the three neighbouring
    /// profile samples.
    pub fn dish_value(&self, r: f64) -> (f64, f64) {
        let zs = self.profile.z_samples();
        let ms = self.profile.m_samples();

        if r == 0.0 {
            return (zs[0], 0.0);
        }
        let (s, r) = if r < 0.0 { (-1.0, -r) } else { (1.0, r) };
        let d = self.profile.delta_r();
        let dd = d * d;

        let n = ((r / d + 0.5).floor() as usize).min(zs.len() - 2);
        let x = r - n as f64 * d;

        let (ma, mb, mc, zav) = if n == 0 {
            (-ms[1], 0.0, ms[1], 2.0 * zs[1] + zs[0])
        } else {
            (ms[n - 1], ms[n], ms[n + 1], zs[n - 1] + zs[n] + zs[n + 1])
        };

        let ca = mb;
        let cb = 0.5 * (mc - ma) / d;
        let cc = 0.5 * (mc - 2.0 * mb + ma) / dd;
        let cd = (zav - cb * dd) / 3.0;

        let m = s * (ca + cb * x + cc * x * x);
        let z = s * (cd + ca * x + cb * x * x / 2.0 + cc * x * x * x / 3.0);
        (z, m)
    }

    /// As [`Antenna::dish_value`], but with the sagitta and slope perturbed
    /// by the Zernike Z5/Z6 astigmatism terms. Identical to `dish_value`
    /// when both astigmatism coefficients are zero.
    pub fn astig_dish_value(&self, x: f64, y: f64) -> (f64, f64) {
        let rr = x * x + y * y;
        let r = rr.sqrt();

        if r == 0.0 || (self.astigm_0 == 0.0 && self.astigm_45 == 0.0) {
            return self.dish_value(r);
        }

        let theta = y.atan2(x);
        let sin2th = (2.0 * theta).sin();
        let cos2th = (2.0 * theta).cos();
        let rho = r / self.profile.radius();
        let rho2 = rho * rho;

        let z5 = 6.0_f64.sqrt() * rho2 * sin2th;
        let z6 = 6.0_f64.sqrt() * rho2 * cos2th;

        let astigm = 1.0 + self.astigm_45 * z5 + self.astigm_0 * z6;
        let dastigm =
            2.0 * rho2 / r * 6.0_f64.sqrt() * (self.astigm_45 * sin2th + self.astigm_0 * cos2th);

        let zs = self.profile.z_samples();
        let ms = self.profile.m_samples();
        let d = self.profile.delta_r();
        let dd = d * d;

        let n = ((r / d + 0.5).floor() as usize).min(zs.len() - 2);
        let xp = r - n as f64 * d;

        let (ma, mb, mc, zav) = if n == 0 {
            (-ms[1], 0.0, ms[1], 2.0 * zs[1] + zs[0])
        } else {
            (ms[n - 1], ms[n], ms[n + 1], zs[n - 1] + zs[n] + zs[n + 1])
        };

        let ca = mb;
        let cb = 0.5 * (mc - ma) / d;
        let cc = 0.5 * (mc - 2.0 * mb + ma) / dd;
        let cd = (zav - cb * dd) / 3.0;

        let zn = cd + ca * xp + cb * xp * xp / 2.0 + cc * xp * xp * xp / 3.0;
        let z = zn * astigm;
        let m = (ca + cb * xp + cc * xp * xp) * astigm + dastigm * zn;
        (z, m)
    }

    /// The subreflector point illuminating the dish at `(x, y)`, from the
    /// law of reflection: the reflected dish ray and the feed ray must meet
    /// on a surface of constant total path length. The normal is the
    /// bisector of the unit vectors towards the dish point and the feed.
    pub fn sub_from_dish(&self, x: f64, y: f64) -> SurfacePoint {
        let r = (x * x + y * y).sqrt();

        let (z, pos) = if r == 0.0 {
            (self.dish_value(0.0).0, [0.0, 0.0, self.sub_h])
        } else {
            let (z, m) = self.astig_dish_value(x, y);

            // Direction of the ray reflected off the dish.
            let m = (2.0 * m.atan()).tan();
            let w = 1.0 / (1.0 + m * m).sqrt();
            let u = -m * (x / r) * w;
            let v = -m * (y / r) * w;

            let dx = self.feed[0] - x;
            let dy = self.feed[1] - y;
            let dz = self.feed[2] - z;
            let dl = self.k_path + z;

            let t = 0.5 * (dx * dx + dy * dy + dz * dz - dl * dl)
                / (-dl + u * dx + v * dy + w * dz);
            (z, [x + u * t, y + v * t, z + w * t])
        };

        let sf = unit_towards(self.feed, pos);
        let sd = unit_towards([x, y, z], pos);
        let normal = normalized([sd[0] + sf[0], sd[1] + sf[1], sd[2] + sf[2]]);
        SurfacePoint { pos, normal }
    }

    /// The inverse of [`Antenna::sub_from_dish`]: the dish footprint point
    /// whose subreflector point is `(x, y)`, by damped finite-difference
    /// Newton steps. Returns `None` on divergence; callers must fall back,
    /// never continue with a stale approximation.
    pub fn dish_from_sub(&self, x: f64, y: f64) -> Option<[f64; 2]> {
        const EPS: f64 = 0.001;
        const MAX_ITER: usize = 500;

        let radius = self.profile.radius();
        let mut x1 = x;
        let mut y1 = y;
        let mut converged = false;

        for _ in 0..MAX_ITER {
            let sub0 = self.sub_from_dish(x1, y1);
            let sub_xm = self.sub_from_dish(x1 - EPS, y1);
            let sub_xp = self.sub_from_dish(x1 + EPS, y1);
            let sub_ym = self.sub_from_dish(x1, y1 - EPS);
            let sub_yp = self.sub_from_dish(x1, y1 + EPS);

            let mx = 0.5 * (sub_xp.pos[0] - sub_xm.pos[0]) / EPS;
            let my = 0.5 * (sub_yp.pos[1] - sub_ym.pos[1]) / EPS;
            let mut dx = (x - sub0.pos[0]) / mx;
            let mut dy = (y - sub0.pos[1]) / my;

            let clamp = radius / 7.0;
            if dx.abs() > clamp {
                dx = clamp.copysign(dx);
            }
            if dy.abs() > clamp {
                dy = clamp.copysign(dy);
            }

            let r = (x1 * x1 + y1 * y1).sqrt();
            if r >= radius && x1 * dx + y1 * dy > 0.0 {
                warn!("dish_from_sub({x}, {y}) left the dish while diverging");
                return None;
            }
            x1 += 0.5 * dx;
            y1 += 0.5 * dy;
            if dx.abs() < 0.005 * EPS && dy.abs() < 0.005 * EPS {
                converged = true;
                break;
            }
        }
        if !converged {
            warn!("dish_from_sub({x}, {y}) did not converge after {MAX_ITER} iterations");
            return None;
        }

        if (x1 * x1 + y1 * y1).sqrt() > radius {
            warn!("dish_from_sub({x}, {y}) converged outside the dish");
            return None;
        }
        Some([x1, y1])
    }

    /// Intersect a ray leaving the subreflector with the real dish surface:
    /// a closed-form hit on the best-fit paraboloid, then `niter` Newton
    /// refinements against the interpolated surface.
    fn intersect_dish(&self, sub: [f64; 3], unitdir: [f64; 3], niter: usize) -> SurfacePoint {
        let qa = self.best_parabola * (unitdir[0] * unitdir[0] + unitdir[1] * unitdir[1]);
        let qb = 2.0 * self.best_parabola * (unitdir[0] * sub[0] + unitdir[1] * sub[1]) - unitdir[2];
        let qc = self.best_parabola * (sub[0] * sub[0] + sub[1] * sub[1]) - sub[2];
        // Greater root.
        let mut t = 0.5 * ((qb * qb - 4.0 * qa * qc).sqrt() - qb) / qa;

        let mut x = [0.0; 3];
        let mut n = [0.0; 3];
        for iter in 0.. {
            x[0] = sub[0] + t * unitdir[0];
            x[1] = sub[1] + t * unitdir[1];
            let r = (x[0] * x[0] + x[1] * x[1]).sqrt();
            let (z, m) = self.astig_dish_value(x[0], x[1]);
            x[2] = z;
            n[2] = 1.0 / (1.0 + m * m).sqrt();
            if r == 0.0 {
                n[0] = 0.0;
                n[1] = 0.0;
            } else {
                n[0] = -m * (x[0] / r) * n[2];
                n[1] = -m * (x[1] / r) * n[2];
            }

            if iter >= niter {
                break;
            }

            let a = n[0] * (x[0] - sub[0]) + n[1] * (x[1] - sub[1]) + n[2] * (x[2] - sub[2]);
            let b = dot(n, unitdir);
            t = a / b;
        }

        SurfacePoint { pos: x, normal: n }
    }

    /// Project a ray leaving the dish onto the flat aperture plane at the
    /// rim height.
    fn intersect_aperture(&self, dish: [f64; 3], unitdir: [f64; 3]) -> SurfacePoint {
        let t = (self.z_edge - dish[2]) / unitdir[2];
        SurfacePoint {
            pos: [
                dish[0] + t * unitdir[0],
                dish[1] + t * unitdir[1],
                dish[2] + t * unitdir[2],
            ],
            normal: [0.0, 0.0, 1.0],
        }
    }

    /// Trace the ray that illuminates the dish at `(x, y)`: feed →
    /// subreflector → dish → aperture plane. `None` when any stage fails to
    /// resolve a finite point with a physical subreflector normal.
    pub fn trace(&self, x: f64, y: f64, pathology: &Pathology) -> Option<Ray> {
        const NITER: usize = 7;

        let ideal = self.sub_from_dish(x, y);
        let sub = pathology.transform_sub(ideal);

        if sub.normal[2] < -1.0 || sub.normal[2] > 0.0 {
            return None;
        }

        let feed = [
            self.feed[0] + pathology.feed_shift[0],
            self.feed[1] + pathology.feed_shift[1],
            self.feed[2] + pathology.feed_shift[2],
        ];

        // Unit towards the feed, reflected into the unit towards the dish.
        let fu = unit_towards(feed, sub.pos);
        let ndotf = dot(sub.normal, fu);
        let du = [
            2.0 * sub.normal[0] * ndotf - fu[0],
            2.0 * sub.normal[1] * ndotf - fu[1],
            2.0 * sub.normal[2] * ndotf - fu[2],
        ];

        let dish = self.intersect_dish(sub.pos, du, NITER);
        if !dish.pos.iter().chain(dish.normal.iter()).all(|v| v.is_finite()) {
            return None;
        }

        let ndotd = dot(dish.normal, du);
        let au = [
            du[0] - 2.0 * dish.normal[0] * ndotd,
            du[1] - 2.0 * dish.normal[1] * ndotd,
            du[2] - 2.0 * dish.normal[2] * ndotd,
        ];

        let aper = self.intersect_aperture(dish.pos, au);
        if !aper.pos.iter().all(|v| v.is_finite()) {
            return None;
        }

        Some(Ray {
            feed,
            sub,
            dish,
            aper,
        })
    }

    /// Feed power gain as a pure function of the angle off boresight.
    pub fn feed_func(&self, theta: f64) -> f64 {
        let stheta = theta.sin();
        (2.0 * FEED_TAPER_EXP * self.fa2pi * self.fa2pi * stheta * stheta).exp()
    }

    /// Feed power gain towards a traced ray's subreflector point, with the
    /// boresight taken after any feed-rotation pathology.
    pub fn feed_gain(&self, ray: &Ray) -> f64 {
        let v = unit_towards(ray.sub.pos, ray.feed);
        let costheta = dot(self.p_feed_dir, v);
        (2.0 * FEED_TAPER_EXP * self.fa2pi * self.fa2pi * (1.0 - costheta * costheta)).exp()
    }

    /// The solid angle subtended at the feed by the spherical triangle of
    /// three neighbouring rays' subreflector points.
    pub fn d_omega(&self, ray1: &Ray, ray2: &Ray, ray3: &Ray, pathology: &Pathology) -> f64 {
        let f = [
            self.feed[0] + pathology.feed_shift[0],
            self.feed[1] + pathology.feed_shift[1],
            self.feed[2] + pathology.feed_shift[2],
        ];
        let n3 = unit_towards(ray3.sub.pos, f);
        let n1 = unit_towards(ray1.sub.pos, f);
        let n2 = unit_towards(ray2.sub.pos, f);

        let n1 = [n1[0] - n3[0], n1[1] - n3[1], n1[2] - n3[2]];
        let n2 = [n2[0] - n3[0], n2[1] - n3[1], n2[2] - n3[2]];

        0.5 * magnitude(cross(n1, n2))
    }

    /// The basis `[hhat, vhat, boresight]` the feed's polarization states
    /// are defined in.
    pub(crate) fn feed_basis(&self) -> [[f64; 3]; 3] {
        let dir = self.p_feed_dir;
        if dir[0] == 0.0 && dir[1] == 0.0 {
            [[0.0, 1.0, 0.0], [1.0, 0.0, 0.0], dir]
        } else {
            let vhat = normalized([dir[1], -dir[0], 0.0]);
            let hhat = cross(vhat, dir);
            [hhat, vhat, dir]
        }
    }

    /// The 3-vector E field the feed launches for a 2-component
    /// polarization state.
    pub(crate) fn e_field(&self, pol: [c64; 2]) -> [c64; 3] {
        let basis = self.feed_basis();
        let hhat = basis[0];
        let vhat = basis[1];
        std::array::from_fn(|i| c64::new(hhat[i], 0.0) * pol[0] + c64::new(vhat[i], 0.0) * pol[1])
    }

    fn strut_azimuths(&self) -> &'static [f64; 4] {
        match self.strut_pattern {
            StrutPattern::Plus => &STRUT_AZIMUTHS_PLUS,
            StrutPattern::Cross => &STRUT_AZIMUTHS_CROSS,
            StrutPattern::Vlba => &STRUT_AZIMUTHS_VLBA,
        }
    }

    /// Does the line from `dish_pos` towards `target` pass within half a
    /// strut width of one of the strut line segments?
    fn strut_shadow(&self, dish_pos: [f64; 3], target: [f64; 3]) -> bool {
        let r0 = dish_pos;
        let dr = [target[0] - r0[0], target[1] - r0[1], target[2] - r0[2]];
        let rr = r0[0] * r0[0] + r0[1] * r0[1];

        let l1 = [0.0, 0.0, self.leg_apex];
        for &theta in self.strut_azimuths() {
            let l0 = [
                self.leg_foot * theta.cos(),
                self.leg_foot * theta.sin(),
                self.leg_foot_z,
            ];
            let ll = l0[0] * l0[0] + l0[1] * l0[1];
            if (l0[0] * r0[0] + l0[1] * r0[1]) / (ll * rr).sqrt() < STRUT_AZIMUTH_CUT {
                continue;
            }
            let dl = [l1[0] - l0[0], l1[1] - l0[1], l1[2] - l0[2]];
            let d = [r0[0] - l0[0], r0[1] - l0[1], r0[2] - l0[2]];

            let n = normalized(cross(dr, dl));
            let d2 = dot(d, n);
            if d2.abs() <= 0.5 * self.leg_width.abs() {
                return true;
            }
        }
        false
    }

    /// Plane-wave strut blockage of an aperture-plane footprint point;
    /// only applies within the leg-foot radius.
    pub fn leg_plane_wave_block_xy(&self, x: f64, y: f64) -> bool {
        // Outside the leg-foot area the blockage is spherical-wave.
        if x * x + y * y > self.leg_foot * self.leg_foot {
            return false;
        }
        if self.leg_width == 0.0 {
            return false;
        }

        match self.strut_pattern {
            StrutPattern::Vlba => {
                let s = VLBA_FOOTPRINT_SIN;
                let c = VLBA_FOOTPRINT_COS;
                (s * x + c * y).abs() < -self.leg_width || (s * x - c * y).abs() < -self.leg_width
            }
            StrutPattern::Cross => {
                (x - y).abs() * SQRT_2 < -self.leg_width
                    || (x + y).abs() * SQRT_2 < -self.leg_width
            }
            StrutPattern::Plus => x.abs() * 2.0 < self.leg_width || y.abs() * 2.0 < self.leg_width,
        }
    }

    /// Plane-wave strut blockage of a traced ray: inside the leg-foot
    /// radius, the shadow is cast along the dish → aperture direction.
    pub fn leg_plane_wave_block(&self, ray: &Ray) -> bool {
        if self.leg_width == 0.0 {
            return false;
        }
        let dr2 = ray.dish.pos[0] * ray.dish.pos[0] + ray.dish.pos[1] * ray.dish.pos[1];
        if dr2 >= self.leg_foot * self.leg_foot {
            return false;
        }
        self.strut_shadow(ray.dish.pos, ray.aper.pos)
    }

    /// Spherical-wave strut blockage of a traced ray: outside the leg-foot
    /// radius, the shadow is cast along the dish → subreflector direction.
    pub fn leg_spherical_wave_block(&self, ray: &Ray) -> bool {
        if self.leg_width == 0.0 {
            return false;
        }
        let dr2 = ray.dish.pos[0] * ray.dish.pos[0] + ray.dish.pos[1] * ray.dish.pos[1];
        if dr2 < self.leg_foot * self.leg_foot {
            return false;
        }
        self.strut_shadow(ray.dish.pos, ray.sub.pos)
    }
}

/// Propagate a feed E field through a traced ray's two specular
/// reflections: `E' = 2(r·E)r − E` at the subreflector, then again at the
/// dish.
pub fn trace_pol(e0: &[c64; 3], ray: &Ray) -> [c64; 3] {
    let v1 = unit_towards(ray.sub.pos, ray.feed);
    let v2 = unit_towards(ray.dish.pos, ray.sub.pos);
    let v3 = unit_towards(ray.aper.pos, ray.dish.pos);

    let mut e = *e0;
    for (a, b) in [(v1, v2), (v2, v3)] {
        let r = normalized([a[0] - b[0], a[1] - b[1], a[2] - b[2]]);
        let fac = c64::new(r[0], 0.0) * e[0] + c64::new(r[1], 0.0) * e[1] + c64::new(r[2], 0.0) * e[2];
        for i in 0..3 {
            e[i] = c64::new(r[i], 0.0) * fac * 2.0 - e[i];
        }
    }
    e
}
