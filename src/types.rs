// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Generic types: small fixed-size vector helpers used by the ray tracer.

/// A 3-vector. All the geometry here is short, hot, fixed-size arithmetic;
/// plain arrays keep it allocation-free and `Copy`.
pub(crate) type Vec3 = [f64; 3];

#[inline]
pub(crate) fn dot(a: Vec3, b: Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub(crate) fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
pub(crate) fn magnitude(v: Vec3) -> f64 {
    dot(v, v).sqrt()
}

#[inline]
pub(crate) fn normalized(v: Vec3) -> Vec3 {
    let r = magnitude(v);
    [v[0] / r, v[1] / r, v[2] / r]
}

/// The unit vector pointing from `b` to `a`.
#[inline]
pub(crate) fn unit_towards(a: Vec3, b: Vec3) -> Vec3 {
    normalized([a[0] - b[0], a[1] - b[1], a[2] - b[2]])
}

#[inline]
pub(crate) fn distance(a: Vec3, b: Vec3) -> f64 {
    magnitude([a[0] - b[0], a[1] - b[1], a[2] - b[2]])
}
