// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Per-band antenna geometry records and the catalogs that resolve them.

A [`GeometryCatalog`] is an explicit, immutable object constructed by the
caller and handed to a calculation; concurrent calculations with different
catalogs are safe. Catalogs come from a whitespace-delimited ray-geometry
table (one row per band) or from compiled-in defaults for a fixed set of
known observatories.
 */

mod defaults;
mod error;
#[cfg(test)]
mod tests;

pub use error::CatalogError;

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
};

use log::info;

use crate::aperture::PolBasis;
use crate::constants::MAX_GEOM_SAMPLES;

/// The number of whitespace-delimited columns in a ray-geometry table row:
/// NAME MINFREQ MAXFREQ SUB_H FEEDPOS(3) SUBANGLE LEGWIDTH LEGFOOT LEGAPEX
/// RHOLE RANT REFFREQ TAPERPOLY(5) NTAPERPOLY ASTIGM_0 ASTIGM_45.
const RAY_TABLE_COLUMNS: usize = 22;

/// The ray-tracing geometry of one antenna type in one receiver band.
/// Immutable after load. Lengths in metres, frequencies in GHz, angles in
/// degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct BandGeometry {
    /// Band name, e.g. "EVLA_L". Antennas named "VLBA" get the VLBA strut
    /// layout.
    pub name: String,
    pub min_freq_ghz: f64,
    pub max_freq_ghz: f64,
    /// Subreflector vertex height above the dish vertex.
    pub sub_h: f64,
    /// Feed position. The x coordinate is mirrored when an antenna is
    /// constructed; the table convention is left-handed.
    pub feed_pos: [f64; 3],
    /// Half-angle subtended by the subreflector as seen from the feed
    /// \[degrees\].
    pub sub_angle_deg: f64,
    /// Strut width. Positive for "+"-shaped strut layouts, negative for
    /// "×"-shaped ones, zero for no strut shadowing at all.
    pub leg_width: f64,
    /// Distance of a strut foot from the optical axis.
    pub leg_foot: f64,
    /// Height at which the struts meet.
    pub leg_apex: f64,
    /// Radius of the central hole in the dish.
    pub hole_radius: f64,
    /// Radius of the dish.
    pub antenna_radius: f64,
    /// Frequency the taper polynomial is expanded about \[GHz\].
    pub ref_freq_ghz: f64,
    /// Feed edge-taper polynomial coefficients, low order first.
    pub taper_poly: [f64; 5],
    /// Number of meaningful terms in `taper_poly`.
    pub n_taper_poly: usize,
    /// Coefficient of the Zernike Z6 (0°/90°) astigmatism term.
    pub astigm_0: f64,
    /// Coefficient of the Zernike Z5 (45°/135°) astigmatism term.
    pub astigm_45: f64,
}

impl BandGeometry {
    /// Evaluate the feed taper polynomial at the given frequency.
    pub fn taper_at(&self, freq_ghz: f64) -> f64 {
        let df = freq_ghz - self.ref_freq_ghz;
        let mut x = 1.0;
        let mut taper = 0.0;
        for coeff in self.taper_poly.iter().take(self.n_taper_poly) {
            taper += coeff * x;
            x *= df;
        }
        taper
    }
}

/// A dish surface profile: sagitta and slope sampled on a uniform radius
/// grid from the vertex to the rim. At least 3 samples are required at
/// construction; nothing later has to cope with a degenerate table.
#[derive(Debug, Clone, PartialEq)]
pub struct DishProfile {
    /// Sagitta samples \[metres\].
    z: Vec<f64>,
    /// Surface slope dz/dr samples.
    m: Vec<f64>,
    /// Dish radius; the radius of the last sample.
    radius: f64,
    /// Radius step between samples.
    delta_r: f64,
}

impl DishProfile {
    /// Read a profile from 3-column (`r z m`) whitespace-delimited text.
    /// Lines starting with `#` and blank lines are skipped.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<DishProfile, CatalogError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| CatalogError::Io {
            path: path.display().to_string(),
            err,
        })?;
        Self::from_reader(BufReader::new(file), &path.display().to_string())
    }

    /// Read a profile from anything buffered; `label` is only used in error
    /// messages.
    pub fn from_reader<R: BufRead>(reader: R, label: &str) -> Result<DishProfile, CatalogError> {
        let mut z = Vec::new();
        let mut m = Vec::new();
        let mut radius = 0.0;
        for (i, line) in reader.lines().enumerate() {
            let line = line.map_err(|err| CatalogError::Io {
                path: label.to_string(),
                err,
            })?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != 3 {
                return Err(CatalogError::BadProfileRow {
                    line_num: i + 1,
                    got: fields.len(),
                });
            }
            let mut row = [0.0; 3];
            for (value, text) in row.iter_mut().zip(fields.iter()) {
                *value = text.parse().map_err(|_| CatalogError::BadProfileField {
                    line_num: i + 1,
                    text: text.to_string(),
                })?;
            }
            if z.len() == MAX_GEOM_SAMPLES {
                return Err(CatalogError::TooManySamples {
                    path: label.to_string(),
                    max: MAX_GEOM_SAMPLES,
                });
            }
            radius = row[0];
            z.push(row[1]);
            m.push(row[2]);
        }
        if z.len() < 3 {
            return Err(CatalogError::TruncatedProfile {
                path: label.to_string(),
                got: z.len(),
            });
        }
        let delta_r = radius / (z.len() - 1) as f64;
        Ok(DishProfile {
            z,
            m,
            radius,
            delta_r,
        })
    }

    /// Synthesise the profile of an ideal paraboloid `z = r²/4F` with `n`
    /// samples. Useful when no as-measured surface table is available.
    pub fn paraboloid(radius: f64, focal_length: f64, n: usize) -> Result<DishProfile, CatalogError> {
        if !(radius > 0.0) || !(focal_length > 0.0) {
            return Err(CatalogError::BadParaboloid);
        }
        if n < 3 {
            return Err(CatalogError::TruncatedProfile {
                path: "paraboloid".to_string(),
                got: n,
            });
        }
        if n > MAX_GEOM_SAMPLES {
            return Err(CatalogError::TooManySamples {
                path: "paraboloid".to_string(),
                max: MAX_GEOM_SAMPLES,
            });
        }
        let delta_r = radius / (n - 1) as f64;
        let mut z = Vec::with_capacity(n);
        let mut m = Vec::with_capacity(n);
        for i in 0..n {
            let r = delta_r * i as f64;
            z.push(r * r / (4.0 * focal_length));
            m.push(r / (2.0 * focal_length));
        }
        Ok(DishProfile {
            z,
            m,
            radius,
            delta_r,
        })
    }

    pub fn num_samples(&self) -> usize {
        self.z.len()
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Sagitta of the last sample; the height of the aperture plane.
    pub fn z_edge(&self) -> f64 {
        *self.z.last().expect("at least 3 samples by construction")
    }

    pub(crate) fn delta_r(&self) -> f64 {
        self.delta_r
    }

    pub(crate) fn z_samples(&self) -> &[f64] {
        &self.z
    }

    pub(crate) fn m_samples(&self) -> &[f64] {
        &self.m
    }
}

/// An immutable set of [`BandGeometry`] records for one (observatory,
/// antenna type) combination, with band lookup by frequency.
#[derive(Debug, Clone)]
pub struct GeometryCatalog {
    observatory: String,
    antenna_type: String,
    bands: Vec<BandGeometry>,
    /// Directory holding `<band name>.surface` profiles, when the catalog
    /// was read from a table on disk.
    profile_dir: Option<PathBuf>,
    /// Focal length for synthesised profiles, when the catalog is a
    /// compiled-in one.
    focal_length: Option<f64>,
}

impl GeometryCatalog {
    /// Resolve a catalog for the given observatory and antenna type. If
    /// `ray_table` is supplied it is parsed; otherwise the compiled-in
    /// defaults are consulted. An unknown combination is a fatal error,
    /// never a silent default.
    pub fn select(
        observatory: &str,
        antenna_type: &str,
        ray_table: Option<&Path>,
    ) -> Result<GeometryCatalog, CatalogError> {
        info!(
            "Initialisation of geometries for observatory {observatory}, antenna type {antenna_type}"
        );
        match ray_table {
            Some(path) => {
                let mut catalog = Self::from_ray_table(path)?;
                catalog.observatory = observatory.to_string();
                catalog.antenna_type = antenna_type.to_string();
                Ok(catalog)
            }
            None => Self::internal(observatory, antenna_type),
        }
    }

    /// The compiled-in defaults for a fixed set of known observatories:
    /// "VLA"/"EVLA" with antenna type "STANDARD", and "ALMA" with antenna
    /// types "DA", "DV" and "PM" (one shared geometry; "DA" carries
    /// ×-oriented struts).
    pub fn internal(
        observatory: &str,
        antenna_type: &str,
    ) -> Result<GeometryCatalog, CatalogError> {
        let (table, focal_length): (&[defaults::DefaultBand], f64) =
            match (observatory, antenna_type) {
                ("VLA", "STANDARD") => (&defaults::VLA_BANDS, defaults::VLA_FOCAL_LENGTH),
                ("EVLA", "STANDARD") => (&defaults::EVLA_BANDS, defaults::VLA_FOCAL_LENGTH),
                ("ALMA", "DA" | "DV" | "PM") => (&defaults::ALMA_BANDS, defaults::ALMA_FOCAL_LENGTH),
                _ => {
                    return Err(CatalogError::UnknownObservatory {
                        observatory: observatory.to_string(),
                        antenna_type: antenna_type.to_string(),
                    })
                }
            };
        info!("Will use default geometries for {observatory} {antenna_type}");

        let bands = table
            .iter()
            .map(|d| {
                let mut band = BandGeometry {
                    name: d.name.to_string(),
                    min_freq_ghz: d.min_freq_ghz,
                    max_freq_ghz: d.max_freq_ghz,
                    sub_h: d.sub_h,
                    feed_pos: d.feed_pos,
                    sub_angle_deg: d.sub_angle_deg,
                    leg_width: d.leg_width,
                    leg_foot: d.leg_foot,
                    leg_apex: d.leg_apex,
                    hole_radius: d.hole_radius,
                    antenna_radius: d.antenna_radius,
                    ref_freq_ghz: d.ref_freq_ghz,
                    taper_poly: d.taper_poly,
                    n_taper_poly: d.n_taper_poly,
                    astigm_0: d.astigm_0,
                    astigm_45: d.astigm_45,
                };
                // DA antennas have the same geometry but "×"-shaped struts.
                if observatory == "ALMA" && antenna_type == "DA" {
                    band.leg_width = -band.leg_width;
                }
                band
            })
            .collect();

        Ok(GeometryCatalog {
            observatory: observatory.to_string(),
            antenna_type: antenna_type.to_string(),
            bands,
            profile_dir: None,
            focal_length: Some(focal_length),
        })
    }

    /// Parse a ray-geometry table: whitespace-delimited text, one row per
    /// band, `#` comments. Surface profiles are looked for next to the
    /// table as `<band name>.surface`.
    pub fn from_ray_table<P: AsRef<Path>>(path: P) -> Result<GeometryCatalog, CatalogError> {
        let path = path.as_ref();
        info!("Reading ray-geometry table {}", path.display());
        let file = File::open(path).map_err(|err| CatalogError::Io {
            path: path.display().to_string(),
            err,
        })?;
        let mut catalog = Self::from_table_reader(
            BufReader::new(file),
            &path.display().to_string(),
        )?;
        catalog.profile_dir = path.parent().map(Path::to_path_buf);
        Ok(catalog)
    }

    /// As [`GeometryCatalog::from_ray_table`], but from anything buffered;
    /// the resulting catalog has no profile directory.
    pub fn from_table_reader<R: BufRead>(
        reader: R,
        label: &str,
    ) -> Result<GeometryCatalog, CatalogError> {
        let mut bands = Vec::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line.map_err(|err| CatalogError::Io {
                path: label.to_string(),
                err,
            })?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let fields: Vec<&str> = line.split_whitespace().collect();
            if fields.len() != RAY_TABLE_COLUMNS {
                return Err(CatalogError::MissingColumns {
                    line_num: i + 1,
                    expected: RAY_TABLE_COLUMNS,
                    got: fields.len(),
                });
            }
            let num = |text: &str| -> Result<f64, CatalogError> {
                text.parse().map_err(|_| CatalogError::ParseField {
                    line_num: i + 1,
                    text: text.to_string(),
                })
            };
            bands.push(BandGeometry {
                name: fields[0].to_string(),
                min_freq_ghz: num(fields[1])?,
                max_freq_ghz: num(fields[2])?,
                sub_h: num(fields[3])?,
                feed_pos: [num(fields[4])?, num(fields[5])?, num(fields[6])?],
                sub_angle_deg: num(fields[7])?,
                leg_width: num(fields[8])?,
                leg_foot: num(fields[9])?,
                leg_apex: num(fields[10])?,
                hole_radius: num(fields[11])?,
                antenna_radius: num(fields[12])?,
                ref_freq_ghz: num(fields[13])?,
                taper_poly: [
                    num(fields[14])?,
                    num(fields[15])?,
                    num(fields[16])?,
                    num(fields[17])?,
                    num(fields[18])?,
                ],
                n_taper_poly: num(fields[19])? as usize,
                astigm_0: num(fields[20])?,
                astigm_45: num(fields[21])?,
            });
        }
        if bands.is_empty() {
            return Err(CatalogError::EmptyTable);
        }
        info!("... successful ({} bands)", bands.len());
        Ok(GeometryCatalog {
            observatory: String::new(),
            antenna_type: String::new(),
            bands,
            profile_dir: None,
            focal_length: None,
        })
    }

    pub fn observatory(&self) -> &str {
        &self.observatory
    }

    pub fn antenna_type(&self) -> &str {
        &self.antenna_type
    }

    pub fn num_bands(&self) -> usize {
        self.bands.len()
    }

    pub fn bands(&self) -> &[BandGeometry] {
        &self.bands
    }

    pub fn band(&self, band: usize) -> Result<&BandGeometry, CatalogError> {
        self.bands.get(band).ok_or(CatalogError::BandOutOfRange {
            band,
            num_bands: self.bands.len(),
        })
    }

    /// Find the band whose `[min, max]` frequency range contains
    /// `freq_ghz`. The scan is linear and the first match wins, so a
    /// frequency exactly on a boundary shared by two bands resolves to the
    /// lower band.
    pub fn band_for_freq(&self, freq_ghz: f64) -> Result<usize, CatalogError> {
        for (i, band) in self.bands.iter().enumerate() {
            if band.min_freq_ghz <= freq_ghz && freq_ghz <= band.max_freq_ghz {
                return Ok(i);
            }
        }
        Err(CatalogError::NoMatchingBand { freq_ghz })
    }

    /// The polarization basis the observatory's feeds are usually described
    /// in: circular for the VLA family, linear otherwise.
    pub fn natural_basis(&self) -> PolBasis {
        match self.observatory.as_str() {
            "VLA" | "EVLA" => PolBasis::Circular,
            _ => PolBasis::Linear,
        }
    }

    /// Resolve a dish surface profile for the given band: a
    /// `<band name>.surface` file next to the ray table if the catalog came
    /// from disk, else a synthesised paraboloid for the compiled-in
    /// catalogs.
    pub fn profile_for_band(&self, band: usize) -> Result<DishProfile, CatalogError> {
        let geometry = self.band(band)?;
        if let Some(dir) = &self.profile_dir {
            return DishProfile::from_path(dir.join(format!("{}.surface", geometry.name)));
        }
        if let Some(focal_length) = self.focal_length {
            return DishProfile::paraboloid(geometry.antenna_radius, focal_length, 129);
        }
        Err(CatalogError::NoProfileSource {
            band_name: geometry.name.clone(),
        })
    }
}
