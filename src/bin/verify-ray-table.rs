// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! This program parses the given ray-geometry tables and sanity-checks the
//! band definitions, so a bad table is caught before a long aperture
//! computation trips over it.

use hyperaperture::{CatalogError, GeometryCatalog};

fn main() {
    // Test each input table.
    for table in std::env::args().skip(1) {
        if let Err(e) = test_table(&table) {
            println!("Table '{}' failed to load: {}", &table, e);
        }
    }
}

fn test_table(table: &str) -> Result<(), CatalogError> {
    println!("Testing table '{}'", table);
    let catalog = GeometryCatalog::from_ray_table(table)?;
    for (i, band) in catalog.bands().iter().enumerate() {
        println!(
            "  band {} '{}': {} - {} GHz, R = {} m",
            i, band.name, band.min_freq_ghz, band.max_freq_ghz, band.antenna_radius
        );
        if band.min_freq_ghz > band.max_freq_ghz {
            println!("    WARNING: inverted frequency range");
        }
        if band.antenna_radius <= band.hole_radius {
            println!("    WARNING: the central hole swallows the whole dish");
        }
        // A band is only usable if its surface profile is there too.
        match catalog.profile_for_band(i) {
            Ok(profile) => println!("    surface profile: {} samples", profile.num_samples()),
            Err(e) => println!("    WARNING: no usable surface profile: {}", e),
        }
    }

    println!("Table '{}' is all good!", table);
    Ok(())
}
