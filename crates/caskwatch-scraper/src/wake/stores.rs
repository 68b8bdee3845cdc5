//! Coordinates of Wake County ABC stores, keyed by the address as the
//! search page renders it.

use caskwatch_core::Location;

use super::GeoLookup;

const STORE_COORDINATES: &[(&str, f64, f64)] = &[
    ("7200 Sandy Fork Rd. Raleigh, NC 27609", 35.871_920_6, -78.623_290_6),
    ("3320 Olympia Dr. Raleigh, NC 27603", 35.734_528_7, -78.651_765_7),
    ("1793 West Williams St. Apex, NC 27502", 35.759_358_7, -78.876_518_3),
    ("1940 Cinema Dr. Fuquay Varina, NC 27526", 35.601_865_7, -78.753_198_3),
    ("11360 Capital Blvd. Wake Forest, NC 27587", 35.954_119_7, -78.539_536_7),
    ("6301 Town Center Dr. Raleigh, NC 27614", 35.870_012, -78.577_662_8),
    ("200 New Rand Road Garner, NC 27529", 35.701_743_8, -78.602_32),
    ("1601-61 Cross Link Rd. Raleigh, NC 27610", 35.746_164_3, -78.623_002_4),
    ("7336 Creedmoor Rd. Raleigh, NC 27613", 35.886_729_6, -78.679_386_4),
    ("1415 E. Williams St. Apex, NC 27617", 35.713_443_7, -78.839_580_3),
    ("7911 ACC Blvd. Raleigh, NC 27617", 35.916_925_6, -78.780_007_4),
    ("100 Village Walk Dr Holly Springs, NC 27540", 35.638_907_2, -78.835_385_3),
    ("1505 Banyon Pl. Wendell, NC 27571", 35.7794, -78.3687),
    ("4009 Davis Dr. Morrisville, NC 27560", 35.834_936_5, -78.855_620_5),
    ("3615 SW Cary Parkway Cary, NC 27513", 35.781_112, -78.838_474_8),
    ("665 Cary Towne Blvd. Cary, NC 27511", 35.776_632_7, -78.766_272),
    ("6494 Tryon Rd. Cary, NC 27511", 35.743_637_2, -78.762_383_4),
    ("704 Money Ct. Knightdale, NC 27545", 35.798_297_5, -78.473_172_5),
    ("4501 Vineyrd Pine Ln. Rolesville, NC 27571", 35.9319, -78.4466),
    ("209 S Salisbury St Raleigh, NC 27601", 35.778_080_3, -78.640_092_3),
    ("4215 The Circle at North Hills Rd Raleigh, NC 27609", 35.837_895_9, -78.642_488),
    ("2109-106 Avent Ferry Rd. Raleigh, NC 27606", 35.779_602_9, -78.675_650_1),
    ("1420 N Ardendell Dr. Zebulon, NC 27597", 35.840_154, -78.325_293_5),
    ("6809 Davis Circle Raleigh, NC 27612", 35.862_667, -78.709_989_9),
    ("420 Woodburn Rd. Raleigh, NC 27605", 35.789_932_6, -78.658_690_2),
    ("2645 Appliance Ct. Raleigh, NC 27604", 35.812_529_3, -78.601_825_8),
];

/// Static address lookup for Wake County stores.
///
/// Matching ignores case and whitespace differences, since the search page
/// renders addresses across a `<br/>` that is collapsed during parsing.
#[derive(Debug, Clone, Copy, Default)]
pub struct WakeStoreDirectory;

impl WakeStoreDirectory {
    #[must_use]
    pub fn len(&self) -> usize {
        STORE_COORDINATES.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        STORE_COORDINATES.is_empty()
    }
}

fn canonical(address: &str) -> String {
    address
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

impl GeoLookup for WakeStoreDirectory {
    fn locate(&self, address: &str) -> Option<Location> {
        let wanted = canonical(address);
        STORE_COORDINATES
            .iter()
            .find(|(known, _, _)| canonical(known) == wanted)
            .map(|&(_, lat, lon)| Location::new(lat, lon))
    }
}
